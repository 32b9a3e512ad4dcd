//! `--list`: the platform registry.

use crate::ui::table::registry_table;

/// Print every supported platform and its upstream archive.
pub fn list() {
    println!("{}", registry_table(ortpull_schema::REGISTRY));
}
