//! Registry listing for `--list`.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use ortpull_schema::{DEFAULT_ORT_VERSION, PlatformTarget};

/// Render `registry` with archive names at the default version.
pub fn registry_table(registry: &[PlatformTarget]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["platform", "upstream", "format", "archive"]);

    for target in registry {
        table.add_row(vec![
            target.selector(),
            target.archive_tuple(),
            target.format.to_string(),
            target.archive_filename(DEFAULT_ORT_VERSION),
        ]);
    }
    table
}
