//! Selector resolution against the platform registry.

use ortpull_schema::{PlatformSelector, PlatformTarget, SelectorError, lookup};

/// A registry row bound to a concrete version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    /// The matched registry row.
    pub target: PlatformTarget,
    /// Filename template with the version substituted.
    pub archive_filename: String,
}

/// A selector that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    /// The selector exactly as given.
    pub input: String,
    /// Why it was rejected.
    pub reason: SelectorError,
}

/// Outcome of resolving a platform selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Jobs to run, in order.
    pub specs: Vec<JobSpec>,
    /// Selectors that were skipped.
    pub rejected: Vec<Rejected>,
}

fn bind(target: &PlatformTarget, version: &str) -> JobSpec {
    JobSpec {
        target: *target,
        archive_filename: target.archive_filename(version),
    }
}

/// Resolve a selection into job specs.
///
/// With no selection every registry row is returned in registry order.
/// Otherwise selectors are resolved in the order given; malformed or unknown
/// ones are collected in [`Resolution::rejected`] and never abort resolution.
pub fn targets_for(
    registry: &[PlatformTarget],
    selection: Option<&[String]>,
    version: &str,
) -> Resolution {
    let Some(selection) = selection else {
        return Resolution {
            specs: registry.iter().map(|t| bind(t, version)).collect(),
            rejected: Vec::new(),
        };
    };

    let mut resolution = Resolution::default();
    for input in selection {
        let resolved = input
            .parse::<PlatformSelector>()
            .and_then(|sel| {
                lookup(registry, &sel).ok_or(SelectorError::Unknown {
                    os: sel.os,
                    arch: sel.arch,
                })
            });

        match resolved {
            Ok(target) => resolution.specs.push(bind(target, version)),
            Err(reason) => {
                tracing::warn!(selector = %input, %reason, "skipping platform");
                resolution.rejected.push(Rejected {
                    input: input.clone(),
                    reason,
                });
            }
        }
    }
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use ortpull_schema::REGISTRY;

    fn sel(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_no_selection_returns_full_registry_in_order() {
        let resolution = targets_for(REGISTRY, None, "9.9.9");

        assert!(resolution.rejected.is_empty());
        assert_eq!(resolution.specs.len(), REGISTRY.len());
        for (spec, target) in resolution.specs.iter().zip(REGISTRY) {
            assert_eq!(&spec.target, target);
            assert_eq!(
                spec.archive_filename,
                target.filename_template.replace("{version}", "9.9.9")
            );
            assert!(spec.archive_filename.contains("9.9.9"));
        }
        assert_eq!(
            resolution.specs[0].archive_filename,
            "onnxruntime-win-x64-9.9.9.zip"
        );
    }

    #[test]
    fn test_malformed_selector_is_dropped() {
        let selection = sel(&["linuxamd64", "linux-arm64"]);
        let resolution = targets_for(REGISTRY, Some(selection.as_slice()), "1.21.0");

        assert_eq!(resolution.specs.len(), 1);
        assert_eq!(
            resolution.specs[0].archive_filename,
            "onnxruntime-linux-aarch64-1.21.0.tgz"
        );
        assert_eq!(
            resolution.rejected,
            vec![Rejected {
                input: "linuxamd64".to_string(),
                reason: SelectorError::Malformed("linuxamd64".to_string()),
            }]
        );
    }

    #[test]
    fn test_unknown_selector_is_dropped() {
        let selection = sel(&["freebsd-amd64"]);
        let resolution = targets_for(REGISTRY, Some(selection.as_slice()), "1.21.0");

        assert!(resolution.specs.is_empty());
        assert!(matches!(
            resolution.rejected[0].reason,
            SelectorError::Unknown { .. }
        ));
    }

    #[test]
    fn test_selection_order_is_preserved() {
        let selection = sel(&["windows-arm64", "darwin-amd64", "windows-amd64"]);
        let resolution = targets_for(REGISTRY, Some(selection.as_slice()), "1.0.0");

        let order: Vec<String> = resolution
            .specs
            .iter()
            .map(|s| s.target.selector())
            .collect();
        assert_eq!(order, selection);
    }

    #[test]
    fn test_empty_selection_yields_no_jobs() {
        let resolution = targets_for(REGISTRY, Some(&[] as &[String]), "1.0.0");
        assert_eq!(resolution, Resolution::default());
    }
}
