/*!
 * Reconciliation of freshly discovered files with a persisted manifest
 */

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::warn;

use crate::manifest::Manifest;
use crate::paths::Normalizer;

/// Merges a discovered file set into an existing manifest
pub trait ManifestUpdater {
    /// Build the manifest reflecting `current`, keeping flags from `old`
    fn update_manifest(&self, old: &Manifest, current: &BTreeSet<PathBuf>) -> Manifest;
}

/// Default updater
///
/// Known paths keep their flag, new paths come in enabled and vanished
/// paths are dropped. A path that fails to normalize is logged and skipped.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    normalizer: Normalizer,
}

impl Reconciler {
    /// Create a reconciler
    pub fn new(normalizer: Normalizer) -> Self {
        Self { normalizer }
    }
}

impl ManifestUpdater for Reconciler {
    fn update_manifest(&self, old: &Manifest, current: &BTreeSet<PathBuf>) -> Manifest {
        let mut updated = Manifest::new();

        for file in current {
            let normalized = match self.normalizer.normalize(file) {
                Ok(path) => path,
                Err(e) => {
                    warn!(path = %file.display(), error = %e, "failed to normalize path, skipping");
                    continue;
                }
            };
            let disabled = old.is_disabled(&normalized).unwrap_or(false);
            updated.insert(normalized, disabled);
        }

        updated
    }
}

/// Reconcile with the default normalizer rules
pub fn reconcile(old: &Manifest, current: &BTreeSet<PathBuf>) -> Manifest {
    Reconciler::default().update_manifest(old, current)
}
