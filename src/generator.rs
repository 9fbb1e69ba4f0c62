/*!
 * Manifest generation: discover, reconcile, persist
 */

use std::path::Path;

use tracing::{debug, info};

use crate::config::Config;
use crate::discover::{Discoverer, FileWalker};
use crate::error::Result;
use crate::manifest::Manifest;
use crate::project::txtar_name;
use crate::reconcile::{ManifestUpdater, Reconciler};
use crate::store::{ManifestReader, ManifestStore, ManifestWriter};

/// Orchestrates one manifest generation pass
///
/// Each collaborator defaults to the file-backed implementation and can be
/// replaced, e.g. with a test double.
pub struct ManifestGenerator {
    reader: Box<dyn ManifestReader>,
    writer: Box<dyn ManifestWriter>,
    updater: Box<dyn ManifestUpdater>,
    walker: Box<dyn FileWalker>,
}

impl ManifestGenerator {
    /// Create a generator wired to the default collaborators for `config`
    pub fn new(config: &Config) -> Result<Self> {
        let normalizer = config.normalizer();
        let store = ManifestStore::new(normalizer.clone(), config.path_style);
        let manifest_path = normalizer.normalize(&config.manifest_file)?;
        let output_path = manifest_path.with_file_name(txtar_name(&config.manifest_file));
        let discoverer = Discoverer::new(config.filter()?, normalizer.clone())
            .skip_file(manifest_path)
            .skip_file(output_path);

        Ok(Self {
            reader: Box::new(store.clone()),
            writer: Box::new(store),
            updater: Box::new(Reconciler::new(normalizer)),
            walker: Box::new(discoverer),
        })
    }

    /// Replace the manifest reader
    pub fn with_reader(mut self, reader: impl ManifestReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    /// Replace the manifest writer
    pub fn with_writer(mut self, writer: impl ManifestWriter + 'static) -> Self {
        self.writer = Box::new(writer);
        self
    }

    /// Replace the reconciliation strategy
    pub fn with_updater(mut self, updater: impl ManifestUpdater + 'static) -> Self {
        self.updater = Box::new(updater);
        self
    }

    /// Replace the file walker
    pub fn with_walker(mut self, walker: impl FileWalker + 'static) -> Self {
        self.walker = Box::new(walker);
        self
    }

    /// Discover files and write the manifest
    ///
    /// Returns `true` when the written manifest is fresh (first run, an
    /// empty previous manifest, or `force`), meaning the caller should stop
    /// and let the user edit it before packing.
    pub fn generate(&self, force: bool, manifest_file: &Path) -> Result<bool> {
        debug!(path = %manifest_file.display(), force, "generating manifest");

        let current = self.walker.current_files()?;

        let (manifest, fresh) = if force {
            (Manifest::all_enabled(current), true)
        } else {
            let existing = self.reader.read_manifest(manifest_file)?;
            if existing.is_empty() {
                (Manifest::all_enabled(current), true)
            } else {
                (self.updater.update_manifest(&existing, &current), false)
            }
        };

        self.writer.write_manifest(&manifest, manifest_file)?;
        info!(entries = manifest.len(), fresh, "manifest written");

        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::path::PathBuf;
    use std::rc::Rc;

    use crate::manifest::{self, PathStyle};

    struct FixedWalker(Vec<&'static str>);

    impl FileWalker for FixedWalker {
        fn current_files(&self) -> Result<BTreeSet<PathBuf>> {
            Ok(self.0.iter().map(PathBuf::from).collect())
        }
    }

    struct FixedReader(Manifest);

    impl ManifestReader for FixedReader {
        fn read_manifest(&self, _path: &Path) -> Result<Manifest> {
            Ok(self.0.clone())
        }
    }

    #[derive(Clone, Default)]
    struct CapturingWriter(Rc<RefCell<String>>);

    impl ManifestWriter for CapturingWriter {
        fn write_manifest(&self, manifest: &Manifest, _path: &Path) -> Result<()> {
            *self.0.borrow_mut() = manifest::render(manifest, PathStyle::Absolute, Path::new("/"));
            Ok(())
        }
    }

    fn generator(walker: FixedWalker, existing: Manifest, out: CapturingWriter) -> Result<ManifestGenerator> {
        Ok(ManifestGenerator::new(&Config::default())?
            .with_walker(walker)
            .with_reader(FixedReader(existing))
            .with_writer(out)
            .with_updater(Reconciler::new(crate::paths::Normalizer::new(Vec::new()))))
    }

    #[test]
    fn test_first_run_enables_everything() -> Result<()> {
        let out = CapturingWriter::default();
        let gen = generator(FixedWalker(vec!["/p/b", "/p/a"]), Manifest::new(), out.clone())?;

        assert!(gen.generate(false, Path::new("m.yml"))?);
        assert_eq!(*out.0.borrow(), "filelist:\n- /p/a\n- /p/b\n");
        Ok(())
    }

    #[test]
    fn test_existing_manifest_is_reconciled() -> Result<()> {
        let mut existing = Manifest::new();
        existing.insert(PathBuf::from("/p/a"), true);
        existing.insert(PathBuf::from("/p/old"), false);

        let out = CapturingWriter::default();
        let gen = generator(FixedWalker(vec!["/p/a", "/p/c"]), existing, out.clone())?;

        assert!(!gen.generate(false, Path::new("m.yml"))?);
        assert_eq!(*out.0.borrow(), "filelist:\n# - /p/a\n- /p/c\n");
        Ok(())
    }

    #[test]
    fn test_force_discards_state() -> Result<()> {
        let mut existing = Manifest::new();
        existing.insert(PathBuf::from("/p/a"), true);

        let out = CapturingWriter::default();
        let gen = generator(FixedWalker(vec!["/p/a"]), existing, out.clone())?;

        assert!(gen.generate(true, Path::new("m.yml"))?);
        assert_eq!(*out.0.borrow(), "filelist:\n- /p/a\n");
        Ok(())
    }
}
