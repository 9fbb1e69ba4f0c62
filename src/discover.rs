/*!
 * File discovery: walks the project tree and collects candidate files
 */

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{NearwaitError, Result};
use crate::filter::Filter;
use crate::paths::Normalizer;

/// Source of the current candidate file set
pub trait FileWalker {
    /// Return the normalized paths of every candidate file
    fn current_files(&self) -> Result<BTreeSet<PathBuf>>;
}

/// Walks the real filesystem under the filter's root or include roots
#[derive(Debug, Clone)]
pub struct Discoverer {
    /// Inclusion/exclusion rules
    filter: Filter,
    /// Normalizer applied to every recorded file
    normalizer: Normalizer,
    /// Exact files never recorded (the manifest itself)
    skip: BTreeSet<PathBuf>,
}

impl Discoverer {
    /// Create a discoverer
    pub fn new(filter: Filter, normalizer: Normalizer) -> Self {
        Self {
            filter,
            normalizer,
            skip: BTreeSet::new(),
        }
    }

    /// Never record `path`, even when an include covers it
    pub fn skip_file(mut self, path: PathBuf) -> Self {
        self.skip.insert(path);
        self
    }

    /// Walk all roots and collect candidate files
    pub fn discover(&self) -> Result<BTreeSet<PathBuf>> {
        let mut files = BTreeSet::new();

        if self.filter.has_includes() {
            for include in self.filter.includes() {
                if !include.exists() {
                    warn!(path = %include.display(), "include path does not exist, skipping");
                    continue;
                }
                self.walk(include, &mut files)?;
            }
        } else {
            self.walk(self.filter.root(), &mut files)?;
        }

        debug!(count = files.len(), "discovered files");
        Ok(files)
    }

    /// Depth-first walk from `start`, pruning excluded directories
    fn walk(&self, start: &Path, files: &mut BTreeSet<PathBuf>) -> Result<()> {
        let walker = WalkDir::new(start)
            .into_iter()
            .filter_entry(|entry| !self.filter.is_excluded(entry.path()));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| start.to_path_buf());
                NearwaitError::Discovery {
                    path,
                    source: io::Error::from(e),
                }
            })?;

            if entry.file_type().is_dir() {
                continue;
            }

            let normalized = self.normalizer.normalize(entry.path())?;
            if self.skip.contains(&normalized) {
                continue;
            }
            files.insert(normalized);
        }

        Ok(())
    }
}

impl FileWalker for Discoverer {
    fn current_files(&self) -> Result<BTreeSet<PathBuf>> {
        self.discover()
    }
}
