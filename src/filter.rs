/*!
 * Inclusion/exclusion rules applied while discovering files
 */

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Decides whether a path is a discovery candidate
///
/// All paths handed to the filter are normalized absolute paths. Exclude
/// names are matched against the segments of the path *below* `root`, so
/// an ancestor of the project named like an excluded directory has no
/// effect.
#[derive(Debug, Clone)]
pub struct Filter {
    /// Project root the walk starts from
    root: PathBuf,
    /// Excluded path segment names
    excludes: HashSet<String>,
    /// Explicitly included roots (files or directories)
    includes: Vec<PathBuf>,
}

impl Filter {
    /// Create a filter with no includes
    pub fn new(root: impl Into<PathBuf>, excludes: impl IntoIterator<Item = String>) -> Self {
        Self {
            root: root.into(),
            excludes: excludes.into_iter().collect(),
            includes: Vec::new(),
        }
    }

    /// Restrict discovery to the given normalized roots
    pub fn with_includes(mut self, includes: Vec<PathBuf>) -> Self {
        self.includes = includes;
        self
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Include roots, empty when discovery covers the whole root
    pub fn includes(&self) -> &[PathBuf] {
        &self.includes
    }

    /// Whether explicit includes are configured
    pub fn has_includes(&self) -> bool {
        !self.includes.is_empty()
    }

    /// Check whether `path` should be skipped
    ///
    /// For a directory, `true` means the walk must not descend into it.
    pub fn is_excluded(&self, path: &Path) -> bool {
        if path == self.root {
            return false;
        }

        if self.has_includes() {
            // Ancestors of an include stay visible so the walker can reach it
            return !self.includes.iter().any(|include| {
                path == include || path.starts_with(include) || include.starts_with(path)
            });
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .any(|segment| self.excludes.contains(segment.as_os_str().to_string_lossy().as_ref()))
    }
}
