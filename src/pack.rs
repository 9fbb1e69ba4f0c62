/*!
 * Size-bounded batch packing
 *
 * Files are charged their txtar container size and packed greedily,
 * largest first. A file that alone exceeds the budget gets a batch of its
 * own; it is never merged and never an error.
 */

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, ResultExt};
use crate::txtar;

/// A file scheduled for packing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the extraction directory
    pub path: PathBuf,
    /// Container size in bytes (content plus txtar framing)
    pub size: u64,
}

impl FileEntry {
    /// Entry for a file of `raw_size` bytes, charging txtar overhead
    pub fn new(path: impl Into<PathBuf>, raw_size: u64) -> Self {
        let path = path.into();
        let size = raw_size + txtar::entry_overhead(&path.to_string_lossy());
        Self { path, size }
    }
}

/// One archive worth of files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    /// Files in placement order
    pub files: Vec<FileEntry>,
    /// Sum of container sizes
    pub size: u64,
}

impl Batch {
    fn push(&mut self, file: FileEntry) {
        self.size += file.size;
        self.files.push(file);
    }

    fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Partition `files` into batches of at most `budget` container bytes
///
/// A `budget` of 0 means "do not batch" and yields no batches; the caller
/// produces one unbounded archive instead.
pub fn pack(mut files: Vec<FileEntry>, budget: u64) -> Vec<Batch> {
    if budget == 0 {
        return Vec::new();
    }

    // Largest first, ties by path for stable output
    files.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));

    let mut batches = Vec::new();
    let mut current = Batch::default();

    for file in files {
        if file.size > budget {
            if !current.is_empty() {
                batches.push(std::mem::take(&mut current));
            }
            let mut alone = Batch::default();
            alone.push(file);
            batches.push(alone);
            continue;
        }

        if current.size + file.size > budget && !current.is_empty() {
            batches.push(std::mem::take(&mut current));
        }
        current.push(file);
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}

/// Collect every file under `dir` with its container size
pub fn collect_files(dir: &Path) -> Result<Vec<FileEntry>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.batch_context(|| format!("walking {}", dir.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let metadata = entry
            .metadata()
            .batch_context(|| format!("reading size of {}", entry.path().display()))?;
        let rel = entry
            .path()
            .strip_prefix(dir)
            .batch_context(|| format!("relativizing {}", entry.path().display()))?;
        files.push(FileEntry::new(rel, metadata.len()));
    }

    Ok(files)
}
