/*!
 * Per-invocation project context: working and scratch locations
 */

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

/// Locations used while processing one manifest
///
/// Recomputed on every run. Two concurrent runs for the same project share
/// the scratch directory and are not coordinated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    /// Project name (basename of the working directory)
    pub name: String,
    /// Working directory; tar entry names are relative to it
    pub cwd: PathBuf,
    /// Scratch directory owned by this run
    pub temp_dir: PathBuf,
    /// Intermediate tar file
    pub tar_file: PathBuf,
    /// Directory the tar is unpacked into
    pub extract_dir: PathBuf,
    /// Final txtar written next to the manifest
    pub txtar_file: PathBuf,
    /// Directory holding per-batch txtar files
    pub batch_dir: PathBuf,
}

impl ProjectInfo {
    /// Set up the context rooted at `cwd`, with scratch space under `scratch_base`
    ///
    /// Stale extraction and batch directories from an earlier run are removed.
    pub fn new(cwd: &Path, manifest_file: &Path, scratch_base: &Path, batching: bool) -> Result<Self> {
        let name = cwd
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "root".to_string());

        let temp_dir = scratch_base.join(format!("nearwait_{}", name));
        fs::create_dir_all(&temp_dir)?;
        debug!(path = %temp_dir.display(), "created temporary directory");

        let extract_dir = temp_dir.join(&name);
        let batch_dir = temp_dir.join("batches");
        for stale in [&extract_dir, &batch_dir] {
            if stale.exists() {
                fs::remove_dir_all(stale)?;
            }
        }
        if batching {
            fs::create_dir_all(&batch_dir)?;
        }

        let manifest_dir = match manifest_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => cwd.join(parent),
            _ => cwd.to_path_buf(),
        };

        Ok(Self {
            tar_file: temp_dir.join(format!("{}.tar", name)),
            txtar_file: manifest_dir.join(txtar_name(manifest_file)),
            cwd: cwd.to_path_buf(),
            name,
            temp_dir,
            extract_dir,
            batch_dir,
        })
    }

    /// Path of the `index`-th (zero-based) batch file
    pub fn batch_file(&self, index: usize) -> PathBuf {
        self.batch_dir.join(format!("batch_{:03}.txtar", index + 1))
    }
}

/// File name of the txtar produced for `manifest_file`
pub fn txtar_name(manifest_file: &Path) -> String {
    let stem = manifest_file
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "nearwait".to_string());
    format!("{}.txtar", stem)
}
