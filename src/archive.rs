/*!
 * Archive staging: tar collection of enabled files and txtar bundling
 */

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use indicatif::ProgressBar;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, ResultExt};
use crate::project::ProjectInfo;
use crate::txtar;

/// Turns the enabled manifest entries into the final txtar
pub trait ArchiveProcessor {
    /// Gather `files` into the project's extraction directory
    fn stage(&self, files: &[PathBuf], project: &ProjectInfo) -> Result<()>;

    /// Encode the extraction directory as the project's txtar file
    fn bundle(&self, project: &ProjectInfo) -> Result<()>;
}

/// Default processor: tar into the scratch dir, unpack, then txtar
pub struct TarTxtarArchiver {
    progress: ProgressBar,
}

impl Default for TarTxtarArchiver {
    fn default() -> Self {
        Self::new(ProgressBar::hidden())
    }
}

impl TarTxtarArchiver {
    /// Create an archiver reporting per-file progress on `progress`
    pub fn new(progress: ProgressBar) -> Self {
        Self { progress }
    }
}

impl ArchiveProcessor for TarTxtarArchiver {
    fn stage(&self, files: &[PathBuf], project: &ProjectInfo) -> Result<()> {
        create_tar(files, &project.tar_file, &project.cwd, &self.progress)?;
        debug!(path = %project.tar_file.display(), "created tar archive");

        fs::create_dir_all(&project.extract_dir)?;
        extract_tar(&project.tar_file, &project.extract_dir)?;
        debug!(from = %project.tar_file.display(), to = %project.extract_dir.display(), "extracted tar archive");
        Ok(())
    }

    fn bundle(&self, project: &ProjectInfo) -> Result<()> {
        let archive = read_dir_archive(&project.extract_dir)?;
        fs::write(&project.txtar_file, txtar::format(&archive))
            .archive_context(|| format!("writing {}", project.txtar_file.display()))?;
        debug!(path = %project.txtar_file.display(), files = archive.files.len(), "created txtar archive");
        Ok(())
    }
}

/// Name a file gets inside the tar
///
/// Files under `base` are stored relative to it; anything else keeps its
/// absolute path without the root, so it can never escape the extraction
/// directory.
pub fn entry_name(file: &Path, base: &Path) -> PathBuf {
    if let Ok(rel) = file.strip_prefix(base) {
        if !rel.as_os_str().is_empty() {
            return rel.to_path_buf();
        }
    }
    file.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

/// Write `files` into a tar at `tar_file`
pub fn create_tar(files: &[PathBuf], tar_file: &Path, base: &Path, progress: &ProgressBar) -> Result<()> {
    let out = File::create(tar_file).archive_context(|| format!("creating {}", tar_file.display()))?;
    let mut builder = tar::Builder::new(BufWriter::new(out));

    progress.set_length(files.len() as u64);
    for file in files {
        let name = entry_name(file, base);
        debug!(file = %name.display(), "adding file to tar");
        progress.set_message(name.display().to_string());
        builder
            .append_path_with_name(file, &name)
            .archive_context(|| format!("adding {} to tar", file.display()))?;
        progress.inc(1);
    }

    let mut out = builder
        .into_inner()
        .archive_context(|| format!("finishing {}", tar_file.display()))?;
    out.flush()
        .archive_context(|| format!("flushing {}", tar_file.display()))
}

/// Unpack `tar_file` into `dest`
pub fn extract_tar(tar_file: &Path, dest: &Path) -> Result<()> {
    let input = File::open(tar_file).archive_context(|| format!("opening {}", tar_file.display()))?;
    tar::Archive::new(input)
        .unpack(dest)
        .archive_context(|| format!("extracting {} to {}", tar_file.display(), dest.display()))
}

/// Read every file under `dir` into a txtar archive, names relative to `dir`
pub fn read_dir_archive(dir: &Path) -> Result<txtar::Archive> {
    let mut archive = txtar::Archive::default();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.archive_context(|| format!("walking {}", dir.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(dir)
            .archive_context(|| format!("relativizing {}", entry.path().display()))?;
        let data = fs::read(entry.path()).archive_context(|| format!("reading {}", entry.path().display()))?;
        archive.files.push(txtar::File {
            name: rel.to_string_lossy().to_string(),
            data,
        });
    }

    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_entry_name() {
        let base = Path::new("/work/proj");
        assert_eq!(entry_name(Path::new("/work/proj/src/a.rs"), base), PathBuf::from("src/a.rs"));
        assert_eq!(entry_name(Path::new("/etc/hosts"), base), PathBuf::from("etc/hosts"));
    }

    #[test]
    fn test_stage_and_bundle() -> Result<()> {
        let work = tempdir()?;
        let cwd = work.path().join("proj");
        fs::create_dir_all(cwd.join("src"))?;
        fs::write(cwd.join("src/lib.rs"), "pub fn x() {}\n")?;
        fs::write(cwd.join("README.md"), "readme")?;
        let outside = work.path().join("shared.txt");
        fs::write(&outside, "shared\n")?;

        let scratch = tempdir()?;
        let project = ProjectInfo::new(&cwd, Path::new(".nearwait.yml"), scratch.path(), false)?;

        let archiver = TarTxtarArchiver::default();
        archiver.stage(
            &[cwd.join("src/lib.rs"), cwd.join("README.md"), outside.clone()],
            &project,
        )?;
        assert!(project.extract_dir.join("src/lib.rs").is_file());

        archiver.bundle(&project)?;
        let archive = txtar::parse(&fs::read(&project.txtar_file)?);
        let names: Vec<&str> = archive.files.iter().map(|f| f.name.as_str()).collect();
        let outside_name = entry_name(&outside, &cwd).to_string_lossy().to_string();

        assert!(names.contains(&"README.md"));
        assert!(names.contains(&"src/lib.rs"));
        assert!(names.contains(&outside_name.as_str()));
        let readme = archive.files.iter().find(|f| f.name == "README.md").unwrap();
        assert_eq!(readme.data, b"readme\n");
        Ok(())
    }

    #[test]
    fn test_missing_file_is_archive_error() -> Result<()> {
        let work = tempdir()?;
        let tar_file = work.path().join("t.tar");
        let result = create_tar(
            &[work.path().join("missing.txt")],
            &tar_file,
            work.path(),
            &ProgressBar::hidden(),
        );
        assert!(matches!(result, Err(crate::error::NearwaitError::Archive(_))));
        Ok(())
    }
}
