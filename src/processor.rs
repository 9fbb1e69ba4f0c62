/*!
 * Manifest processing: stage enabled files, pack batches, deliver to clipboard
 */

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::archive::{ArchiveProcessor, TarTxtarArchiver};
use crate::clipboard::{ClipboardWriter, SystemClipboard};
use crate::config::Config;
use crate::error::{NearwaitError, Result, ResultExt};
use crate::pack::{self, Batch};
use crate::paths::Normalizer;
use crate::project::ProjectInfo;
use crate::store::{ManifestReader, ManifestStore};
use crate::txtar;

/// Pause between clipboard writes when not prompting
pub const BATCH_DELAY: Duration = Duration::from_millis(600);

/// Gate between successive batch deliveries
pub trait BatchPrompt {
    /// Block until the user is ready for batch `next` (1-based) of `total`
    fn wait(&self, next: usize, total: usize) -> io::Result<()>;
}

/// Prompts on stdout and waits for Enter on stdin
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl BatchPrompt for StdinPrompt {
    fn wait(&self, next: usize, total: usize) -> io::Result<()> {
        print!("Press Enter to copy batch {}/{}...", next, total);
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(())
    }
}

/// Summary of one delivered archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Archive written
    pub path: PathBuf,
    /// Number of files in it
    pub files: usize,
    /// Container bytes
    pub bytes: u64,
    /// Whether the clipboard accepted it
    pub copied: bool,
}

/// Result of processing a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// No enabled entries; nothing was written
    Empty,
    /// Archives were produced
    Processed(ProcessReport),
}

/// What a processing run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReport {
    /// The full txtar next to the manifest
    pub txtar_file: PathBuf,
    /// Enabled files packed
    pub files: usize,
    /// One entry per batch, or a single entry for the whole txtar
    pub batches: Vec<BatchSummary>,
    /// Scratch directory, when kept for debugging
    pub kept_temp_dir: Option<PathBuf>,
}

/// Turns a manifest into txtar archives on the clipboard
pub struct ManifestProcessor {
    root: PathBuf,
    normalizer: Normalizer,
    manifest_file: PathBuf,
    debug: bool,
    byte_size: u64,
    prompt: bool,
    scratch_base: Option<PathBuf>,
    reader: Box<dyn ManifestReader>,
    archiver: Box<dyn ArchiveProcessor>,
    clipboard: Box<dyn ClipboardWriter>,
    gate: Box<dyn BatchPrompt>,
}

impl ManifestProcessor {
    /// Create a processor wired to the default collaborators for `config`
    pub fn new(config: &Config) -> Self {
        Self {
            root: config.root.clone(),
            normalizer: config.normalizer(),
            manifest_file: config.manifest_file.clone(),
            debug: config.debug,
            byte_size: config.byte_size,
            prompt: config.prompt,
            scratch_base: None,
            reader: Box::new(ManifestStore::new(config.normalizer(), config.path_style)),
            archiver: Box::new(TarTxtarArchiver::default()),
            clipboard: Box::new(SystemClipboard),
            gate: Box::new(StdinPrompt),
        }
    }

    /// Resolve tar entry names against `root` instead of the configured root
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the maximum container bytes per batch (0 disables batching)
    pub fn with_byte_size(mut self, byte_size: u64) -> Self {
        self.byte_size = byte_size;
        self
    }

    /// Wait for confirmation between batches
    pub fn with_prompt(mut self, prompt: bool) -> Self {
        self.prompt = prompt;
        self
    }

    /// Put the scratch directory under `dir` instead of the system temp dir
    pub fn with_scratch_base(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_base = Some(dir.into());
        self
    }

    /// Replace the manifest reader
    pub fn with_reader(mut self, reader: impl ManifestReader + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    /// Replace the archive processor
    pub fn with_archiver(mut self, archiver: impl ArchiveProcessor + 'static) -> Self {
        self.archiver = Box::new(archiver);
        self
    }

    /// Replace the clipboard
    pub fn with_clipboard(mut self, clipboard: impl ClipboardWriter + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    /// Replace the between-batch prompt
    pub fn with_batch_prompt(mut self, gate: impl BatchPrompt + 'static) -> Self {
        self.gate = Box::new(gate);
        self
    }

    /// Process the manifest
    pub fn process(&self) -> Result<ProcessOutcome> {
        debug!(path = %self.manifest_file.display(), "processing manifest");
        let manifest = self.reader.read_manifest(&self.manifest_file)?;

        if !manifest.has_enabled() {
            return Ok(ProcessOutcome::Empty);
        }
        let files = manifest.enabled_paths();

        let cwd = self.normalizer.normalize(&self.root)?;
        let scratch_base = self.scratch_base.clone().unwrap_or_else(env::temp_dir);
        let project = ProjectInfo::new(&cwd, &self.manifest_file, &scratch_base, self.byte_size > 0)?;

        let result = self.run(&files, &project);

        let kept_temp_dir = if self.debug {
            info!(path = %project.temp_dir.display(), "debug mode: temporary directory kept for inspection");
            Some(project.temp_dir.clone())
        } else {
            if let Err(e) = fs::remove_dir_all(&project.temp_dir) {
                warn!(path = %project.temp_dir.display(), error = %e, "failed to remove temporary directory");
            }
            None
        };

        let batches = result?;
        Ok(ProcessOutcome::Processed(ProcessReport {
            txtar_file: project.txtar_file,
            files: files.len(),
            batches,
            kept_temp_dir,
        }))
    }

    fn run(&self, files: &[PathBuf], project: &ProjectInfo) -> Result<Vec<BatchSummary>> {
        self.archiver.stage(files, project)?;
        self.archiver.bundle(project)?;

        if self.byte_size == 0 {
            let content = fs::read(&project.txtar_file)
                .archive_context(|| format!("reading {}", project.txtar_file.display()))?;
            let copied = self.copy(&content, 1, 1);
            return Ok(vec![BatchSummary {
                path: project.txtar_file.clone(),
                files: files.len(),
                bytes: content.len() as u64,
                copied,
            }]);
        }

        let entries = pack::collect_files(&project.extract_dir)?;
        let batches = pack::pack(entries, self.byte_size);
        let paths = write_batches(&batches, project)?;

        println!("Created {} batches", batches.len());

        let total = batches.len();
        let mut summaries = Vec::with_capacity(total);
        for (i, (batch, path)) in batches.iter().zip(paths).enumerate() {
            let content = fs::read(&path)
                .batch_context(|| format!("reading {}", path.display()))?;

            if i > 0 && self.prompt {
                if let Err(e) = self.gate.wait(i + 1, total) {
                    debug!(error = %e, "error reading user input");
                }
            }

            let copied = self.copy(&content, i + 1, total);

            if i + 1 < total && !self.prompt && self.clipboard.should_delay() {
                debug!(delay_ms = BATCH_DELAY.as_millis() as u64, "delaying before next batch copy");
                thread::sleep(BATCH_DELAY);
            }

            summaries.push(BatchSummary {
                path,
                files: batch.files.len(),
                bytes: batch.size,
                copied,
            });
        }

        debug!(count = total, dir = %project.batch_dir.display(), "created and copied batch files");
        Ok(summaries)
    }

    /// Copy to the clipboard; failures are logged and reported as `false`
    fn copy(&self, content: &[u8], index: usize, total: usize) -> bool {
        match self.clipboard.write_all(content) {
            Ok(()) => {
                debug!(batch = index, total_batches = total, "txtar content copied to clipboard");
                true
            }
            Err(e) => {
                let err = NearwaitError::from(e);
                warn!(error = %err, "skipping clipboard");
                false
            }
        }
    }
}

/// Write one txtar per batch into the project's batch directory
pub fn write_batches(batches: &[Batch], project: &ProjectInfo) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(batches.len());

    for (i, batch) in batches.iter().enumerate() {
        let mut archive = txtar::Archive::default();
        for file in &batch.files {
            let full = project.extract_dir.join(&file.path);
            let data = fs::read(&full).batch_context(|| format!("reading {}", full.display()))?;
            archive.files.push(txtar::File {
                name: file.path.to_string_lossy().to_string(),
                data,
            });
        }

        let path = project.batch_file(i);
        write_file(&path, &txtar::format(&archive))?;
        debug!(batch = i + 1, file_count = batch.files.len(), path = %path.display(), "created batch txtar file");
        paths.push(path);
    }

    Ok(paths)
}

fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).batch_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::pack::FileEntry;
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct RecordingClipboard(Rc<RefCell<Vec<Vec<u8>>>>);

    impl ClipboardWriter for RecordingClipboard {
        fn write_all(&self, data: &[u8]) -> crate::clipboard::Result<()> {
            self.0.borrow_mut().push(data.to_vec());
            Ok(())
        }

        fn should_delay(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_write_batches() -> Result<()> {
        let scratch = tempdir()?;
        let project = ProjectInfo::new(Path::new("/x/proj"), Path::new("m.yml"), scratch.path(), true)?;
        fs::create_dir_all(project.extract_dir.join("d"))?;
        fs::write(project.extract_dir.join("a.txt"), "A")?;
        fs::write(project.extract_dir.join("d/b.txt"), "B\n")?;

        let batches = vec![
            Batch {
                files: vec![FileEntry::new("a.txt", 1)],
                size: FileEntry::new("a.txt", 1).size,
            },
            Batch {
                files: vec![FileEntry::new("d/b.txt", 2)],
                size: FileEntry::new("d/b.txt", 2).size,
            },
        ];

        let paths = write_batches(&batches, &project)?;
        assert_eq!(paths, vec![project.batch_file(0), project.batch_file(1)]);
        assert_eq!(fs::read_to_string(&paths[0])?, "-- a.txt --\nA\n");
        assert_eq!(fs::read_to_string(&paths[1])?, "-- d/b.txt --\nB\n");
        Ok(())
    }

    #[test]
    fn test_empty_manifest_is_nothing_to_do() -> Result<()> {
        let dir = tempdir()?;
        let manifest = dir.path().join("m.yml");
        fs::write(&manifest, "filelist:\n# - /nowhere/a\n")?;

        let clip = RecordingClipboard::default();
        let config = Config {
            manifest_file: manifest,
            ..Config::default()
        };
        let outcome = ManifestProcessor::new(&config)
            .with_clipboard(clip.clone())
            .with_scratch_base(dir.path())
            .process()?;

        assert_eq!(outcome, ProcessOutcome::Empty);
        assert!(clip.0.borrow().is_empty());
        Ok(())
    }
}
