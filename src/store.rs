/*!
 * Manifest persistence
 */

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{NearwaitError, Result};
use crate::manifest::{self, EntryStatus, Manifest, PathStyle};
use crate::paths::Normalizer;

/// Loads a manifest from disk
pub trait ManifestReader {
    /// Read the manifest at `path`; a missing file yields an empty manifest
    fn read_manifest(&self, path: &Path) -> Result<Manifest>;
}

/// Persists a manifest
pub trait ManifestWriter {
    /// Replace the manifest at `path` with `manifest`
    fn write_manifest(&self, manifest: &Manifest, path: &Path) -> Result<()>;
}

/// Default file-backed manifest reader/writer
#[derive(Debug, Clone, Default)]
pub struct ManifestStore {
    normalizer: Normalizer,
    style: PathStyle,
}

impl ManifestStore {
    /// Create a store
    pub fn new(normalizer: Normalizer, style: PathStyle) -> Self {
        Self { normalizer, style }
    }

    /// Absolute directory containing the manifest file
    fn manifest_dir(&self, path: &Path) -> Result<PathBuf> {
        let absolute = self.normalizer.normalize(path)?;
        Ok(absolute
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/")))
    }

    /// Mark `item` disabled
    pub fn disable(&self, manifest_path: &Path, item: &Path) -> Result<()> {
        self.toggle(manifest_path, item, true)
    }

    /// Mark `item` enabled
    pub fn enable(&self, manifest_path: &Path, item: &Path) -> Result<()> {
        self.toggle(manifest_path, item, false)
    }

    /// Report whether `item` is enabled, disabled or absent
    pub fn status(&self, manifest_path: &Path, item: &Path) -> Result<EntryStatus> {
        let manifest = self.read_manifest(manifest_path)?;
        let item = self.normalizer.normalize(item)?;
        Ok(manifest.status(&item))
    }

    fn toggle(&self, manifest_path: &Path, item: &Path, disabled: bool) -> Result<()> {
        let mut manifest = self.read_manifest(manifest_path)?;
        let item = self.normalizer.normalize(item)?;
        if !manifest.set_disabled(&item, disabled) {
            return Err(NearwaitError::NotInManifest(item));
        }
        self.write_manifest(&manifest, manifest_path)
    }
}

impl ManifestReader for ManifestStore {
    fn read_manifest(&self, path: &Path) -> Result<Manifest> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no manifest yet");
                return Ok(Manifest::new());
            }
            Err(e) => return Err(NearwaitError::manifest_read(path, e)),
        };

        let base = self.manifest_dir(path)?;
        manifest::parse(&text, &base, &self.normalizer)
            .map_err(|e| NearwaitError::manifest_read(path, e))
    }
}

impl ManifestWriter for ManifestStore {
    /// Writes to a sibling temp file, then renames it over `path`
    fn write_manifest(&self, manifest: &Manifest, path: &Path) -> Result<()> {
        let write_err = |source: io::Error| NearwaitError::ManifestWrite {
            path: path.to_path_buf(),
            source,
        };

        let dir = self.manifest_dir(path)?;
        let text = manifest::render(manifest, self.style, &dir);

        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(text.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;

        debug!(path = %path.display(), entries = manifest.len(), "wrote manifest");
        Ok(())
    }
}
