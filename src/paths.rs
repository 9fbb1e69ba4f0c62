/*!
 * Path normalization so manifest entries compare equal however they were referenced
 */

use std::env;
use std::path::{Component, Path, PathBuf};

use crate::error::{NearwaitError, Result};

/// Canonicalizes paths for manifest comparison
///
/// Normalization is lexical: home expansion, absolute resolution against a
/// base directory, `.`/`..` folding and removal of temp-alias prefixes. The
/// filesystem is never consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    /// Leading prefixes that alias another location (e.g. `/private` on macOS)
    strip_prefixes: Vec<PathBuf>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl Normalizer {
    /// Create a normalizer stripping the given alias prefixes
    pub fn new(strip_prefixes: Vec<PathBuf>) -> Self {
        Self { strip_prefixes }
    }

    /// Normalizer with the temp-alias rule for the current platform
    ///
    /// On macOS `/tmp` and `/var` are symlinks into `/private`, so walks
    /// and user input can disagree on the prefix. Other platforms strip
    /// nothing.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::new(vec![PathBuf::from("/private")])
        } else {
            Self::new(Vec::new())
        }
    }

    /// Alias prefixes this normalizer removes
    pub fn strip_prefixes(&self) -> &[PathBuf] {
        &self.strip_prefixes
    }

    /// Normalize relative to the process working directory
    pub fn normalize(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let cwd = env::current_dir()
            .map_err(|e| NearwaitError::invalid_path(path.display().to_string(), e))?;
        self.normalize_from(path, &cwd)
    }

    /// Normalize, resolving relative paths against `base`
    pub fn normalize_from(&self, path: impl AsRef<Path>, base: &Path) -> Result<PathBuf> {
        let path = path.as_ref();
        let expanded = expand_home(path)?;

        let absolute = if expanded.is_absolute() {
            expanded
        } else if base.is_absolute() {
            base.join(expanded)
        } else {
            let cwd = env::current_dir()
                .map_err(|e| NearwaitError::invalid_path(path.display().to_string(), e))?;
            cwd.join(base).join(expanded)
        };

        Ok(self.strip_alias(clean(&absolute)))
    }

    fn strip_alias(&self, path: PathBuf) -> PathBuf {
        for prefix in &self.strip_prefixes {
            if let Ok(rest) = path.strip_prefix(prefix) {
                if rest.as_os_str().is_empty() {
                    continue;
                }
                return Path::new("/").join(rest);
            }
        }
        path
    }
}

/// Expand a leading `~` to the user's home directory
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let home = dirs::home_dir().ok_or_else(|| {
                NearwaitError::invalid_path(
                    path.display().to_string(),
                    "could not determine home directory",
                )
            })?;
            Ok(home.join(components.as_path()))
        }
        _ => {
            let raw = path.to_string_lossy();
            if raw.starts_with('~') {
                // ~user forms are not supported
                return Err(NearwaitError::invalid_path(
                    raw.to_string(),
                    "cannot expand user-specific home directory",
                ));
            }
            Ok(path.to_path_buf())
        }
    }
}

/// Lexically resolve `.` and `..` segments
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
