/*!
 * In-memory manifest and its line-oriented text form
 *
 * ```text
 * filelist:
 * - /proj/src/lib.rs
 * # - /proj/notes.txt
 * ```
 *
 * Unprefixed entries are enabled, `# ` marks a disabled entry. Every other
 * line, the header included, is ignored on read.
 */

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::Result;
use crate::paths::Normalizer;

/// First line of every manifest
pub const HEADER: &str = "filelist:";
/// Prefix of an enabled entry
pub const ENABLED_PREFIX: &str = "- ";
/// Prefix of a disabled entry
pub const DISABLED_PREFIX: &str = "# - ";

/// How entry paths are written to disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    /// Normalized absolute paths
    #[default]
    Absolute,
    /// Relative to the manifest's directory where possible
    Relative,
}

/// Status of a single item in the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Listed and included in packing
    Enabled,
    /// Listed but skipped by packing
    Disabled,
    /// Not listed at all
    NotListed,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryStatus::Enabled => write!(f, "enabled"),
            EntryStatus::Disabled => write!(f, "disabled"),
            EntryStatus::NotListed => write!(f, "not in list"),
        }
    }
}

/// Mapping of normalized path to its disabled flag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<PathBuf, bool>,
}

impl Manifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Manifest with every given path enabled
    pub fn all_enabled<I: IntoIterator<Item = PathBuf>>(paths: I) -> Self {
        Self {
            entries: paths.into_iter().map(|p| (p, false)).collect(),
        }
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, path: PathBuf, disabled: bool) {
        self.entries.insert(path, disabled);
    }

    /// Disabled flag of `path`, `None` when not listed
    pub fn is_disabled(&self, path: &Path) -> Option<bool> {
        self.entries.get(path).copied()
    }

    /// Flip an existing entry; returns `false` when `path` is not listed
    pub fn set_disabled(&mut self, path: &Path, disabled: bool) -> bool {
        match self.entries.get_mut(path) {
            Some(flag) => {
                *flag = disabled;
                true
            }
            None => false,
        }
    }

    /// Status of `path`
    pub fn status(&self, path: &Path) -> EntryStatus {
        match self.is_disabled(path) {
            Some(true) => EntryStatus::Disabled,
            Some(false) => EntryStatus::Enabled,
            None => EntryStatus::NotListed,
        }
    }

    /// Iterate over `(path, disabled)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, bool)> {
        self.entries.iter().map(|(p, d)| (p, *d))
    }

    /// Paths that take part in packing
    pub fn enabled_paths(&self) -> Vec<PathBuf> {
        self.iter()
            .filter(|(_, disabled)| !disabled)
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// Whether any entry is enabled
    pub fn has_enabled(&self) -> bool {
        self.entries.values().any(|disabled| !disabled)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse manifest text, resolving relative entries against `base`
///
/// Fails on the first entry that cannot be normalized.
pub fn parse(text: &str, base: &Path, normalizer: &Normalizer) -> Result<Manifest> {
    let mut manifest = Manifest::new();

    for line in text.lines() {
        let line = line.trim();
        let (raw, disabled) = if let Some(rest) = line.strip_prefix(DISABLED_PREFIX) {
            (rest, true)
        } else if let Some(rest) = line.strip_prefix(ENABLED_PREFIX) {
            (rest, false)
        } else {
            continue;
        };

        let path = normalizer.normalize_from(raw.trim(), base)?;
        manifest.insert(path, disabled);
    }

    Ok(manifest)
}

/// Render a manifest, one line per entry in lexicographic order
///
/// With [`PathStyle::Relative`], entries under `manifest_dir` are written
/// relative to it.
pub fn render(manifest: &Manifest, style: PathStyle, manifest_dir: &Path) -> String {
    let mut lines: Vec<(String, bool)> = manifest
        .iter()
        .map(|(path, disabled)| {
            let shown = match style {
                PathStyle::Absolute => path.as_path(),
                PathStyle::Relative => path
                    .strip_prefix(manifest_dir)
                    .ok()
                    .filter(|rel| !rel.as_os_str().is_empty())
                    .unwrap_or(path),
            };
            (shown.to_string_lossy().to_string(), disabled)
        })
        .collect();
    lines.sort();

    let mut out = String::with_capacity(HEADER.len() + 1 + lines.len() * 64);
    out.push_str(HEADER);
    out.push('\n');
    for (path, disabled) in lines {
        out.push_str(if disabled { DISABLED_PREFIX } else { ENABLED_PREFIX });
        out.push_str(&path);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new(Vec::new())
    }

    #[test]
    fn test_parse_prefixes() -> Result<()> {
        let text = "filelist:\n- /p/a.txt\n  # - /p/b.txt  \nrandom line\n\n-/p/c.txt\n";
        let m = parse(text, Path::new("/p"), &normalizer())?;
        assert_eq!(m.len(), 2);
        assert_eq!(m.is_disabled(Path::new("/p/a.txt")), Some(false));
        assert_eq!(m.is_disabled(Path::new("/p/b.txt")), Some(true));
        assert_eq!(m.is_disabled(Path::new("/p/c.txt")), None);
        Ok(())
    }

    #[test]
    fn test_parse_relative_against_base() -> Result<()> {
        let m = parse("- src/lib.rs\n# - ./docs/../x.md\n", Path::new("/p"), &normalizer())?;
        assert_eq!(m.status(Path::new("/p/src/lib.rs")), EntryStatus::Enabled);
        assert_eq!(m.status(Path::new("/p/x.md")), EntryStatus::Disabled);
        Ok(())
    }

    #[test]
    fn test_render_sorted_with_header() {
        let mut m = Manifest::new();
        m.insert(PathBuf::from("/p/b.txt"), true);
        m.insert(PathBuf::from("/p/a/z.txt"), false);
        m.insert(PathBuf::from("/p/a.txt"), false);

        let text = render(&m, PathStyle::Absolute, Path::new("/p"));
        assert_eq!(
            text,
            "filelist:\n- /p/a.txt\n- /p/a/z.txt\n# - /p/b.txt\n"
        );
    }

    #[test]
    fn test_render_relative() {
        let mut m = Manifest::new();
        m.insert(PathBuf::from("/p/src/lib.rs"), false);
        m.insert(PathBuf::from("/elsewhere/x"), true);

        let text = render(&m, PathStyle::Relative, Path::new("/p"));
        assert_eq!(text, "filelist:\n# - /elsewhere/x\n- src/lib.rs\n");
    }

    #[test]
    fn test_render_then_parse_roundtrip() -> Result<()> {
        let mut m = Manifest::new();
        m.insert(PathBuf::from("/p/src/lib.rs"), false);
        m.insert(PathBuf::from("/p/notes.txt"), true);
        m.insert(PathBuf::from("/other/file"), false);

        for style in [PathStyle::Absolute, PathStyle::Relative] {
            let text = render(&m, style, Path::new("/p"));
            assert_eq!(parse(&text, Path::new("/p"), &normalizer())?, m);
        }
        Ok(())
    }

    #[test]
    fn test_toggles_and_status() {
        let mut m = Manifest::all_enabled(vec![PathBuf::from("/p/a")]);
        assert!(m.has_enabled());
        assert!(m.set_disabled(Path::new("/p/a"), true));
        assert!(!m.has_enabled());
        assert!(!m.set_disabled(Path::new("/p/missing"), true));
        assert_eq!(m.status(Path::new("/p/a")).to_string(), "disabled");
        assert_eq!(m.status(Path::new("/p/missing")).to_string(), "not in list");
    }
}
