/*!
 * Configuration handling for nearwait
 */

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use serde::Deserialize;
use tracing::debug;

use crate::error::{NearwaitError, Result};
use crate::filter::Filter;
use crate::logging::LogFormat;
use crate::manifest::PathStyle;
use crate::paths::Normalizer;
use crate::project::txtar_name;
use crate::utils::{DEFAULT_EXCLUDES, DEFAULT_MANIFEST};

/// Name of the settings file looked up in the home directory
pub const SETTINGS_FILE: &str = ".nearwait.toml";

/// Command-line arguments for nearwait
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "nearwait",
    version = env!("CARGO_PKG_VERSION"),
    about = "Copies project files to the clipboard based on a manifest",
    long_about = "Generates an editable manifest of project files, then packs the enabled files into txtar archives, optionally split into size-bounded batches, and copies them to the clipboard."
)]
pub struct Args {
    /// Manifest toggle commands; without one, generate and process
    #[clap(subcommand)]
    pub command: Option<Command>,

    /// Settings file (default is ~/.nearwait.toml)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[clap(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Force overwrite of existing manifest
    #[clap(long)]
    pub force: bool,

    /// Keep temporary directory for debugging
    #[clap(long)]
    pub debug: bool,

    /// Name of the manifest file
    #[clap(long, global = true, default_value = DEFAULT_MANIFEST, env = "NEARWAIT_MANIFEST")]
    pub manifest: PathBuf,

    /// Include only specified paths (comma-separated or repeated)
    #[clap(long, value_delimiter = ',')]
    pub include: Vec<PathBuf>,

    /// Disable default directory exclusions
    #[clap(long)]
    pub no_exclude: bool,

    /// Maximum byte size per batch of files to copy (0 disables batching)
    #[clap(long)]
    pub byte_size: Option<u64>,

    /// Prompt before copying each batch (only valid with --byte-size)
    #[clap(long)]
    pub prompt: bool,

    /// How paths are written into the manifest
    #[clap(long, value_enum, global = true)]
    pub path_style: Option<PathStyle>,

    /// Path prefix aliasing another location, stripped during normalization
    #[clap(long, value_delimiter = ',', global = true)]
    pub strip_prefix: Vec<PathBuf>,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Manifest toggle commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Enable a file in the manifest
    Enable {
        /// File to enable
        path: PathBuf,
    },
    /// Disable a file in the manifest
    Disable {
        /// File to disable
        path: PathBuf,
    },
    /// Show whether a file is enabled, disabled or not listed
    Status {
        /// File to look up
        path: PathBuf,
    },
}

/// Values read from the settings file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enable verbose logging
    pub verbose: Option<bool>,
    /// Log output format
    pub log_format: Option<LogFormat>,
    /// Extra exclude names on top of the defaults
    pub excludes: Vec<String>,
    /// Default batch budget in bytes
    pub byte_size: Option<u64>,
    /// Manifest path style
    pub path_style: Option<PathStyle>,
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| NearwaitError::Config(format!("invalid settings: {}", e)))
    }

    /// Load the explicit settings file, or `~/.nearwait.toml` when present
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match dirs::home_dir().map(|home| home.join(SETTINGS_FILE)) {
                Some(path) if path.is_file() => path,
                _ => return Ok(Self::default()),
            },
        };

        debug!(path = %path.display(), "loading settings");
        let text = fs::read_to_string(&path).map_err(|e| {
            NearwaitError::Config(format!("cannot read settings {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Project root discovery starts from
    pub root: PathBuf,

    /// Manifest file path
    pub manifest_file: PathBuf,

    /// Regenerate the manifest from scratch
    pub force: bool,

    /// Keep the scratch directory after processing
    pub debug: bool,

    /// Explicit include roots (if empty, walk the whole root)
    pub includes: Vec<PathBuf>,

    /// Disable the default exclude names
    pub no_exclude: bool,

    /// Extra exclude names
    pub extra_excludes: Vec<String>,

    /// Batch budget in bytes, 0 for a single unbounded archive
    pub byte_size: u64,

    /// Wait for Enter between batches
    pub prompt: bool,

    /// How manifest paths are written
    pub path_style: PathStyle,

    /// Temp-alias prefixes; `None` uses the platform default
    pub strip_prefixes: Option<Vec<PathBuf>>,

    /// Verbose logging
    pub verbose: bool,

    /// Log output format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            manifest_file: PathBuf::from(DEFAULT_MANIFEST),
            force: false,
            debug: false,
            includes: Vec::new(),
            no_exclude: false,
            extra_excludes: Vec::new(),
            byte_size: 0,
            prompt: false,
            path_style: PathStyle::default(),
            strip_prefixes: None,
            verbose: false,
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments and settings
    ///
    /// Command-line values win over settings file values.
    pub fn from_args(args: Args, settings: Settings) -> Self {
        Self {
            root: PathBuf::from("."),
            manifest_file: args.manifest,
            force: args.force,
            debug: args.debug,
            includes: args.include,
            no_exclude: args.no_exclude,
            extra_excludes: settings.excludes,
            byte_size: args.byte_size.or(settings.byte_size).unwrap_or(0),
            prompt: args.prompt,
            path_style: args.path_style.or(settings.path_style).unwrap_or_default(),
            strip_prefixes: if args.strip_prefix.is_empty() {
                None
            } else {
                Some(args.strip_prefix)
            },
            verbose: args.verbose || settings.verbose.unwrap_or(false),
            log_format: args.log_format.or(settings.log_format).unwrap_or_default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        crate::ensure!(
            !self.prompt || self.byte_size > 0,
            Config,
            "--prompt can only be used with --byte-size"
        );

        if !self.root.is_dir() {
            crate::bail!(Config, "Project root not found: {}", self.root.display());
        }

        // Check if manifest directory exists
        if let Some(parent) = self.manifest_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                crate::bail!(Config, "Manifest directory not found: {}", parent.display());
            }
        }

        Ok(())
    }

    /// Path normalizer for this run
    pub fn normalizer(&self) -> Normalizer {
        match &self.strip_prefixes {
            Some(prefixes) => Normalizer::new(prefixes.clone()),
            None => Normalizer::platform_default(),
        }
    }

    /// Exclude names in effect
    ///
    /// The manifest's own file name and its txtar output are always excluded.
    pub fn excludes(&self) -> Vec<String> {
        let mut excludes: Vec<String> = if self.no_exclude {
            Vec::new()
        } else {
            DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect()
        };
        excludes.extend(self.extra_excludes.iter().cloned());
        if let Some(name) = self.manifest_file.file_name() {
            excludes.push(name.to_string_lossy().to_string());
        }
        excludes.push(txtar_name(&self.manifest_file));
        excludes
    }

    /// Build the discovery filter with normalized root and includes
    pub fn filter(&self) -> Result<Filter> {
        let normalizer = self.normalizer();
        let root = normalizer.normalize(&self.root)?;
        let includes = self
            .includes
            .iter()
            .map(|include| normalizer.normalize(include))
            .collect::<Result<Vec<_>>>()?;

        Ok(Filter::new(root, self.excludes()).with_includes(includes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("nearwait").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_args(parse(&[]), Settings::default());
        assert_eq!(config.manifest_file, PathBuf::from(".nearwait.yml"));
        assert_eq!(config.byte_size, 0);
        assert_eq!(config.path_style, PathStyle::Absolute);
        assert!(config.strip_prefixes.is_none());
    }

    #[test]
    fn test_prompt_requires_byte_size() {
        let config = Config::from_args(parse(&["--prompt"]), Settings::default());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, NearwaitError::Config(_)));

        let config = Config::from_args(parse(&["--prompt", "--byte-size", "4096"]), Settings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_manifest_dir_rejected() {
        let config = Config::from_args(
            parse(&["--manifest", "/nonexistent-nearwait-dir/m.yml"]),
            Settings::default(),
        );
        assert!(matches!(config.validate(), Err(NearwaitError::Config(_))));
    }

    #[test]
    fn test_includes_comma_separated() {
        let config = Config::from_args(parse(&["--include", "src,docs", "--include", "README.md"]), Settings::default());
        assert_eq!(
            config.includes,
            vec![PathBuf::from("src"), PathBuf::from("docs"), PathBuf::from("README.md")]
        );
    }

    #[test]
    fn test_subcommand_with_global_manifest() {
        let args = parse(&["disable", "src/lib.rs", "--manifest", "m.yml"]);
        assert_eq!(
            args.command,
            Some(Command::Disable {
                path: PathBuf::from("src/lib.rs")
            })
        );
        assert_eq!(args.manifest, PathBuf::from("m.yml"));
    }

    #[test]
    fn test_excludes() {
        let mut config = Config::default();
        assert!(config.excludes().contains(&".git".to_string()));
        assert!(config.excludes().contains(&".nearwait.yml".to_string()));

        config.no_exclude = true;
        config.extra_excludes = vec!["vendor".to_string()];
        assert_eq!(
            config.excludes(),
            vec!["vendor".to_string(), ".nearwait.yml".to_string(), ".nearwait.txtar".to_string()]
        );
    }

    #[test]
    fn test_settings_merge() -> Result<()> {
        let settings = Settings::from_toml(
            "verbose = true\nlog_format = \"json\"\nexcludes = [\"vendor\"]\nbyte_size = 2048\npath_style = \"relative\"\n",
        )?;
        let config = Config::from_args(parse(&["--byte-size", "100"]), settings);
        assert!(config.verbose);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.byte_size, 100);
        assert_eq!(config.path_style, PathStyle::Relative);
        assert_eq!(config.extra_excludes, vec!["vendor".to_string()]);
        Ok(())
    }

    #[test]
    fn test_bad_settings() {
        assert!(matches!(
            Settings::from_toml("byte_size = \"big\""),
            Err(NearwaitError::Config(_))
        ));
    }

    #[test]
    fn test_strip_prefix_overrides_platform() {
        let config = Config::from_args(parse(&["--strip-prefix", "/alias"]), Settings::default());
        assert_eq!(config.normalizer().strip_prefixes(), &[PathBuf::from("/alias")]);
    }
}
