/*!
 * nearwait - Copy project files to the clipboard from an editable manifest
 *
 * A first run writes a manifest listing every discovered project file.
 * The user comments out what they do not want; later runs reconcile the
 * manifest with the file system and pack the enabled files into txtar
 * archives, optionally split into size-bounded batches.
 */

pub mod archive;
pub mod clipboard;
pub mod config;
pub mod discover;
pub mod error;
pub mod filter;
pub mod generator;
pub mod logging;
pub mod manifest;
pub mod pack;
pub mod paths;
pub mod processor;
pub mod project;
pub mod reconcile;
pub mod report;
pub mod store;
pub mod txtar;
pub mod utils;


// Re-export main components for easier access
pub use clipboard::{ClipboardWriter, NoopClipboard, SystemClipboard};
pub use config::Config;
pub use error::{NearwaitError, Result};
pub use generator::ManifestGenerator;
pub use manifest::{EntryStatus, Manifest, PathStyle};
pub use pack::{pack, Batch, FileEntry};
pub use processor::{ManifestProcessor, ProcessOutcome, ProcessReport};
pub use reconcile::reconcile;
pub use report::{ReportFormat, Reporter};
pub use store::ManifestStore;
pub use utils::format_file_size;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
