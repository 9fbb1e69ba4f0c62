/*!
 * Utility functions for nearwait
 */

use once_cell::sync::Lazy;

/// Default manifest file name
pub const DEFAULT_MANIFEST: &str = ".nearwait.yml";

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Path segment names skipped during discovery unless excludes are disabled
pub static DEFAULT_EXCLUDES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Version Control
        ".git",
        ".hg",
        ".svn",
        // Python
        "__pycache__",
        ".pytest_cache",
        ".ruff_cache",
        ".mypy_cache",
        ".tox",
        ".venv",
        // Dependencies & Build
        "node_modules",
        "target",
        ".terraform",
        // Misc
        ".timestamps",
        ".DS_Store",
    ]
});
