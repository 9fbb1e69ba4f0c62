/*!
 * Clipboard support for nearwait
 *
 * The clipboard is a pure sink: callers hand it a full payload and treat
 * any failure as non-fatal.
 */

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use thiserror::Error;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// Failed to execute the clipboard command
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Destination for packed archives
pub trait ClipboardWriter {
    /// Replace the clipboard content with `data`, passed through unchanged
    fn write_all(&self, data: &[u8]) -> Result<()>;

    /// Whether consecutive writes need a pause so clipboard managers keep up
    fn should_delay(&self) -> bool;
}

/// The system clipboard, reached through whichever helper command exists
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn write_all(&self, data: &[u8]) -> Result<()> {
        let provider = determine_clipboard_providers()
            .into_iter()
            .next()
            .ok_or(ClipboardError::NoClipboardFound)?;
        provider.copy(data)
    }

    fn should_delay(&self) -> bool {
        true
    }
}

/// Clipboard that accepts everything and does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopClipboard;

impl ClipboardWriter for NoopClipboard {
    fn write_all(&self, _data: &[u8]) -> Result<()> {
        Ok(())
    }

    fn should_delay(&self) -> bool {
        false
    }
}

/// Available clipboard providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClipboardProvider {
    /// tmux paste buffer
    Tmux,
    /// X11 clipboard with xclip
    Xclip,
    /// X11 clipboard with xsel
    Xsel,
    /// Wayland clipboard
    Wayland,
    /// macOS clipboard
    MacOS,
    /// Windows clipboard (via WSL)
    Wsl,
    /// Termux clipboard
    Termux,
}

impl ClipboardProvider {
    fn command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Tmux => ("tmux", &["load-buffer", "-w", "-"]),
            Self::Xclip => ("xclip", &["-selection", "clipboard", "-in"]),
            Self::Xsel => ("xsel", &["-b", "-i"]),
            Self::Wayland => ("wl-copy", &[]),
            Self::MacOS => ("pbcopy", &[]),
            Self::Wsl => ("clip.exe", &[]),
            Self::Termux => ("termux-clipboard-set", &[]),
        }
    }

    fn copy(self, data: &[u8]) -> Result<()> {
        let (cmd, args) = self.command();
        execute_clipboard_command(cmd, args, data)
    }
}

/// Check if a command exists on the system PATH
pub fn command_exists(command: &str) -> bool {
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| Path::new(&dir).join(command).is_file()))
        .unwrap_or(false)
}

/// Spawn `cmd`, pipe `data` into its stdin and wait for success
fn execute_clipboard_command(cmd: &str, args: &[&str], data: &[u8]) -> Result<()> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ClipboardError::CommandFailed(format!("Failed to spawn {}: {}", cmd, e)))?;

    {
        let stdin = child.stdin.as_mut().ok_or_else(|| {
            ClipboardError::CommandFailed(format!("Failed to open stdin for {}", cmd))
        })?;
        stdin.write_all(data)?;
    }
    // Close stdin so the helper sees EOF
    drop(child.stdin.take());

    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed(format!(
            "{} exited with status: {}",
            cmd, status
        )))
    }
}

/// Platform detection cache
static PLATFORM: OnceLock<&'static str> = OnceLock::new();

/// Determine the platform (cached)
fn get_platform() -> &'static str {
    PLATFORM.get_or_init(|| {
        if cfg!(target_os = "macos") {
            "macos"
        } else if cfg!(target_os = "windows") {
            "windows"
        } else if cfg!(target_os = "android") {
            "android"
        } else if cfg!(target_os = "linux") {
            if env::var("WSL_DISTRO_NAME").is_ok() {
                "wsl"
            } else {
                "linux"
            }
        } else {
            "unknown"
        }
    })
}

/// Providers to try, most preferred first
fn determine_clipboard_providers() -> Vec<ClipboardProvider> {
    let mut providers = Vec::with_capacity(3);

    // Inside tmux the paste buffer is what the user expects
    if env::var("TMUX").is_ok() && command_exists("tmux") {
        providers.push(ClipboardProvider::Tmux);
    }

    match get_platform() {
        "macos" => providers.push(ClipboardProvider::MacOS),
        "windows" | "wsl" => providers.push(ClipboardProvider::Wsl),
        "android" => providers.push(ClipboardProvider::Termux),
        "linux" => {
            if env::var("WAYLAND_DISPLAY").is_ok() {
                providers.push(ClipboardProvider::Wayland);
            }
            providers.push(ClipboardProvider::Xsel);
            providers.push(ClipboardProvider::Xclip);
        }
        _ => {}
    }

    providers.retain(|p| command_exists(p.command().0));
    providers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_exists() {
        assert!(command_exists("sh"));
        assert!(!command_exists("nonexistentcommandxyz"));
    }

    #[test]
    fn test_get_platform_is_cached() {
        let platform = get_platform();
        assert!(["macos", "windows", "wsl", "linux", "android", "unknown"].contains(&platform));
        assert_eq!(platform, get_platform());
    }

    #[test]
    fn test_detected_providers_are_installed() {
        for provider in determine_clipboard_providers() {
            assert!(command_exists(provider.command().0));
        }
    }

    #[test]
    fn test_noop_clipboard() {
        let clip = NoopClipboard;
        assert!(clip.write_all(b"anything").is_ok());
        assert!(!clip.should_delay());
        assert!(SystemClipboard.should_delay());
    }

    #[test]
    fn test_failing_command_reports_status() {
        let err = execute_clipboard_command("sh", &["-c", "cat >/dev/null; exit 3"], b"x").unwrap_err();
        assert!(matches!(err, ClipboardError::CommandFailed(_)));
    }

    #[test]
    #[ignore] // Requires a running tmux session
    fn test_tmux_clipboard() {
        if env::var("TMUX").is_err() || !command_exists("tmux") {
            return;
        }

        let text = "Test text for tmux clipboard";
        ClipboardProvider::Tmux
            .copy(text.as_bytes())
            .expect("Failed to copy to tmux clipboard");

        let output = Command::new("tmux")
            .args(["show-buffer"])
            .output()
            .expect("Failed to execute tmux show-buffer");
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), text);
    }
}
