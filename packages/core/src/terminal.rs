//! External terminal launcher.
//!
//! Used by the timed-out diagnostic path to re-run a detail fetch
//! interactively, with no deadline applied.

use std::process::{Command, Stdio};

use snafu::ResultExt;

use crate::error::{Result, TerminalLaunchSnafu};
use crate::executor::applescript_escape;

/// Capability for opening a command in an interactive terminal window.
pub trait TerminalLauncher {
    /// Opens a new terminal window running `command`. Fire-and-forget: the
    /// spawned window is not tracked and its output is never read.
    fn open_interactive(&self, command: &str) -> Result<()>;
}

/// Launches commands in the macOS Terminal application via AppleScript.
#[derive(Debug, Clone, Copy, Default)]
pub struct MacTerminal;

impl TerminalLauncher for MacTerminal {
    fn open_interactive(&self, command: &str) -> Result<()> {
        let script = format!(
            "tell application \"Terminal\" to do script \"{}\"",
            applescript_escape(command)
        );
        Command::new("osascript")
            .args(["-e", &script, "-e", "tell application \"Terminal\" to activate"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context(TerminalLaunchSnafu)?;
        Ok(())
    }
}
