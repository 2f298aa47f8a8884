//! Unified error types for the macos-mount-core library.
//!
//! Uses SNAFU for context-rich error handling, especially useful when the same
//! underlying error type (like `std::io::Error`) appears in different contexts.

use snafu::{ResultExt, Snafu};

/// Result type alias using the library's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for all core library operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Failed to execute a system command.
    #[snafu(display("failed to execute command '{command}'"))]
    CommandExecution {
        command: String,
        source: std::io::Error,
    },

    /// Command executed but returned non-zero exit code.
    #[snafu(display("command '{command}' exited with code {code}: {stderr}"))]
    CommandExit {
        command: String,
        code: i32,
        stderr: String,
    },

    /// User cancelled the authentication dialog.
    #[snafu(display("authentication cancelled by user"))]
    AuthenticationCancelled,

    /// Failed to open an interactive terminal window.
    #[snafu(display("failed to launch terminal"))]
    TerminalLaunch { source: std::io::Error },
}

/// Marker emitted by the Disk Arbitration daemon when an operation on a
/// protected volume (system, EFI) is refused for the current user.
pub const NOT_PERMITTED_MARKER: &str = "kDAReturnNotPermitted";

/// Closed classification of a failed command, produced once at the boundary
/// where the raw error text is received so downstream logic can switch on a
/// typed value instead of repeating substring checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandErrorKind {
    /// The operation requires elevated privileges (`kDAReturnNotPermitted`).
    NotPermitted,
    /// The user dismissed the credential prompt.
    AuthenticationCancelled,
    /// Any other failure.
    Other,
}

/// Classifies a command failure into a [`CommandErrorKind`].
pub fn classify_command_error(error: &Error) -> CommandErrorKind {
    match error {
        Error::AuthenticationCancelled => CommandErrorKind::AuthenticationCancelled,
        Error::CommandExit { stderr, .. } if stderr.contains(NOT_PERMITTED_MARKER) => {
            CommandErrorKind::NotPermitted
        }
        _ => CommandErrorKind::Other,
    }
}

/// Extension trait for adding context to io::Error results.
pub trait IoResultExt<T> {
    /// Add context for command execution errors.
    fn command_context(self, command: impl Into<String>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, std::io::Error> {
    fn command_context(self, command: impl Into<String>) -> Result<T> {
        self.context(CommandExecutionSnafu {
            command: command.into(),
        })
    }
}
