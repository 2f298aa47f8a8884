//! Command execution abstraction with privilege escalation support.
//!
//! This module provides a flexible way to execute system commands with
//! optional privilege escalation via `osascript` (GUI authentication
//! dialog) or `sudo` (TTY).

use std::process::Stdio;

use async_trait::async_trait;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tokio::process::Command;

use crate::error::{Error, IoResultExt, Result};

/// Privilege escalation method for executing commands that require root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrivilegeEscalation {
    /// Execute directly without privilege escalation.
    #[default]
    None,
    /// Use `osascript ... with administrator privileges` for GUI-based
    /// escalation (native macOS credential dialog).
    Osascript,
    /// Use `sudo` for TTY-based privilege escalation.
    Sudo,
}

/// Capability for running external commands.
///
/// Returns stdout on success. A non-zero exit becomes a structured
/// [`Error::CommandExit`] carrying the diagnostic text the tool printed.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs a command without elevated privileges.
    async fn run(&self, program: &str, args: &[&str]) -> Result<String>;

    /// Runs a command with elevated privileges, prompting the user for
    /// credentials as configured.
    async fn run_elevated(&self, program: &str, args: &[&str]) -> Result<String>;
}

/// System implementation of [`CommandRunner`] backed by real subprocesses.
///
/// # Example
///
/// ```
/// use macos_mount_core::executor::SystemRunner;
///
/// // Default: elevated calls run without a wrapper
/// let runner = SystemRunner::new();
///
/// // For GUI applications
/// let gui_runner = SystemRunner::with_osascript();
///
/// // For terminal applications
/// let tty_runner = SystemRunner::with_sudo();
/// ```
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    escalation: PrivilegeEscalation,
}

impl SystemRunner {
    /// Creates a runner with no privilege escalation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner that uses `osascript` for privileged commands.
    ///
    /// This is suitable for GUI contexts where the user should see the
    /// native macOS authentication dialog.
    pub fn with_osascript() -> Self {
        Self {
            escalation: PrivilegeEscalation::Osascript,
        }
    }

    /// Creates a runner that uses `sudo` for privileged commands.
    ///
    /// This is suitable for terminal applications.
    pub fn with_sudo() -> Self {
        Self {
            escalation: PrivilegeEscalation::Sudo,
        }
    }

    /// Creates a runner with a specific escalation method.
    pub fn with_escalation(escalation: PrivilegeEscalation) -> Self {
        Self { escalation }
    }

    /// Returns the current privilege escalation method.
    pub fn escalation(&self) -> PrivilegeEscalation {
        self.escalation
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        run_command(program, args).await
    }

    async fn run_elevated(&self, program: &str, args: &[&str]) -> Result<String> {
        match self.escalation {
            PrivilegeEscalation::None => run_command(program, args).await,
            PrivilegeEscalation::Sudo => {
                let mut wrapped = vec![program];
                wrapped.extend(args);
                run_command("sudo", &wrapped).await
            }
            PrivilegeEscalation::Osascript => {
                let script = format!(
                    "do shell script \"{}\" with administrator privileges",
                    applescript_escape(&render(program, args))
                );
                run_command("osascript", &["-e", &script]).await
            }
        }
    }
}

/// Renders a program and its arguments as a single shell command line.
///
/// Arguments containing shell metacharacters are single-quoted so the
/// rendered string stays valid inside `do shell script`.
pub fn render(program: &str, args: &[&str]) -> String {
    let mut parts = vec![shell_quote(program)];
    parts.extend(args.iter().map(|arg| shell_quote(arg)));
    parts.join(" ")
}

fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '='));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Escapes a string for embedding in a double-quoted AppleScript literal.
pub(crate) fn applescript_escape(text: &str) -> String {
    text.replace('\\', r"\\").replace('"', r#"\""#)
}

/// Sends SIGKILL to a spawned process group when dropped without being
/// disarmed, so cancelling an in-flight command (e.g. a fired deadline)
/// reaps the subprocess instead of leaking it.
struct GroupKillGuard {
    pgid: Option<Pid>,
}

impl GroupKillGuard {
    fn new(pid: Option<u32>) -> Self {
        Self {
            pgid: pid.map(|pid| Pid::from_raw(pid as i32)),
        }
    }

    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for GroupKillGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid {
            let _ = killpg(pgid, Signal::SIGKILL);
        }
    }
}

/// Runs a command in its own process group and collects its stdout.
async fn run_command(program: &str, args: &[&str]) -> Result<String> {
    let rendered = render(program, args);
    tracing::debug!(command = %rendered, "running command");

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .kill_on_drop(true);

    let child = cmd.spawn().command_context(rendered.clone())?;
    // The child is the leader of its own group, so its pid doubles as pgid.
    let mut guard = GroupKillGuard::new(child.id());
    let output = child
        .wait_with_output()
        .await
        .command_context(rendered.clone())?;
    guard.disarm();

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = diagnostic_text(&output.stdout, &output.stderr);

        if is_cancelled_authentication(&stderr) {
            return Err(Error::AuthenticationCancelled);
        }

        return Err(Error::CommandExit {
            command: rendered,
            code,
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Picks the failure text of a command: stderr, falling back to stdout.
///
/// diskutil reports most failures on stdout with an empty stderr.
fn diagnostic_text(stdout: &[u8], stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }
    String::from_utf8_lossy(stdout).trim().to_string()
}

/// Detects a dismissed osascript credential dialog (AppleScript error -128).
fn is_cancelled_authentication(stderr: &str) -> bool {
    stderr.contains("User canceled") || stderr.contains("(-128)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_runner() {
        let runner = SystemRunner::default();
        assert_eq!(runner.escalation(), PrivilegeEscalation::None);
    }

    #[test]
    fn test_osascript_runner() {
        let runner = SystemRunner::with_osascript();
        assert_eq!(runner.escalation(), PrivilegeEscalation::Osascript);
    }

    #[test]
    fn test_sudo_runner() {
        let runner = SystemRunner::with_sudo();
        assert_eq!(runner.escalation(), PrivilegeEscalation::Sudo);
    }

    #[test]
    fn test_render_plain_arguments() {
        assert_eq!(
            render("diskutil", &["mount", "disk0s1"]),
            "diskutil mount disk0s1"
        );
    }

    #[test]
    fn test_render_quotes_spaces() {
        assert_eq!(
            render("open", &["/Volumes/My Disk"]),
            "open '/Volumes/My Disk'"
        );
    }

    #[test]
    fn test_applescript_escape() {
        assert_eq!(
            applescript_escape(r#"say "hi" \ bye"#),
            r#"say \"hi\" \\ bye"#
        );
    }

    #[test]
    fn test_cancelled_authentication_markers() {
        assert!(is_cancelled_authentication(
            "execution error: User canceled. (-128)"
        ));
        assert!(!is_cancelled_authentication("command not found"));
    }

    #[tokio::test]
    async fn test_run_collects_stdout() {
        let runner = SystemRunner::new();
        let out = runner.run("sh", &["-c", "printf hello"]).await.unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn test_run_maps_nonzero_exit() {
        let runner = SystemRunner::new();
        let err = runner
            .run("sh", &["-c", "echo boom 1>&2; exit 3"])
            .await
            .unwrap_err();
        match err {
            Error::CommandExit { code, stderr, .. } => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_falls_back_to_stdout_diagnostics() {
        let runner = SystemRunner::new();
        let err = runner
            .run("sh", &["-c", "echo no-stderr-details; exit 1"])
            .await
            .unwrap_err();
        match err {
            Error::CommandExit { stderr, .. } => assert_eq!(stderr, "no-stderr-details"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
