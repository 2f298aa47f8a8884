//! Mount, unmount, reveal, and diagnostic-retry execution.
//!
//! Every operation reports its outcome through the [`Notifier`] and returns
//! the final [`Feedback`] so callers can decide whether to re-scan. The
//! dispatcher never refreshes state itself.

use crate::disk::{DISKUTIL, DiskRecord};
use crate::error::{CommandErrorKind, classify_command_error};
use crate::executor::CommandRunner;
use crate::notify::{Feedback, Notifier};
use crate::terminal::TerminalLauncher;

/// The two diskutil verbs an action can run, with their whole-disk variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Mount,
    Unmount,
}

impl Verb {
    /// The diskutil subcommand: whole disks use the `mountDisk` /
    /// `unmountDisk` variants that apply to every partition at once.
    fn subcommand(self, is_whole: bool) -> &'static str {
        match (self, is_whole) {
            (Verb::Mount, false) => "mount",
            (Verb::Mount, true) => "mountDisk",
            (Verb::Unmount, false) => "unmount",
            (Verb::Unmount, true) => "unmountDisk",
        }
    }

    fn acted(self) -> &'static str {
        match self {
            Verb::Mount => "Mounted",
            Verb::Unmount => "Unmounted",
        }
    }

    fn infinitive(self) -> &'static str {
        match self {
            Verb::Mount => "mount",
            Verb::Unmount => "unmount",
        }
    }
}

/// Mounts a record's volume (or all volumes of a whole disk).
pub async fn mount(
    record: &DiskRecord,
    runner: &dyn CommandRunner,
    notifier: &dyn Notifier,
) -> Feedback {
    run_verb(Verb::Mount, record, runner, notifier).await
}

/// Unmounts a record's volume (or all volumes of a whole disk).
pub async fn unmount(
    record: &DiskRecord,
    runner: &dyn CommandRunner,
    notifier: &dyn Notifier,
) -> Feedback {
    run_verb(Verb::Unmount, record, runner, notifier).await
}

/// Runs a mount/unmount verb with the privileged-retry fallback.
///
/// The first attempt runs unprivileged. A `kDAReturnNotPermitted` failure
/// (system and EFI partitions) is retried exactly once through the elevated
/// runner variant, after a visible "retrying" notice. Any other failure
/// surfaces directly and never touches the elevated path.
async fn run_verb(
    verb: Verb,
    record: &DiskRecord,
    runner: &dyn CommandRunner,
    notifier: &dyn Notifier,
) -> Feedback {
    let subcommand = verb.subcommand(record.is_whole);
    let args = [subcommand, record.identifier.as_str()];

    let feedback = match runner.run(DISKUTIL, &args).await {
        Ok(_) => Feedback::success(format!("{} {}", verb.acted(), record.identifier)),
        Err(error) => match classify_command_error(&error) {
            CommandErrorKind::NotPermitted => {
                tracing::info!(
                    identifier = %record.identifier,
                    verb = subcommand,
                    "not permitted, retrying with elevated privileges"
                );
                notifier.notify(Feedback::progress(format!(
                    "Retrying {} of {} with administrator privileges",
                    verb.infinitive(),
                    record.identifier
                )));
                match runner.run_elevated(DISKUTIL, &args).await {
                    Ok(_) => Feedback::success(format!("{} {}", verb.acted(), record.identifier)),
                    Err(error) => failure(verb, record, &error.to_string()),
                }
            }
            _ => failure(verb, record, &error.to_string()),
        },
    };

    notifier.notify(feedback.clone());
    feedback
}

fn failure(verb: Verb, record: &DiskRecord, message: &str) -> Feedback {
    Feedback::failure(
        format!("Failed to {} {}", verb.infinitive(), record.identifier),
        message,
    )
}

/// Opens the record's mount point in Finder.
pub async fn reveal(
    record: &DiskRecord,
    runner: &dyn CommandRunner,
    notifier: &dyn Notifier,
) -> Feedback {
    let feedback = match &record.mount_point {
        None => Feedback::failure(
            format!("Cannot reveal {}", record.identifier),
            "volume has no mount point",
        ),
        Some(mount_point) => {
            match runner
                .run("open", &[&mount_point.display().to_string()])
                .await
            {
                Ok(_) => Feedback::success(format!("Revealed {}", record.identifier)),
                Err(error) => Feedback::failure(
                    format!("Cannot reveal {}", record.identifier),
                    error.to_string(),
                ),
            }
        }
    };

    notifier.notify(feedback.clone());
    feedback
}

/// Re-runs the record's detail fetch in an interactive terminal window.
///
/// This is the diagnostic escape hatch for `Timed Out` records: the query
/// runs with no deadline and in-memory state is untouched.
pub fn retry_in_terminal(
    record: &DiskRecord,
    launcher: &dyn TerminalLauncher,
    notifier: &dyn Notifier,
) -> Feedback {
    let command = format!("{DISKUTIL} info {}", record.identifier);
    let feedback = match launcher.open_interactive(&command) {
        Ok(()) => Feedback::success(format!("Opened Terminal for {}", record.identifier)),
        Err(error) => Feedback::failure(
            format!("Cannot open Terminal for {}", record.identifier),
            error.to_string(),
        ),
    };

    notifier.notify(feedback.clone());
    feedback
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{Error, NOT_PERMITTED_MARKER, Result};
    use crate::listing;
    use crate::notify::FeedbackStyle;

    /// Runner that refuses unprivileged calls and counts both paths.
    struct RefusingRunner {
        stderr: &'static str,
        plain_calls: Mutex<u32>,
        elevated_calls: Mutex<u32>,
    }

    impl RefusingRunner {
        fn new(stderr: &'static str) -> Self {
            Self {
                stderr,
                plain_calls: Mutex::new(0),
                elevated_calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl CommandRunner for RefusingRunner {
        async fn run(&self, _program: &str, args: &[&str]) -> Result<String> {
            *self.plain_calls.lock().unwrap() += 1;
            Err(Error::CommandExit {
                command: format!("diskutil {}", args.join(" ")),
                code: 1,
                stderr: self.stderr.to_string(),
            })
        }

        async fn run_elevated(&self, _program: &str, _args: &[&str]) -> Result<String> {
            *self.elevated_calls.lock().unwrap() += 1;
            Ok(String::new())
        }
    }

    /// Notifier that records everything it is asked to show.
    #[derive(Default)]
    struct RecordingNotifier {
        shown: Mutex<Vec<Feedback>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, feedback: Feedback) {
            self.shown.lock().unwrap().push(feedback);
        }
    }

    fn record(line: &str) -> DiskRecord {
        DiskRecord::from_row(listing::parse_row(line).unwrap())
    }

    fn efi_record() -> DiskRecord {
        record("   1:                        EFI EFI                     314.6 MB   disk0s1")
    }

    #[tokio::test]
    async fn test_not_permitted_triggers_single_elevated_retry() {
        let runner = RefusingRunner::new("Volume failed to mount (kDAReturnNotPermitted)");
        let notifier = RecordingNotifier::default();

        let outcome = mount(&efi_record(), &runner, &notifier).await;

        assert!(outcome.is_success());
        assert_eq!(*runner.plain_calls.lock().unwrap(), 1);
        assert_eq!(*runner.elevated_calls.lock().unwrap(), 1);

        let shown = notifier.shown.lock().unwrap();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].style, FeedbackStyle::Progress);
        assert!(shown[0].title.contains("administrator privileges"));
        assert_eq!(shown[1].style, FeedbackStyle::Success);
        assert!(shown[1].title.contains("disk0s1"));
    }

    #[tokio::test]
    async fn test_unrelated_failure_never_escalates() {
        let runner = RefusingRunner::new("Could not find disk: disk0s1");
        let notifier = RecordingNotifier::default();

        let outcome = unmount(&efi_record(), &runner, &notifier).await;

        assert!(!outcome.is_success());
        assert_eq!(*runner.plain_calls.lock().unwrap(), 1);
        assert_eq!(*runner.elevated_calls.lock().unwrap(), 0);

        let shown = notifier.shown.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].style, FeedbackStyle::Failure);
        assert!(shown[0].title.contains("disk0s1"));
        assert!(
            shown[0]
                .message
                .as_deref()
                .unwrap()
                .contains("Could not find disk")
        );
    }

    #[tokio::test]
    async fn test_whole_disk_uses_disk_verbs() {
        struct VerbCheck;

        #[async_trait]
        impl CommandRunner for VerbCheck {
            async fn run(&self, _program: &str, args: &[&str]) -> Result<String> {
                assert_eq!(args[0], "unmountDisk");
                Ok(String::new())
            }

            async fn run_elevated(&self, _program: &str, _args: &[&str]) -> Result<String> {
                unreachable!("no escalation expected")
            }
        }

        let mut whole =
            record("   0:      GUID_partition_scheme                        *500.3 GB   disk0");
        whole.is_whole = true;

        let outcome = unmount(&whole, &VerbCheck, &RecordingNotifier::default()).await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_reveal_without_mount_point_fails_without_running() {
        struct NoRun;

        #[async_trait]
        impl CommandRunner for NoRun {
            async fn run(&self, _program: &str, _args: &[&str]) -> Result<String> {
                unreachable!("reveal must not run a command")
            }

            async fn run_elevated(&self, _program: &str, _args: &[&str]) -> Result<String> {
                unreachable!()
            }
        }

        let notifier = RecordingNotifier::default();
        let outcome = reveal(&efi_record(), &NoRun, &notifier).await;
        assert!(!outcome.is_success());
        assert_eq!(
            outcome.message.as_deref(),
            Some("volume has no mount point")
        );
    }

    #[tokio::test]
    async fn test_reveal_opens_mount_point() {
        struct OpenCheck;

        #[async_trait]
        impl CommandRunner for OpenCheck {
            async fn run(&self, program: &str, args: &[&str]) -> Result<String> {
                assert_eq!(program, "open");
                assert_eq!(args, ["/Volumes/BACKUPS"]);
                Ok(String::new())
            }

            async fn run_elevated(&self, _program: &str, _args: &[&str]) -> Result<String> {
                unreachable!()
            }
        }

        let mut mounted = efi_record();
        mounted.mount_point = Some("/Volumes/BACKUPS".into());

        let outcome = reveal(&mounted, &OpenCheck, &RecordingNotifier::default()).await;
        assert!(outcome.is_success());
    }

    #[test]
    fn test_retry_in_terminal_passes_fetch_command() {
        struct LauncherCheck {
            opened: Mutex<Vec<String>>,
        }

        impl TerminalLauncher for LauncherCheck {
            fn open_interactive(&self, command: &str) -> Result<()> {
                self.opened.lock().unwrap().push(command.to_string());
                Ok(())
            }
        }

        let launcher = LauncherCheck {
            opened: Mutex::new(Vec::new()),
        };
        let outcome = retry_in_terminal(&efi_record(), &launcher, &RecordingNotifier::default());

        assert!(outcome.is_success());
        assert_eq!(
            launcher.opened.lock().unwrap().as_slice(),
            ["diskutil info disk0s1"]
        );
    }

    #[test]
    fn test_not_permitted_marker_matches_classifier_input() {
        // The refusal text used above must carry the real marker.
        assert!("Volume failed to mount (kDAReturnNotPermitted)".contains(NOT_PERMITTED_MARKER));
    }
}
