//! macOS Mount CLI - Command line interface for disk listing and mounting.
//!
//! Wraps the core scan pipeline and action dispatcher: list disks with
//! their classified mount state, mount/unmount volumes (with an automatic
//! elevated-privilege retry), reveal mount points in Finder, and re-run a
//! timed-out detail fetch in a Terminal window.

mod render;

use clap::{Parser, Subcommand};
use macos_mount_core::disk::{DISKUTIL, DiskRecord};
use macos_mount_core::executor::{CommandRunner, SystemRunner};
use macos_mount_core::notify::{Feedback, FeedbackStyle, Notifier};
use macos_mount_core::terminal::MacTerminal;
use macos_mount_core::{Result, mount, section};
use tracing_subscriber::EnvFilter;

/// macOS mount CLI tool.
#[derive(Parser)]
#[command(name = "macos-mount-cli")]
#[command(about = "List, mount, and unmount disks via diskutil", long_about = None)]
struct Cli {
    /// Use sudo for privileged retries instead of the GUI credential prompt.
    #[arg(long, global = true)]
    sudo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan all disks and print them grouped by section.
    List {
        /// Emit the scan result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print one disk's detail report and classification.
    Info { identifier: String },
    /// Mount a volume, or every volume of a whole disk.
    Mount { identifier: String },
    /// Unmount a volume, or every volume of a whole disk.
    Unmount { identifier: String },
    /// Open a mounted volume in Finder.
    Reveal { identifier: String },
    /// Re-run the detail fetch in a Terminal window (no deadline).
    Retry { identifier: String },
}

/// Renders feedback notifications on the console.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, feedback: Feedback) {
        let message = feedback.message.as_deref().unwrap_or_default();
        match feedback.style {
            FeedbackStyle::Success => println!("{}", feedback.title),
            FeedbackStyle::Failure => eprintln!("{}: {}", feedback.title, message),
            FeedbackStyle::Progress => eprintln!("{}...", feedback.title),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runner = if cli.sudo {
        SystemRunner::with_sudo()
    } else {
        SystemRunner::with_osascript()
    };

    std::process::exit(run(cli.command, &runner).await);
}

async fn run(command: Commands, runner: &SystemRunner) -> i32 {
    let notifier = ConsoleNotifier;

    match command {
        Commands::List { json } => match section::scan(runner).await {
            Ok(sections) => {
                if json {
                    match serde_json::to_string_pretty(&sections) {
                        Ok(text) => println!("{text}"),
                        Err(error) => {
                            eprintln!("Failed to encode scan result: {error}");
                            return 1;
                        }
                    }
                } else {
                    render::print_sections(&sections);
                }
                0
            }
            Err(error) => {
                tracing::error!(%error, "scan failed");
                eprintln!("Failed to fetch disks: {error}");
                1
            }
        },

        Commands::Info { identifier } => match lookup(runner, &identifier).await {
            Ok(Some(record)) => {
                render::print_record(&record);
                0
            }
            other => missing_or_failed(other, &identifier),
        },

        Commands::Mount { identifier } => match lookup(runner, &identifier).await {
            Ok(Some(record)) => {
                let outcome = mount::mount(&record, runner, &notifier).await;
                after_action(outcome, runner, &identifier).await
            }
            other => missing_or_failed(other, &identifier),
        },

        Commands::Unmount { identifier } => match lookup(runner, &identifier).await {
            Ok(Some(record)) => {
                let outcome = mount::unmount(&record, runner, &notifier).await;
                after_action(outcome, runner, &identifier).await
            }
            other => missing_or_failed(other, &identifier),
        },

        Commands::Reveal { identifier } => match lookup(runner, &identifier).await {
            Ok(Some(record)) => {
                let outcome = mount::reveal(&record, runner, &notifier).await;
                if outcome.is_success() { 0 } else { 1 }
            }
            other => missing_or_failed(other, &identifier),
        },

        Commands::Retry { identifier } => match lookup(runner, &identifier).await {
            Ok(Some(record)) => {
                let outcome = mount::retry_in_terminal(&record, &MacTerminal, &notifier);
                if outcome.is_success() { 0 } else { 1 }
            }
            other => missing_or_failed(other, &identifier),
        },
    }
}

/// Finds one record by identifier and initializes it.
///
/// Parses the listing without initializing every disk; only the matching
/// record pays for a detail fetch.
async fn lookup(runner: &dyn CommandRunner, identifier: &str) -> Result<Option<DiskRecord>> {
    let raw = runner.run(DISKUTIL, &["list"]).await?;
    let record = section::DiskSection::split_from_listing(&raw)
        .into_iter()
        .flat_map(|section| section.disks)
        .find(|disk| disk.identifier == identifier);

    match record {
        Some(record) => Ok(Some(record.init(runner).await)),
        None => Ok(None),
    }
}

/// After a successful mount/unmount, re-fetch the record and show its new
/// state; the dispatcher itself never refreshes.
async fn after_action(outcome: Feedback, runner: &dyn CommandRunner, identifier: &str) -> i32 {
    if !outcome.is_success() {
        return 1;
    }
    match lookup(runner, identifier).await {
        Ok(Some(record)) => {
            println!("{}", render::summary_line(&record));
            0
        }
        Ok(None) => 0,
        Err(error) => {
            eprintln!("Failed to fetch disks: {error}");
            1
        }
    }
}

fn missing_or_failed(result: Result<Option<DiskRecord>>, identifier: &str) -> i32 {
    match result {
        // Found records are handled at the call site; Ok here means no match.
        Ok(_) => {
            eprintln!("No such disk: {identifier}");
            1
        }
        Err(error) => {
            eprintln!("Failed to fetch disks: {error}");
            1
        }
    }
}
