//! macos-mount-core: Core library for macOS disk mounting.
//!
//! This library wraps the `diskutil` command-line tool: it parses the
//! columnar `diskutil list` output into sections of disk records, classifies
//! each record's mount state from its `diskutil info` report, and drives
//! mount/unmount actions with an automatic elevated-privilege retry for
//! protected volumes.
//!
//! # Modules
//!
//! - [`listing`]: Line grammar for the `diskutil list` output
//! - [`disk`]: Disk records and per-record detail initialization
//! - [`status`]: Mount-state classification
//! - [`section`]: Section aggregation and the scan pipeline
//! - [`actions`]: Per-status action dispatch table
//! - [`mount`]: Mount/unmount/reveal execution with privileged retry
//! - [`executor`]: Command execution and privilege escalation
//! - [`terminal`]: Interactive terminal launcher
//! - [`notify`]: Toast-style user feedback
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```no_run
//! use macos_mount_core::{actions, executor::SystemRunner, section};
//!
//! # async fn demo() -> macos_mount_core::Result<()> {
//! let runner = SystemRunner::with_osascript();
//!
//! // Scan: list, split into sections, classify every record.
//! let sections = section::scan(&runner).await?;
//! for section in &sections {
//!     println!("{}", section.section_name);
//!     for disk in &section.disks {
//!         let actions = actions::available_actions(disk.mount_status);
//!         println!(
//!             "  {} {} [{}] {} actions",
//!             disk.identifier,
//!             disk.name,
//!             disk.mount_status,
//!             actions.actions.len()
//!         );
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod disk;
pub mod error;
pub mod executor;
pub mod listing;
pub mod mount;
pub mod notify;
pub mod section;
pub mod status;
pub mod terminal;

// Re-export commonly used types
pub use actions::{ActionKind, ActionSet, ActionSpec};
pub use disk::DiskRecord;
pub use error::{CommandErrorKind, Error, Result};
pub use executor::{CommandRunner, SystemRunner};
pub use notify::{Feedback, Notifier};
pub use section::DiskSection;
pub use status::MountStatus;
