//! Mount-state classification from `diskutil info` reports.
//!
//! The detail report is free-form `Key:   Value` text:
//!
//! ```text
//!    Device Identifier:         disk0s1
//!    Device Node:               /dev/disk0s1
//!    Whole:                     No
//!    Mounted:                   Yes
//!    Mount Point:               /System/Volumes/ESP
//! ```
//!
//! Classification is a pure function of the record name and the report text;
//! every code path yields an explicit terminal state.

use std::fmt;
use std::path::PathBuf;

use lazy_regex::regex_captures;
use serde::{Serialize, Serializer};

/// Sentinel embedded in `details` when the detail fetch misses its deadline.
pub const TIMEOUT_SENTINEL: &str = "ERROR: Initialization Timed Out";

/// Renders the timeout sentinel for one identifier.
pub fn timeout_details(identifier: &str) -> String {
    format!("{TIMEOUT_SENTINEL} ({identifier})")
}

/// Mount status of a disk record.
///
/// `Initializing` is the only non-terminal state; a record leaves it exactly
/// once, when its detail fetch settles. Every other state is terminal for
/// the record instance and only a full re-scan produces a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountStatus {
    /// Detail fetch has not settled yet.
    Initializing,
    /// Volume is mounted.
    Mounted,
    /// Volume is present but not mounted.
    Unmounted,
    /// The report carries a `Mounted:` value that is neither Yes nor No.
    Unmountable,
    /// The record is an entire physical disk, not a partition.
    Whole,
    /// The record is an APFS container; containers cannot be mounted.
    Container,
    /// The report has no `Mounted:` field at all.
    Inaccessible,
    /// The detail fetch missed its deadline.
    TimedOut,
    /// The detail fetch failed outright.
    ClassificationFailed,
}

impl MountStatus {
    /// The fixed user-facing tag for this status.
    pub fn label(&self) -> &'static str {
        match self {
            MountStatus::Initializing => "Initializing...",
            MountStatus::Mounted => "Mounted",
            MountStatus::Unmounted => "Unmounted",
            MountStatus::Unmountable => "Unmountable",
            MountStatus::Whole => "Whole",
            MountStatus::Container => "Container",
            MountStatus::Inaccessible => "Inaccessible",
            MountStatus::TimedOut => "Timed Out",
            MountStatus::ClassificationFailed => "Classification Failed",
        }
    }
}

impl fmt::Display for MountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for MountStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Outcome of classifying one detail report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: MountStatus,
    /// True when the record represents an entire physical disk.
    pub is_whole: bool,
    /// Filesystem path the volume is mounted at, when reported.
    pub mount_point: Option<PathBuf>,
}

impl Classification {
    pub(crate) fn failed() -> Self {
        Self {
            status: MountStatus::ClassificationFailed,
            is_whole: false,
            mount_point: None,
        }
    }

    pub(crate) fn timed_out() -> Self {
        Self {
            status: MountStatus::TimedOut,
            is_whole: false,
            mount_point: None,
        }
    }
}

/// Classifies a detail report, in priority order:
///
/// 1. report embeds the timeout sentinel;
/// 2. `Whole: Yes` marks an entire physical disk;
/// 3. a report with no `Mounted:` field is inaccessible;
/// 4. a record named like a container cannot be mounted;
/// 5. otherwise the `Mounted:` value decides.
pub fn classify(name: &str, details: &str) -> Classification {
    let mount_point = detail_field(details, "Mount Point").map(PathBuf::from);

    if details.contains(TIMEOUT_SENTINEL) {
        return Classification {
            mount_point,
            ..Classification::timed_out()
        };
    }

    if detail_field(details, "Whole") == Some("Yes") {
        return Classification {
            status: MountStatus::Whole,
            is_whole: true,
            mount_point,
        };
    }

    let Some(mounted) = detail_field(details, "Mounted") else {
        return Classification {
            status: MountStatus::Inaccessible,
            is_whole: false,
            mount_point,
        };
    };

    let status = if name.contains("Container") {
        MountStatus::Container
    } else {
        match mounted {
            "Yes" => MountStatus::Mounted,
            "No" => MountStatus::Unmounted,
            _ => MountStatus::Unmountable,
        }
    };

    Classification {
        status,
        is_whole: false,
        mount_point,
    }
}

/// Extracts the value of one `Key:   Value` line from a detail report.
pub fn detail_field<'a>(details: &'a str, key: &str) -> Option<&'a str> {
    details.lines().find_map(|line| {
        let (_, found, value) = regex_captures!(r"^\s*([^:]+?):\s+(.+?)\s*$", line)?;
        (found == key).then_some(value)
    })
}
