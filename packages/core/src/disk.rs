//! Disk records parsed from the `diskutil list` output.
//!
//! A [`DiskRecord`] starts as the static fields of one listing row and is
//! completed by [`DiskRecord::init`], which fetches the record's detail
//! report and classifies its mount state. `init` consumes the record and
//! returns a new one; records are value types, never mutated in place.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::executor::CommandRunner;
use crate::listing::{self, RawRow};
use crate::status::{Classification, MountStatus, classify, timeout_details};

/// The system utility every listing and mount operation shells out to.
pub const DISKUTIL: &str = "diskutil";

/// Deadline for one record's detail fetch.
pub const DETAIL_TIMEOUT: Duration = Duration::from_secs(5);

/// One row of the disk listing: a partition, volume, or whole disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskRecord {
    /// Ordinal position within the record's section.
    pub number: u32,
    /// Partition/scheme type string (e.g. "Apple_APFS").
    pub device_type: String,
    /// Human-readable volume or container name, possibly empty.
    pub name: String,
    /// Human-readable size string (e.g. "500.3 GB").
    pub size: String,
    /// Device identifier (e.g. "disk0s2").
    pub identifier: String,
    /// Raw detail report, or an error sentinel. None until `init` has run.
    pub details: Option<String>,
    /// Classified mount state.
    pub mount_status: MountStatus,
    /// True when this record is an entire physical disk.
    pub is_whole: bool,
    /// Path the volume is mounted at, when mounted.
    pub mount_point: Option<PathBuf>,
}

impl DiskRecord {
    /// Creates an uninitialized record from one matched listing row.
    pub fn from_row(row: RawRow) -> Self {
        Self {
            number: row.number,
            device_type: row.device_type,
            name: row.name,
            size: row.size,
            identifier: row.identifier,
            details: None,
            mount_status: MountStatus::Initializing,
            is_whole: false,
            mount_point: None,
        }
    }

    /// Extracts all disk records from a chunk of listing text.
    ///
    /// Lines that are not disk rows are skipped; text with no rows yields an
    /// empty list, never an error.
    pub fn parse_rows(text: &str) -> Vec<DiskRecord> {
        listing::parse_rows(text)
            .into_iter()
            .map(DiskRecord::from_row)
            .collect()
    }

    /// Fetches and classifies this record's detail report.
    ///
    /// The fetch races a fixed deadline. A missed deadline yields the
    /// `Timed Out` state with a sentinel in `details`; the runner's
    /// subprocess is cancelled along with the dropped future. A failed fetch
    /// yields `Classification Failed` with the error text in `details`.
    pub async fn init(self, runner: &dyn CommandRunner) -> DiskRecord {
        let args = ["info", self.identifier.as_str()];
        let fetch = runner.run(DISKUTIL, &args);
        match tokio::time::timeout(DETAIL_TIMEOUT, fetch).await {
            Err(_elapsed) => {
                tracing::warn!(identifier = %self.identifier, "detail fetch timed out");
                let details = timeout_details(&self.identifier);
                self.resolved(details, Classification::timed_out())
            }
            Ok(Err(error)) => {
                tracing::warn!(identifier = %self.identifier, %error, "detail fetch failed");
                self.resolved(format!("ERROR: {error}"), Classification::failed())
            }
            Ok(Ok(details)) => {
                let classification = classify(&self.name, &details);
                self.resolved(details, classification)
            }
        }
    }

    fn resolved(mut self, details: String, classification: Classification) -> DiskRecord {
        self.details = Some(details);
        self.mount_status = classification.status;
        self.is_whole = classification.is_whole;
        self.mount_point = classification.mount_point;
        self
    }
}
