//! Section aggregation and the full scan pipeline.
//!
//! A [`DiskSection`] groups the records of one physical or synthesized
//! device, in listing order. Sections are rebuilt wholesale on every
//! refresh; there is no diffing against the previous scan.

use futures::future::join_all;
use serde::Serialize;

use crate::disk::{DISKUTIL, DiskRecord};
use crate::error::Result;
use crate::executor::CommandRunner;
use crate::listing;

/// One labeled group of disk records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskSection {
    /// Section header label, e.g. "/dev/disk0 (internal, physical)".
    /// Empty when the chunk carried no recognizable header.
    pub section_name: String,
    /// Contained records, in listing order.
    pub disks: Vec<DiskRecord>,
}

impl DiskSection {
    /// Splits the full `diskutil list` output into sections, extracting each
    /// chunk's rows synchronously. Chunks with zero rows yield valid, empty
    /// sections.
    pub fn split_from_listing(raw: &str) -> Vec<DiskSection> {
        listing::split_sections(raw)
            .into_iter()
            .map(|chunk| DiskSection {
                section_name: chunk.label,
                disks: DiskRecord::parse_rows(&chunk.body),
            })
            .collect()
    }

    /// Initializes every contained record concurrently.
    ///
    /// All detail fetches are issued at once and the call returns only when
    /// each has settled. Individual fetch failures become terminal record
    /// states, never a hard failure of the call.
    pub async fn init_disks(&mut self, runner: &dyn CommandRunner) {
        let disks = std::mem::take(&mut self.disks);
        self.disks = join_all(disks.into_iter().map(|disk| disk.init(runner))).await;
    }
}

/// Runs the full refresh pipeline: list, split, parse, initialize.
///
/// This is the unit of refresh. Callers re-run it after every successful
/// mount/unmount action and on manual refresh.
pub async fn scan(runner: &dyn CommandRunner) -> Result<Vec<DiskSection>> {
    let raw = runner.run(DISKUTIL, &["list"]).await?;
    let mut sections = DiskSection::split_from_listing(&raw);
    join_all(
        sections
            .iter_mut()
            .map(|section| section.init_disks(runner)),
    )
    .await;

    let disks: usize = sections.iter().map(|s| s.disks.len()).sum();
    tracing::info!(sections = sections.len(), disks, "scan complete");
    Ok(sections)
}
