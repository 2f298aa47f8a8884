//! Line grammar for `diskutil list` output.
//!
//! `diskutil list` prints one section per physical or synthesized device:
//!
//! ```text
//! /dev/disk0 (internal, physical):
//!    #:                       TYPE NAME                    SIZE       IDENTIFIER
//!    0:      GUID_partition_scheme                        *500.3 GB   disk0
//!    1:                        EFI EFI                     314.6 MB   disk0s1
//!    2:                 Apple_APFS Container disk3         500.0 GB   disk0s2
//! ```
//!
//! The row format is columnar: the TYPE field is right-aligned and ends at a
//! fixed column, NAME fills the gap up to the SIZE column and may be empty,
//! SIZE and IDENTIFIER close the line. Newer diskutil builds wrap fields in
//! invisible Unicode directional isolates, which are stripped before
//! matching. Lines that do not match the row shape (headers, continuation
//! lines, prose) are skipped; parsing is total and never fails.

use lazy_regex::{regex, regex_captures};

/// Column (0-based, exclusive) at which the right-aligned TYPE field ends.
/// The NAME column starts one space later.
const TYPE_COLUMN_END: usize = 32;

/// One matched row of the listing, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Ordinal position within the section.
    pub number: u32,
    /// Partition/scheme type string (e.g. "Apple_APFS", "APFS Volume").
    pub device_type: String,
    /// Human-readable volume or container name, possibly empty.
    pub name: String,
    /// Human-readable size (e.g. "500.3 GB"), without the `*`/`+` prefix.
    pub size: String,
    /// Device identifier (e.g. "disk0s2").
    pub identifier: String,
}

/// One section chunk of the raw listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionChunk {
    /// Header label without the trailing colon, e.g.
    /// "/dev/disk0 (internal, physical)". Empty if no header matched.
    pub label: String,
    /// The chunk's full text, header line included.
    pub body: String,
}

/// Parses one line of the listing into a [`RawRow`].
///
/// Returns `None` for anything that is not a disk row.
pub fn parse_row(line: &str) -> Option<RawRow> {
    let line = strip_directional_marks(line);
    // ordinal, TYPE+NAME blob, SIZE, IDENTIFIER
    let caps = regex!(r"^\s*(\d+):\s+(.+?)\s+[+*]?(\d+(?:\.\d+)?\s[KMGTPE]?B)\s+(\S+)\s*$")
        .captures(&line)?;

    let number: u32 = caps[1].parse().ok()?;
    let blob = caps.get(2)?;
    let (device_type, name) = split_type_name(&line, blob.start(), blob.end());

    Some(RawRow {
        number,
        device_type,
        name,
        size: caps[3].to_string(),
        identifier: caps[4].to_string(),
    })
}

/// Parses every matching row of a text chunk, skipping everything else.
pub fn parse_rows(text: &str) -> Vec<RawRow> {
    text.lines().filter_map(parse_row).collect()
}

/// Splits the full `diskutil list` output into per-section chunks.
///
/// A new chunk starts at every section-header line (a `/dev/...` label
/// followed by a colon). Text before the first header becomes a chunk with
/// an empty label, unless it is blank.
pub fn split_sections(raw: &str) -> Vec<SectionChunk> {
    let mut chunks = Vec::new();
    let mut label = String::new();
    let mut body = String::new();

    for line in raw.lines() {
        if let Some(header) = header_label(line) {
            if !body.trim().is_empty() {
                chunks.push(SectionChunk { label, body });
            }
            label = header;
            body = String::new();
        }
        body.push_str(line);
        body.push('\n');
    }
    if !body.trim().is_empty() {
        chunks.push(SectionChunk { label, body });
    }

    tracing::debug!(sections = chunks.len(), "split listing into sections");
    chunks
}

/// Extracts the label of a section-header line, colon removed.
fn header_label(line: &str) -> Option<String> {
    let (_, label) = regex_captures!(r"^(/dev/\S+(?:\s+\([^)]*\))?):\s*$", line)?;
    Some(label.to_string())
}

/// Splits the TYPE+NAME blob at the fixed column boundary.
///
/// `start`/`end` are the blob's byte offsets within `line`. Rows are ASCII
/// up to the NAME column, so byte offsets line up with display columns.
fn split_type_name(line: &str, start: usize, end: usize) -> (String, String) {
    if end <= TYPE_COLUMN_END {
        // Blob sits entirely inside the TYPE column; the name is empty.
        (line[start..end].trim().to_string(), String::new())
    } else if start < TYPE_COLUMN_END && line.is_char_boundary(TYPE_COLUMN_END) {
        (
            line[start..TYPE_COLUMN_END].trim().to_string(),
            line[TYPE_COLUMN_END..end].trim().to_string(),
        )
    } else {
        // Drifted right of the expected boundary; fall back to splitting at
        // the first run of two spaces.
        let blob = &line[start..end];
        match blob.find("  ") {
            Some(split) => (
                blob[..split].trim().to_string(),
                blob[split..].trim().to_string(),
            ),
            None => (blob.trim().to_string(), String::new()),
        }
    }
}

/// Removes the Unicode directional-formatting characters diskutil wraps
/// around fields on newer systems.
fn strip_directional_marks(line: &str) -> String {
    line.chars()
        .filter(|c| !matches!(c, '\u{2066}'..='\u{2069}' | '\u{200E}' | '\u{200F}'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LISTING: &str = "\
/dev/disk0 (internal, physical):
   #:                       TYPE NAME                    SIZE       IDENTIFIER
   0:      GUID_partition_scheme                        *500.3 GB   disk0
   1:                        EFI EFI                     314.6 MB   disk0s1
   2:                 Apple_APFS Container disk3         500.0 GB   disk0s2

/dev/disk3 (synthesized):
   #:                       TYPE NAME                    SIZE       IDENTIFIER
   0:      APFS Container Scheme -                      +500.0 GB   disk3
                                 Physical Store disk0s2
   1:                APFS Volume Macintosh HD            15.3 GB    disk3s1
   2:                APFS Volume Data                    320.1 GB   disk3s5

/dev/disk4 (external, physical):
   #:                       TYPE NAME                    SIZE       IDENTIFIER
   0:     FDisk_partition_scheme                        *64.0 GB    disk4
   1:               Windows_NTFS BACKUPS                 64.0 GB    disk4s1
";

    #[test]
    fn test_parse_scheme_row_has_empty_name() {
        let row =
            parse_row("   0:      GUID_partition_scheme                        *500.3 GB   disk0")
                .unwrap();
        assert_eq!(row.number, 0);
        assert_eq!(row.device_type, "GUID_partition_scheme");
        assert_eq!(row.name, "");
        assert_eq!(row.size, "500.3 GB");
        assert_eq!(row.identifier, "disk0");
    }

    #[test]
    fn test_parse_row_with_spaced_type_and_name() {
        let row =
            parse_row("   1:                APFS Volume Macintosh HD            15.3 GB    disk3s1")
                .unwrap();
        assert_eq!(row.device_type, "APFS Volume");
        assert_eq!(row.name, "Macintosh HD");
        assert_eq!(row.size, "15.3 GB");
        assert_eq!(row.identifier, "disk3s1");
    }

    #[test]
    fn test_type_column_boundary() {
        // The TYPE field is right-aligned: it must end exactly at the fixed
        // column for the split to hold.
        let line = "   1:                        EFI EFI                     314.6 MB   disk0s1";
        assert_eq!(&line[TYPE_COLUMN_END - 3..TYPE_COLUMN_END], "EFI");
        let row = parse_row(line).unwrap();
        assert_eq!(row.device_type, "EFI");
        assert_eq!(row.name, "EFI");
    }

    #[test]
    fn test_parse_row_strips_directional_marks() {
        let line = "   1:               Windows_NTFS BACKUPS                 64.0 GB    \u{2068}disk4s1\u{2069}";
        let row = parse_row(line).unwrap();
        assert_eq!(row.identifier, "disk4s1");
    }

    #[test]
    fn test_parse_row_skips_non_rows() {
        assert!(parse_row("").is_none());
        assert!(parse_row("/dev/disk0 (internal, physical):").is_none());
        assert!(
            parse_row("   #:                       TYPE NAME                    SIZE       IDENTIFIER")
                .is_none()
        );
        assert!(parse_row("                                 Physical Store disk0s2").is_none());
        assert!(parse_row("this is not a disk listing at all").is_none());
    }

    #[test]
    fn test_parse_rows_is_total_on_arbitrary_text() {
        assert!(parse_rows("").is_empty());
        assert!(parse_rows("once upon a time\nthere were no disks\n").is_empty());
    }

    #[test]
    fn test_split_sections_extracts_labels() {
        let chunks = split_sections(SAMPLE_LISTING);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].label, "/dev/disk0 (internal, physical)");
        assert_eq!(chunks[1].label, "/dev/disk3 (synthesized)");
        assert_eq!(chunks[2].label, "/dev/disk4 (external, physical)");
    }

    #[test]
    fn test_split_sections_preserves_row_count() {
        let total = parse_rows(SAMPLE_LISTING).len();
        let per_section: usize = split_sections(SAMPLE_LISTING)
            .iter()
            .map(|chunk| parse_rows(&chunk.body).len())
            .sum();
        assert_eq!(total, 8);
        assert_eq!(per_section, total);
    }

    #[test]
    fn test_split_sections_without_header_yields_empty_label() {
        let chunks = split_sections("   1:                        EFI EFI                     314.6 MB   disk0s1\n");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].label, "");
        assert_eq!(parse_rows(&chunks[0].body).len(), 1);
    }

    #[test]
    fn test_split_sections_on_blank_input() {
        assert!(split_sections("").is_empty());
        assert!(split_sections("\n\n  \n").is_empty());
    }
}
