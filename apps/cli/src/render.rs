//! Console rendering of sections and records.

use macos_mount_core::actions;
use macos_mount_core::disk::DiskRecord;
use macos_mount_core::section::DiskSection;

/// Prints every section with its records, grouped the way the listing
/// grouped them.
pub fn print_sections(sections: &[DiskSection]) {
    for (index, section) in sections.iter().enumerate() {
        if index > 0 {
            println!();
        }
        if section.section_name.is_empty() {
            println!("(unnamed section)");
        } else {
            println!("{}", section.section_name);
        }
        if section.disks.is_empty() {
            println!("   (no disks)");
        }
        for disk in &section.disks {
            println!("{}", summary_line(disk));
        }
    }
}

/// One table line for a record.
pub fn summary_line(disk: &DiskRecord) -> String {
    let mount_point = disk
        .mount_point
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    format!(
        "{:>4}: {:<10} {:<24} {:<20} {:>10}  {:<15} {}",
        disk.number,
        disk.identifier,
        disk.device_type,
        disk.name,
        disk.size,
        disk.mount_status.label(),
        mount_point,
    )
    .trim_end()
    .to_string()
}

/// Prints one record's classification, permitted actions, and raw report.
pub fn print_record(record: &DiskRecord) {
    println!("Identifier:   {}", record.identifier);
    println!("Type:         {}", record.device_type);
    if !record.name.is_empty() {
        println!("Name:         {}", record.name);
    }
    println!("Size:         {}", record.size);
    println!("Status:       {}", record.mount_status);
    if let Some(mount_point) = &record.mount_point {
        println!("Mount Point:  {}", mount_point.display());
    }

    let set = actions::available_actions(record.mount_status);
    if let Some(notice) = set.notice {
        println!("Notice:       {notice}");
    }
    if !set.actions.is_empty() {
        let titles: Vec<_> = set.actions.iter().map(|action| action.title).collect();
        println!("Actions:      {}", titles.join(", "));
    }

    if let Some(details) = &record.details {
        println!();
        println!("{}", details.trim_end());
    }
}
