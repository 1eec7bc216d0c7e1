//! The `cleanup` command.

use br::{Inventory, MetadataCache, Prefix};
use colored::Colorize;

pub fn cleanup(prefix: &Prefix) -> br::Result<()> {
    let cache = MetadataCache::open(&prefix.cache_db())?;
    let inventory = Inventory::load(prefix.inventory_file());

    println!("{}", "Cleaning up...".yellow().bold());

    let report = br::maintenance::cleanup(prefix, &inventory, &cache)?;

    println!(
        "{} Cleanup complete! Freed {}",
        "✓".green(),
        format_size(report.bytes_freed).bold()
    );
    if report.tarballs_removed > 0 {
        println!(
            "{} Removed {} leftover tarball{}",
            "✓".green(),
            report.tarballs_removed,
            if report.tarballs_removed == 1 { "" } else { "s" }
        );
    }
    if report.versions_removed > 0 {
        println!(
            "{} Removed {} stale version{}",
            "✓".green(),
            report.versions_removed,
            if report.versions_removed == 1 { "" } else { "s" }
        );
    }
    println!(
        "{} Removed {} expired cache entr{}",
        "✓".green(),
        report.cache_entries_removed,
        if report.cache_entries_removed == 1 { "y" } else { "ies" }
    );

    Ok(())
}

pub(crate) fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = 1024.0 * 1024.0;
    let bytes = bytes as f64;
    if bytes >= MIB {
        format!("{:.2} MB", bytes / MIB)
    } else if bytes >= KIB {
        format!("{:.2} KB", bytes / KIB)
    } else {
        format!("{} bytes", bytes as u64)
    }
}
