//! The `doctor` command.

use br::{Inventory, MetadataCache, Prefix};
use colored::Colorize;

pub fn doctor(prefix: &Prefix) -> br::Result<()> {
    let cache = MetadataCache::open(&prefix.cache_db())?;
    let inventory = Inventory::load(prefix.inventory_file());
    let path_var = std::env::var("PATH").unwrap_or_default();

    println!("{}", "Running diagnostics...".bold());

    let report = br::maintenance::doctor(prefix, &inventory, &cache, &path_var)?;

    if !report.bin_on_path {
        println!(
            "{} Bin directory {} is not in your PATH.",
            "!".red(),
            prefix.bin_dir().display()
        );
        println!(
            "  Run {} for the snippet to add.",
            "br shellenv".cyan()
        );
    }

    for link in &report.broken_symlinks {
        println!(
            "{} Broken symlink found: {}",
            "!".red(),
            link.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| link.display().to_string())
        );
    }

    for name in &report.missing_kegs {
        println!(
            "{} Inventory says {} is installed, but its folder is missing.",
            "!".red(),
            name.bold()
        );
    }

    println!(
        "{} {} valid, {} expired entries",
        "Cache:".cyan(),
        report.cache.valid,
        report.cache.expired
    );

    if report.issues() == 0 {
        println!("{}", "Your system is healthy!".green());
    } else {
        println!("{}", format!("Found {} issues.", report.issues()).red());
    }

    Ok(())
}
