//! The `list` command.

use br::{Inventory, Prefix};
use colored::Colorize;

pub fn list(prefix: &Prefix) -> br::Result<()> {
    let inventory = Inventory::load(prefix.inventory_file());

    if inventory.is_empty() {
        println!("{}", "Your Cellar is empty.".yellow());
        return Ok(());
    }

    let name_width = inventory
        .iter()
        .map(|(name, _)| name.len())
        .chain(["Package".len()])
        .max()
        .unwrap_or(7);
    let version_width = inventory
        .iter()
        .map(|(_, entry)| entry.version.len())
        .chain(["Version".len()])
        .max()
        .unwrap_or(7);

    // Pad before coloring; ANSI escapes would otherwise count into the width.
    println!(
        "{}  {}  {}",
        format!("{:<name_width$}", "Package").bold().magenta(),
        format!("{:<version_width$}", "Version").bold().magenta(),
        "Path".bold().magenta()
    );

    for (name, entry) in inventory.iter() {
        println!(
            "{}  {}  {}",
            format!("{:<name_width$}", name).cyan(),
            format!("{:<version_width$}", entry.version).green(),
            entry.path.display().to_string().dimmed()
        );
    }

    Ok(())
}
