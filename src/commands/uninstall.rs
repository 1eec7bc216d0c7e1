//! The `uninstall` command.

use br::{Inventory, MetadataCache, Prefix};
use colored::Colorize;
use dialoguer::Confirm;

pub fn uninstall(prefix: &Prefix, packages: &[String], confirm: bool) -> br::Result<()> {
    let cache = MetadataCache::open(&prefix.cache_db())?;
    let mut inventory = Inventory::load(prefix.inventory_file());

    let to_remove: Vec<String> = packages
        .iter()
        .filter(|name| inventory.contains(name))
        .cloned()
        .collect();

    if to_remove.is_empty() {
        println!(
            "{} Packages not installed: {}",
            "⚠".yellow(),
            packages.join(", ")
        );
        return Ok(());
    }

    if confirm {
        let proceed = Confirm::new()
            .with_prompt(format!("Uninstall {}?", to_remove.join(", ")))
            .default(false)
            .interact()
            .map_err(anyhow::Error::from)?;
        if !proceed {
            return Ok(());
        }
    }

    let (removed, not_installed) =
        br::install::uninstall_packages(prefix, &mut inventory, &cache, packages)?;

    for report in &removed {
        println!(
            "{} Uninstalled {} {}",
            "✓".green(),
            report.name.bold().green(),
            report.version.dimmed()
        );
    }
    for name in &not_installed {
        println!("{} {} not installed", "⚠".yellow(), name.bold());
    }

    Ok(())
}
