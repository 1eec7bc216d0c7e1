//! The `info` command.

use br::{Inventory, MetadataCache, Prefix, Registry, RegistryClient};
use colored::Colorize;
use std::sync::Arc;

pub async fn info(prefix: &Prefix, package: &str) -> br::Result<()> {
    let cache = Arc::new(MetadataCache::open(&prefix.cache_db())?);
    let client = RegistryClient::new(cache)?;
    let inventory = Inventory::load(prefix.inventory_file());

    let Some(formula) = client.fetch_metadata(package, false).await? else {
        println!("{} Package '{}' not found.", "✗".red(), package);
        return Ok(());
    };

    let status = if inventory.contains(package) {
        "Installed".green().to_string()
    } else {
        "Not Installed".red().to_string()
    };
    let deps = if formula.dependencies.is_empty() {
        "None".to_string()
    } else {
        formula.dependencies.join(", ")
    };

    println!("{}", format!("==> {}", formula.name).bold().green());
    println!(
        "{}: {}",
        "Description".bold().cyan(),
        formula.desc.as_deref().unwrap_or("")
    );
    println!(
        "{}: {}",
        "Homepage".bold().cyan(),
        formula.homepage.as_deref().unwrap_or("").underline()
    );
    println!(
        "{}: {}",
        "Latest Version".bold().cyan(),
        formula.versions.stable.as_deref().unwrap_or("?")
    );
    println!("{}: {}", "Status".bold().cyan(), status);
    println!("{}: {}", "Dependencies".bold().magenta(), deps);

    Ok(())
}
