//! The `upgrade` command: force-reinstall every outdated package.

use br::{Inventory, MetadataCache, Prefix, Registry, RegistryClient};
use colored::Colorize;
use std::sync::Arc;

pub async fn upgrade(prefix: &Prefix) -> br::Result<()> {
    let flavor = br::platform::os_flavor()?;
    let cache = Arc::new(MetadataCache::open(&prefix.cache_db())?);
    let client = RegistryClient::new(cache)?;
    let mut inventory = Inventory::load(prefix.inventory_file());

    if inventory.is_empty() {
        println!("{}", "Nothing installed yet.".yellow());
        return Ok(());
    }

    println!("Checking for updates...");

    // Bypass the cache: stale versions here would mask available upgrades.
    let mut outdated = Vec::new();
    for name in inventory.names() {
        let Some(formula) = client.fetch_metadata(&name, true).await? else {
            continue;
        };
        let Some(installed) = inventory.get(&name) else {
            continue;
        };
        if let Some(stable) = formula.versions.stable
            && stable != installed.version
        {
            outdated.push(name);
        }
    }

    if outdated.is_empty() {
        println!("{}", "Everything is up to date!".green());
        return Ok(());
    }

    println!(
        "{} {}",
        "Upgrading:".yellow().bold(),
        outdated.join(", ")
    );

    // Extraction clears the destination keg and symlinks are replaced; old
    // version directories stay behind until `cleanup`.
    super::install::run_install(&client, prefix, &mut inventory, &flavor, &outdated, true).await
}
