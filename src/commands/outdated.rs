//! The `outdated` command: parallel upstream check of every installed
//! package, bypassing the metadata cache.

use br::{Inventory, MetadataCache, Prefix, Registry, RegistryClient};
use colored::Colorize;
use futures::StreamExt;
use std::sync::Arc;

const CHECK_CONCURRENCY: usize = 10;

pub async fn outdated(prefix: &Prefix) -> br::Result<()> {
    let cache = Arc::new(MetadataCache::open(&prefix.cache_db())?);
    let client = RegistryClient::new(cache)?;
    let inventory = Inventory::load(prefix.inventory_file());

    if inventory.is_empty() {
        println!("{}", "Your Cellar is empty.".yellow());
        return Ok(());
    }

    println!("Checking for updates...");

    let names = inventory.names();
    let client_ref = &client;
    let results: Vec<(String, Option<String>)> = futures::stream::iter(names.iter().map(|name| {
        async move {
            let latest = match client_ref.fetch_metadata(name, true).await {
                Ok(Some(formula)) => formula.versions.stable,
                Ok(None) => None,
                Err(e) => {
                    tracing::debug!("error checking {}: {}", name, e);
                    None
                }
            };
            (name.clone(), latest)
        }
    }))
    .buffer_unordered(CHECK_CONCURRENCY)
    .collect()
    .await;

    let mut rows = Vec::new();
    for (name, latest) in results {
        let Some(latest) = latest else { continue };
        if let Some(entry) = inventory.get(&name)
            && entry.version != latest
        {
            rows.push((name, entry.version.clone(), latest));
        }
    }

    if rows.is_empty() {
        println!("{}", "✓ All packages are up to date!".green());
        return Ok(());
    }

    rows.sort();
    println!(
        "{}  {}  {}",
        "Package".bold(),
        "Current".bold(),
        "Latest".bold()
    );
    for (name, current, latest) in rows {
        println!("{}  {}  {}", name.cyan(), current.red(), latest.green());
    }

    Ok(())
}
