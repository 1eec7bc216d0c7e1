//! The `search` command. Exact-match only: the upstream API is queried for
//! the name as given, there is no fuzzy matching.

use br::{MetadataCache, Prefix, Registry, RegistryClient};
use colored::Colorize;
use std::sync::Arc;

pub async fn search(prefix: &Prefix, query: &str) -> br::Result<()> {
    let cache = Arc::new(MetadataCache::open(&prefix.cache_db())?);
    let client = RegistryClient::new(cache)?;

    match client.fetch_metadata(query, false).await? {
        Some(formula) => {
            let version = formula.versions.stable.as_deref().unwrap_or("?");
            println!("++ {} v{}", formula.name.bold().green(), version);
            if let Some(desc) = &formula.desc {
                println!("   {}", desc);
            }
        }
        None => {
            println!("{} No exact match for '{}'", "✗".red(), query);
        }
    }

    Ok(())
}
