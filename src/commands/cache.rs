//! The `cache-stats` and `cache-clear` commands.

use br::{MetadataCache, Prefix};
use colored::Colorize;

/// Delete the cache backing store (the WAL sidecars go with it).
pub fn clear(prefix: &Prefix) -> br::Result<()> {
    let db = prefix.cache_db();

    for suffix in ["", "-wal", "-shm"] {
        let mut path = db.clone().into_os_string();
        path.push(suffix);
        let path = std::path::PathBuf::from(path);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
    }

    println!("{} Cache cleared!", "✓".green());
    Ok(())
}

pub fn stats(prefix: &Prefix) -> br::Result<()> {
    let db = prefix.cache_db();
    let cache = MetadataCache::open(&db)?;
    let stats = cache.stats()?;

    let size_kb = std::fs::metadata(&db)
        .map(|m| m.len() as f64 / 1024.0)
        .unwrap_or(0.0);

    println!("{}", "==> Cache Statistics".bold().green());
    println!("{}: {}", "Total Entries".cyan(), stats.total);
    println!("{}: {}", "Valid Entries".cyan(), stats.valid);
    println!("{}: {}", "Expired Entries".cyan(), stats.expired);
    println!("{}: {:.2} KB", "Cache Size".cyan(), size_kb);

    Ok(())
}
