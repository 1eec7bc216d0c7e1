//! Persistent metadata cache with per-entry TTL.
//!
//! Package metadata JSON is stored in an embedded SQLite database keyed by
//! package name. Each row carries the time it was cached and its TTL in
//! hours; an entry older than its TTL is treated as absent and deleted the
//! next time it is read. The database lives at `cache/metadata.db` under the
//! br base directory.
//!
//! Single-process concurrency is handled by the interior mutex; crash
//! durability is SQLite's own (WAL journal). No cross-process coordination
//! is required.

use crate::api::Formula;
use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// Default time-to-live for cached metadata.
pub const DEFAULT_TTL_HOURS: i64 = 6;

/// Counts reported by [`MetadataCache::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total: usize,
    pub valid: usize,
    pub expired: usize,
}

/// SQLite-backed key→JSON store for formula metadata.
pub struct MetadataCache {
    conn: Mutex<Connection>,
}

impl MetadataCache {
    /// Open (creating if necessary) the cache database at `db_path`.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS metadata_cache (
                package_name TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                cached_at INTEGER NOT NULL,
                ttl_hours INTEGER NOT NULL
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cached_at ON metadata_cache(cached_at)",
            [],
        )?;

        debug!("metadata cache ready at {}", db_path.display());

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Return the cached record for `name` iff it has not expired. Expired
    /// rows are deleted on read.
    pub fn get(&self, name: &str) -> Result<Option<Formula>> {
        let conn = self.conn.lock().expect("cache mutex poisoned");

        let row: Option<(String, i64, i64)> = conn
            .query_row(
                "SELECT data, cached_at, ttl_hours FROM metadata_cache WHERE package_name = ?1",
                [name],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        let Some((data, cached_at, ttl_hours)) = row else {
            return Ok(None);
        };

        if now_unix() - cached_at < ttl_hours * 3600 {
            let formula = serde_json::from_str(&data)?;
            return Ok(Some(formula));
        }

        conn.execute(
            "DELETE FROM metadata_cache WHERE package_name = ?1",
            [name],
        )?;
        debug!("evicted expired cache entry for {}", name);
        Ok(None)
    }

    /// Insert or replace the record for `name`, stamped with the current time.
    pub fn set(&self, name: &str, formula: &Formula, ttl_hours: i64) -> Result<()> {
        let data = serde_json::to_string(formula)?;
        let conn = self.conn.lock().expect("cache mutex poisoned");
        conn.execute(
            r#"
            INSERT OR REPLACE INTO metadata_cache (package_name, data, cached_at, ttl_hours)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            rusqlite::params![name, data, now_unix(), ttl_hours],
        )?;
        Ok(())
    }

    /// Remove the entry for `name` if present.
    pub fn invalidate(&self, name: &str) -> Result<()> {
        let conn = self.conn.lock().expect("cache mutex poisoned");
        conn.execute(
            "DELETE FROM metadata_cache WHERE package_name = ?1",
            [name],
        )?;
        Ok(())
    }

    /// Delete every expired entry, returning how many were removed.
    pub fn clear_expired(&self) -> Result<usize> {
        let conn = self.conn.lock().expect("cache mutex poisoned");
        let removed = conn.execute(
            "DELETE FROM metadata_cache WHERE ?1 - cached_at >= ttl_hours * 3600",
            [now_unix()],
        )?;
        Ok(removed)
    }

    /// Count total, valid, and expired entries.
    pub fn stats(&self) -> Result<CacheStats> {
        let conn = self.conn.lock().expect("cache mutex poisoned");

        let total: usize =
            conn.query_row("SELECT COUNT(*) FROM metadata_cache", [], |row| row.get(0))?;
        let expired: usize = conn.query_row(
            "SELECT COUNT(*) FROM metadata_cache WHERE ?1 - cached_at >= ttl_hours * 3600",
            [now_unix()],
            |row| row.get(0),
        )?;

        Ok(CacheStats {
            total,
            valid: total - expired,
            expired,
        })
    }
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_formula(name: &str) -> Formula {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "desc": "A test formula",
            "versions": { "stable": "1.0" },
        }))
        .unwrap()
    }

    fn open_cache(tmp: &TempDir) -> MetadataCache {
        MetadataCache::open(&tmp.path().join("metadata.db")).unwrap()
    }

    #[test]
    fn set_then_get_round_trips() {
        let tmp = TempDir::new().unwrap();
        let cache = open_cache(&tmp);

        cache
            .set("wget", &sample_formula("wget"), DEFAULT_TTL_HOURS)
            .unwrap();

        let hit = cache.get("wget").unwrap().unwrap();
        assert_eq!(hit.name, "wget");
        assert_eq!(hit.versions.stable.as_deref(), Some("1.0"));
    }

    #[test]
    fn get_missing_returns_none() {
        let tmp = TempDir::new().unwrap();
        let cache = open_cache(&tmp);
        assert!(cache.get("nonexistent").unwrap().is_none());
    }

    #[test]
    fn zero_ttl_entry_expires_and_row_is_deleted() {
        let tmp = TempDir::new().unwrap();
        let cache = open_cache(&tmp);

        cache.set("x", &sample_formula("x"), 0).unwrap();

        assert!(cache.get("x").unwrap().is_none());
        // Row was removed on read, not just hidden.
        assert_eq!(cache.stats().unwrap().total, 0);
    }

    #[test]
    fn invalidate_removes_entry() {
        let tmp = TempDir::new().unwrap();
        let cache = open_cache(&tmp);

        cache
            .set("wget", &sample_formula("wget"), DEFAULT_TTL_HOURS)
            .unwrap();
        cache.invalidate("wget").unwrap();

        assert!(cache.get("wget").unwrap().is_none());
    }

    #[test]
    fn clear_expired_removes_only_stale_rows() {
        let tmp = TempDir::new().unwrap();
        let cache = open_cache(&tmp);

        cache
            .set("fresh", &sample_formula("fresh"), DEFAULT_TTL_HOURS)
            .unwrap();
        cache.set("stale", &sample_formula("stale"), 0).unwrap();

        let removed = cache.clear_expired().unwrap();
        assert_eq!(removed, 1);

        let stats = cache.stats().unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.valid, 1);
        assert_eq!(stats.expired, 0);
    }

    #[test]
    fn stats_counts_valid_and_expired() {
        let tmp = TempDir::new().unwrap();
        let cache = open_cache(&tmp);

        cache
            .set("a", &sample_formula("a"), DEFAULT_TTL_HOURS)
            .unwrap();
        cache
            .set("b", &sample_formula("b"), DEFAULT_TTL_HOURS)
            .unwrap();
        cache.set("c", &sample_formula("c"), 0).unwrap();

        let stats = cache.stats().unwrap();
        assert_eq!(
            stats,
            CacheStats {
                total: 3,
                valid: 2,
                expired: 1
            }
        );
    }
}
