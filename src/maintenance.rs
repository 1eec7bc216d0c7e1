//! Garbage collection and health diagnostics.
//!
//! Both operations are data-returning so the CLI layer owns all rendering
//! and the test suite can assert on the reports directly.

use crate::cache::{CacheStats, MetadataCache};
use crate::error::Result;
use crate::inventory::Inventory;
use crate::prefix::Prefix;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// What `cleanup` removed.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub tarballs_removed: usize,
    pub versions_removed: usize,
    pub cache_entries_removed: usize,
    pub bytes_freed: u64,
}

/// Remove orphaned download tarballs, Cellar versions that are not the
/// active inventory version, and expired metadata cache rows.
pub fn cleanup(
    prefix: &Prefix,
    inventory: &Inventory,
    cache: &MetadataCache,
) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    // Orphaned downloads sit flat in the base directory.
    for entry in fs::read_dir(prefix.root())? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && is_tarball(&path) {
            report.bytes_freed += entry.metadata()?.len();
            fs::remove_file(&path)?;
            report.tarballs_removed += 1;
            debug!("removed orphan tarball {}", path.display());
        }
    }

    // Stale versions: anything under Cellar/<name>/ that is not the version
    // the inventory says is active. Packages missing from the inventory have
    // no active version, so all of their leftovers go.
    let cellar = prefix.cellar();
    if cellar.is_dir() {
        for package in fs::read_dir(&cellar)? {
            let package = package?;
            if !package.path().is_dir() {
                continue;
            }
            let name = package.file_name().to_string_lossy().to_string();
            let active = inventory.get(&name).map(|e| e.version.clone());

            for version_dir in fs::read_dir(package.path())? {
                let version_dir = version_dir?;
                if !version_dir.path().is_dir() {
                    continue;
                }
                let version = version_dir.file_name().to_string_lossy().to_string();
                if Some(&version) != active.as_ref() {
                    report.bytes_freed += dir_size(&version_dir.path());
                    fs::remove_dir_all(version_dir.path())?;
                    report.versions_removed += 1;
                    debug!("removed stale version {}/{}", name, version);
                }
            }
        }
    }

    report.cache_entries_removed = cache.clear_expired()?;

    Ok(report)
}

/// What `doctor` found.
#[derive(Debug)]
pub struct DoctorReport {
    pub bin_on_path: bool,
    /// Symlinks in the shared bin directory whose target is gone.
    pub broken_symlinks: Vec<PathBuf>,
    /// Inventory entries whose keg directory is missing on disk.
    pub missing_kegs: Vec<String>,
    pub cache: CacheStats,
}

impl DoctorReport {
    /// Number of problems worth flagging.
    pub fn issues(&self) -> usize {
        usize::from(!self.bin_on_path) + self.broken_symlinks.len() + self.missing_kegs.len()
    }
}

/// Inspect the installation for inconsistencies. `path_var` is the `PATH`
/// value to check the shared bin directory against.
pub fn doctor(
    prefix: &Prefix,
    inventory: &Inventory,
    cache: &MetadataCache,
    path_var: &str,
) -> Result<DoctorReport> {
    let bin_dir = prefix.bin_dir();
    let bin_on_path = std::env::split_paths(path_var).any(|p| p == bin_dir);

    let mut broken_symlinks = Vec::new();
    if bin_dir.is_dir() {
        for entry in fs::read_dir(&bin_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_symlink() {
                if let Ok(target) = fs::read_link(&path) {
                    let resolved = if target.is_absolute() {
                        target
                    } else {
                        bin_dir.join(target)
                    };
                    if !resolved.exists() {
                        broken_symlinks.push(path);
                    }
                }
            }
        }
    }

    let missing_kegs = inventory
        .iter()
        .filter(|(_, entry)| !entry.path.exists())
        .map(|(name, _)| name.clone())
        .collect();

    Ok(DoctorReport {
        bin_on_path,
        broken_symlinks,
        missing_kegs,
        cache: cache.stats()?,
    })
}

fn is_tarball(path: &Path) -> bool {
    path.file_name()
        .and_then(OsStr::to_str)
        .is_some_and(|name| name.ends_with(".tar.gz"))
}

fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}
