//! Filesystem layout rooted at the br base directory.
//!
//! Everything br owns lives under one base directory, `~/.br` by default:
//!
//! ```text
//! ~/.br/
//!   Cellar/<name>/<version>/   # extracted packages
//!   bin/                       # shared executable symlinks
//!   cache/metadata.db          # metadata cache backing store
//!   inventory.json             # installed-package inventory
//!   <name>_<version>.tar.gz    # transient downloads
//! ```
//!
//! The base can be overridden with the `BR_PREFIX` environment variable,
//! which is also how the test suite sandboxes the layout.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Handle to the br base directory and the well-known paths under it.
#[derive(Debug, Clone)]
pub struct Prefix {
    root: PathBuf,
}

impl Prefix {
    /// Detect the base directory: `BR_PREFIX` if set, otherwise `$HOME/.br`.
    pub fn detect() -> Self {
        if let Ok(root) = std::env::var("BR_PREFIX") {
            return Self::at(root);
        }

        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        Self::at(PathBuf::from(home).join(".br"))
    }

    /// Use an explicit base directory.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `Cellar/`, holding one `<name>/<version>/` tree per installed package.
    pub fn cellar(&self) -> PathBuf {
        self.root.join("Cellar")
    }

    /// Versioned directory for one package.
    pub fn keg(&self, name: &str, version: &str) -> PathBuf {
        self.cellar().join(name).join(version)
    }

    /// Shared symlink directory; this is what goes on `PATH`.
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    pub fn cache_db(&self) -> PathBuf {
        self.cache_dir().join("metadata.db")
    }

    pub fn inventory_file(&self) -> PathBuf {
        self.root.join("inventory.json")
    }

    /// Transient download path for one bottle; deleted after extraction.
    pub fn tarball_path(&self, name: &str, version: &str) -> PathBuf {
        self.root.join(format!("{}_{}.tar.gz", name, version))
    }

    /// Create the Cellar, bin, and cache directories if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.cellar(), self.bin_dir(), self.cache_dir()] {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let prefix = Prefix::at("/tmp/br-test");
        assert_eq!(prefix.cellar(), PathBuf::from("/tmp/br-test/Cellar"));
        assert_eq!(
            prefix.keg("wget", "1.2"),
            PathBuf::from("/tmp/br-test/Cellar/wget/1.2")
        );
        assert_eq!(prefix.bin_dir(), PathBuf::from("/tmp/br-test/bin"));
        assert_eq!(
            prefix.cache_db(),
            PathBuf::from("/tmp/br-test/cache/metadata.db")
        );
        assert_eq!(
            prefix.tarball_path("wget", "1.2"),
            PathBuf::from("/tmp/br-test/wget_1.2.tar.gz")
        );
    }

    #[test]
    fn test_ensure_dirs_creates_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let prefix = Prefix::at(tmp.path().join("base"));
        prefix.ensure_dirs().unwrap();

        assert!(prefix.cellar().is_dir());
        assert!(prefix.bin_dir().is_dir());
        assert!(prefix.cache_dir().is_dir());
    }
}
