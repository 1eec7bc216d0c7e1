//! Durable inventory of installed packages.
//!
//! One pretty-printed JSON document at `inventory.json` maps package name to
//! its installed version, keg path, and the symlinks created for it. Loading
//! treats a missing file as an empty inventory and a corrupt file as empty
//! with a warning; the previous contents are not recoverable and every
//! install rewrites the document anyway.
//!
//! Saves take an exclusive advisory lock on the file for the duration of the
//! write, so concurrent processes that honor the same convention never
//! interleave. The install orchestrator saves after each committed package,
//! which keeps a partially failed run's inventory consistent with what
//! actually landed on disk.

use crate::error::Result;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Installed state of one package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryEntry {
    pub version: String,
    /// Absolute keg directory, `<cellar>/<name>/<version>`.
    pub path: PathBuf,
    /// Symlinks created in the shared bin directory.
    pub symlinks: Vec<PathBuf>,
}

/// The installed-package map plus the file it persists to.
#[derive(Debug)]
pub struct Inventory {
    entries: BTreeMap<String, InventoryEntry>,
    file: PathBuf,
}

impl Inventory {
    /// Load the inventory from `file`, or start empty.
    pub fn load(file: impl Into<PathBuf>) -> Self {
        let file = file.into();
        let entries = match fs::read_to_string(&file) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        "inventory at {} is unreadable ({}), starting empty",
                        file.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };

        Self { entries, file }
    }

    /// Write the inventory as pretty JSON under an exclusive file lock.
    pub fn save(&self) -> Result<()> {
        let file = fs::File::create(&self.file)?;
        file.lock_exclusive()?;
        let result = serde_json::to_writer_pretty(&file, &self.entries);
        let unlock = fs2::FileExt::unlock(&file);
        result?;
        unlock?;
        Ok(())
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn get(&self, name: &str) -> Option<&InventoryEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn insert(&mut self, name: String, entry: InventoryEntry) {
        self.entries.insert(name, entry);
    }

    pub fn remove(&mut self, name: &str) -> Option<InventoryEntry> {
        self.entries.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &InventoryEntry)> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(version: &str) -> InventoryEntry {
        InventoryEntry {
            version: version.to_string(),
            path: PathBuf::from("/tmp/br/Cellar/wget").join(version),
            symlinks: vec![PathBuf::from("/tmp/br/bin/wget")],
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("inventory.json");

        let mut inventory = Inventory::load(&file);
        inventory.insert("wget".to_string(), entry("1.2"));
        inventory.save().unwrap();

        let reloaded = Inventory::load(&file);
        assert_eq!(reloaded.get("wget"), Some(&entry("1.2")));
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let inventory = Inventory::load(tmp.path().join("missing.json"));
        assert!(inventory.is_empty());
    }

    #[test]
    fn corrupt_file_resets_to_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("inventory.json");
        fs::write(&file, b"{ not json").unwrap();

        let inventory = Inventory::load(&file);
        assert!(inventory.is_empty());
    }

    #[test]
    fn saved_document_is_pretty_printed() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("inventory.json");

        let mut inventory = Inventory::load(&file);
        inventory.insert("wget".to_string(), entry("1.2"));
        inventory.save().unwrap();

        let contents = fs::read_to_string(&file).unwrap();
        assert!(contents.contains('\n'));
        assert!(contents.contains("\"version\": \"1.2\""));
    }

    #[test]
    fn remove_then_save_drops_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("inventory.json");

        let mut inventory = Inventory::load(&file);
        inventory.insert("wget".to_string(), entry("1.2"));
        inventory.save().unwrap();

        assert!(inventory.remove("wget").is_some());
        assert!(inventory.remove("wget").is_none());
        inventory.save().unwrap();

        assert!(Inventory::load(&file).is_empty());
    }
}
