//! br library - install engine for prebuilt Homebrew bottles
//!
//! This library implements the machinery behind the `br` CLI: dependency
//! resolution against the Homebrew formulae API, parallel bottle downloads
//! from GHCR, integrity verification, Cellar extraction, executable linking,
//! and the durable inventory of installed packages.
//!
//! # Architecture
//!
//! - **api.rs**: formula metadata client (HTTP + session memo + durable cache)
//! - **cache.rs**: SQLite-backed metadata cache with per-entry TTL
//! - **resolver.rs**: transitive dependency resolution into a flat plan
//! - **install.rs**: the install orchestrator and uninstall core
//! - **extract.rs** / **link.rs**: bottle extraction and bin symlinks
//! - **inventory.rs**: installed-package inventory with locked saves
//! - **maintenance.rs**: cleanup and doctor reports
//! - **platform.rs** / **prefix.rs**: OS flavor and on-disk layout
//! - **progress.rs**: progress sink abstraction over indicatif
//!
//! # Quick start
//!
//! ```no_run
//! use br::{MetadataCache, Prefix, RegistryClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let prefix = Prefix::detect();
//!     prefix.ensure_dirs()?;
//!
//!     let cache = Arc::new(MetadataCache::open(&prefix.cache_db())?);
//!     let client = RegistryClient::new(cache)?;
//!
//!     let mut inventory = br::Inventory::load(prefix.inventory_file());
//!     let flavor = br::platform::os_flavor()?;
//!
//!     let outcomes = br::install::install(
//!         &client,
//!         &prefix,
//!         &mut inventory,
//!         &flavor,
//!         &["wget".to_string()],
//!         false,
//!         &br::NoopProgress,
//!     )
//!     .await?;
//!     println!("{} workers ran", outcomes.len());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod error;
pub mod extract;
pub mod install;
pub mod inventory;
pub mod link;
pub mod maintenance;
pub mod platform;
pub mod prefix;
pub mod progress;
pub mod resolver;
pub mod verify;

// Re-export commonly used types
pub use api::{Bottle, BottleFile, Formula, Registry, RegistryClient, Versions};
pub use cache::{CacheStats, MetadataCache};
pub use error::{BrError, Result};
pub use install::{InstallOutcome, UninstallReport};
pub use inventory::{Inventory, InventoryEntry};
pub use prefix::Prefix;
pub use progress::{NoopProgress, ProgressSink, TaskId, TerminalProgress};
pub use resolver::{PlanEntry, ResolutionPlan};
