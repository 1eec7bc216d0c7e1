//! The install engine.
//!
//! `install` drives user-named packages through resolution, inventory
//! diffing, a bounded pool of download workers, verification, extraction,
//! linking, and inventory commit. Workers are pure: each returns an
//! [`InstallOutcome`] describing what it did, and the coordinator is the
//! single writer of the inventory map and file. One worker's failure never
//! aborts its siblings; only a resolution failure aborts the invocation,
//! because a partial plan could install a dependency without its dependent.

use crate::api::Registry;
use crate::error::{BrError, Result};
use crate::inventory::{Inventory, InventoryEntry};
use crate::link;
use crate::prefix::Prefix;
use crate::progress::ProgressSink;
use crate::resolver;
use crate::{extract, verify};
use futures::StreamExt;
use std::path::PathBuf;
use tracing::debug;

/// Bounded concurrency for install downloads.
pub const MAX_PARALLEL_DOWNLOADS: usize = 5;

/// What one install worker did.
#[derive(Debug)]
pub enum InstallOutcome {
    /// Fully installed and ready to commit.
    Installed {
        name: String,
        version: String,
        path: PathBuf,
        symlinks: Vec<PathBuf>,
    },
    /// Metadata had no bottle for this host; not an error.
    SkippedNoBottle { name: String, flavor: String },
    /// The worker failed; siblings are unaffected.
    Failed { name: String, error: BrError },
}

/// Resolve `roots`, diff against the inventory, and install what is missing
/// (everything in the plan, when `force`). Successful packages are committed
/// to the inventory and saved as each worker completes.
///
/// Returns one outcome per dispatched worker; an empty vector means the
/// whole plan was already installed.
pub async fn install<R: Registry>(
    registry: &R,
    prefix: &Prefix,
    inventory: &mut Inventory,
    flavor: &str,
    roots: &[String],
    force: bool,
    sink: &dyn ProgressSink,
) -> Result<Vec<InstallOutcome>> {
    let plan = resolver::resolve(registry, roots).await?;

    let to_fetch: Vec<_> = plan
        .iter()
        .filter(|entry| force || !inventory.contains(&entry.name))
        .collect();

    debug!(
        "plan has {} packages, {} to fetch",
        plan.len(),
        to_fetch.len()
    );

    if to_fetch.is_empty() {
        return Ok(Vec::new());
    }

    let mut workers = futures::stream::iter(to_fetch.into_iter().map(|entry| {
        let name = entry.name.clone();
        let version = entry.version.clone();
        async move {
            match install_one(registry, prefix, flavor, &name, &version, sink).await {
                Ok(outcome) => outcome,
                Err(error) => InstallOutcome::Failed { name, error },
            }
        }
    }))
    .buffer_unordered(MAX_PARALLEL_DOWNLOADS);

    // Commit on the coordinator as each worker completes, so an interrupted
    // run leaves the inventory reflecting exactly what finished.
    let mut outcomes = Vec::new();
    while let Some(outcome) = workers.next().await {
        if let InstallOutcome::Installed {
            name,
            version,
            path,
            symlinks,
        } = &outcome
        {
            inventory.insert(
                name.clone(),
                InventoryEntry {
                    version: version.clone(),
                    path: path.clone(),
                    symlinks: symlinks.clone(),
                },
            );
            inventory.save()?;
        }
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// One worker: metadata (session-memo hit) → bottle lookup → token →
/// download → verify → extract → link.
async fn install_one<R: Registry>(
    registry: &R,
    prefix: &Prefix,
    flavor: &str,
    name: &str,
    version: &str,
    sink: &dyn ProgressSink,
) -> Result<InstallOutcome> {
    let task = sink.start(&format!("Installing {}...", name));

    let Some(formula) = registry.fetch_metadata(name, false).await? else {
        sink.finish(task);
        return Err(BrError::MetadataAbsent(name.to_string()));
    };

    let Some(bottle) = formula.bottle_for(flavor) else {
        sink.set_label(task, &format!("No bottle for {}, skipping {}", flavor, name));
        sink.finish(task);
        return Ok(InstallOutcome::SkippedNoBottle {
            name: name.to_string(),
            flavor: flavor.to_string(),
        });
    };

    let token = registry.fetch_token(name).await?;

    let tarball = prefix.tarball_path(name, version);
    registry
        .download_bottle(&bottle.url, &token, &tarball, sink, task)
        .await?;

    sink.set_label(task, &format!("Verifying {}...", name));
    if !verify::verify_sha256(&tarball, &bottle.sha256).await? {
        let _ = tokio::fs::remove_file(&tarball).await;
        sink.set_label(task, &format!("SHA mismatch for {}", name));
        sink.finish(task);
        return Err(BrError::IntegrityMismatch(name.to_string()));
    }

    sink.set_label(task, &format!("Extracting {}...", name));
    let (path, symlinks) = {
        let prefix = prefix.clone();
        let name = name.to_string();
        let version = version.to_string();
        let tarball = tarball.clone();
        tokio::task::spawn_blocking(move || -> Result<(PathBuf, Vec<PathBuf>)> {
            let keg = extract::extract_bottle(&prefix, &name, &version, &tarball)?;
            let symlinks = link::link_binaries(&prefix, &keg)?;
            std::fs::remove_file(&tarball)?;
            Ok((keg, symlinks))
        })
        .await
        .map_err(|e| BrError::Other(anyhow::anyhow!("install worker panicked: {e}")))??
    };

    sink.set_label(task, &format!("Installed {}", name));
    sink.finish(task);

    Ok(InstallOutcome::Installed {
        name: name.to_string(),
        version: version.to_string(),
        path,
        symlinks,
    })
}

/// Result of removing one package.
#[derive(Debug)]
pub struct UninstallReport {
    pub name: String,
    pub version: String,
    pub symlinks_removed: usize,
}

/// Remove each named package that is actually installed: its recorded
/// symlinks, its entire `Cellar/<name>` tree, its inventory entry, and its
/// metadata cache row. Names not in the inventory are returned separately.
pub fn uninstall_packages(
    prefix: &Prefix,
    inventory: &mut Inventory,
    cache: &crate::cache::MetadataCache,
    names: &[String],
) -> Result<(Vec<UninstallReport>, Vec<String>)> {
    let mut removed = Vec::new();
    let mut not_installed = Vec::new();

    for name in names {
        let Some(entry) = inventory.get(name).cloned() else {
            not_installed.push(name.clone());
            continue;
        };

        let symlinks_removed = link::unlink_binaries(&entry.symlinks)?;

        let package_dir = prefix.cellar().join(name);
        if package_dir.exists() {
            // Removes every version, not just the active one.
            let _ = std::fs::remove_dir_all(&package_dir);
        }

        cache.invalidate(name)?;
        inventory.remove(name);
        inventory.save()?;

        removed.push(UninstallReport {
            name: name.clone(),
            version: entry.version,
            symlinks_removed,
        });
    }

    Ok((removed, not_installed))
}
