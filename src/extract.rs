//! Bottle extraction into the Cellar.
//!
//! Upstream bottles nest their payload one or two levels deep by package
//! name and version. Extraction therefore stages the archive into a fresh
//! temporary directory, probes for the payload root, and moves its entries
//! into `Cellar/<name>/<version>`. The stage lives inside the base directory
//! so the final move is a same-filesystem rename.

use crate::error::Result;
use crate::prefix::Prefix;
use anyhow::Context;
use flate2::read::GzDecoder;
use std::fs;
use std::path::{Path, PathBuf};
use tar::Archive;

/// Unpack `tarball` into `Cellar/<name>/<version>`, replacing any previous
/// contents of that directory. Returns the final package directory.
///
/// The caller has already verified the tarball's checksum and remains
/// responsible for deleting it.
pub fn extract_bottle(
    prefix: &Prefix,
    name: &str,
    version: &str,
    tarball: &Path,
) -> Result<PathBuf> {
    let final_dir = prefix.keg(name, version);

    // A leftover directory means a forced reinstall or an earlier failed
    // attempt; either way it must go.
    if final_dir.exists() {
        fs::remove_dir_all(&final_dir)
            .with_context(|| format!("Failed to clear {}", final_dir.display()))?;
    }
    fs::create_dir_all(&final_dir)
        .with_context(|| format!("Failed to create {}", final_dir.display()))?;

    let stage = tempfile::tempdir_in(prefix.root())
        .context("Failed to create extraction staging directory")?;

    let file = fs::File::open(tarball)
        .with_context(|| format!("Failed to open bottle: {}", tarball.display()))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive
        .unpack(stage.path())
        .with_context(|| format!("Failed to extract bottle: {}", tarball.display()))?;

    let payload = payload_root(stage.path(), name, version);
    for entry in fs::read_dir(&payload)? {
        let entry = entry?;
        fs::rename(entry.path(), final_dir.join(entry.file_name()))
            .with_context(|| format!("Failed to move {} into place", entry.path().display()))?;
    }

    Ok(final_dir)
}

/// Locate the directory actually holding the package contents: first of
/// `<stage>/<name>/<version>`, `<stage>/<name>`, or the stage root itself.
fn payload_root(stage: &Path, name: &str, version: &str) -> PathBuf {
    let nested = stage.join(name).join(version);
    if nested.is_dir() {
        return nested;
    }
    let named = stage.join(name);
    if named.is_dir() {
        return named;
    }
    stage.to_path_buf()
}
