//! Executable symlink management for installed packages.

use crate::error::Result;
use crate::prefix::Prefix;
use anyhow::Context;
use std::fs;
use std::os::unix::fs as unix_fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Subdirectories of a keg whose regular files get linked.
const LINKABLE_DIRS: &[&str] = &["bin", "sbin"];

/// Link every regular file under `<keg>/bin` and `<keg>/sbin` into the
/// shared bin directory, forcing executable bits first. An existing file or
/// link of the same name is replaced (last writer wins). Returns the created
/// link paths.
///
/// A keg without bin/sbin yields an empty list; library-only packages are
/// still considered installed.
pub fn link_binaries(prefix: &Prefix, keg: &Path) -> Result<Vec<PathBuf>> {
    let bin_dir = prefix.bin_dir();
    let mut links = Vec::new();

    for dir_name in LINKABLE_DIRS {
        let source_dir = keg.join(dir_name);
        if !source_dir.is_dir() {
            continue;
        }

        for entry in fs::read_dir(&source_dir)? {
            let entry = entry?;
            let source = entry.path();
            if !source.is_file() {
                continue;
            }

            ensure_executable(&source)?;

            let dest = bin_dir.join(entry.file_name());
            // symlink_metadata also catches dangling links that exists() misses.
            if dest.symlink_metadata().is_ok() {
                fs::remove_file(&dest)
                    .with_context(|| format!("Failed to replace {}", dest.display()))?;
            }
            unix_fs::symlink(&source, &dest).with_context(|| {
                format!("Failed to link {} -> {}", dest.display(), source.display())
            })?;

            links.push(dest);
        }
    }

    Ok(links)
}

/// Remove the symlinks recorded for a package, tolerating ones already gone.
pub fn unlink_binaries(symlinks: &[PathBuf]) -> Result<usize> {
    let mut removed = 0;
    for link in symlinks {
        if link.symlink_metadata().is_ok() {
            fs::remove_file(link)
                .with_context(|| format!("Failed to remove {}", link.display()))?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn ensure_executable(path: &Path) -> Result<()> {
    let metadata = fs::metadata(path)?;
    let mut perms = metadata.permissions();
    let mode = perms.mode();
    if mode & 0o111 != 0o111 {
        perms.set_mode(mode | 0o111);
        fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keg_with_tool(prefix: &Prefix, name: &str, version: &str, tool: &str) -> PathBuf {
        let keg = prefix.keg(name, version);
        fs::create_dir_all(keg.join("bin")).unwrap();
        fs::write(keg.join("bin").join(tool), b"#!/bin/sh\n").unwrap();
        keg
    }

    #[test]
    fn links_bin_and_sbin_files() {
        let tmp = tempfile::tempdir().unwrap();
        let prefix = Prefix::at(tmp.path());
        prefix.ensure_dirs().unwrap();

        let keg = keg_with_tool(&prefix, "wget", "1.2", "wget");
        fs::create_dir_all(keg.join("sbin")).unwrap();
        fs::write(keg.join("sbin/wgetd"), b"daemon").unwrap();

        let links = link_binaries(&prefix, &keg).unwrap();
        assert_eq!(links.len(), 2);

        let link = prefix.bin_dir().join("wget");
        assert!(link.symlink_metadata().unwrap().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), keg.join("bin/wget"));
        assert!(prefix.bin_dir().join("wgetd").symlink_metadata().is_ok());
    }

    #[test]
    fn forces_executable_bits() {
        let tmp = tempfile::tempdir().unwrap();
        let prefix = Prefix::at(tmp.path());
        prefix.ensure_dirs().unwrap();

        let keg = keg_with_tool(&prefix, "wget", "1.2", "wget");
        let tool = keg.join("bin/wget");
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o644)).unwrap();

        link_binaries(&prefix, &keg).unwrap();

        let mode = fs::metadata(&tool).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn last_writer_wins_on_name_collision() {
        let tmp = tempfile::tempdir().unwrap();
        let prefix = Prefix::at(tmp.path());
        prefix.ensure_dirs().unwrap();

        let old_keg = keg_with_tool(&prefix, "old", "1.0", "tool");
        let new_keg = keg_with_tool(&prefix, "new", "2.0", "tool");

        link_binaries(&prefix, &old_keg).unwrap();
        link_binaries(&prefix, &new_keg).unwrap();

        let link = prefix.bin_dir().join("tool");
        assert_eq!(fs::read_link(&link).unwrap(), new_keg.join("bin/tool"));
    }

    #[test]
    fn keg_without_bin_dirs_links_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let prefix = Prefix::at(tmp.path());
        prefix.ensure_dirs().unwrap();

        let keg = prefix.keg("lib-only", "0.1");
        fs::create_dir_all(keg.join("lib")).unwrap();

        let links = link_binaries(&prefix, &keg).unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn unlink_tolerates_missing_links() {
        let tmp = tempfile::tempdir().unwrap();
        let prefix = Prefix::at(tmp.path());
        prefix.ensure_dirs().unwrap();

        let keg = keg_with_tool(&prefix, "wget", "1.2", "wget");
        let links = link_binaries(&prefix, &keg).unwrap();

        fs::remove_file(&links[0]).unwrap();
        let removed = unlink_binaries(&links).unwrap();
        assert_eq!(removed, 0);
    }
}
