//! The `install` command: resolve, download, and commit packages.

use br::{
    BrError, Inventory, MetadataCache, NoopProgress, Prefix, ProgressSink, Registry,
    RegistryClient, TerminalProgress,
};
use colored::Colorize;
use std::io::IsTerminal;
use std::sync::Arc;

pub async fn install(prefix: &Prefix, packages: &[String], force: bool) -> br::Result<()> {
    let flavor = br::platform::os_flavor()?;
    let cache = Arc::new(MetadataCache::open(&prefix.cache_db())?);
    let client = RegistryClient::new(cache)?;
    let mut inventory = Inventory::load(prefix.inventory_file());

    run_install(&client, prefix, &mut inventory, &flavor, packages, force).await
}

/// Shared by `install` and `upgrade`: run the engine and render outcomes.
pub(crate) async fn run_install<R: Registry>(
    client: &R,
    prefix: &Prefix,
    inventory: &mut Inventory,
    flavor: &str,
    packages: &[String],
    force: bool,
) -> br::Result<()> {
    println!("Resolving dependencies...");

    let sink: Box<dyn ProgressSink> = if std::io::stdout().is_terminal() {
        Box::new(TerminalProgress::new())
    } else {
        Box::new(NoopProgress)
    };

    let outcomes = match br::install::install(
        client,
        prefix,
        inventory,
        flavor,
        packages,
        force,
        sink.as_ref(),
    )
    .await
    {
        Ok(outcomes) => outcomes,
        Err(e @ BrError::ResolutionMissingMetadata(_)) => {
            // Nothing was installed; a partial plan is worse than no plan.
            println!("{} {}", "Resolution Error:".red().bold(), e);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    if outcomes.is_empty() {
        println!(
            "{}",
            "All requested packages are already installed. Use --force to reinstall.".green()
        );
        return Ok(());
    }

    let mut installed = 0;
    for outcome in &outcomes {
        match outcome {
            br::InstallOutcome::Installed { name, version, .. } => {
                println!(
                    "{} Installed {} {}",
                    "✓".green(),
                    name.bold().green(),
                    version.dimmed()
                );
                installed += 1;
            }
            br::InstallOutcome::SkippedNoBottle { name, flavor } => {
                println!(
                    "{} No bottle for {}, skipped {}",
                    "⚠".yellow(),
                    flavor.dimmed(),
                    name.bold()
                );
            }
            br::InstallOutcome::Failed { name, error } => {
                println!("{} Failed {}: {}", "✗".red(), name.bold().red(), error);
            }
        }
    }

    if installed > 0 {
        println!(
            "{} Installed {} package{}",
            "✓".green().bold(),
            installed.to_string().bold(),
            if installed == 1 { "" } else { "s" }
        );
    }

    Ok(())
}
