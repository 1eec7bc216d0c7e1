mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "br")]
#[command(version, about = "A lightweight package manager for prebuilt Homebrew bottles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Install packages (and their runtime dependencies)
    Install {
        /// Package names
        #[arg(required = true)]
        packages: Vec<String>,

        /// Reinstall even if already installed
        #[arg(short, long)]
        force: bool,
    },

    /// Uninstall packages
    Uninstall {
        /// Package names
        #[arg(required = true)]
        packages: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Look up a package by exact name upstream
    Search {
        /// Exact package name (no fuzzy matching)
        query: String,
    },

    /// Show package metadata and installation status
    Info {
        /// Package name
        package: String,
    },

    /// List installed packages
    List,

    /// Show installed packages with a newer upstream version
    Outdated,

    /// Upgrade every outdated package
    Upgrade,

    /// Remove orphaned tarballs, stale versions, and expired cache entries
    Cleanup,

    /// Check installation health
    Doctor,

    /// Print the PATH snippet for your shell
    Shellenv,

    /// Delete the metadata cache backing store
    CacheClear,

    /// Show metadata cache statistics
    CacheStats,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too; only real usage errors
            // should exit nonzero.
            let code = match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        std::process::exit(1);
    };

    init_logging(cli.verbose);

    // Internal failures are reported, not fatal: print and exit 0.
    if let Err(e) = run(command).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
    }
}

async fn run(command: Commands) -> br::Result<()> {
    let prefix = br::Prefix::detect();
    prefix.ensure_dirs()?;

    match command {
        Commands::Install { packages, force } => {
            commands::install::install(&prefix, &packages, force).await?;
        }
        Commands::Uninstall { packages, yes } => {
            commands::uninstall::uninstall(&prefix, &packages, !yes)?;
        }
        Commands::Search { query } => {
            commands::search::search(&prefix, &query).await?;
        }
        Commands::Info { package } => {
            commands::info::info(&prefix, &package).await?;
        }
        Commands::List => {
            commands::list::list(&prefix)?;
        }
        Commands::Outdated => {
            commands::outdated::outdated(&prefix).await?;
        }
        Commands::Upgrade => {
            commands::upgrade::upgrade(&prefix).await?;
        }
        Commands::Cleanup => {
            commands::cleanup::cleanup(&prefix)?;
        }
        Commands::Doctor => {
            commands::doctor::doctor(&prefix)?;
        }
        Commands::Shellenv => {
            commands::shellenv::shellenv(&prefix);
        }
        Commands::CacheClear => {
            commands::cache::clear(&prefix)?;
        }
        Commands::CacheStats => {
            commands::cache::stats(&prefix)?;
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "br", &mut std::io::stdout());
        }
    }

    Ok(())
}
