//! Revet CLI - Command line interface for revet
//!
//! Mechanical first-pass review of a git diff: collect changes against
//! a baseline, apply the rule catalogue, and report findings ordered by
//! severity.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use revet_core::{Config, GitRepo};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{CheckArgs, RulesArgs};

/// Revet: mechanical first-pass review of a git diff
#[derive(Parser, Debug)]
#[command(name = "revet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository directory
    #[arg(short = 'd', long, global = true, default_value = ".")]
    dir: PathBuf,

    /// Baseline to compare against (overrides config and env)
    #[arg(long, global = true, env = "REVET_BASELINE")]
    baseline: Option<String>,

    /// Output format (overrides config and env)
    #[arg(long, global = true, env = "REVET_OUTPUT")]
    output: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Review the changes against the baseline
    #[command(visible_alias = "c")]
    Check(CheckArgs),

    /// List the registered rules
    Rules(RulesArgs),

    /// Show current configuration
    Config,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(2);
        }
    }
}

fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Repo-local config lives at the repository root, which may be
    // above the directory the user pointed us at.
    let repo_root = GitRepo::open(&cli.dir)
        .map(|repo| repo.root().to_path_buf())
        .unwrap_or_else(|_| cli.dir.clone());

    let config =
        Config::load_with_overrides(&repo_root, cli.baseline.clone(), cli.output.clone())?;

    if cli.verbose {
        tracing::info!(
            baseline = %config.review.baseline,
            output = %config.review.output,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("revet {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Some(Commands::Check(args)) => args.execute(cli.verbose, &cli.dir, &config),
        Some(Commands::Rules(args)) => {
            args.execute(&config)?;
            Ok(0)
        }
        Some(Commands::Config) => {
            println!("Revet Configuration");
            println!("===================");
            println!();
            println!("Review Settings:");
            println!("  baseline: {}", config.review.baseline);
            println!("  output: {}", config.review.output);
            println!();
            println!("Rules:");
            if config.rules.disabled.is_empty() {
                println!("  disabled: (none)");
            } else {
                println!("  disabled: {}", config.rules.disabled.join(", "));
            }
            println!("  custom: {}", config.rules.custom.len());
            println!();
            let local = repo_root.join(".revet.toml");
            println!("Repo config: {}", local.display());
            if local.exists() {
                println!("  (exists)");
            } else {
                println!("  (not found)");
            }
            if let Some(path) = Config::default_config_path() {
                println!("User config: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
            Ok(0)
        }
        None => {
            println!("Revet - mechanical first-pass review of a git diff");
            println!();
            println!("Use --help for usage information");
            Ok(0)
        }
    }
}
