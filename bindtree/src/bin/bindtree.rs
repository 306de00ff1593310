//! CLI entry point for bindtree.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use bindtree::config::{Options, Platform};

/// bindtree — generate Rust binding modules from a header manifest.
#[derive(Parser, Debug)]
#[command(name = "bindtree", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate missing bindings and module-aggregation files.
    Build {
        /// Prefix for the generated source tree.
        #[arg(long, default_value = ".")]
        prefix: PathBuf,

        /// Translator executable to invoke.
        #[arg(long, default_value = "bindgen")]
        translator: PathBuf,

        /// Tolerate translator failures and keep whatever output it
        /// produced (the historical behavior).
        #[arg(long)]
        best_effort: bool,

        /// Manifest file listing the bindings.
        manifest: PathBuf,
    },
    /// Delete previously generated artifacts.
    Clean {
        /// Prefix for the generated source tree.
        #[arg(long, default_value = ".")]
        prefix: PathBuf,

        /// Manifest file listing the bindings.
        manifest: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bindtree=info")),
        )
        .init();

    match Cli::parse().command {
        Command::Build {
            prefix,
            translator,
            best_effort,
            manifest,
        } => {
            let options = Options {
                prefix,
                translator,
                platform: Platform::from_env(),
                best_effort,
            };
            let report = bindtree::build(&manifest, &options)?;
            println!(
                "generated {} binding(s), skipped {} already present",
                report.generated(),
                report.skipped()
            );
            if !report.failures.is_empty() {
                for err in &report.failures {
                    eprintln!("error: {err}");
                }
                anyhow::bail!("{} binding(s) failed to generate", report.failures.len());
            }
        }
        Command::Clean { prefix, manifest } => {
            let deletions = bindtree::clean(&manifest, &prefix)?;
            let removed = deletions
                .iter()
                .filter(|d| matches!(d, bindtree::Deletion::Removed(_)))
                .count();
            println!("removed {removed} of {} artifact(s)", deletions.len());
            let failures = deletions.iter().filter(|d| d.is_failure()).count();
            if failures > 0 {
                anyhow::bail!("{failures} artifact(s) could not be removed");
            }
        }
    }
    Ok(())
}
