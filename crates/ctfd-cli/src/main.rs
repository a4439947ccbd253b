use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod interrupt;
mod state_file;

#[derive(Parser)]
#[command(name = "ctfd-sync")]
#[command(about = "Reconcile one CTFd challenge against a YAML declaration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the challenge, or update it when the state file exists
    Apply {
        /// Layered config paths in merge order
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Desired challenge (YAML)
        #[arg(long)]
        desired: PathBuf,

        /// Last-applied snapshot (JSON); written after every pass
        #[arg(long)]
        state: PathBuf,
    },

    /// Re-read the challenge recorded in the state file
    Refresh {
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        #[arg(long)]
        state: PathBuf,
    },

    /// Adopt an existing challenge by remote id
    Import {
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        /// Remote challenge id
        #[arg(long)]
        id: i64,

        #[arg(long)]
        state: PathBuf,
    },

    /// Delete the challenge recorded in the state file
    Destroy {
        #[arg(long = "config", required = true)]
        config_paths: Vec<String>,

        #[arg(long)]
        state: PathBuf,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> environment -> local overrides)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Apply {
            config_paths,
            desired,
            state,
        } => commands::sync::apply(&config_paths, &desired, &state),

        Commands::Refresh {
            config_paths,
            state,
        } => commands::sync::refresh(&config_paths, &state),

        Commands::Import {
            config_paths,
            id,
            state,
        } => commands::sync::import(&config_paths, id, &state),

        Commands::Destroy {
            config_paths,
            state,
        } => commands::sync::destroy(&config_paths, &state),

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = ctfd_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
            Ok(())
        }
    }
}

/// Logs go to stderr; stdout carries command output only.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
