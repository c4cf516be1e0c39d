mod cli;
mod files;
mod shell;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use wasmide_core::config::AppConfig;

const LOG_FILE: &str = "wasmide.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wasmide=info,warn"))
}

/// The interactive shell owns the terminal, so it logs to a file in the config
/// directory. Everything else logs to stderr.
fn init_tracing(command: &Command) -> Result<()> {
    match command {
        Command::Shell => {
            let dir = AppConfig::config_dir();
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            let path = dir.join(LOG_FILE);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        Command::Files(_) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command();
    init_tracing(&command)?;

    tracing::info!("Starting Wasm IDE terminal v{}", wasmide_core::VERSION);

    let config = cli.load_config();
    let project = cli.project(&config).context("invalid project id")?;

    match command {
        Command::Shell => shell::run(&config, project).await,
        Command::Files(files) => files::run(files, &config, project).await,
    }
}
