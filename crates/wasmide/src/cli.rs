use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;
use wasmide_core::config::{AppConfig, ExecEndpoint};
use wasmide_core::ProjectId;

#[derive(Parser, Debug)]
#[command(
    name = "wasmide",
    about = "Terminal client for the Wasm IDE execution backend and project file server",
    version
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "WASMIDE_PROJECT",
        value_name = "ID",
        help = "Project every command and file operation is scoped to"
    )]
    pub project: Option<String>,

    #[arg(
        long = "page-url",
        global = true,
        value_name = "URL",
        help = "Take the project from this URL's `project` query parameter"
    )]
    pub page_url: Option<String>,

    #[arg(
        long,
        global = true,
        env = "WASMIDE_BACKEND",
        value_name = "URL",
        help = "Base URL of the execution backend"
    )]
    pub backend: Option<String>,

    #[arg(
        long = "file-server",
        global = true,
        env = "WASMIDE_FILE_SERVER",
        value_name = "URL",
        help = "Base URL of the project file server"
    )]
    pub file_server: Option<String>,

    #[arg(
        long,
        global = true,
        value_name = "ENDPOINT",
        help = "Execution route: execute or stream"
    )]
    pub endpoint: Option<ExecEndpoint>,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Config file to use instead of the default location"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Interactive remote shell (default when no subcommand given)
    Shell,
    /// Work with the project's files
    #[command(subcommand)]
    Files(FilesCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum FilesCommand {
    /// List the project's files
    List,
    /// Print a file's content
    Open { name: String },
    /// Replace a file's content with CONTENT, or stdin when omitted
    Write {
        name: String,
        content: Option<String>,
    },
    /// Create an empty file
    Create { name: String },
    /// Build and run the project's code on the file server
    Run {
        #[arg(long, default_value = "go")]
        lang: String,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Shell)
    }

    /// Config from `--config` or the default location, with flag overrides
    /// applied. A config that cannot be loaded falls back to defaults.
    pub fn load_config(&self) -> AppConfig {
        let loaded = match &self.config {
            Some(path) => AppConfig::load_from(path),
            None => AppConfig::load(),
        };
        let mut config = loaded.unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        });
        self.apply_overrides(&mut config);
        config
    }

    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(url) = &self.backend {
            config.backend.execute_url = url.clone();
        }
        if let Some(url) = &self.file_server {
            config.backend.file_server_url = url.clone();
        }
        if let Some(endpoint) = self.endpoint {
            config.backend.exec_endpoint = endpoint;
        }
    }

    pub fn project(&self, config: &AppConfig) -> wasmide_core::Result<ProjectId> {
        ProjectId::resolve(
            self.project.as_deref(),
            self.page_url.as_deref(),
            &config.general.default_project,
        )
    }
}
