use crate::error::{Result, WasmIdeError};
use crate::models::project::DEFAULT_PROJECT;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub terminal: TerminalConfig,
    pub general: GeneralConfig,
}

/// Which execution route commands are posted to. Both routes accept the same
/// plain-text request and answer with plain text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecEndpoint {
    #[default]
    Execute,
    Stream,
}

impl ExecEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            ExecEndpoint::Execute => "execute",
            ExecEndpoint::Stream => "stream",
        }
    }
}

impl std::str::FromStr for ExecEndpoint {
    type Err = WasmIdeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "execute" => Ok(ExecEndpoint::Execute),
            "stream" => Ok(ExecEndpoint::Stream),
            other => Err(WasmIdeError::Config(format!(
                "Unknown exec endpoint '{}', expected 'execute' or 'stream'",
                other
            ))),
        }
    }
}

/// How dispatch results are ordered in the transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultOrder {
    /// Render each result as soon as it comes back.
    #[default]
    Arrival,
    /// Hold results back until every earlier command has rendered.
    Submission,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub execute_url: String,
    pub file_server_url: String,
    pub exec_endpoint: ExecEndpoint,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub prompt: String,
    pub scrollback_lines: usize,
    pub convert_eol: bool,
    pub result_order: ResultOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub default_project: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            execute_url: "http://localhost:8080".to_string(),
            file_server_url: "http://localhost:8081".to_string(),
            exec_endpoint: ExecEndpoint::Execute,
            request_timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            prompt: "$ ".to_string(),
            scrollback_lines: 1000,
            convert_eol: true,
            result_order: ResultOrder::Arrival,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_project: DEFAULT_PROJECT.to_string(),
        }
    }
}

impl AppConfig {
    /// Get the project directories for Wasm IDE.
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "wasmide", "WasmIde").ok_or_else(|| {
            WasmIdeError::Config("Could not determine config directory".to_string())
        })
    }

    /// Get the config directory path.
    pub fn config_dir() -> PathBuf {
        match Self::project_dirs() {
            Ok(dirs) => dirs.config_dir().to_path_buf(),
            Err(_) => {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".config").join("wasmide")
            }
        }
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location, or create and save defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, or create and save defaults there.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content).map_err(|e| {
                WasmIdeError::Config(format!(
                    "Failed to parse config at {}: {}",
                    path.display(),
                    e
                ))
            })?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            WasmIdeError::Serialization(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content)?;
        info!("Saved config to {}", path.display());

        Ok(())
    }
}
