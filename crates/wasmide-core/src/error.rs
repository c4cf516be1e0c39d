use thiserror::Error;

#[derive(Error, Debug)]
pub enum WasmIdeError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid project: {0}")]
    InvalidProject(String),
}

pub type Result<T> = std::result::Result<T, WasmIdeError>;
