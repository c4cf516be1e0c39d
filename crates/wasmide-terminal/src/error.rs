use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerminalError {
    #[error("Viewport already attached")]
    AlreadyAttached,
    #[error("Viewport not attached")]
    NotAttached,
    #[error("Viewport disposed")]
    Disposed,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, TerminalError>;
