use thiserror::Error;

/// Failures talking to the execution backend or the file server.
///
/// `Clone` so that callers joined on one coalesced request can each receive
/// the same error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Backend returned HTTP {status}: {message}")]
    Backend { status: u16, message: String },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::Decode(describe(&e))
        } else {
            RemoteError::Transport(describe(&e))
        }
    }
}

/// Render an error together with its source chain, e.g.
/// `error sending request for url (...): connection refused`.
pub fn describe(e: &(dyn std::error::Error + 'static)) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

pub type Result<T> = std::result::Result<T, RemoteError>;
