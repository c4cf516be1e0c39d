use crate::endpoints::BackendUrl;
use crate::error::{describe, RemoteError, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, warn};
use wasmide_core::config::{BackendConfig, ExecEndpoint};
use wasmide_core::{Command, ExecutionResult};

/// Sends a command to wherever it runs and reports how it went.
///
/// Implementations must turn every failure into an [`ExecutionResult`]; a
/// dispatch never errors out of the session.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    async fn dispatch(&self, command: &Command) -> ExecutionResult;
}

/// Posts commands as plain text to `<base>/<endpoint>?project=<id>`.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    http: reqwest::Client,
    backend: BackendUrl,
    endpoint: ExecEndpoint,
}

impl HttpDispatcher {
    /// `timeout` bounds the whole round trip, including reading the body.
    pub fn new(backend: BackendUrl, endpoint: ExecEndpoint, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(describe(&e)))?;
        Ok(Self {
            http,
            backend,
            endpoint,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::new(
            BackendUrl::parse(&config.execute_url)?,
            config.exec_endpoint,
            config.request_timeout(),
        )
    }

    pub fn endpoint(&self) -> ExecEndpoint {
        self.endpoint
    }
}

#[async_trait]
impl CommandDispatcher for HttpDispatcher {
    async fn dispatch(&self, command: &Command) -> ExecutionResult {
        let url = match self
            .backend
            .route(&[self.endpoint.path()], command.project())
        {
            Ok(url) => url,
            Err(e) => {
                return ExecutionResult::TransportError {
                    message: e.to_string(),
                }
            }
        };

        debug!("Dispatching command {} to {}", command.id(), url);

        let response = match self
            .http
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(command.text().to_string())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let message = describe(&e);
                warn!("Command {} failed to reach backend: {}", command.id(), message);
                return ExecutionResult::TransportError { message };
            }
        };

        let status = response.status();
        match response.text().await {
            Ok(body) if status.is_success() => ExecutionResult::Success { output: body },
            Ok(body) => {
                debug!("Command {} rejected with HTTP {}", command.id(), status.as_u16());
                ExecutionResult::Failure { error: body }
            }
            Err(e) => {
                let message = describe(&e);
                warn!("Command {} response unreadable: {}", command.id(), message);
                ExecutionResult::TransportError { message }
            }
        }
    }
}
