use crate::endpoints::BackendUrl;
use crate::error::{describe, RemoteError, Result};
use crate::inflight::{InFlight, RequestKey};
use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use wasmide_core::config::BackendConfig;
use wasmide_core::{is_valid_file_name, ProjectId};

/// Body of `GET /files/<name>`.
#[derive(Debug, Deserialize)]
struct FileContent {
    #[serde(default)]
    content: Option<String>,
}

/// Error body the file server sends alongside non-success statuses.
#[derive(Debug, Deserialize)]
struct ServerMessage {
    #[serde(default)]
    message: Option<String>,
}

/// Talks to the project file server. Every request is scoped to one project.
///
/// Holds no content cache; concurrent identical reads share a round trip.
#[derive(Debug, Clone)]
pub struct FileSyncClient {
    http: reqwest::Client,
    backend: BackendUrl,
    project: ProjectId,
    listings: InFlight<Vec<String>>,
    contents: InFlight<String>,
}

impl FileSyncClient {
    pub fn new(backend: BackendUrl, project: ProjectId, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(describe(&e)))?;
        Ok(Self {
            http,
            backend,
            project,
            listings: InFlight::new(),
            contents: InFlight::new(),
        })
    }

    pub fn from_config(config: &BackendConfig, project: ProjectId) -> Result<Self> {
        Self::new(
            BackendUrl::parse(&config.file_server_url)?,
            project,
            config.request_timeout(),
        )
    }

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    /// `GET /list-files?project=<id>`: names of every file in the project.
    pub async fn list_files(&self) -> Result<Vec<String>> {
        let url = self.backend.route(&["list-files"], &self.project)?;
        let http = self.http.clone();
        let key = RequestKey::new("list-files", &self.project, "");

        self.listings
            .run(key, move || async move {
                debug!("Listing files from {}", url);
                let response = check_status(http.get(url).send().await?).await?;
                let names: Vec<String> = response.json().await?;
                Ok::<_, RemoteError>(names)
            })
            .await
    }

    /// `GET /files/<name>?project=<id>`: current content of one file.
    pub async fn load_content(&self, name: &str) -> Result<String> {
        validate_name(name)?;
        let url = self.backend.route(&["files", name], &self.project)?;
        let http = self.http.clone();
        let key = RequestKey::new("load", &self.project, name);

        self.contents
            .run(key, move || async move {
                debug!("Loading {}", url);
                let response = check_status(http.get(url).send().await?).await?;
                let body: FileContent = response.json().await?;
                Ok::<_, RemoteError>(body.content.unwrap_or_default())
            })
            .await
    }

    /// `POST /files/<name>?project=<id>` with the full new content as text.
    pub async fn save_content(&self, name: &str, content: &str) -> Result<()> {
        validate_name(name)?;
        let url = self.backend.route(&["files", name], &self.project)?;
        debug!("Saving {} bytes to {}", content.len(), url);

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(content.to_string())
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// `POST /create-file?project=<id>` with the JSON-encoded file name.
    pub async fn create_file(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        let url = self.backend.route(&["create-file"], &self.project)?;

        let response = self.http.post(url).json(&name).send().await?;
        check_status(response).await?;
        info!("Created {} in project {}", name, self.project);
        Ok(())
    }

    /// `POST /runcode?lang=<lang>&project=<id>`: ask the server to build and
    /// run the project's code.
    pub async fn run_code(&self, lang: &str) -> Result<()> {
        let url = self
            .backend
            .route_with(&["runcode"], &self.project, &[("lang", lang)])?;

        let response = self.http.post(url).send().await?;
        check_status(response).await?;
        info!("Started {} run for project {}", lang, self.project);
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if is_valid_file_name(name) {
        Ok(())
    } else {
        Err(RemoteError::InvalidFileName(name.to_string()))
    }
}

/// Pass successful responses through; turn anything else into
/// [`RemoteError::Backend`], preferring the server's `message` field.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ServerMessage>(&body)
        .ok()
        .and_then(|m| m.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                trimmed.to_string()
            }
        });

    Err(RemoteError::Backend {
        status: status.as_u16(),
        message,
    })
}
