use crate::error::{Result, WasmIdeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Project used when neither the caller nor the page URL names one.
pub const DEFAULT_PROJECT: &str = "default-project";

/// Identifies a remote workspace. Every backend request is scoped by one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(WasmIdeError::InvalidProject(
                "project id cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read the `project` parameter from a URL query string (with or without
    /// the leading `?`). Absent or empty parameters yield `None`.
    pub fn from_query(query: &str) -> Option<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "project")
            .and_then(|(_, value)| Self::new(value.into_owned()).ok())
    }

    /// Project named by a hosting page URL's `project` parameter, if any.
    pub fn from_page_url(page_url: &str) -> Result<Option<Self>> {
        let url = Url::parse(page_url).map_err(|e| {
            WasmIdeError::InvalidProject(format!("invalid page url '{}': {}", page_url, e))
        })?;
        Ok(url.query().and_then(Self::from_query))
    }

    /// Pick the project for a session: an explicit id wins, then the page
    /// URL's `project` parameter, then the configured default, then
    /// [`DEFAULT_PROJECT`]. A page URL without the parameter falls through.
    pub fn resolve(
        explicit: Option<&str>,
        page_url: Option<&str>,
        configured: &str,
    ) -> Result<Self> {
        if let Some(id) = explicit.filter(|id| !id.trim().is_empty()) {
            return Self::new(id);
        }
        if let Some(page_url) = page_url {
            if let Some(id) = Self::from_page_url(page_url)? {
                return Ok(id);
            }
        }
        Ok(Self::new(configured).unwrap_or_default())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self(DEFAULT_PROJECT.to_string())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
