use crate::error::{RemoteError, Result};
use url::Url;
use wasmide_core::ProjectId;

/// Base address of a backend service. Every route built from it carries the
/// `project` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendUrl {
    base: Url,
}

impl BackendUrl {
    pub fn parse(base: &str) -> Result<Self> {
        let base = Url::parse(base.trim())
            .map_err(|e| RemoteError::InvalidUrl(format!("'{}': {}", base, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(RemoteError::InvalidUrl(format!(
                "'{}': expected an http or https URL",
                base
            )));
        }
        if base.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(format!("'{}' cannot be a base URL", base)));
        }
        Ok(Self { base })
    }

    /// `<base>/<segments...>?project=<id>`. Segments are percent-encoded.
    pub fn route(&self, segments: &[&str], project: &ProjectId) -> Result<Url> {
        self.route_with(segments, project, &[])
    }

    /// Like [`route`](Self::route) with extra query pairs placed before `project`.
    pub fn route_with(
        &self,
        segments: &[&str],
        project: &ProjectId,
        query: &[(&str, &str)],
    ) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidUrl(format!("'{}' cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);

        url.set_query(None);
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("project", project.as_str());
        }
        Ok(url)
    }
}
