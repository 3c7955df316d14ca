//! Wikipedia REST summary client (encyclopedia connector).
//!
//! Endpoint: https://en.wikipedia.org/api/rest_v1/page/summary/{title}

use async_trait::async_trait;
use dyemind_common::error::DyeMindError;
use dyemind_common::sandbox::SandboxClient as Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::SourceConnector;
use crate::models::{EncyclopediaPayload, SourceResult};

const SUMMARY_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";

pub struct WikipediaConnector {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    extract: String,
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: Option<DesktopUrls>,
}

#[derive(Debug, Deserialize)]
struct DesktopUrls {
    page: Option<String>,
}

impl WikipediaConnector {
    pub fn new(timeout: Duration) -> Result<Self, DyeMindError> {
        Ok(Self {
            client: Client::with_timeout(timeout)?,
        })
    }

    /// Article titles use underscores where the query has spaces.
    fn title_slug(query: &str) -> String {
        query.trim().replace(' ', "_")
    }

    #[instrument(skip(self))]
    async fn lookup(&self, query: &str) -> Result<SourceResult<EncyclopediaPayload>, DyeMindError> {
        let url = format!("{}/{}", SUMMARY_URL, Self::title_slug(query));

        let resp = self.client.get(&url)?.send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DyeMindError::UpstreamStatus(status.as_u16()));
        }

        let summary: SummaryResponse = resp.json().await?;

        if summary.extract.trim().is_empty() {
            debug!(query = query, "Wikipedia article has no lead text");
            return Ok(SourceResult::Empty);
        }

        let canonical_url = summary
            .content_urls
            .and_then(|c| c.desktop)
            .and_then(|d| d.page);

        Ok(SourceResult::Success(EncyclopediaPayload {
            extract: summary.extract,
            canonical_url,
        }))
    }
}

#[async_trait]
impl SourceConnector for WikipediaConnector {
    type Payload = EncyclopediaPayload;

    fn name(&self) -> &'static str {
        "wikipedia"
    }

    async fn fetch(&self, query: &str) -> SourceResult<EncyclopediaPayload> {
        match self.lookup(query).await {
            Ok(result) => result,
            Err(e) => {
                warn!(query = query, error = %e, "Wikipedia lookup failed");
                SourceResult::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_slug_replaces_spaces() {
        assert_eq!(
            WikipediaConnector::title_slug("Rhodamine B"),
            "Rhodamine_B"
        );
        assert_eq!(WikipediaConnector::title_slug("  Fluorescein  "), "Fluorescein");
    }

    #[test]
    fn test_summary_response_shape() {
        let json = r#"{
            "extract": "Rhodamine B is a chemical compound and a dye.",
            "content_urls": {
                "desktop": { "page": "https://en.wikipedia.org/wiki/Rhodamine_B" }
            }
        }"#;
        let parsed: SummaryResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.extract.starts_with("Rhodamine B"));
        assert_eq!(
            parsed.content_urls.unwrap().desktop.unwrap().page.unwrap(),
            "https://en.wikipedia.org/wiki/Rhodamine_B"
        );
    }

    #[test]
    fn test_summary_response_missing_fields() {
        // The REST API omits content_urls on some redirect pages.
        let parsed: SummaryResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.extract.is_empty());
        assert!(parsed.content_urls.is_none());
    }
}
