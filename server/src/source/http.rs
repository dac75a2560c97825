//! HTTP scrape of the upstream locator page.

use super::{parse_snapshot, SourceError};
use crate::metrics::Metrics;
use async_trait::async_trait;
use charger_engine::{LocationDetails, RemoteSource};
use regex::Regex;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

/// Line breaks, folded to spaces so the payload regex can span the page.
static LINE_BREAK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n").expect("line break regex should compile"));

/// The assignment carrying the location array.
static LOCATION_DATA_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"var location_data =\s+?(?P<json>\[.*\]);")
        .expect("location data regex should compile")
});

/// Cut the JSON array out of an upstream page.
pub fn extract_payload(page: &str) -> Result<String, SourceError> {
    let folded = LINE_BREAK_REGEX.replace_all(page, " ");
    LOCATION_DATA_REGEX
        .captures(&folded)
        .and_then(|caps| caps.name("json"))
        .map(|m| m.as_str().to_string())
        .ok_or(SourceError::NoPayload)
}

/// Fetches the snapshot by scraping the upstream locator page.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
    metrics: Metrics,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("charger-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            metrics: Metrics::default(),
        })
    }

    /// Record every fetch into `metrics`.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<LocationDetails>, SourceError> {
        tracing::debug!(url = %self.url, "Fetching upstream page");

        let start = Instant::now();
        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(e) => {
                self.metrics
                    .record_fetch(&self.url, None, start.elapsed(), None);
                return Err(e.into());
            }
        };
        let status = response.status();
        let length = response.content_length();
        let page = response.text().await;
        self.metrics.record_fetch(
            &self.url,
            Some(status.as_u16()),
            start.elapsed(),
            length.or_else(|| page.as_ref().ok().map(|p| p.len() as u64)),
        );

        if status != reqwest::StatusCode::OK {
            return Err(SourceError::Status(status));
        }
        let page = page?;
        let payload = extract_payload(&page)?;
        parse_snapshot(&payload)
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn fetch_snapshot(&self) -> charger_engine::error::Result<Vec<LocationDetails>> {
        self.fetch().await.map_err(|e| {
            tracing::warn!(url = %self.url, error = %e, "Upstream fetch failed");
            e.into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_payload_across_lines() {
        let page = "<html>\r\n<script>\nvar location_data = \n[{\"nid\":\"1\"},\n{\"nid\":\"2\"}];\nvar other = 1;\n</script>";

        let payload = extract_payload(page).unwrap();

        assert!(payload.starts_with('['));
        assert!(payload.ends_with(']'));
        assert!(payload.contains("\"nid\":\"2\""));
        let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }

    #[test]
    fn missing_payload_is_rejected() {
        let page = "<html><body>Maintenance</body></html>";
        assert!(matches!(extract_payload(page), Err(SourceError::NoPayload)));
    }

    #[test]
    fn empty_array_is_a_payload() {
        let payload = extract_payload("var location_data = [];").unwrap();
        assert_eq!(payload, "[]");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_recorded() {
        let metrics = Metrics::new();
        // Nothing listens on the discard port
        let source = HttpSource::new("http://127.0.0.1:9/locator", Duration::from_secs(2))
            .unwrap()
            .with_metrics(metrics.clone());

        let result = source.fetch_snapshot().await;

        assert!(matches!(
            result,
            Err(charger_engine::Error::RemoteFetchFailed(_))
        ));
        let upstream = metrics.snapshot().upstream;
        assert_eq!(upstream.fetches_total, 1);
        assert_eq!(upstream.failures_total, 1);
        assert_eq!(upstream.last_status, None);
        assert_eq!(upstream.latency.count, 1);
    }

    #[test]
    fn source_errors_become_fetch_failures() {
        let err: charger_engine::Error = SourceError::NoPayload.into();
        assert!(matches!(err, charger_engine::Error::RemoteFetchFailed(_)));
    }
}
