//! Upstream location feed.
//!
//! The upstream publishes its catalog as a JavaScript array literal embedded
//! in an HTML page. [`HttpSource`] downloads that page, cuts the array out
//! and decodes it into engine location details.

mod http;
mod wire;

pub use http::HttpSource;
use wire::parse_snapshot;

/// Errors raised while fetching or decoding the upstream snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Received bad status: {0}")]
    Status(reqwest::StatusCode),

    #[error("No locations found in upstream page")]
    NoPayload,

    #[error("Malformed location payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<SourceError> for charger_engine::Error {
    fn from(e: SourceError) -> Self {
        charger_engine::Error::RemoteFetchFailed(e.to_string())
    }
}
