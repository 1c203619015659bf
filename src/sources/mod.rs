//! Upstream source adapters.
//!
//! Each adapter produces a [`crate::model::DrawResult`] on its own and is
//! responsible for reducing every transient or structural failure to a
//! `None` field exactly once, at its own boundary. A raised [`SourceError`]
//! means the whole adapter call produced nothing usable; the reconciliation
//! engine absorbs it as "fully absent", never propagates it.

pub mod dynamic_site;
pub mod extract;
pub mod http_client;
pub mod static_site;

pub use dynamic_site::DynamicSource;
pub use static_site::StaticSource;

/// Errors an adapter call can terminate with.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("fetch of {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("upstream returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("results marker not found at {url}")]
    MarkerNotFound { url: String },

    #[error("browser session error: {0}")]
    Browser(String),
}

impl SourceError {
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }
}
