//! Renderer abstraction for browser-based page observation.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over the
//! browser engine (currently Chromium via chromiumoxide). The dynamic source
//! never talks to chromiumoxide directly; it navigates and then awaits the
//! first network response matching a [`ResponseMatcher`], an operation a
//! scripted fake can satisfy in tests.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;

/// Result of navigating to a URL.
#[derive(Debug, Clone)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// Predicate over observed network responses.
///
/// Both fragments must match: the content type keeps HTML and asset traffic
/// out, and the URL fragment ties the match to the navigated game's own data
/// call rather than whatever JSON the page happens to load alongside it.
#[derive(Debug, Clone)]
pub struct ResponseMatcher {
    content_type_fragment: String,
    url_fragment: String,
}

impl ResponseMatcher {
    /// Match JSON responses whose URL contains `url_fragment`.
    pub fn json(url_fragment: impl Into<String>) -> Self {
        Self {
            content_type_fragment: "application/json".into(),
            url_fragment: url_fragment.into().to_lowercase(),
        }
    }

    pub fn matches(&self, url: &str, content_type: &str) -> bool {
        content_type
            .to_lowercase()
            .contains(&self.content_type_fragment)
            && url.to_lowercase().contains(&self.url_fragment)
    }
}

/// A background response captured off the wire.
#[derive(Debug, Clone)]
pub struct SniffedResponse {
    pub url: String,
    pub content_type: String,
    pub body: String,
}

/// A browser engine that can open observation contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a fresh browser context. Expensive — callers open one per
    /// adapter invocation and must close it on every exit path.
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Number of currently open contexts. Zero between adapter calls.
    fn active_contexts(&self) -> usize;
}

/// One browser session: navigation plus network observation.
#[async_trait]
pub trait RenderContext: Send {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;

    /// Await the first response matching `matcher`.
    ///
    /// Returns `Ok(None)` when no qualifying response arrives within the
    /// timeout — absence of data, not a failure.
    async fn wait_for_response(
        &mut self,
        matcher: &ResponseMatcher,
        timeout_ms: u64,
    ) -> Result<Option<SniffedResponse>>;

    /// Tear the session down. Must release every browser resource.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A no-op renderer used when Chromium is unavailable.
///
/// The static source works without a browser; this stub makes the dynamic
/// fallback fail fast, which the reconciliation engine absorbs as "no data".
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Err(anyhow::anyhow!("browser not available — static-only mode"))
    }

    fn active_contexts(&self) -> usize {
        0
    }
}
