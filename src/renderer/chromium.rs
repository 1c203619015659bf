//! Chromium-based renderer using chromiumoxide.
//!
//! One dedicated browser process per context: the dynamic source opens a
//! context, drives it, and closes it, so nothing browser-shaped survives
//! between adapter invocations.

use super::{NavigationResult, RenderContext, Renderer, ResponseMatcher, SniffedResponse};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventResponseReceived, GetResponseBodyParams,
};
use chromiumoxide::page::Page;
use futures::{Stream, StreamExt};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

type ResponseStream = Pin<Box<dyn Stream<Item = Arc<EventResponseReceived>> + Send>>;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. DRAWBRIDGE_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("DRAWBRIDGE_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.drawbridge/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".drawbridge/chromium/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".drawbridge/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".drawbridge/chromium/chrome-linux64/chrome"),
                home.join(".drawbridge/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    if let Ok(path) = which::which("google-chrome") {
        return Some(path);
    }
    if let Ok(path) = which::which("chromium") {
        return Some(path);
    }
    if let Ok(path) = which::which("chromium-browser") {
        return Some(path);
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based renderer. Holds only the binary path; the browser process
/// itself lives and dies with each context.
pub struct ChromiumRenderer {
    chrome_path: PathBuf,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Locate the Chromium binary without launching anything.
    pub fn discover() -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found. Set DRAWBRIDGE_CHROMIUM_PATH or install google-chrome.")?;
        Ok(Self {
            chrome_path,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let config = BrowserConfig::builder()
            .chrome_executable(self.chrome_path.clone())
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Drain CDP events for the lifetime of this browser.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let setup = async {
            let page = browser
                .new_page("about:blank")
                .await
                .context("failed to create page")?;

            // Network events are not delivered until the domain is enabled.
            page.execute(EnableParams::default())
                .await
                .context("failed to enable network domain")?;

            let responses = page
                .event_listener::<EventResponseReceived>()
                .await
                .context("failed to subscribe to network responses")?;

            anyhow::Ok((page, responses))
        }
        .await;

        match setup {
            Ok((page, responses)) => {
                self.active_count.fetch_add(1, Ordering::Relaxed);
                Ok(Box::new(ChromiumContext {
                    browser,
                    page,
                    responses: Box::pin(responses),
                    active_count: Arc::clone(&self.active_count),
                }))
            }
            Err(e) => {
                let _ = browser.close().await;
                Err(e)
            }
        }
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// A single Chromium session: one browser process, one page.
///
/// The response subscription is installed before any navigation so data
/// calls fired during page load are buffered rather than missed.
pub struct ChromiumContext {
    browser: Browser,
    page: Page,
    responses: ResponseStream,
    active_count: Arc<AtomicUsize>,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();

        let result = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.page.goto(url),
        )
        .await;

        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(_page)) => {
                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    async fn wait_for_response(
        &mut self,
        matcher: &ResponseMatcher,
        timeout_ms: u64,
    ) -> Result<Option<SniffedResponse>> {
        let sniff = async {
            while let Some(event) = self.responses.next().await {
                let url = event.response.url.clone();
                let content_type = event.response.mime_type.clone();
                if !matcher.matches(&url, &content_type) {
                    continue;
                }

                let params = GetResponseBodyParams::new(event.request_id.clone());
                match self.page.execute(params).await {
                    Ok(reply) => {
                        let body = if reply.base64_encoded {
                            match STANDARD.decode(reply.body.as_bytes()) {
                                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                                Err(e) => {
                                    warn!(%url, "base64 decode of sniffed body failed: {e}");
                                    continue;
                                }
                            }
                        } else {
                            reply.body.clone()
                        };

                        return Ok(Some(SniffedResponse {
                            url,
                            content_type,
                            body,
                        }));
                    }
                    Err(e) => {
                        // The body can be evicted before we ask for it.
                        // Keep listening; the page may repeat the call.
                        debug!(%url, "response body unavailable: {e}");
                        continue;
                    }
                }
            }
            Ok(None)
        };

        match tokio::time::timeout(Duration::from_millis(timeout_ms), sniff).await {
            Ok(result) => result,
            Err(_elapsed) => Ok(None),
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let ChromiumContext {
            mut browser,
            page,
            responses,
            active_count,
        } = *self;

        drop(responses);
        let _ = page.close().await;
        let _ = browser.close().await;
        let _ = browser.wait().await;
        active_count.fetch_sub(1, Ordering::Relaxed);
        Ok(())
    }
}
