//! Dynamic-site source adapter.
//!
//! The official site is an SPA: the page itself carries nothing, the
//! numbers arrive in a background JSON call after load. This adapter drives
//! a browser context per invocation — navigate to each game's page, await
//! the first qualifying data response, extract the midday/evening arrays —
//! and tears the context down on every exit path. Used only as a fallback;
//! a full browser session is orders of magnitude dearer than four GETs.

use crate::config::{DynamicPages, GamePage};
use crate::model::{DrawResult, GameKind};
use crate::reconcile::DrawSource;
use crate::renderer::{RenderContext, Renderer, ResponseMatcher};
use crate::sources::SourceError;
use crate::validate;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Per-game halves before composition.
#[derive(Debug, Default, PartialEq)]
struct GameHalves {
    midday: Option<String>,
    evening: Option<String>,
}

/// Adapter for the browser-rendered official site.
pub struct DynamicSource {
    renderer: Arc<dyn Renderer>,
    pages: DynamicPages,
    nav_timeout_ms: u64,
    response_timeout_ms: u64,
}

impl DynamicSource {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        pages: DynamicPages,
        nav_timeout: Duration,
        response_timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            pages,
            nav_timeout_ms: nav_timeout.as_millis() as u64,
            response_timeout_ms: response_timeout.as_millis() as u64,
        }
    }

    /// Run one full browser session and assemble both composites.
    pub async fn fetch_dynamic(&self) -> Result<DrawResult, SourceError> {
        let mut ctx = self
            .renderer
            .new_context()
            .await
            .map_err(|e| SourceError::Browser(e.to_string()))?;

        let outcome = self.drive(ctx.as_mut()).await;

        // Teardown happens here regardless of how `drive` concluded.
        if let Err(error) = ctx.close().await {
            warn!(%error, "browser context close reported an error");
        }

        outcome
    }

    async fn drive(&self, ctx: &mut dyn RenderContext) -> Result<DrawResult, SourceError> {
        // The two navigations share one page object, so they are sequential.
        let numbers = self
            .game_halves(ctx, &self.pages.numbers, GameKind::Numbers)
            .await;
        let win4 = self.game_halves(ctx, &self.pages.win4, GameKind::Win4).await;

        Ok(DrawResult {
            date: Utc::now(),
            midday: compose(numbers.midday, win4.midday),
            evening: compose(numbers.evening, win4.evening),
        })
    }

    /// One game's lookup, reduced to nullable halves. A failed navigation or
    /// sniff degrades this game only; the sibling game still runs.
    async fn game_halves(
        &self,
        ctx: &mut dyn RenderContext,
        page: &GamePage,
        game: GameKind,
    ) -> GameHalves {
        match self.try_game(ctx, page, game).await {
            Ok(halves) => halves,
            Err(error) => {
                warn!(%game, %error, "dynamic game lookup degraded to no data");
                GameHalves::default()
            }
        }
    }

    async fn try_game(
        &self,
        ctx: &mut dyn RenderContext,
        page: &GamePage,
        game: GameKind,
    ) -> Result<GameHalves, SourceError> {
        ctx.navigate(&page.url, self.nav_timeout_ms)
            .await
            .map_err(|e| SourceError::Browser(e.to_string()))?;

        let matcher = ResponseMatcher::json(page.response_fragment.as_str());
        let sniffed = ctx
            .wait_for_response(&matcher, self.response_timeout_ms)
            .await
            .map_err(|e| SourceError::Browser(e.to_string()))?;

        let Some(response) = sniffed else {
            debug!(%game, "no qualifying data response before timeout");
            return Ok(GameHalves::default());
        };

        Ok(parse_halves(&response.body, game))
    }
}

/// Pull both drawing sessions' digit strings out of one data payload.
/// A payload that is not JSON, or is missing a session, degrades that
/// field only.
fn parse_halves(body: &str, game: GameKind) -> GameHalves {
    let payload: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(error) => {
            warn!(%game, %error, "data response body is not JSON");
            return GameHalves::default();
        }
    };

    GameHalves {
        midday: winning_digits(&payload, "midday"),
        evening: winning_digits(&payload, "evening"),
    }
}

/// Join `<draw>.winningNumbers` into one digit string.
fn winning_digits(payload: &Value, draw: &str) -> Option<String> {
    let numbers = payload.get(draw)?.get("winningNumbers")?.as_array()?;
    if numbers.is_empty() {
        return None;
    }

    let mut digits = String::new();
    for number in numbers {
        match number {
            Value::String(s) => digits.push_str(s.trim()),
            Value::Number(n) => digits.push_str(&n.to_string()),
            _ => return None,
        }
    }
    Some(digits)
}

/// Both halves or nothing: a composite with a missing half is `None`,
/// never a truncated `"123-"` value.
fn compose(three: Option<String>, four: Option<String>) -> Option<String> {
    match (three, four) {
        (Some(three), Some(four)) => validate::composite_owned(format!("{three}-{four}")),
        _ => None,
    }
}

#[async_trait]
impl DrawSource for DynamicSource {
    fn name(&self) -> &'static str {
        "dynamic"
    }

    async fn fetch(&self) -> Result<DrawResult, SourceError> {
        self.fetch_dynamic().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{NavigationResult, SniffedResponse};
    use anyhow::bail;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted browser context: canned bodies keyed by response fragment.
    struct FakeContext {
        bodies: HashMap<String, String>,
        fail_navigation: bool,
        active: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RenderContext for FakeContext {
        async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> anyhow::Result<NavigationResult> {
            if self.fail_navigation {
                bail!("scripted navigation failure");
            }
            Ok(NavigationResult {
                final_url: url.to_string(),
                load_time_ms: 1,
            })
        }

        async fn wait_for_response(
            &mut self,
            matcher: &ResponseMatcher,
            _timeout_ms: u64,
        ) -> anyhow::Result<Option<SniffedResponse>> {
            for (fragment, body) in &self.bodies {
                let url = format!("https://fake.test/api/{fragment}");
                if matcher.matches(&url, "application/json") {
                    return Ok(Some(SniffedResponse {
                        url,
                        content_type: "application/json".to_string(),
                        body: body.clone(),
                    }));
                }
            }
            // Scripted timeout: nothing qualifying arrived.
            Ok(None)
        }

        async fn close(self: Box<Self>) -> anyhow::Result<()> {
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Hands out at most one prepared context and counts open sessions.
    struct FakeRenderer {
        context: Mutex<Option<FakeContext>>,
        active: Arc<AtomicUsize>,
    }

    impl FakeRenderer {
        fn with_bodies(bodies: HashMap<String, String>) -> Self {
            Self::build(bodies, false)
        }

        fn failing_navigation() -> Self {
            Self::build(HashMap::new(), true)
        }

        fn unavailable() -> Self {
            Self {
                context: Mutex::new(None),
                active: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn build(bodies: HashMap<String, String>, fail_navigation: bool) -> Self {
            let active = Arc::new(AtomicUsize::new(0));
            Self {
                context: Mutex::new(Some(FakeContext {
                    bodies,
                    fail_navigation,
                    active: Arc::clone(&active),
                })),
                active,
            }
        }
    }

    #[async_trait]
    impl Renderer for FakeRenderer {
        async fn new_context(&self) -> anyhow::Result<Box<dyn RenderContext>> {
            let context = self
                .context
                .lock()
                .expect("lock poisoned")
                .take()
                .ok_or_else(|| anyhow::anyhow!("scripted launch failure"))?;
            self.active.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(context))
        }

        fn active_contexts(&self) -> usize {
            self.active.load(Ordering::SeqCst)
        }
    }

    fn source(renderer: Arc<FakeRenderer>) -> DynamicSource {
        DynamicSource::new(
            renderer,
            DynamicPages::default(),
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
    }

    fn payload(midday: &[u8], evening: &[u8]) -> String {
        let to_array = |digits: &[u8]| -> Vec<String> {
            digits.iter().map(|d| d.to_string()).collect()
        };
        serde_json::json!({
            "midday": { "winningNumbers": to_array(midday) },
            "evening": { "winningNumbers": to_array(evening) },
        })
        .to_string()
    }

    #[tokio::test]
    async fn assembles_both_composites_from_two_games() {
        let mut bodies = HashMap::new();
        bodies.insert("numbers".to_string(), payload(&[1, 2, 3], &[4, 5, 6]));
        bodies.insert("win4".to_string(), payload(&[4, 5, 6, 7], &[7, 8, 9, 0]));
        let renderer = Arc::new(FakeRenderer::with_bodies(bodies));

        let result = source(Arc::clone(&renderer))
            .fetch_dynamic()
            .await
            .expect("fetch succeeds");

        assert_eq!(result.midday.as_deref(), Some("123-4567"));
        assert_eq!(result.evening.as_deref(), Some("456-7890"));
        assert_eq!(renderer.active_contexts(), 0, "session must be closed");
    }

    #[tokio::test]
    async fn missing_half_nullifies_the_composite() {
        let mut bodies = HashMap::new();
        bodies.insert("numbers".to_string(), payload(&[1, 2, 3], &[4, 5, 6]));
        // Win 4 only published its midday drawing so far.
        bodies.insert(
            "win4".to_string(),
            serde_json::json!({
                "midday": { "winningNumbers": ["4", "5", "6", "7"] },
                "evening": { "winningNumbers": [] },
            })
            .to_string(),
        );
        let renderer = Arc::new(FakeRenderer::with_bodies(bodies));

        let result = source(renderer).fetch_dynamic().await.expect("fetch succeeds");

        assert_eq!(result.midday.as_deref(), Some("123-4567"));
        assert_eq!(result.evening, None, "never a truncated \"456-\" composite");
    }

    #[tokio::test]
    async fn sniff_timeout_degrades_to_all_null() {
        // No bodies: every wait_for_response comes back empty.
        let renderer = Arc::new(FakeRenderer::with_bodies(HashMap::new()));

        let result = source(Arc::clone(&renderer))
            .fetch_dynamic()
            .await
            .expect("timeouts are not errors");

        assert!(result.midday.is_none());
        assert!(result.evening.is_none());
        assert_eq!(renderer.active_contexts(), 0);
    }

    #[tokio::test]
    async fn navigation_failure_still_closes_the_session() {
        let renderer = Arc::new(FakeRenderer::failing_navigation());

        let result = source(Arc::clone(&renderer)).fetch_dynamic().await;

        // Per-game failures are absorbed, so the call itself succeeds empty.
        let result = result.expect("per-game failures are absorbed");
        assert!(result.midday.is_none());
        assert!(result.evening.is_none());
        assert_eq!(renderer.active_contexts(), 0, "no leaked browser session");
    }

    #[tokio::test]
    async fn launch_failure_surfaces_as_a_browser_error() {
        let renderer = Arc::new(FakeRenderer::unavailable());

        let err = source(Arc::clone(&renderer))
            .fetch_dynamic()
            .await
            .expect_err("no context, no data");

        assert!(matches!(err, SourceError::Browser(_)));
        assert_eq!(renderer.active_contexts(), 0);
    }

    #[tokio::test]
    async fn malformed_payload_degrades_locally() {
        let mut bodies = HashMap::new();
        bodies.insert("numbers".to_string(), "<!doctype html>".to_string());
        bodies.insert("win4".to_string(), payload(&[4, 5, 6, 7], &[7, 8, 9, 0]));
        let renderer = Arc::new(FakeRenderer::with_bodies(bodies));

        let result = source(renderer).fetch_dynamic().await.expect("fetch succeeds");

        // Numbers half missing on both sessions, so both composites are null
        // even though Win 4 answered cleanly.
        assert!(result.midday.is_none());
        assert!(result.evening.is_none());
    }

    #[test]
    fn winning_digits_handles_numbers_and_strings() {
        let payload = serde_json::json!({
            "midday": { "winningNumbers": [1, 2, 3] },
            "evening": { "winningNumbers": ["4 ", "5", "6"] },
        });
        assert_eq!(winning_digits(&payload, "midday"), Some("123".to_string()));
        assert_eq!(winning_digits(&payload, "evening"), Some("456".to_string()));
        assert_eq!(winning_digits(&payload, "overnight"), None);
    }
}
