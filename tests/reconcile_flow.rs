//! Full query flow with scripted sources: reconciliation, caching, and the
//! REST boundary working together.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use drawbridge::cache::testing::ManualClock;
use drawbridge::cache::ResultCache;
use drawbridge::model::DrawResult;
use drawbridge::reconcile::{DrawSource, ReconcileEngine};
use drawbridge::rest::{router, AppState};
use drawbridge::service::QueryService;
use drawbridge::sources::SourceError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// Scripted source with a call counter.
struct Scripted {
    name: &'static str,
    midday: Option<&'static str>,
    evening: Option<&'static str>,
    fail: bool,
    calls: AtomicUsize,
}

impl Scripted {
    fn answering(
        name: &'static str,
        midday: Option<&'static str>,
        evening: Option<&'static str>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            midday,
            evening,
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            midday: None,
            evening: None,
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DrawSource for Scripted {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self) -> Result<DrawResult, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SourceError::fetch("test://upstream", "scripted failure"));
        }
        Ok(DrawResult {
            date: Utc::now(),
            midday: self.midday.map(String::from),
            evening: self.evening.map(String::from),
        })
    }
}

fn app(
    primary: Arc<Scripted>,
    fallback: Arc<Scripted>,
    clock: ManualClock,
) -> axum::Router {
    let engine = Arc::new(ReconcileEngine::new(primary, fallback));
    let cache = ResultCache::with_clock(Duration::from_secs(60), Box::new(clock));
    let service = QueryService::new(cache, engine);
    router(Arc::new(AppState { service }))
}

async fn get_latest(app: &axum::Router) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::get("/api/ny/latest")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json"))
}

#[tokio::test]
async fn incomplete_primary_is_completed_by_the_fallback() {
    let primary = Scripted::answering("static", Some("123-4567"), None);
    let fallback = Scripted::answering("dynamic", Some("000-0000"), Some("456-7890"));
    let app = app(Arc::clone(&primary), Arc::clone(&fallback), ManualClock::start());

    let (status, json) = get_latest(&app).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["midday"], "123-4567", "static value wins per field");
    assert_eq!(json["evening"], "456-7890");
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 1);
}

#[tokio::test]
async fn warm_cache_answers_without_touching_the_sources() {
    let primary = Scripted::answering("static", Some("123-4567"), Some("890-1234"));
    let fallback = Scripted::failing("dynamic");
    let app = app(Arc::clone(&primary), Arc::clone(&fallback), ManualClock::start());

    let (_, first) = get_latest(&app).await;
    let (_, second) = get_latest(&app).await;

    assert_eq!(first, second);
    assert_eq!(primary.calls(), 1, "second query served from cache");
    assert_eq!(fallback.calls(), 0, "complete primary never needs the fallback");
}

#[tokio::test]
async fn stale_cache_triggers_exactly_one_new_reconciliation() {
    let clock = ManualClock::start();
    let primary = Scripted::answering("static", Some("123-4567"), Some("890-1234"));
    let fallback = Scripted::failing("dynamic");
    let app = app(Arc::clone(&primary), fallback, clock.clone());

    get_latest(&app).await;
    clock.advance(Duration::from_secs(61));
    get_latest(&app).await;
    get_latest(&app).await;

    assert_eq!(primary.calls(), 2);
}

#[tokio::test]
async fn total_source_unavailability_serves_nulls_with_a_date() {
    let app = app(
        Scripted::failing("static"),
        Scripted::failing("dynamic"),
        ManualClock::start(),
    );

    let (status, json) = get_latest(&app).await;

    assert_eq!(status, StatusCode::OK, "absence of data is not an error");
    assert!(json["midday"].is_null());
    assert!(json["evening"].is_null());
    assert!(json["dateISO"].is_string());
}
