//! Static-HTML source adapter.
//!
//! Four feed pages — one per game and drawing session — each carry the most
//! recent drawing in server-rendered markup. The four fetches are
//! independent and run concurrently; any one of them failing (network,
//! timeout, markup drift) degrades only its own half of its own composite.

use crate::config::StaticFeeds;
use crate::model::{noon_today, DrawResult, DrawTime, GameKind};
use crate::reconcile::DrawSource;
use crate::sources::extract::{HeadingListExtractor, PageExtractor};
use crate::sources::http_client::HttpClient;
use crate::sources::SourceError;
use crate::validate;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// The heading the feed pages render above their most recent results.
const RESULTS_MARKER: &str = "latest numbers";

/// Adapter for the static results site.
pub struct StaticSource {
    http: HttpClient,
    feeds: StaticFeeds,
    numbers_extractor: Arc<dyn PageExtractor>,
    win4_extractor: Arc<dyn PageExtractor>,
}

impl StaticSource {
    pub fn new(http: HttpClient, feeds: StaticFeeds) -> Self {
        Self {
            http,
            feeds,
            numbers_extractor: Arc::new(HeadingListExtractor::new(
                RESULTS_MARKER,
                GameKind::Numbers.digit_count(),
            )),
            win4_extractor: Arc::new(HeadingListExtractor::new(
                RESULTS_MARKER,
                GameKind::Win4.digit_count(),
            )),
        }
    }

    /// Swap the extraction strategies. Test seam.
    pub fn with_extractors(
        mut self,
        numbers: Arc<dyn PageExtractor>,
        win4: Arc<dyn PageExtractor>,
    ) -> Self {
        self.numbers_extractor = numbers;
        self.win4_extractor = win4;
        self
    }

    /// Fetch all four feeds and assemble the two composites.
    pub async fn fetch_static(&self) -> Result<DrawResult, SourceError> {
        let (mid3, mid4, eve3, eve4) = tokio::join!(
            self.feed_digits(&self.feeds.midday_numbers, GameKind::Numbers, DrawTime::Midday),
            self.feed_digits(&self.feeds.midday_win4, GameKind::Win4, DrawTime::Midday),
            self.feed_digits(&self.feeds.evening_numbers, GameKind::Numbers, DrawTime::Evening),
            self.feed_digits(&self.feeds.evening_win4, GameKind::Win4, DrawTime::Evening),
        );

        Ok(DrawResult {
            date: noon_today(),
            midday: combine(mid3, mid4),
            evening: combine(eve3, eve4),
        })
    }

    /// One feed page reduced to its digit string, or `None` with a warning.
    async fn feed_digits(&self, url: &str, game: GameKind, draw: DrawTime) -> Option<String> {
        match self.try_feed_digits(url, game).await {
            Ok(digits) => Some(digits),
            Err(error) => {
                warn!(%game, %draw, %error, "static feed degraded to no data");
                None
            }
        }
    }

    async fn try_feed_digits(&self, url: &str, game: GameKind) -> Result<String, SourceError> {
        let page = self.http.get(url).await?;
        let extractor = match game {
            GameKind::Numbers => &self.numbers_extractor,
            GameKind::Win4 => &self.win4_extractor,
        };
        extractor
            .extract(&page.body)
            .ok_or_else(|| SourceError::MarkerNotFound {
                url: url.to_string(),
            })
    }
}

/// Join a 3-digit and a 4-digit half into a validated composite.
///
/// Either half missing, or the joined string failing the grammar, yields
/// `None` — never a partial composite.
fn combine(three: Option<String>, four: Option<String>) -> Option<String> {
    let (three, four) = (three?, four?);
    let candidate = format!("{three}-{four}");
    match validate::composite_owned(candidate) {
        Some(composite) => Some(composite),
        None => {
            warn!("combined feed digits failed the composite grammar, discarding");
            None
        }
    }
}

#[async_trait]
impl DrawSource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self) -> Result<DrawResult, SourceError> {
        self.fetch_static().await
    }
}
