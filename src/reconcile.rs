//! Priority-with-fallback reconciliation of the two sources.
//!
//! The static source is always tried first; the dynamic source only runs
//! when the static answer is incomplete, because it costs a full browser
//! session. Fields merge independently — each source can be right about one
//! drawing and wrong about the other — with strict static priority when
//! both supplied a value.
//!
//! Reconciliation never fails: both sources failing produces an all-null
//! result stamped with the current instant, which is a valid answer.

use crate::model::DrawResult;
use crate::sources::SourceError;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// One upstream source of draw results.
#[async_trait]
pub trait DrawSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Produce this source's best answer. An `Err` means the whole call
    /// yielded nothing usable; partial knowledge comes back as `Ok` with
    /// null fields.
    async fn fetch(&self) -> Result<DrawResult, SourceError>;
}

/// Orchestrates the two adapters and assembles the unified result.
pub struct ReconcileEngine {
    primary: Arc<dyn DrawSource>,
    fallback: Arc<dyn DrawSource>,
}

impl ReconcileEngine {
    pub fn new(primary: Arc<dyn DrawSource>, fallback: Arc<dyn DrawSource>) -> Self {
        Self { primary, fallback }
    }

    /// Run the fallback policy and merge.
    pub async fn reconcile(&self) -> DrawResult {
        let primary = self.attempt(self.primary.as_ref()).await;

        let fallback = match &primary {
            Some(result) if !result.is_incomplete() => None,
            _ => {
                debug!("primary result incomplete, consulting fallback source");
                self.attempt(self.fallback.as_ref()).await
            }
        };

        merge(primary, fallback)
    }

    async fn attempt(&self, source: &dyn DrawSource) -> Option<DrawResult> {
        match source.fetch().await {
            Ok(result) => {
                debug!(
                    source = source.name(),
                    midday = result.midday.is_some(),
                    evening = result.evening.is_some(),
                    "source answered"
                );
                Some(result)
            }
            Err(error) => {
                warn!(source = source.name(), %error, "source failed, treating as absent");
                None
            }
        }
    }
}

/// Field-wise merge with primary priority.
///
/// The date follows whichever source answered, primary first; when neither
/// did, the current instant stamps the all-null result.
fn merge(primary: Option<DrawResult>, fallback: Option<DrawResult>) -> DrawResult {
    let date = primary
        .as_ref()
        .map(|r| r.date)
        .or_else(|| fallback.as_ref().map(|r| r.date))
        .unwrap_or_else(Utc::now);

    let (p_midday, p_evening) = primary.map(|r| (r.midday, r.evening)).unwrap_or_default();
    let (f_midday, f_evening) = fallback.map(|r| (r.midday, r.evening)).unwrap_or_default();

    DrawResult {
        date,
        midday: p_midday.or(f_midday),
        evening: p_evening.or(f_evening),
    }
}
