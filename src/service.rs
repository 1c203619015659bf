//! Query service: the cache-fronted face of the reconciliation engine.
//!
//! Every query consults the cache first. Misses are coalesced through a
//! single in-flight lock so a burst of cold queries triggers one
//! reconciliation — and at most one browser session — not one per caller.

use crate::cache::ResultCache;
use crate::model::DrawResult;
use crate::reconcile::ReconcileEngine;
use std::sync::Arc;
use tracing::debug;

/// The only error class a caller can see. Adapter failures never reach
/// here — they are absorbed into null fields upstream — so this fires for
/// programming defects only.
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error("reconciliation task failed: {0}")]
    Internal(String),
}

pub struct QueryService {
    cache: ResultCache,
    engine: Arc<ReconcileEngine>,
    inflight: tokio::sync::Mutex<()>,
}

impl QueryService {
    pub fn new(cache: ResultCache, engine: Arc<ReconcileEngine>) -> Self {
        Self {
            cache,
            engine,
            inflight: tokio::sync::Mutex::new(()),
        }
    }

    /// The latest reconciled result, cached for the TTL window.
    pub async fn latest(&self) -> Result<DrawResult, ServiceError> {
        if let Some(hit) = self.cache.get() {
            debug!("cache hit");
            return Ok(hit);
        }

        let _guard = self.inflight.lock().await;

        // A concurrent miss may have filled the slot while we waited.
        if let Some(hit) = self.cache.get() {
            debug!("cache filled while waiting on in-flight reconciliation");
            return Ok(hit);
        }

        debug!("cache miss, reconciling");
        let engine = Arc::clone(&self.engine);
        let fresh = tokio::spawn(async move { engine.reconcile().await })
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        self.cache.put(fresh.clone());
        Ok(fresh)
    }
}
