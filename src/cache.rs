//! Single-slot, time-boxed memoization of the reconciled result.
//!
//! Not a general cache: one entry, overwrite-only, stale by TTL rather
//! than evicted. Its only job is to bound the rate of expensive upstream
//! work — the browser fallback in particular — under repeated queries.

use crate::model::DrawResult;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Clock seam so staleness is testable without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock implementation used in production.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    result: DrawResult,
    stored_at: Instant,
}

/// The process-wide result slot.
pub struct ResultCache {
    slot: Mutex<Option<CacheEntry>>,
    ttl: Duration,
    clock: Box<dyn Clock>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Box::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
            clock,
        }
    }

    /// The cached result, if one was stored within the TTL window.
    ///
    /// A stale entry is left in place; the next `put` overwrites it.
    pub fn get(&self) -> Option<DrawResult> {
        let slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.as_ref().and_then(|entry| {
            (self.clock.now().duration_since(entry.stored_at) < self.ttl)
                .then(|| entry.result.clone())
        })
    }

    /// Store a fresh result, overwriting whatever was there.
    pub fn put(&self, result: DrawResult) {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(CacheEntry {
            result,
            stored_at: self.clock.now(),
        });
    }
}

/// Test support: clocks that only move when told to.
pub mod testing {
    use super::*;
    use std::sync::Arc;

    /// Hand-advanced clock for staleness tests.
    #[derive(Clone)]
    pub struct ManualClock {
        now: Arc<Mutex<Instant>>,
    }

    impl ManualClock {
        pub fn start() -> Self {
            Self {
                now: Arc::new(Mutex::new(Instant::now())),
            }
        }

        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().expect("clock lock");
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().expect("clock lock")
        }
    }
}
