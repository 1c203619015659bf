//! Core draw-result types shared by the adapters, the engine, and the cache.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The two games whose results are combined into one composite string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    /// The 3-digit "Numbers" game.
    Numbers,
    /// The 4-digit "Win 4" game.
    Win4,
}

impl GameKind {
    /// How many single-digit entries this game announces per drawing.
    pub const fn digit_count(self) -> usize {
        match self {
            Self::Numbers => 3,
            Self::Win4 => 4,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Numbers => "numbers",
            Self::Win4 => "win4",
        }
    }
}

impl Display for GameKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two drawing sessions each game holds per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawTime {
    Midday,
    Evening,
}

impl DrawTime {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Midday => "midday",
            Self::Evening => "evening",
        }
    }
}

impl Display for DrawTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reconciled (or single-source) set of draw results.
///
/// `midday` and `evening`, when present, always satisfy the composite
/// grammar `\d{3}-\d{4}`. A value that fails the grammar is discarded to
/// `None` by whoever produced it — a partial string never leaves an adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawResult {
    /// The date this result pertains to, not a precise draw timestamp.
    #[serde(rename = "dateISO")]
    pub date: DateTime<Utc>,
    pub midday: Option<String>,
    pub evening: Option<String>,
}

impl DrawResult {
    /// An all-null result stamped with the current instant.
    pub fn empty() -> Self {
        Self {
            date: Utc::now(),
            midday: None,
            evening: None,
        }
    }

    /// True when either drawing session is still unconfirmed.
    pub fn is_incomplete(&self) -> bool {
        self.midday.is_none() || self.evening.is_none()
    }
}

/// The current date anchored to 12:00 local time.
///
/// Upstream pages report "today's" numbers without a timestamp. Anchoring to
/// midday keeps the stamped date stable when the service runs in a timezone
/// offset from the jurisdiction's.
pub fn noon_today() -> DateTime<Utc> {
    let local_noon = Local::now()
        .date_naive()
        .and_hms_opt(12, 0, 0)
        .and_then(|naive| naive.and_local_timezone(Local).single());

    match local_noon {
        Some(noon) => noon.with_timezone(&Utc),
        // Only reachable on a DST gap crossing noon, which New York does not have.
        None => Utc::now(),
    }
}
