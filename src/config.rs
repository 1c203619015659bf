//! Process configuration.
//!
//! Everything externally tunable lives here: the listening port, the cache
//! TTL, the per-operation timeouts, and the fixed upstream addresses. The
//! upstream URLs are effectively part of the service contract — the
//! extraction logic is tailored to those exact pages — so they are shipped
//! as defaults rather than required settings, overridable only for tests
//! and staging mirrors.
//!
//! Log verbosity is controlled by `RUST_LOG` (or `--verbose`), handled at
//! bootstrap, not here.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;

/// The four static feed pages, one per game and drawing session.
#[derive(Debug, Clone)]
pub struct StaticFeeds {
    pub midday_numbers: String,
    pub midday_win4: String,
    pub evening_numbers: String,
    pub evening_win4: String,
}

impl Default for StaticFeeds {
    fn default() -> Self {
        Self {
            midday_numbers: "https://www.lotteryusa.com/new-york/midday-numbers/".into(),
            midday_win4: "https://www.lotteryusa.com/new-york/midday-win-4/".into(),
            evening_numbers: "https://www.lotteryusa.com/new-york/numbers/".into(),
            evening_win4: "https://www.lotteryusa.com/new-york/win-4/".into(),
        }
    }
}

/// One dynamic-site game page plus the URL fragment its background data
/// call is known to carry.
///
/// The fragment keeps the response sniffer from latching onto an unrelated
/// JSON response (analytics beacons, consent banners) that happens to share
/// the content type.
#[derive(Debug, Clone)]
pub struct GamePage {
    pub url: String,
    pub response_fragment: String,
}

/// The two dynamic-site game pages.
#[derive(Debug, Clone)]
pub struct DynamicPages {
    pub numbers: GamePage,
    pub win4: GamePage,
}

impl Default for DynamicPages {
    fn default() -> Self {
        Self {
            numbers: GamePage {
                url: "https://nylottery.ny.gov/draw-game/?game=numbers".into(),
                response_fragment: "numbers".into(),
            },
            win4: GamePage {
                url: "https://nylottery.ny.gov/draw-game/?game=win4".into(),
                response_fragment: "win4".into(),
            },
        }
    }
}

/// Full service configuration with deployment defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Validity window of the single cached result.
    pub cache_ttl: Duration,
    /// Per-page fetch bound for the static source.
    pub page_timeout: Duration,
    /// Navigation bound for the dynamic source's browser session.
    pub nav_timeout: Duration,
    /// How long to wait for the sniffed background data response.
    pub response_timeout: Duration,
    pub feeds: StaticFeeds,
    pub pages: DynamicPages,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cache_ttl: Duration::from_secs(60),
            page_timeout: Duration::from_secs(15),
            nav_timeout: Duration::from_secs(30),
            response_timeout: Duration::from_secs(15),
            feeds: StaticFeeds::default(),
            pages: DynamicPages::default(),
        }
    }
}

impl Config {
    /// Defaults with the port taken from `DRAWBRIDGE_PORT` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(port) = std::env::var("DRAWBRIDGE_PORT")
            .ok()
            .and_then(|raw| raw.trim().parse::<u16>().ok())
        {
            config.port = port;
        }
        config
    }
}
