//! Composite-result grammar gate.
//!
//! The single checkpoint between scraped text and a stored result. Extra
//! whitespace, a missing list element, or a wrong digit count all surface
//! here as a rejection rather than as a truncated number downstream.

use regex::Regex;
use std::sync::LazyLock;

/// `{3 digits}-{4 digits}`, nothing more, nothing less.
static COMPOSITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}-\d{4}$").expect("composite pattern is valid"));

/// Returns the candidate unchanged iff it matches the composite grammar.
pub fn composite(candidate: &str) -> Option<&str> {
    COMPOSITE.is_match(candidate).then_some(candidate)
}

/// Owned convenience over [`composite`] for `Option<String>` pipelines.
pub fn composite_owned(candidate: String) -> Option<String> {
    composite(&candidate).is_some().then_some(candidate)
}
