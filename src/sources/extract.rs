//! Structural extraction of draw digits from static result pages.
//!
//! The static source renders each feed's most recent drawing as a short
//! list of single-digit elements directly under a "Latest numbers" heading.
//! The coupling to that markup lives here and nowhere else; the adapter
//! only sees "html in, digit string out".

use scraper::{ElementRef, Html, Selector};

/// Strategy for pulling one raw digit string out of a fetched page.
///
/// Implementations must be pure over the HTML they are given so they can be
/// swapped for scripted fakes in adapter tests.
pub trait PageExtractor: Send + Sync {
    /// Extract the digit string, or `None` when the page's structure does
    /// not carry one (marker missing, too few list entries).
    fn extract(&self, html: &str) -> Option<String>;
}

/// Extracts the first `take` list entries following a marker heading.
///
/// Walks the document for an `h2` whose text contains `marker`
/// (case-insensitive), then reads `<li>` descendants of that heading's
/// following siblings in document order, trimming and concatenating their
/// text. Short pages — fewer than `take` entries — yield `None` rather than
/// a truncated string.
pub struct HeadingListExtractor {
    marker: String,
    take: usize,
}

impl HeadingListExtractor {
    pub fn new(marker: impl Into<String>, take: usize) -> Self {
        Self {
            marker: marker.into().to_lowercase(),
            take,
        }
    }
}

impl PageExtractor for HeadingListExtractor {
    fn extract(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let headings = Selector::parse("h2").expect("static selector");
        let items = Selector::parse("li").expect("static selector");

        let marker = document.select(&headings).find(|h2| {
            h2.text()
                .collect::<String>()
                .to_lowercase()
                .contains(&self.marker)
        })?;

        let mut digits = String::new();
        let mut taken = 0usize;

        'siblings: for sibling in marker.next_siblings() {
            let Some(element) = ElementRef::wrap(sibling) else {
                continue;
            };
            for item in element.select(&items) {
                let text = item.text().collect::<String>();
                digits.push_str(text.trim());
                taken += 1;
                if taken == self.take {
                    break 'siblings;
                }
            }
        }

        (taken == self.take).then_some(digits)
    }
}
