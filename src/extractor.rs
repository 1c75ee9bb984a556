//! Parses fetched pages into same-domain links and mailto candidates.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

use crate::domain::normalize_url;
use crate::models::PageContent;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static MAILTO_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href*='mailto']").unwrap());

/// Visible text of an element: fragments joined with interior whitespace
/// collapsed, the way a browser would render the anchor label.
fn normalized_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pulls candidate links and mailto anchor texts out of one page.
///
/// Link selection is by substring: an anchor is kept when its raw `href`
/// contains `target_domain` anywhere. Kept hrefs are resolved against the
/// page base and normalized; hrefs that cannot be resolved are dropped.
/// The dequeue guard makes the final same-domain decision, so overshoot
/// here is harmless.
///
/// Mailto anchors (href containing `mailto`) contribute their visible
/// text, not their target, as email candidates.
///
/// The parser is error correcting: malformed markup yields whatever could
/// be salvaged, never an error.
pub(crate) fn extract_page(html: &str, base_url: &str, target_domain: &str) -> PageContent {
    let document = Html::parse_document(html);
    let base = Url::parse(base_url).ok();

    let mut links = Vec::new();
    let mut seen_links: HashSet<String> = HashSet::new();
    if let Some(base) = &base {
        for element in document.select(&ANCHOR_SELECTOR) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !href.contains(target_domain) {
                continue;
            }
            let Ok(resolved) = base.join(href) else {
                tracing::debug!("Dropping unresolvable href '{}' on {}", href, base_url);
                continue;
            };
            let link = normalize_url(resolved.as_str());
            if seen_links.insert(link.clone()) {
                links.push(link);
            }
        }
    }

    let mut mailto_texts = Vec::new();
    for element in document.select(&MAILTO_SELECTOR) {
        mailto_texts.push(normalized_text(element));
    }

    PageContent {
        links,
        mailto_texts,
    }
}
