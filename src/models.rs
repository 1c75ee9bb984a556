//! Defines the core data structures used in the mailsweep crawler.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{domain_of, normalize_url};
use crate::error::{AppError, Result};

/// The immutable scope of one crawl run: where it starts and which domain
/// it is allowed to stay on.
#[derive(Debug, Clone)]
pub(crate) struct CrawlTarget {
    /// The normalized URL the crawl starts from.
    pub root_url: String,
    /// The domain every fetched page must belong to. Never empty.
    pub domain: String,
}

impl CrawlTarget {
    /// Builds a target from a user-supplied seed.
    ///
    /// The seed is normalized (scheme prefixed when missing), parsed so the
    /// stored root takes the same canonical form extracted links do, and
    /// its domain extracted. A seed without a usable host is a
    /// configuration problem: the crawl must not start, so this returns
    /// [`AppError::DomainExtraction`].
    pub(crate) fn from_seed(seed: &str) -> Result<Self> {
        let normalized = normalize_url(seed);
        let parsed = Url::parse(&normalized)
            .map_err(|_| AppError::DomainExtraction(seed.to_string()))?;
        let root_url = parsed.to_string();
        let domain = domain_of(&root_url)
            .ok_or_else(|| AppError::DomainExtraction(seed.to_string()))?;
        Ok(Self { root_url, domain })
    }
}

/// A URL waiting in the frontier, together with the depth it was
/// discovered at. Created once on discovery, consumed once at dequeue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FrontierEntry {
    pub url: String,
    pub depth: usize,
}

/// Everything the extractor pulls out of a single fetched page.
#[derive(Debug, Default)]
pub(crate) struct PageContent {
    /// Candidate same-domain links, absolute, in page order, deduplicated
    /// within the page.
    pub links: Vec<String>,
    /// The visible text of each mailto anchor, in page order. These are
    /// candidates only; the validator decides what gets kept.
    pub mailto_texts: Vec<String>,
}

/// The outcome of a finished (or cancelled) crawl run.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CrawlReport {
    /// Every validated email found, deduplicated exactly as seen on the
    /// pages, sorted for stable presentation.
    pub emails: Vec<String>,
    /// Number of pages claimed for fetching, including fetches that failed.
    pub pages_visited: usize,
    /// Subset of visited pages whose fetch failed.
    pub pages_failed: usize,
    /// Wall-clock duration of the run in seconds.
    pub duration_secs: f64,
}

impl CrawlReport {
    /// The one-line human summary printed at the end of a run.
    pub fn summary(&self) -> String {
        format!(
            "scanned {} pages, found {} unique emails",
            self.pages_visited,
            self.emails.len()
        )
    }

    /// Writes the report as pretty-printed JSON to `path`.
    pub fn write_json(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_seed_normalizes_and_extracts() {
        let target = CrawlTarget::from_seed("www.example.com").unwrap();
        assert_eq!(target.root_url, "http://www.example.com/");
        assert_eq!(target.domain, "example.com");
    }

    #[test]
    fn test_target_from_seed_keeps_scheme() {
        let target = CrawlTarget::from_seed("https://example.com/contact").unwrap();
        assert_eq!(target.root_url, "https://example.com/contact");
        assert_eq!(target.domain, "example.com");
    }

    #[test]
    fn test_target_from_seed_rejects_hostless_input() {
        assert!(CrawlTarget::from_seed("").is_err());
        assert!(CrawlTarget::from_seed("http://").is_err());
        assert!(CrawlTarget::from_seed("http://www./").is_err());
    }

    #[test]
    fn test_report_summary_line() {
        let report = CrawlReport {
            emails: vec!["a@example.com".to_string(), "b@example.com".to_string()],
            pages_visited: 7,
            pages_failed: 1,
            duration_secs: 0.5,
        };
        assert_eq!(report.summary(), "scanned 7 pages, found 2 unique emails");
    }
}
