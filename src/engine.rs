//! The crawl engine: frontier scheduling, dequeue guards, and the bounded
//! worker pool that fetches and extracts pages.

use parking_lot::Mutex;
use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio::time::sleep;

use crate::config::Config;
use crate::domain::domain_of;
use crate::error::Result;
use crate::extractor::extract_page;
use crate::fetcher::{build_http_client, fetch_page};
use crate::models::{CrawlReport, CrawlTarget, FrontierEntry};
use crate::validator::is_valid_email;

/// How often the scheduler wakes up to re-check the cancel flag and the
/// run deadline while workers are in flight.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run state shared between the scheduler and its workers. Built fresh for
/// every crawl; nothing carries over between runs.
#[derive(Default)]
struct CrawlState {
    /// URLs already claimed for fetching. Grows monotonically; membership
    /// test and insert happen under one lock so a URL is claimed at most
    /// once.
    visited: Mutex<HashSet<String>>,
    /// Validated addresses, kept exactly as they appeared on the pages.
    emails: Mutex<HashSet<String>>,
    /// Visited pages whose fetch failed.
    pages_failed: AtomicUsize,
}

/// What one worker hands back to the scheduler.
struct PageOutcome {
    depth: usize,
    links: Vec<String>,
}

/// Requests cooperative cancellation of the crawler that issued it.
///
/// Cancellation is not an error: the run stops admitting pages, aborts
/// in-flight fetches, and returns whatever it has collected so far. The
/// flag is sticky and applies to every run started from the same
/// [`Crawler`].
#[derive(Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Crawls one domain at a time, collecting the contact emails published
/// as mailto anchor text.
pub struct Crawler {
    config: Arc<Config>,
    http_client: Arc<Client>,
    cancelled: Arc<AtomicBool>,
}

impl Crawler {
    /// Creates a new Crawler with a shared HTTP client built from the
    /// given configuration.
    pub fn new(config: Config) -> Result<Self> {
        let http_client = Arc::new(build_http_client(&config)?);
        Ok(Self {
            config: Arc::new(config),
            http_client,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Hands out a handle that can stop this crawler from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancelled))
    }

    /// Crawls the domain of `seed` and returns the collected report.
    ///
    /// Only a seed without a usable host is an error; every per-page
    /// problem along the way is logged and skipped. The run ends when the
    /// frontier is exhausted and no fetch is in flight, or earlier on
    /// cancellation, the page ceiling, or the configured time limit. All
    /// early exits still produce a report from what was collected.
    pub async fn crawl(&self, seed: &str) -> Result<CrawlReport> {
        let start_time = Instant::now();
        let target = Arc::new(CrawlTarget::from_seed(seed)?);
        tracing::info!(
            target: "crawl_task",
            "Starting crawl of {} (domain: {})", target.root_url, target.domain
        );

        let state = Arc::new(CrawlState::default());
        let mut frontier: VecDeque<FrontierEntry> = VecDeque::new();
        frontier.push_back(FrontierEntry {
            url: target.root_url.clone(),
            depth: 0,
        });

        let mut in_flight: JoinSet<PageOutcome> = JoinSet::new();

        loop {
            if self.cancelled.load(Ordering::Relaxed) {
                tracing::info!(target: "crawl_task", "Cancellation requested, stopping with partial results");
                break;
            }
            if let Some(limit) = self.config.max_runtime {
                if start_time.elapsed() >= limit {
                    tracing::info!(target: "crawl_task", "Run hit the configured time limit, stopping with partial results");
                    break;
                }
            }

            // Top up the worker pool from the frontier.
            while in_flight.len() < self.config.max_concurrency {
                let Some(entry) = frontier.pop_front() else {
                    break;
                };
                if !self.admit(&entry, &target, &state) {
                    continue;
                }
                tracing::info!(target: "crawl_task", "Visiting (depth {}) {}", entry.depth, entry.url);
                in_flight.spawn(process_page(
                    Arc::clone(&self.http_client),
                    Arc::clone(&self.config),
                    Arc::clone(&target),
                    Arc::clone(&state),
                    entry.url,
                    entry.depth,
                ));
            }

            // Quiescence: nothing queued and nothing running.
            if frontier.is_empty() && in_flight.is_empty() {
                break;
            }

            tokio::select! {
                Some(joined) = in_flight.join_next() => match joined {
                    Ok(outcome) => {
                        for link in outcome.links {
                            if state.visited.lock().contains(&link) {
                                continue;
                            }
                            frontier.push_back(FrontierEntry {
                                url: link,
                                depth: outcome.depth + 1,
                            });
                        }
                    }
                    Err(e) => {
                        tracing::warn!(target: "crawl_task", "Crawl worker failed: {}", e);
                    }
                },
                _ = sleep(POLL_INTERVAL) => {}
            }
        }

        // Cancellation and deadlines leave workers behind; drop them.
        in_flight.shutdown().await;

        let pages_visited = state.visited.lock().len();
        let pages_failed = state.pages_failed.load(Ordering::Relaxed);
        let mut emails: Vec<String> = std::mem::take(&mut *state.emails.lock())
            .into_iter()
            .collect();
        emails.sort();

        let elapsed = start_time.elapsed();
        tracing::info!(
            target: "crawl_task",
            "Crawl of {} finished in {:.2?}. Visited {} pages ({} failed). Found {} unique emails.",
            target.root_url,
            elapsed,
            pages_visited,
            pages_failed,
            emails.len()
        );

        Ok(CrawlReport {
            emails,
            pages_visited,
            pages_failed,
            duration_secs: elapsed.as_secs_f64(),
        })
    }

    /// Applies the dequeue guards to one frontier entry: same domain,
    /// within the depth bound, not yet visited, and under the optional
    /// page ceiling. Passing marks the URL visited, so `true` commits the
    /// caller to fetching it.
    fn admit(&self, entry: &FrontierEntry, target: &CrawlTarget, state: &CrawlState) -> bool {
        if domain_of(&entry.url).as_deref() != Some(target.domain.as_str()) {
            tracing::debug!(target: "crawl_task", "Skipping off-domain URL: {}", entry.url);
            return false;
        }

        if entry.depth >= self.config.max_depth {
            tracing::debug!(
                target: "crawl_task",
                "Skipping {} at depth {} (limit {})", entry.url, entry.depth, self.config.max_depth
            );
            return false;
        }

        let mut visited = state.visited.lock();
        if visited.contains(&entry.url) {
            return false;
        }
        if let Some(max_pages) = self.config.max_pages {
            if visited.len() >= max_pages {
                tracing::debug!(
                    target: "crawl_task",
                    "Page ceiling {} reached, skipping {}", max_pages, entry.url
                );
                return false;
            }
        }
        visited.insert(entry.url.clone());
        true
    }
}

/// One worker: politeness delay, fetch, extract, record emails, and hand
/// the discovered links back to the scheduler.
async fn process_page(
    http_client: Arc<Client>,
    config: Arc<Config>,
    target: Arc<CrawlTarget>,
    state: Arc<CrawlState>,
    url: String,
    depth: usize,
) -> PageOutcome {
    let delay = config.random_sleep_duration();
    if delay > Duration::ZERO {
        sleep(delay).await;
    }

    let html = match fetch_page(&http_client, &url, config.request_timeout).await {
        Ok(html) => html,
        Err(e) => {
            state.pages_failed.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(target: "crawl_task", "Skipping {}: {}", url, e);
            return PageOutcome {
                depth,
                links: Vec::new(),
            };
        }
    };

    let content = extract_page(&html, &url, &target.domain);

    for candidate in content.mailto_texts {
        if is_valid_email(&candidate) {
            tracing::debug!(target: "crawl_task", "Found email on {}: {}", url, candidate);
            state.emails.lock().insert(candidate);
        } else if !candidate.is_empty() {
            tracing::debug!(target: "crawl_task", "Mailto text failed validation on {}: {:?}", url, candidate);
        }
    }

    PageOutcome {
        depth,
        links: content.links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawler_with(config: Config) -> (Crawler, Arc<CrawlState>, CrawlTarget) {
        let crawler = Crawler::new(config).unwrap();
        let state = Arc::new(CrawlState::default());
        let target = CrawlTarget::from_seed("http://example.com").unwrap();
        (crawler, state, target)
    }

    fn entry(url: &str, depth: usize) -> FrontierEntry {
        FrontierEntry {
            url: url.to_string(),
            depth,
        }
    }

    #[test]
    fn test_admit_rejects_off_domain_urls() {
        let (crawler, state, target) = crawler_with(Config::default());
        assert!(!crawler.admit(&entry("http://other.com/", 0), &target, &state));
        assert!(!crawler.admit(&entry("not a url", 0), &target, &state));
        assert!(state.visited.lock().is_empty());
    }

    #[test]
    fn test_admit_claims_urls_at_most_once() {
        let (crawler, state, target) = crawler_with(Config::default());
        let e = entry("http://example.com/contact", 1);
        assert!(crawler.admit(&e, &target, &state));
        assert!(!crawler.admit(&e, &target, &state));
        assert_eq!(state.visited.lock().len(), 1);
    }

    #[test]
    fn test_admit_enforces_depth_bound() {
        let config = Config {
            max_depth: 3,
            ..Config::default()
        };
        let (crawler, state, target) = crawler_with(config);
        assert!(crawler.admit(&entry("http://example.com/a", 2), &target, &state));
        assert!(!crawler.admit(&entry("http://example.com/b", 3), &target, &state));
        assert!(!state.visited.lock().contains("http://example.com/b"));
    }

    #[test]
    fn test_admit_enforces_page_ceiling() {
        let config = Config {
            max_pages: Some(2),
            ..Config::default()
        };
        let (crawler, state, target) = crawler_with(config);
        assert!(crawler.admit(&entry("http://example.com/1", 0), &target, &state));
        assert!(crawler.admit(&entry("http://example.com/2", 1), &target, &state));
        assert!(!crawler.admit(&entry("http://example.com/3", 1), &target, &state));
        assert_eq!(state.visited.lock().len(), 2);
    }

    #[test]
    fn test_admit_matches_domain_after_www_strip() {
        let (crawler, state, target) = crawler_with(Config::default());
        assert!(crawler.admit(&entry("http://www.example.com/team", 0), &target, &state));
    }

    #[test]
    fn test_cancel_handle_is_shared() {
        let crawler = Crawler::new(Config::default()).unwrap();
        let handle = crawler.cancel_handle();
        assert!(!handle.is_cancelled());
        handle.cancel();
        assert!(crawler.cancelled.load(Ordering::Relaxed));
        assert!(handle.is_cancelled());
    }
}
