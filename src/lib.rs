//! Crawl a single web domain and collect the contact emails it publishes
//! as mailto links.
//!
//! Starting from a seed URL, the crawler walks same-domain links up to a
//! bounded depth, takes the visible text of every mailto anchor it sees,
//! validates those candidates, and returns the deduplicated set together
//! with page counts.
//!
//! ```no_run
//! use mailsweep::{Config, Crawler};
//!
//! # async fn run() -> mailsweep::Result<()> {
//! let crawler = Crawler::new(Config::default())?;
//! let report = crawler.crawl("www.example.com").await?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod models;

mod domain;
mod extractor;
mod fetcher;
mod validator;

pub use config::Config;
pub use engine::{CancelHandle, Crawler};
pub use error::{AppError, FetchError, Result};
pub use models::CrawlReport;
