//! Crawl orchestration.
//!
//! Two engines share one structure: fetch a page, extract plain data from it
//! synchronously, then fan out follow-up fetches as spawned tasks. Records
//! flow through an mpsc sender to whatever sink the caller attached. A failed
//! branch is logged and abandoned; sibling branches are unaffected.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::infrastructure::config::{ConfigError, SiteConfig};
use crate::infrastructure::parsing::{SelectorError, SelectorExpr};

pub mod brand_crawler;
pub mod context;
pub mod product_crawler;

pub use brand_crawler::BrandCrawler;
pub use context::CrawlContext;
pub use product_crawler::ProductCrawler;

/// Errors that stop a crawl before any network activity.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("invalid start URL '{url}': {reason}")]
    InvalidStartUrl { url: String, reason: String },
}

/// Outcome of one crawl run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages_fetched: usize,
    pub records_emitted: usize,
    pub failed_branches: usize,
    pub elapsed: Duration,
}

/// Run counters shared across branch tasks.
#[derive(Debug, Default)]
pub(crate) struct CrawlStats {
    pages_fetched: AtomicUsize,
    records_emitted: AtomicUsize,
    failed_branches: AtomicUsize,
}

impl CrawlStats {
    pub(crate) fn page_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_emitted(&self) {
        self.records_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn branch_failed(&self) {
        self.failed_branches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn summary(&self, elapsed: Duration) -> CrawlSummary {
        CrawlSummary {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            records_emitted: self.records_emitted.load(Ordering::Relaxed),
            failed_branches: self.failed_branches.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

/// Parse configured start URLs, failing the run on the first invalid one.
pub(crate) fn parse_start_urls(config: &SiteConfig) -> Result<Vec<Url>, CrawlError> {
    config
        .start_urls
        .iter()
        .map(|raw| {
            Url::parse(raw).map_err(|e| CrawlError::InvalidStartUrl {
                url: raw.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Compile the selector list configured for a role.
pub(crate) fn compile_role(
    config: &SiteConfig,
    site: &str,
    role: &str,
) -> Result<Vec<SelectorExpr>, CrawlError> {
    let list = config.selector_list(role).ok_or_else(|| ConfigError::MissingSelector {
        site: site.to_string(),
        role: role.to_string(),
    })?;
    Ok(SelectorExpr::compile_list(role, &list)?)
}
