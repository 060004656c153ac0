//! GRS Crawler - config-driven e-commerce brand/product crawling engine
//!
//! One generic traversal engine per mode, driven entirely by per-site JSON
//! selector configurations: brand-listing mode walks brand listing pages and
//! emits brand records; product-listing mode paginates product listings,
//! visits detail pages, and emits cleaned product records.

// Module declarations
pub mod crawling;
pub mod domain;
pub mod infrastructure;

// Re-export the main entry points
pub use crawling::{BrandCrawler, CrawlContext, CrawlError, CrawlSummary, ProductCrawler};
pub use domain::{BrandRecord, ProductRecord};
pub use infrastructure::config::{CrawlMode, CrawlerSettings, SiteConfig, SiteConfigStore};
pub use infrastructure::dupe_filter::RootAwareDupeFilter;
pub use infrastructure::http_client::{FetchError, Fetcher, HttpClient, HttpClientConfig};
