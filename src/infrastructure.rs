//! Infrastructure layer: configuration, HTTP, parsing, dedup, logging, feeds.

pub mod config;
pub mod dupe_filter;
pub mod export;
pub mod http_client;
pub mod logging;
pub mod parsing;

// Re-export commonly used items
pub use config::{
    ConfigError, CrawlMode, CrawlerSettings, LoggingConfig, SelectorSpec, SiteConfig,
    SiteConfigStore,
};
pub use dupe_filter::RootAwareDupeFilter;
pub use http_client::{FetchError, Fetcher, HttpClient, HttpClientConfig};
pub use logging::{init_logging, init_logging_with_config};
pub use parsing::{BrandResolver, Page, RecordPipeline, SelectorError, SelectorExpr};
