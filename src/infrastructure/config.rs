//! Configuration infrastructure
//!
//! Two layers of configuration:
//! 1. Per-site crawl configuration (start URLs + selector roles), loaded from
//!    a JSON document keyed by site identifier. The document path is passed
//!    explicitly at load time; nothing is resolved relative to the executable.
//! 2. Crawler-wide settings (HTTP behavior, logging), with sane defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Selector roles in the site-config document.
pub mod roles {
    /// Brand-listing mode: links to brand pages.
    pub const SITE_BRANDS_URLS: &str = "site-brands-URLs";
    /// Brand-listing mode: brand names paired positionally with the links.
    pub const SITE_BRANDS_NAMES: &str = "site-brands-names";
    /// Brand-listing mode: product count on a brand page.
    pub const NUMBER_OF_PRODUCTS: &str = "number-of-products";

    /// Product-listing mode: links to product detail pages.
    pub const PRODUCT_LINKS: &str = "product_links";
    /// Product-listing mode: product name on a detail page.
    pub const PRODUCT_NAME: &str = "product_name";
    /// Product-listing mode: price text on a detail page.
    pub const PRODUCT_PRICE: &str = "product_price";
    /// Product-listing mode: description fragments on a detail page.
    pub const PRODUCT_DESCRIPTION: &str = "product_description";
    /// Product-listing mode, optional: next-page link on a listing page.
    pub const NEXT_PAGE: &str = "next_page";
    /// Product-listing mode, optional: brand element fallbacks on detail pages.
    pub const BRAND_SELECTORS: &str = "brand_selectors";
    /// Product-listing mode, optional: brand element on listing pages.
    pub const LISTING_BRAND_SELECTORS: &str = "listing_brand_selectors";
}

/// Which traversal the orchestrator runs for a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    BrandListing,
    ProductListing,
}

impl CrawlMode {
    /// Selector roles a site config must define for this mode.
    pub fn required_roles(self) -> &'static [&'static str] {
        match self {
            Self::BrandListing => &[
                roles::SITE_BRANDS_URLS,
                roles::SITE_BRANDS_NAMES,
                roles::NUMBER_OF_PRODUCTS,
            ],
            Self::ProductListing => &[
                roles::PRODUCT_LINKS,
                roles::PRODUCT_NAME,
                roles::PRODUCT_PRICE,
                roles::PRODUCT_DESCRIPTION,
            ],
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("site '{site}' not found in configuration")]
    NotFound { site: String },

    #[error("could not read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration is malformed: {message}")]
    Malformed { message: String },

    #[error("site '{site}' is missing required selector '{role}'")]
    MissingSelector { site: String, role: String },
}

/// A selector role maps to one expression or an ordered fallback list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorSpec {
    One(String),
    Many(Vec<String>),
}

impl SelectorSpec {
    /// View as an ordered list regardless of which form the config used.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            Self::One(expr) => vec![expr.clone()],
            Self::Many(exprs) => exprs.clone(),
        }
    }
}

/// Per-site settings overriding crawler-wide defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomSettings {
    /// Outbound header overrides, e.g. `User-Agent` or `Accept-Language`.
    #[serde(default)]
    pub default_request_headers: HashMap<String, String>,

    /// Settings this engine does not interpret; kept so configs round-trip.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// One site's crawl configuration. Read-only after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub start_urls: Vec<String>,
    pub selectors: HashMap<String, SelectorSpec>,

    /// Category tag carried onto every product record for this site.
    #[serde(default)]
    pub categories: Option<String>,

    #[serde(default)]
    pub custom_settings: Option<CustomSettings>,
}

impl SiteConfig {
    /// Selector list for a role, when configured.
    pub fn selector_list(&self, role: &str) -> Option<Vec<String>> {
        self.selectors.get(role).map(SelectorSpec::as_list)
    }

    /// Category for this site, defaulting like the feed expects.
    pub fn category(&self) -> String {
        self.categories.clone().unwrap_or_else(|| "uncategorized".to_string())
    }

    /// Check that every selector the given mode needs is present.
    pub fn validate_for(&self, site: &str, mode: CrawlMode) -> Result<(), ConfigError> {
        for role in mode.required_roles() {
            if !self.selectors.contains_key(*role) {
                return Err(ConfigError::MissingSelector {
                    site: site.to_string(),
                    role: (*role).to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Loads and serves per-site configurations from one JSON document.
#[derive(Debug, Clone)]
pub struct SiteConfigStore {
    sites: HashMap<String, SiteConfig>,
}

impl SiteConfigStore {
    /// Load and parse the whole document. Call once per crawl run.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let sites: HashMap<String, SiteConfig> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Malformed {
                message: format!("{} ({})", e, path.display()),
            })?;

        info!("loaded {} site configuration(s) from {}", sites.len(), path.display());
        Ok(Self { sites })
    }

    /// Configuration for one site.
    pub fn site(&self, site_id: &str) -> Result<&SiteConfig, ConfigError> {
        self.sites.get(site_id).ok_or_else(|| ConfigError::NotFound {
            site: site_id.to_string(),
        })
    }

    pub fn site_ids(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }
}

/// Crawler-wide logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter when `RUST_LOG` is unset.
    pub level: String,

    /// Also write a non-blocking rolling log file.
    pub log_to_file: bool,

    /// Explicit log directory, required when `log_to_file` is set.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
            log_dir: None,
        }
    }
}

/// Crawler-wide settings: HTTP behavior plus logging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlerSettings {
    #[serde(default)]
    pub http: crate::infrastructure::http_client::HttpClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}
