//! Shared test fixtures: an in-memory fetcher and config builders.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use grs_crawler::{FetchError, Fetcher, SiteConfig};

/// Serves pages from a static URL -> HTML map and counts fetches per URL.
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    hits: Mutex<HashMap<String, usize>>,
}

impl StaticFetcher {
    pub fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.to_string()))
                .collect(),
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_default() += 1;
        self.pages.get(url).cloned().ok_or_else(|| FetchError::NotFound {
            url: url.to_string(),
        })
    }
}

pub fn site_config(json: serde_json::Value) -> SiteConfig {
    serde_json::from_value(json).expect("valid site config fixture")
}
