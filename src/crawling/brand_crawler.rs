//! Brand-listing crawl engine.
//!
//! Traversal: start URLs -> brand listing page -> brand pages (terminal).
//! A listing page yields two parallel selector sequences, brand URLs and
//! brand names, zipped positionally. When a follow-up request cannot be
//! built for a pair, the listing page itself stands in as that pair's brand
//! page instead of failing the branch.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, warn};
use url::Url;

use crate::domain::{BrandRecord, RawBrandItem};
use crate::infrastructure::config::{roles, CrawlMode, SiteConfig};
use crate::infrastructure::dupe_filter::RootAwareDupeFilter;
use crate::infrastructure::http_client::Fetcher;
use crate::infrastructure::parsing::{Page, RecordPipeline, SelectorExpr};

use super::{compile_role, parse_start_urls, CrawlError, CrawlStats, CrawlSummary};

pub struct BrandCrawler {
    site_id: String,
    start_urls: Vec<Url>,
    brand_urls: Vec<SelectorExpr>,
    brand_names: Vec<SelectorExpr>,
    product_count: Vec<SelectorExpr>,
    fetcher: Arc<dyn Fetcher>,
    dupe_filter: Arc<RootAwareDupeFilter>,
    sink: UnboundedSender<BrandRecord>,
    stats: CrawlStats,
}

/// Outcome of building one follow-up request from a listing pair.
enum BrandLink {
    Follow { url: Url, brand_name: String },
    /// Request construction failed; the listing page acts as the brand page.
    Fallback { item: RawBrandItem },
}

impl BrandCrawler {
    pub fn new(
        site_id: &str,
        config: &SiteConfig,
        fetcher: Arc<dyn Fetcher>,
        dupe_filter: Arc<RootAwareDupeFilter>,
        sink: UnboundedSender<BrandRecord>,
    ) -> Result<Self, CrawlError> {
        config.validate_for(site_id, CrawlMode::BrandListing)?;

        Ok(Self {
            site_id: site_id.to_string(),
            start_urls: parse_start_urls(config)?,
            brand_urls: compile_role(config, site_id, roles::SITE_BRANDS_URLS)?,
            brand_names: compile_role(config, site_id, roles::SITE_BRANDS_NAMES)?,
            product_count: compile_role(config, site_id, roles::NUMBER_OF_PRODUCTS)?,
            fetcher,
            dupe_filter,
            sink,
            stats: CrawlStats::default(),
        })
    }

    /// Crawl every configured start URL to completion.
    ///
    /// Consumes the crawler, so the record sink closes as soon as the run
    /// finishes and the last task handle drops.
    pub async fn run(self) -> CrawlSummary {
        let started = Instant::now();
        let this = Arc::new(self);

        let mut listings = JoinSet::new();
        for url in &this.start_urls {
            if !this.dupe_filter.should_visit(url) {
                debug!("[{}] start URL already visited: {}", this.site_id, url);
                continue;
            }
            let handle = Arc::clone(&this);
            let url = url.clone();
            listings.spawn(async move { handle.crawl_listing(url).await });
        }

        while let Some(joined) = listings.join_next().await {
            if let Err(e) = joined {
                error!("[{}] listing branch aborted: {}", this.site_id, e);
                this.stats.branch_failed();
            }
        }

        this.stats.summary(started.elapsed())
    }

    async fn crawl_listing(self: Arc<Self>, url: Url) {
        let body = match self.fetcher.fetch(url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                warn!("[{}] request failed: {} - {}", self.site_id, url, e);
                self.stats.branch_failed();
                return;
            }
        };
        self.stats.page_fetched();

        // Extract everything as plain data before any await: Html is not Send.
        let links = {
            let page = Page::parse(url.clone(), &body);
            self.parse_listing(&page)
        };

        let mut brands = JoinSet::new();
        for link in links {
            match link {
                BrandLink::Fallback { item } => self.emit(item),
                BrandLink::Follow { url, brand_name } => {
                    if !self.dupe_filter.should_visit(&url) {
                        debug!("[{}] duplicate brand page skipped: {}", self.site_id, url);
                        continue;
                    }
                    let this = Arc::clone(&self);
                    brands.spawn(async move { this.crawl_brand_page(url, brand_name).await });
                }
            }
        }

        while let Some(joined) = brands.join_next().await {
            if let Err(e) = joined {
                error!("[{}] brand branch aborted: {}", self.site_id, e);
                self.stats.branch_failed();
            }
        }
    }

    /// Zip the URL and name sequences positionally. Unequal lengths are not
    /// an error: the longer sequence's tail is dropped, as the deployed
    /// configs rely on.
    fn parse_listing(&self, page: &Page) -> Vec<BrandLink> {
        let urls = page.select_all_of(&self.brand_urls);
        let names = page.select_all_of(&self.brand_names);

        if urls.len() != names.len() {
            debug!(
                "[{}] {}: {} brand URLs vs {} names, zipping to the shorter",
                self.site_id,
                page.url(),
                urls.len(),
                names.len()
            );
        }

        urls.iter()
            .zip(names.iter())
            .map(|(href, name)| match page.resolve_url(href) {
                Ok(url) => BrandLink::Follow {
                    url,
                    brand_name: name.clone(),
                },
                Err(e) => {
                    warn!(
                        "[{}] cannot build brand request from '{}' on {}: {}; treating listing page as brand page",
                        self.site_id,
                        href.trim(),
                        page.url(),
                        e
                    );
                    BrandLink::Fallback {
                        item: Self::extract_brand_item(&self.product_count, page, name.clone()),
                    }
                }
            })
            .collect()
    }

    async fn crawl_brand_page(self: Arc<Self>, url: Url, brand_name: String) {
        let body = match self.fetcher.fetch(url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                warn!("[{}] request failed: {} - {}", self.site_id, url, e);
                self.stats.branch_failed();
                return;
            }
        };
        self.stats.page_fetched();

        let item = {
            let page = Page::parse(url, &body);
            Self::extract_brand_item(&self.product_count, &page, brand_name)
        };
        self.emit(item);
    }

    fn extract_brand_item(
        product_count: &[SelectorExpr],
        page: &Page,
        brand_name: String,
    ) -> RawBrandItem {
        let number_of_products = page
            .select_first_of(product_count)
            .unwrap_or_else(|| "0".to_string());
        RawBrandItem {
            brand_name,
            number_of_products,
        }
    }

    fn emit(&self, item: RawBrandItem) {
        let record = RecordPipeline::process_brand(item);
        if self.sink.send(record).is_err() {
            debug!("[{}] record sink closed, dropping record", self.site_id);
            return;
        }
        self.stats.record_emitted();
    }
}
