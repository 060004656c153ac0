//! Product-listing crawl engine.
//!
//! Traversal: start URLs -> listing pages -> product detail pages (terminal),
//! with a listing -> listing self-loop for pagination. Pagination is bounded
//! by the site's own link structure plus the duplicate filter; there is no
//! depth cap at this layer.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, warn};
use url::Url;

use crate::domain::{ProductRecord, RawProductItem};
use crate::infrastructure::config::{roles, CrawlMode, SiteConfig};
use crate::infrastructure::dupe_filter::RootAwareDupeFilter;
use crate::infrastructure::http_client::Fetcher;
use crate::infrastructure::parsing::{BrandResolver, Page, RecordPipeline, SelectorExpr};

use super::{compile_role, parse_start_urls, CrawlContext, CrawlError, CrawlStats, CrawlSummary};

pub struct ProductCrawler {
    site_id: String,
    category: String,
    start_urls: Vec<Url>,
    product_links: Vec<SelectorExpr>,
    product_name: Vec<SelectorExpr>,
    product_price: Vec<SelectorExpr>,
    product_description: Vec<SelectorExpr>,
    /// Empty when the site configures no pagination.
    next_page: Vec<SelectorExpr>,
    resolver: BrandResolver,
    fetcher: Arc<dyn Fetcher>,
    dupe_filter: Arc<RootAwareDupeFilter>,
    sink: UnboundedSender<ProductRecord>,
    stats: CrawlStats,
}

/// Plain data lifted out of a listing page before fan-out.
struct ListingExtract {
    detail_urls: Vec<Url>,
    listing_brand: Option<String>,
    next: Option<Url>,
}

impl ProductCrawler {
    pub fn new(
        site_id: &str,
        config: &SiteConfig,
        fetcher: Arc<dyn Fetcher>,
        dupe_filter: Arc<RootAwareDupeFilter>,
        sink: UnboundedSender<ProductRecord>,
    ) -> Result<Self, CrawlError> {
        config.validate_for(site_id, CrawlMode::ProductListing)?;

        let next_page = match config.selector_list(roles::NEXT_PAGE) {
            Some(list) => SelectorExpr::compile_list(roles::NEXT_PAGE, &list)?,
            None => Vec::new(),
        };
        let resolver = BrandResolver::new(
            config.selector_list(roles::BRAND_SELECTORS).as_deref(),
            config.selector_list(roles::LISTING_BRAND_SELECTORS).as_deref(),
        )?;

        Ok(Self {
            site_id: site_id.to_string(),
            category: config.category(),
            start_urls: parse_start_urls(config)?,
            product_links: compile_role(config, site_id, roles::PRODUCT_LINKS)?,
            product_name: compile_role(config, site_id, roles::PRODUCT_NAME)?,
            product_price: compile_role(config, site_id, roles::PRODUCT_PRICE)?,
            product_description: compile_role(config, site_id, roles::PRODUCT_DESCRIPTION)?,
            next_page,
            resolver,
            fetcher,
            dupe_filter,
            sink,
            stats: CrawlStats::default(),
        })
    }

    /// Crawl every configured start URL to completion, pagination included.
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
            listings.spawn(Arc::clone(&this).crawl_listing(url.clone()));
        }

        while let Some(joined) = listings.join_next().await {
            if let Err(e) = joined {
                error!("[{}] listing branch aborted: {}", this.site_id, e);
                this.stats.branch_failed();
            }
        }

        this.stats.summary(started.elapsed())
    }

    /// One listing page: fan out detail fetches, then follow the next-page
    /// link back into this function. Boxed for the recursion.
    fn crawl_listing(self: Arc<Self>, url: Url) -> BoxFuture<'static, ()> {
        async move {
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
            let extract = {
                let page = Page::parse(url.clone(), &body);
                self.parse_listing(&page)
            };

            let context = CrawlContext::new(self.category.clone())
                .with_listing_brand(extract.listing_brand);

            let mut children = JoinSet::new();
            for detail_url in extract.detail_urls {
                if !self.dupe_filter.should_visit(&detail_url) {
                    debug!("[{}] duplicate product page skipped: {}", self.site_id, detail_url);
                    continue;
                }
                let this = Arc::clone(&self);
                let context = context.clone();
                children.spawn(async move { this.crawl_detail(detail_url, context).await });
            }

            if let Some(next) = extract.next {
                if self.dupe_filter.should_visit(&next) {
                    debug!("[{}] following pagination to {}", self.site_id, next);
                    children.spawn(Arc::clone(&self).crawl_listing(next));
                }
            }

            while let Some(joined) = children.join_next().await {
                if let Err(e) = joined {
                    error!("[{}] branch aborted below {}: {}", self.site_id, url, e);
                    self.stats.branch_failed();
                }
            }
        }
        .boxed()
    }

    fn parse_listing(&self, page: &Page) -> ListingExtract {
        let mut detail_urls = Vec::new();
        for href in page.select_all_of(&self.product_links) {
            let href = href.trim();
            // An empty scraped link yields no request.
            if href.is_empty() {
                continue;
            }
            match page.resolve_url(href) {
                Ok(url) => detail_urls.push(url),
                Err(e) => {
                    warn!(
                        "[{}] skipping product link '{}' on {}: {}",
                        self.site_id,
                        href,
                        page.url(),
                        e
                    );
                    self.stats.branch_failed();
                }
            }
        }

        let next = page.select_first_of(&self.next_page).and_then(|href| {
            match page.resolve_url(href.trim()) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(
                        "[{}] unusable next-page link '{}' on {}: {}",
                        self.site_id,
                        href.trim(),
                        page.url(),
                        e
                    );
                    None
                }
            }
        });

        ListingExtract {
            detail_urls,
            listing_brand: self.resolver.extract_from_listing(page),
            next,
        }
    }

    async fn crawl_detail(self: Arc<Self>, url: Url, context: CrawlContext) {
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
            let product_name = page.select_first_of(&self.product_name);
            let brand = self.resolver.resolve(
                &page,
                context.listing_page_brand.as_deref(),
                product_name.as_deref(),
            );
            RawProductItem {
                product_url: page.url().to_string(),
                category: context.category,
                brand,
                product_name,
                product_price: page.select_first_of(&self.product_price),
                description_parts: page.select_all_of(&self.product_description),
            }
        };

        let record = RecordPipeline::process_product(item);
        if self.sink.send(record).is_err() {
            debug!("[{}] record sink closed, dropping record", self.site_id);
            return;
        }
        self.stats.record_emitted();
    }
}
