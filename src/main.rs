//! Crawl runner: load a site config, run one crawl, write the CSV feed.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracing::info;

use grs_crawler::infrastructure::{config::CrawlMode, export, init_logging_with_config};
use grs_crawler::{
    BrandCrawler, CrawlerSettings, HttpClient, HttpClientConfig, ProductCrawler,
    RootAwareDupeFilter, SiteConfigStore,
};

struct Args {
    mode: CrawlMode,
    site_id: String,
    config_path: String,
    output_path: String,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let usage = "usage: grs-crawler <brands|products> <site-id> <config.json> <output.csv>";

    let mode = match args.next().as_deref() {
        Some("brands") => CrawlMode::BrandListing,
        Some("products") => CrawlMode::ProductListing,
        Some(other) => bail!("unknown mode '{other}'\n{usage}"),
        None => bail!("{usage}"),
    };
    let site_id = args.next().with_context(|| usage.to_string())?;
    let config_path = args.next().with_context(|| usage.to_string())?;
    let output_path = args.next().with_context(|| usage.to_string())?;

    Ok(Args {
        mode,
        site_id,
        config_path,
        output_path,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;

    let settings = CrawlerSettings::default();
    init_logging_with_config(&settings.logging)?;

    // Configuration problems must surface before any network activity.
    let store = SiteConfigStore::load(&args.config_path).await?;
    let site = store.site(&args.site_id)?;
    site.validate_for(&args.site_id, args.mode)?;

    let mut http_config: HttpClientConfig = settings.http.clone();
    if let Some(custom) = &site.custom_settings {
        http_config = http_config.with_header_overrides(&custom.default_request_headers);
    }
    let fetcher = Arc::new(HttpClient::new(http_config)?);
    let dupe_filter = Arc::new(RootAwareDupeFilter::new());

    let summary = match args.mode {
        CrawlMode::BrandListing => {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let crawler = BrandCrawler::new(&args.site_id, site, fetcher, dupe_filter, tx)?;

            let collector = tokio::spawn(async move {
                let mut records = Vec::new();
                while let Some(record) = rx.recv().await {
                    records.push(record);
                }
                records
            });

            let summary = crawler.run().await;
            let records = collector.await.context("record collector failed")?;
            export::write_brand_feed(&args.output_path, &records)?;
            summary
        }
        CrawlMode::ProductListing => {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let crawler = ProductCrawler::new(&args.site_id, site, fetcher, dupe_filter, tx)?;

            let collector = tokio::spawn(async move {
                let mut records = Vec::new();
                while let Some(record) = rx.recv().await {
                    records.push(record);
                }
                records
            });

            let summary = crawler.run().await;
            let records = collector.await.context("record collector failed")?;
            export::write_product_feed(&args.output_path, &records)?;
            summary
        }
    };

    info!(
        "crawl finished for '{}': {} page(s) fetched, {} record(s) emitted, {} failed branch(es) in {:.1?}",
        args.site_id,
        summary.pages_fetched,
        summary.records_emitted,
        summary.failed_branches,
        summary.elapsed
    );

    Ok(())
}
