//! End-to-end product-listing crawls against an in-memory fetcher.

mod common;

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;

use grs_crawler::{CrawlSummary, ProductCrawler, ProductRecord, RootAwareDupeFilter};

use common::{site_config, StaticFetcher};

fn product_config(extra_selectors: serde_json::Value) -> grs_crawler::SiteConfig {
    let mut selectors = json!({
        "product_links": "a.p::attr(href)",
        "product_name": "h1::text",
        "product_price": ".price::text",
        "product_description": ".desc::text"
    });
    if let (Some(base), Some(extra)) = (selectors.as_object_mut(), extra_selectors.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    site_config(json!({
        "start_urls": ["https://shop.test/cat"],
        "selectors": selectors,
        "categories": "sneakers"
    }))
}

async fn run_crawl(
    config: &grs_crawler::SiteConfig,
    fetcher: Arc<StaticFetcher>,
) -> (Vec<ProductRecord>, CrawlSummary) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let crawler =
        ProductCrawler::new("shop", config, fetcher, Arc::new(RootAwareDupeFilter::new()), tx)
            .unwrap();

    // `run` consumes the crawler, so the channel closes when it returns.
    let summary = crawler.run().await;

    let mut records = Vec::new();
    while let Some(record) = rx.recv().await {
        records.push(record);
    }
    records.sort_by(|a, b| a.product_url.cmp(&b.product_url));
    (records, summary)
}

const DETAIL_ONE: &str = r#"
    <h1>  Air
        Zoom </h1>
    <span class="price">$1,234.56</span>
    <p class="desc">Light.</p><p class="desc">Fast.</p>
"#;

const DETAIL_TWO: &str = r#"
    <h1>Court Classic</h1>
    <span class="price">€99,90</span>
    <p class="desc">Timeless.</p>
"#;

#[tokio::test]
async fn detail_pages_become_cleaned_records() {
    let fetcher = Arc::new(StaticFetcher::new(&[
        ("https://shop.test/cat", r#"<a class="p" href="/p/1">x</a>"#),
        ("https://shop.test/p/1", DETAIL_ONE),
    ]));

    let (records, summary) = run_crawl(&product_config(json!({})), fetcher).await;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.product_url, "https://shop.test/p/1");
    assert_eq!(record.category, "sneakers");
    assert_eq!(record.product_name, "Air Zoom");
    assert_eq!(record.product_price, Some(1234.56));
    assert_eq!(record.product_description, "Light. Fast.");
    // No brand element anywhere, so the product name's first token stands in.
    assert_eq!(record.brand, "Air");
    assert_eq!(summary.records_emitted, 1);
}

#[tokio::test]
async fn pagination_follows_next_links_and_terminates() {
    let config = product_config(json!({ "next_page": "a[rel='next']::attr(href)" }));
    let fetcher = Arc::new(StaticFetcher::new(&[
        (
            "https://shop.test/cat",
            r#"<a class="p" href="/p/1">x</a><a rel="next" href="/cat?page=2">next</a>"#,
        ),
        (
            "https://shop.test/cat?page=2",
            r#"<a class="p" href="/p/2">y</a>"#,
        ),
        ("https://shop.test/p/1", DETAIL_ONE),
        ("https://shop.test/p/2", DETAIL_TWO),
    ]));

    let (records, summary) = run_crawl(&config, Arc::clone(&fetcher)).await;

    assert_eq!(records.len(), 2);
    assert_eq!(fetcher.hits("https://shop.test/cat"), 1);
    assert_eq!(fetcher.hits("https://shop.test/cat?page=2"), 1);
    // Last page has no next link: exactly four fetches in total.
    assert_eq!(fetcher.total_hits(), 4);
    assert_eq!(summary.pages_fetched, 4);
}

#[tokio::test]
async fn without_next_page_selector_no_pagination_happens() {
    let fetcher = Arc::new(StaticFetcher::new(&[
        (
            "https://shop.test/cat",
            r#"<a class="p" href="/p/1">x</a><a rel="next" href="/cat?page=2">next</a>"#,
        ),
        ("https://shop.test/p/1", DETAIL_ONE),
    ]));

    let (records, _) = run_crawl(&product_config(json!({})), Arc::clone(&fetcher)).await;

    assert_eq!(records.len(), 1);
    assert_eq!(fetcher.hits("https://shop.test/cat?page=2"), 0);
}

#[tokio::test]
async fn one_failing_detail_branch_leaves_siblings_unaffected() {
    let fetcher = Arc::new(StaticFetcher::new(&[
        (
            "https://shop.test/cat",
            r#"<a class="p" href="/p/1">x</a><a class="p" href="/p/404">y</a>"#,
        ),
        ("https://shop.test/p/1", DETAIL_ONE),
        // /p/404 has no page: its fetch fails.
    ]));

    let (records, summary) = run_crawl(&product_config(json!({})), fetcher).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].product_url, "https://shop.test/p/1");
    assert_eq!(summary.failed_branches, 1);
}

#[tokio::test]
async fn listing_brand_is_forwarded_and_wins_over_detail_selectors() {
    let config = product_config(json!({
        "brand_selectors": [".product-brand::text"],
        "listing_brand_selectors": [".listing-brand::text"]
    }));
    let fetcher = Arc::new(StaticFetcher::new(&[
        (
            "https://shop.test/cat",
            r#"<span class="listing-brand">Nike</span><a class="p" href="/p/1">x</a>"#,
        ),
        (
            "https://shop.test/p/1",
            r#"<h1>Air Zoom</h1><span class="product-brand">Adidas</span>
               <span class="price">10</span><p class="desc">d</p>"#,
        ),
    ]));

    let (records, _) = run_crawl(&config, fetcher).await;
    assert_eq!(records[0].brand, "Nike");
}

#[tokio::test]
async fn detail_brand_selector_applies_when_listing_has_none() {
    let config = product_config(json!({
        "brand_selectors": [".product-brand::text"],
        "listing_brand_selectors": [".listing-brand::text"]
    }));
    let fetcher = Arc::new(StaticFetcher::new(&[
        ("https://shop.test/cat", r#"<a class="p" href="/p/1">x</a>"#),
        (
            "https://shop.test/p/1",
            r#"<h1>Air Zoom</h1><span class="product-brand">Adidas®</span>
               <span class="price">10</span><p class="desc">d</p>"#,
        ),
    ]));

    let (records, _) = run_crawl(&config, fetcher).await;
    assert_eq!(records[0].brand, "Adidas");
}

#[tokio::test]
async fn duplicate_product_links_are_fetched_once() {
    let config = product_config(json!({ "next_page": "a[rel='next']::attr(href)" }));
    let fetcher = Arc::new(StaticFetcher::new(&[
        (
            "https://shop.test/cat",
            r#"<a class="p" href="/p/1">x</a><a rel="next" href="/cat?page=2">next</a>"#,
        ),
        (
            "https://shop.test/cat?page=2",
            r#"<a class="p" href="/p/1">x again</a>"#,
        ),
        ("https://shop.test/p/1", DETAIL_ONE),
    ]));

    let (records, _) = run_crawl(&config, Arc::clone(&fetcher)).await;

    assert_eq!(records.len(), 1);
    assert_eq!(fetcher.hits("https://shop.test/p/1"), 1);
}

#[tokio::test]
async fn empty_hrefs_yield_no_requests() {
    let fetcher = Arc::new(StaticFetcher::new(&[(
        "https://shop.test/cat",
        r#"<a class="p" href="">x</a><a class="p" href="  ">y</a>"#,
    )]));

    let (records, summary) = run_crawl(&product_config(json!({})), Arc::clone(&fetcher)).await;

    assert!(records.is_empty());
    assert_eq!(fetcher.total_hits(), 1);
    assert_eq!(summary.failed_branches, 0);
}
