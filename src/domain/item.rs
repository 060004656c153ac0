//! Output records produced by the crawl engines.
//!
//! Raw items carry fields exactly as scraped; the record pipeline turns them
//! into the final, cleaned records that get emitted.

use serde::Serialize;

/// Brand summary extracted from a brand page in brand-listing mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandRecord {
    pub brand_name: String,
    /// Parsed product count; `None` when the scraped text held no number.
    pub number_of_products: Option<u64>,
}

/// Brand fields as scraped, before pipeline cleaning.
#[derive(Debug, Clone)]
pub struct RawBrandItem {
    pub brand_name: String,
    pub number_of_products: String,
}

/// Product extracted from a detail page in product-listing mode.
///
/// Field declaration order is the CSV column order of the output feed
/// (`product_url, product_description, category, brand, product_name,
/// product_price`); keep it stable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub product_url: String,
    pub product_description: String,
    pub category: String,
    pub brand: String,
    pub product_name: String,
    pub product_price: Option<f64>,
}

/// Product fields as scraped from a detail page, before pipeline cleaning.
///
/// `brand` is already resolved (the resolver needs selector access to the
/// live page, so it runs during extraction, not in the pipeline).
#[derive(Debug, Clone)]
pub struct RawProductItem {
    pub product_url: String,
    pub category: String,
    pub brand: String,
    pub product_name: Option<String>,
    pub product_price: Option<String>,
    pub description_parts: Vec<String>,
}
