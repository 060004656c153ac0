//! Domain module - crawl output records
//!
//! Contains the record types the crawl engines emit and the raw item types
//! that precede pipeline cleaning.

pub mod item;

// Re-export commonly used items for convenience
pub use item::{BrandRecord, ProductRecord, RawBrandItem, RawProductItem};
