//! CSV output feeds.
//!
//! Row-oriented UTF-8 output with overwrite-on-run semantics. Product columns
//! are `product_url, product_description, category, brand, product_name,
//! product_price` (the record's serde field order); keep that order if this
//! sink is ever reimplemented.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::domain::{BrandRecord, ProductRecord};

pub fn write_brand_feed(path: impl AsRef<Path>, records: &[BrandRecord]) -> Result<usize> {
    write_feed(path.as_ref(), records)
}

pub fn write_product_feed(path: impl AsRef<Path>, records: &[ProductRecord]) -> Result<usize> {
    write_feed(path.as_ref(), records)
}

fn write_feed<T: serde::Serialize>(path: &Path, records: &[T]) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to open output feed {}", path.display()))?;

    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("failed to write record to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush output feed {}", path.display()))?;

    info!("wrote {} record(s) to {}", records.len(), path.display());
    Ok(records.len())
}
