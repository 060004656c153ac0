//! Record pipeline: field-level cleaning between raw extraction and emission.
//!
//! Crawl engines hand raw items over exactly as scraped; this stage applies
//! the shared normalizers so every emitted record is clean regardless of
//! which site it came from.

use crate::domain::{BrandRecord, ProductRecord, RawBrandItem, RawProductItem};

use super::text::{clean_text, extract_integer, extract_price};

pub struct RecordPipeline;

impl RecordPipeline {
    /// Finalize a brand record: clean the name, parse the product count.
    ///
    /// A count that parses negative is treated as absent.
    pub fn process_brand(raw: RawBrandItem) -> BrandRecord {
        BrandRecord {
            brand_name: clean_text(&raw.brand_name),
            number_of_products: extract_integer(&raw.number_of_products)
                .and_then(|n| u64::try_from(n).ok()),
        }
    }

    /// Finalize a product record: clean name and description, parse the price.
    pub fn process_product(raw: RawProductItem) -> ProductRecord {
        ProductRecord {
            product_url: raw.product_url,
            product_description: clean_text(&raw.description_parts.join(" ")),
            category: raw.category,
            brand: raw.brand,
            product_name: clean_text(raw.product_name.as_deref().unwrap_or_default()),
            product_price: raw.product_price.as_deref().and_then(extract_price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_fields_are_cleaned_and_parsed() {
        let record = RecordPipeline::process_brand(RawBrandItem {
            brand_name: "  The\nNorth\tFace  ".to_string(),
            number_of_products: "1,234 products".to_string(),
        });
        assert_eq!(record.brand_name, "The North Face");
        assert_eq!(record.number_of_products, Some(1234));
    }

    #[test]
    fn defaulted_count_parses_to_zero() {
        let record = RecordPipeline::process_brand(RawBrandItem {
            brand_name: "Vans".to_string(),
            number_of_products: "0".to_string(),
        });
        assert_eq!(record.number_of_products, Some(0));
    }

    #[test]
    fn unparseable_count_is_absent() {
        let record = RecordPipeline::process_brand(RawBrandItem {
            brand_name: "Vans".to_string(),
            number_of_products: "coming soon".to_string(),
        });
        assert_eq!(record.number_of_products, None);
    }

    #[test]
    fn product_description_parts_join_with_single_spaces() {
        let record = RecordPipeline::process_product(RawProductItem {
            product_url: "https://shop.example.com/p/1".to_string(),
            category: "shoes".to_string(),
            brand: "Nike".to_string(),
            product_name: Some("  Air \n Max ".to_string()),
            product_price: Some("$1,234.56".to_string()),
            description_parts: vec!["Light.".to_string(), " Fast.\n".to_string()],
        });
        assert_eq!(record.product_name, "Air Max");
        assert_eq!(record.product_description, "Light. Fast.");
        assert_eq!(record.product_price, Some(1234.56));
    }

    #[test]
    fn missing_name_and_price_stay_empty_and_absent() {
        let record = RecordPipeline::process_product(RawProductItem {
            product_url: "https://shop.example.com/p/2".to_string(),
            category: "shoes".to_string(),
            brand: "unknown_brand".to_string(),
            product_name: None,
            product_price: None,
            description_parts: Vec::new(),
        });
        assert_eq!(record.product_name, "");
        assert_eq!(record.product_price, None);
    }
}
