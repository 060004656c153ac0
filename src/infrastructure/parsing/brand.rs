//! Brand resolution across multiple page sources.
//!
//! Brand names show up in different places depending on the site: forwarded
//! listing metadata, a dedicated element on the detail page, image alt text,
//! or the product name itself. The resolver walks those sources in priority
//! order and normalizes whichever candidate wins.

use once_cell::sync::Lazy;

use super::page::Page;
use super::selector::{SelectorError, SelectorExpr};

/// Sentinel emitted when no source yields a brand.
pub const UNKNOWN_BRAND: &str = "unknown_brand";

const DEFAULT_BRAND_SELECTORS: &[&str] = &[
    "a[href*='/brand/']::text",
    ".product-brand::text",
    "span.brand::text",
    "meta[property='brand']::attr(content)",
];

const DEFAULT_LISTING_BRAND_SELECTORS: &[&str] = &[
    "a[href*='/brand/']::text",
    ".listing-brand::text",
];

static IMAGE_ALT: Lazy<Option<SelectorExpr>> =
    Lazy::new(|| SelectorExpr::parse("img::attr(alt)").ok());

/// Prioritized multi-source brand lookup.
///
/// Resolution order, first non-empty candidate wins:
/// 1. brand forwarded from the listing page,
/// 2. dedicated brand selectors on the detail page,
/// 3. image alt text (first token when multi-word),
/// 4. first token of the product name,
/// 5. [`UNKNOWN_BRAND`].
///
/// Every candidate passes through [`normalize_brand`] before acceptance; a
/// candidate that normalizes to empty falls through to the next source.
pub struct BrandResolver {
    brand_selectors: Vec<SelectorExpr>,
    listing_brand_selectors: Vec<SelectorExpr>,
}

impl BrandResolver {
    /// Build a resolver from configured selector lists, falling back to the
    /// defaults for whichever list a site leaves unconfigured.
    pub fn new(
        brand_selectors: Option<&[String]>,
        listing_brand_selectors: Option<&[String]>,
    ) -> Result<Self, SelectorError> {
        let brand = match brand_selectors {
            Some(exprs) => SelectorExpr::compile_list("brand_selectors", exprs)?,
            None => Self::compile_defaults(DEFAULT_BRAND_SELECTORS),
        };
        let listing = match listing_brand_selectors {
            Some(exprs) => SelectorExpr::compile_list("listing_brand_selectors", exprs)?,
            None => Self::compile_defaults(DEFAULT_LISTING_BRAND_SELECTORS),
        };

        Ok(Self {
            brand_selectors: brand,
            listing_brand_selectors: listing,
        })
    }

    fn compile_defaults(exprs: &[&str]) -> Vec<SelectorExpr> {
        exprs.iter().filter_map(|e| SelectorExpr::parse(e).ok()).collect()
    }

    /// Resolve the brand for a product detail page.
    pub fn resolve(
        &self,
        page: &Page,
        forwarded_brand: Option<&str>,
        product_name: Option<&str>,
    ) -> String {
        if let Some(brand) = forwarded_brand.and_then(accept) {
            return brand;
        }

        if let Some(brand) = page.select_first_of(&self.brand_selectors).as_deref().and_then(accept) {
            return brand;
        }

        if let Some(alt) = IMAGE_ALT.as_ref().and_then(|sel| page.select_first(sel)) {
            let alt = alt.trim();
            let candidate = match alt.split_whitespace().nth(1) {
                Some(_) => alt.split_whitespace().next().unwrap_or(alt),
                None => alt,
            };
            if let Some(brand) = accept(candidate) {
                return brand;
            }
        }

        if let Some(brand) = product_name
            .and_then(|name| name.split_whitespace().next())
            .and_then(accept)
        {
            return brand;
        }

        UNKNOWN_BRAND.to_string()
    }

    /// Extract a brand from a product listing page, if it exposes one.
    pub fn extract_from_listing(&self, page: &Page) -> Option<String> {
        page.select_first_of(&self.listing_brand_selectors)
            .as_deref()
            .and_then(accept)
    }
}

fn accept(candidate: &str) -> Option<String> {
    let normalized = normalize_brand(candidate);
    (!normalized.is_empty()).then_some(normalized)
}

/// Trim, strip trademark/registration glyphs and trailing colon/hyphen
/// characters, then trim again.
pub fn normalize_brand(raw: &str) -> String {
    let stripped = raw.replace(['®', '™'], "");
    stripped
        .trim()
        .trim_end_matches([':', '-'])
        .trim()
        .to_string()
}
