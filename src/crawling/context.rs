//! Per-request context bags.

/// Ephemeral context propagated from a listing request to the requests and
/// records it spawns; not persisted beyond the traversal step consuming it.
#[derive(Debug, Clone)]
pub struct CrawlContext {
    /// Category tag configured for the site, carried onto every record.
    pub category: String,

    /// Brand extracted from the listing page, when it exposes one.
    pub listing_page_brand: Option<String>,
}

impl CrawlContext {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            listing_page_brand: None,
        }
    }

    pub fn with_listing_brand(mut self, brand: Option<String>) -> Self {
        self.listing_page_brand = brand;
        self
    }
}
