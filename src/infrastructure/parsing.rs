//! HTML extraction infrastructure.
//!
//! Selector-expression compilation, page-level selector evaluation, text and
//! number normalization, brand resolution, and the record pipeline. The crawl
//! engines are built entirely on top of this module.

pub mod brand;
pub mod page;
pub mod pipeline;
pub mod selector;
pub mod text;

// Re-export public types
pub use brand::{normalize_brand, BrandResolver, UNKNOWN_BRAND};
pub use page::Page;
pub use pipeline::RecordPipeline;
pub use selector::{Extract, SelectorError, SelectorExpr};
pub use text::{clean_text, extract_integer, extract_price};
