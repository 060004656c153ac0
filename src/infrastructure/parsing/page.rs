//! Fetched-page wrapper for selector evaluation.
//!
//! `Page` couples a parsed HTML document with the URL it was fetched from, so
//! extraction code can evaluate selector expressions and resolve relative
//! links against the right base. `scraper::Html` is not `Send`; callers parse
//! a page, pull everything they need into plain data, and drop it before
//! awaiting anything.

use scraper::Html;
use url::Url;

use super::selector::{Extract, SelectorExpr};

pub struct Page {
    url: Url,
    doc: Html,
}

impl Page {
    pub fn parse(url: Url, body: &str) -> Self {
        Self {
            url,
            doc: Html::parse_document(body),
        }
    }

    /// URL this page was fetched from, after redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// All matches for one expression, in document order.
    ///
    /// Text content is returned as scraped; cleaning happens downstream.
    pub fn select_all(&self, expr: &SelectorExpr) -> Vec<String> {
        self.doc
            .select(expr.css())
            .filter_map(|el| match expr.extract() {
                Extract::Text => Some(el.text().collect::<String>()),
                Extract::Attr(name) => el.value().attr(name).map(str::to_string),
            })
            .collect()
    }

    /// First match for one expression.
    pub fn select_first(&self, expr: &SelectorExpr) -> Option<String> {
        self.doc.select(expr.css()).next().and_then(|el| match expr.extract() {
            Extract::Text => Some(el.text().collect::<String>()),
            Extract::Attr(name) => el.value().attr(name).map(str::to_string),
        })
    }

    /// First non-blank match across an ordered fallback list of expressions.
    pub fn select_first_of(&self, exprs: &[SelectorExpr]) -> Option<String> {
        exprs.iter().find_map(|expr| {
            self.doc.select(expr.css()).find_map(|el| {
                let value = match expr.extract() {
                    Extract::Text => el.text().collect::<String>(),
                    Extract::Attr(name) => el.value().attr(name)?.to_string(),
                };
                (!value.trim().is_empty()).then_some(value)
            })
        })
    }

    /// All matches for the first expression in the list that matches anything.
    pub fn select_all_of(&self, exprs: &[SelectorExpr]) -> Vec<String> {
        for expr in exprs {
            let matches = self.select_all(expr);
            if !matches.is_empty() {
                return matches;
            }
        }
        Vec::new()
    }

    /// Resolve a scraped link to absolute form: pass through when already
    /// absolute, otherwise join against this page's URL.
    pub fn resolve_url(&self, href: &str) -> Result<Url, url::ParseError> {
        let href = href.trim();
        if href.starts_with("http://") || href.starts_with("https://") {
            Url::parse(href)
        } else {
            self.url.join(href)
        }
    }
}
