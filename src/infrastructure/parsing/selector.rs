//! Selector expressions in the site-config dialect.
//!
//! Site configurations write selectors as a CSS selector optionally suffixed
//! with `::text` or `::attr(name)`. The suffix is not CSS; it picks what to
//! extract from the matched elements, so it is split off here before the CSS
//! part is compiled.

use scraper::Selector;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone)]
pub enum SelectorError {
    #[error("invalid CSS selector '{selector}': {reason}")]
    InvalidCss { selector: String, reason: String },

    #[error("selector expression '{0}' has an empty CSS part")]
    EmptyCss(String),

    #[error("no valid selectors compiled for role '{role}': {errors}")]
    NoneCompiled { role: String, errors: String },
}

/// What to pull out of a matched element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extract {
    /// Concatenated text content of the element.
    Text,
    /// A single attribute value.
    Attr(String),
}

/// A compiled selector expression: CSS selector plus extraction suffix.
#[derive(Debug, Clone)]
pub struct SelectorExpr {
    source: String,
    css: Selector,
    extract: Extract,
}

impl SelectorExpr {
    /// Compile an expression such as `a.brand::text` or
    /// `meta[property='brand']::attr(content)`.
    ///
    /// A plain CSS selector without suffix extracts text content.
    pub fn parse(expr: &str) -> Result<Self, SelectorError> {
        let expr = expr.trim();
        let (css_part, extract) = Self::split_suffix(expr);

        if css_part.is_empty() {
            return Err(SelectorError::EmptyCss(expr.to_string()));
        }

        let css = Selector::parse(css_part).map_err(|e| SelectorError::InvalidCss {
            selector: css_part.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            source: expr.to_string(),
            css,
            extract,
        })
    }

    fn split_suffix(expr: &str) -> (&str, Extract) {
        if let Some(css) = expr.strip_suffix("::text") {
            return (css, Extract::Text);
        }
        if let Some(idx) = expr.rfind("::attr(") {
            if let Some(name) = expr[idx + "::attr(".len()..].strip_suffix(')') {
                return (&expr[..idx], Extract::Attr(name.to_string()));
            }
        }
        (expr, Extract::Text)
    }

    /// Compile a list of expressions, keeping the ones that parse.
    ///
    /// Mirrors the tolerant behavior used for multi-fallback selector lists:
    /// individual failures are logged, but an entirely invalid list for a
    /// required role is an error.
    pub fn compile_list(role: &str, exprs: &[String]) -> Result<Vec<Self>, SelectorError> {
        let mut compiled = Vec::new();
        let mut errors = Vec::new();

        for expr in exprs {
            match Self::parse(expr) {
                Ok(sel) => compiled.push(sel),
                Err(e) => {
                    warn!("failed to compile selector '{}' for role '{}': {}", expr, role, e);
                    errors.push(e.to_string());
                }
            }
        }

        if compiled.is_empty() && !exprs.is_empty() {
            return Err(SelectorError::NoneCompiled {
                role: role.to_string(),
                errors: errors.join(", "),
            });
        }

        if !errors.is_empty() {
            debug!("role '{}': {} of {} selectors compiled", role, compiled.len(), exprs.len());
        }

        Ok(compiled)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn css(&self) -> &Selector {
        &self.css
    }

    pub(crate) fn extract(&self) -> &Extract {
        &self.extract
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_suffix_is_split_off() {
        let sel = SelectorExpr::parse("a.brand-link::text").unwrap();
        assert_eq!(sel.extract(), &Extract::Text);
        assert_eq!(sel.source(), "a.brand-link::text");
    }

    #[test]
    fn attr_suffix_names_the_attribute() {
        let sel = SelectorExpr::parse("img::attr(alt)").unwrap();
        assert_eq!(sel.extract(), &Extract::Attr("alt".to_string()));
    }

    #[test]
    fn plain_css_defaults_to_text() {
        let sel = SelectorExpr::parse("span.price").unwrap();
        assert_eq!(sel.extract(), &Extract::Text);
    }

    #[test]
    fn attr_selector_with_quotes_compiles() {
        assert!(SelectorExpr::parse("meta[property='brand']::attr(content)").is_ok());
        assert!(SelectorExpr::parse("a[href*='/brand/']::text").is_ok());
    }

    #[test]
    fn invalid_css_is_rejected() {
        assert!(matches!(
            SelectorExpr::parse("..broken::text"),
            Err(SelectorError::InvalidCss { .. })
        ));
    }

    #[test]
    fn empty_css_part_is_rejected() {
        assert!(matches!(SelectorExpr::parse("::text"), Err(SelectorError::EmptyCss(_))));
    }

    #[test]
    fn compile_list_tolerates_partial_failures() {
        let exprs = vec!["..broken".to_string(), ".brand::text".to_string()];
        let compiled = SelectorExpr::compile_list("brand_selectors", &exprs).unwrap();
        assert_eq!(compiled.len(), 1);
    }

    #[test]
    fn compile_list_fails_when_nothing_compiles() {
        let exprs = vec!["..broken".to_string()];
        assert!(SelectorExpr::compile_list("brand_selectors", &exprs).is_err());
    }
}
