//! Text normalization for scraped fields.
//!
//! One regex-and-normalize pass shared across all sites: scraped text comes
//! with currency symbols, locale separators, and markup artifacts, and these
//! helpers turn it into clean strings and numbers without per-site code.
//! Parse failures are absent values, never errors.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));
static HEX_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[xX][0-9a-fA-F]+").expect("static regex"));
static OCTAL_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[0-7]{1,3}").expect("static regex"));
static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[-+]?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?").expect("static regex")
});

/// Collapse whitespace runs to single spaces, drop `\xHH` / `\OOO` escape
/// artifacts left by upstream extraction, and trim. Idempotent.
pub fn clean_text(raw: &str) -> String {
    let mut text = raw.replace(['\n', '\t', '\r'], " ");

    // Removing one artifact can butt a stray backslash against the next
    // hex/octal sequence, so strip to a fixpoint.
    loop {
        let stripped = HEX_ESCAPE.replace_all(&text, "");
        let stripped = OCTAL_ESCAPE.replace_all(&stripped, "").into_owned();
        if stripped == text {
            break;
        }
        text = stripped;
    }

    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}

/// First signed decimal number in the text, with optional comma
/// thousands-grouping and optional fraction. Truncates toward zero, so
/// `"1,234.9 products"` yields 1234. `None` when no numeric substring exists.
pub fn extract_integer(raw: &str) -> Option<i64> {
    let matched = NUMBER.find(raw)?;
    let digits = matched.as_str().replace(',', "");
    let value: f64 = digits.parse().ok()?;
    Some(value.trunc() as i64)
}

/// Parse a price out of noisy text: keep digits plus `,` and `.`, map `,` to
/// the decimal point, and treat every dot but the last as a grouping
/// separator. `"$1,234.56"` yields 1234.56 and `"€99,90"` yields 99.90.
/// `None` when the cleaned string does not parse.
pub fn extract_price(raw: &str) -> Option<f64> {
    let kept: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.').collect();
    let dotted = kept.replace(',', ".");

    let parseable = match dotted.rfind('.') {
        Some(last) if dotted.matches('.').count() > 1 => {
            let mut s = String::with_capacity(dotted.len());
            for (i, c) in dotted.char_indices() {
                if c != '.' || i == last {
                    s.push(c);
                }
            }
            s
        }
        _ => dotted,
    };

    parseable.parse().ok()
}
