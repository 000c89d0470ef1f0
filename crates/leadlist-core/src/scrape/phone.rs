//! Telephone-number extraction with ranked sources and JP formatting.
//!
//! Source order is first-match-wins: `tel:` links, then labeled patterns
//! ("TEL: ..."), then bare digit runs. Every hit is validated before use.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};

fn labeled_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:TEL|Tel|電話|☎|℡|代表)[:\s：]*(\(?0\d{1,4}\)?[-\s.]?\d{1,4}[-\s.]?\d{3,4})")
            .expect("labeled phone regex must compile")
    })
}

fn bare_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b0\d{1,4}[-\s]?\d{1,4}[-\s]?\d{3,4}\b")
            .expect("bare phone regex must compile")
    })
}

/// Extract the best phone number from a page.
///
/// `html` is the raw document (for `tel:` links); `text` is its visible
/// text (for labeled and bare patterns).
pub fn extract_phone(html: &str, text: &str) -> Option<String> {
    if let Some(phone) = extract_tel_link(html) {
        return Some(phone);
    }
    for caps in labeled_re().captures_iter(text) {
        if let Some(digits) = validate_digits(&caps[1]) {
            return Some(format_phone(&digits));
        }
    }
    for m in bare_re().find_iter(text) {
        if let Some(digits) = validate_digits(m.as_str()) {
            return Some(format_phone(&digits));
        }
    }
    None
}

fn extract_tel_link(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").ok()?;
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Some(raw) = href.strip_prefix("tel:") {
            if let Some(digits) = validate_digits(raw) {
                return Some(format_phone(&digits));
            }
        }
    }
    None
}

/// Strip non-digits and check JP phone-number shape: 10 or 11 digits,
/// leading zero, and no `0000` run.
pub fn validate_digits(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 && digits.len() != 11 {
        return None;
    }
    if !digits.starts_with('0') {
        return None;
    }
    if digits.contains("0000") {
        return None;
    }
    Some(digits)
}

/// Format validated digits into the conventional JP shape.
pub fn format_phone(digits: &str) -> String {
    if digits.len() == 10 && digits.starts_with("0120") {
        return format!("{}-{}-{}", &digits[..4], &digits[4..7], &digits[7..]);
    }
    if digits.len() == 10 && digits.starts_with("03") {
        return format!("{}-{}-{}", &digits[..2], &digits[2..6], &digits[6..]);
    }
    if digits.len() == 11
        && (digits.starts_with("090") || digits.starts_with("080") || digits.starts_with("070"))
    {
        return format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..]);
    }
    if digits.len() == 11 {
        return format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..]);
    }
    format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..])
}
