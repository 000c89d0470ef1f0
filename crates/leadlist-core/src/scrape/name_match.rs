//! Verification that a fetched top page actually belongs to the expected
//! company.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};
use unicode_normalization::UnicodeNormalization;

use crate::cleanse::CORPORATE_FORMS_JP;

fn script_style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>")
            .expect("script/style regex must compile")
    })
}

fn en_form_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:inc|corp|co|ltd|llc|llp|limited)\b\.?")
            .expect("corporate form regex must compile")
    })
}

/// Visible text of a document: all text nodes with `<script>`/`<style>`
/// content removed.
pub(crate) fn visible_text(html: &str) -> String {
    let stripped = script_style_re().replace_all(html, " ");
    let document = Html::parse_document(&stripped);
    document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reduce a name or page fragment to its comparable core: fold widths,
/// lower-case, drop corporate-form markers, and keep only letters and
/// digits.
pub(crate) fn normalize_for_match(s: &str) -> String {
    let mut s: String = s.nfkc().collect::<String>().to_lowercase();
    for form in CORPORATE_FORMS_JP {
        s = s.replace(form, "");
    }
    s = en_form_re().replace_all(&s, "").into_owned();
    s.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Check whether the page carries evidence of the expected company name.
///
/// Candidate names that normalize to fewer than 2 characters skip the
/// check entirely. Body-wide matching requires at least 3 characters to
/// avoid accidental hits.
pub fn page_matches_company(html: &str, company_name: &str) -> bool {
    let needle = normalize_for_match(company_name);
    if needle.chars().count() < 2 {
        return true;
    }

    let document = Html::parse_document(html);

    let title = select_text(&document, "title");
    let og_site_name = select_attr(&document, r#"meta[property="og:site_name"]"#, "content");
    let sections = select_text(
        &document,
        "header, footer, #company, .company, #about, .about",
    );

    let title_n = normalize_for_match(&title);
    let og_n = normalize_for_match(&og_site_name);
    let sections_n = normalize_for_match(&sections);

    if title_n.contains(&needle) || og_n.contains(&needle) || sections_n.contains(&needle) {
        return true;
    }

    if needle.chars().count() >= 3 {
        let body_n = normalize_for_match(&visible_text(html));
        if body_n.contains(&needle) {
            return true;
        }
    }

    // Symmetric fallback: a short site title fully contained in the
    // candidate name is also a match.
    for evidence in [&title_n, &og_n] {
        if evidence.chars().count() >= 2 && needle.contains(evidence.as_str()) {
            return true;
        }
    }

    false
}

fn select_text(document: &Html, selector: &str) -> String {
    let Ok(selector) = Selector::parse(selector) else {
        return String::new();
    };
    document
        .select(&selector)
        .flat_map(|el| el.text())
        .collect::<Vec<_>>()
        .join(" ")
}

fn select_attr(document: &Html, selector: &str, attr: &str) -> String {
    let Ok(selector) = Selector::parse(selector) else {
        return String::new();
    };
    document
        .select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .collect::<Vec<_>>()
        .join(" ")
}
