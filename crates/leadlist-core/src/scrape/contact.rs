//! Contact-page link discovery with ranked scoring.

use reqwest::Url;
use scraper::{Html, Selector};

/// Keywords marking a contact link, in href or link text.
const CONTACT_KEYWORDS: &[&str] = &[
    "contact",
    "inquiry",
    "toiawase",
    "form",
    "mail",
    "support",
    "お問い合わせ",
    "お問合せ",
    "問い合わせ",
    "問合せ",
];

/// Find the most likely contact-page URL on a page.
///
/// Links are resolved against `base`; cross-domain links, `mailto:`,
/// `javascript:`, `tel:`, and fragments other than exactly `#contact` are
/// skipped. The highest-scored link wins, first-seen on ties.
pub fn extract_contact_url(html: &str, base: &Url) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").ok()?;
    let base_host = host_of(base);

    let mut best: Option<(i32, String)> = None;

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        let href_lower = href.to_lowercase();

        if href_lower.starts_with("mailto:")
            || href_lower.starts_with("javascript:")
            || href_lower.starts_with("tel:")
        {
            continue;
        }
        if href.starts_with('#') && href != "#contact" {
            continue;
        }

        let Ok(resolved) = base.join(href) else {
            continue;
        };
        if host_of(&resolved) != base_host {
            continue;
        }

        let text = element.text().collect::<Vec<_>>().join(" ").to_lowercase();
        let text_has_keyword = CONTACT_KEYWORDS.iter().any(|kw| text.contains(kw));
        let href_has_keyword = CONTACT_KEYWORDS.iter().any(|kw| href_lower.contains(kw));
        if !text_has_keyword && !href_has_keyword {
            continue;
        }

        let mut score = 0i32;
        for strong in ["contact", "inquiry", "toiawase"] {
            if href_lower.contains(strong) {
                score += 10;
            }
        }
        if text_has_keyword {
            score += 8;
        }
        if href_lower.contains("form") {
            score += 5;
        }
        let slashes = resolved.path().matches('/').count() as i32;
        score += (5 - slashes).max(0);

        let resolved_str = resolved.to_string();
        match &best {
            Some((best_score, _)) if *best_score >= score => {}
            _ => best = Some((score, resolved_str)),
        }
    }

    best.map(|(_, url)| url)
}

fn host_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    host.strip_prefix("www.").unwrap_or(&host).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.co.jp/").expect("base url")
    }

    #[test]
    fn contact_path_beats_weaker_links() {
        let html = r#"
            <a href="/support/">サポート</a>
            <a href="/contact/">お問い合わせ</a>
            <a href="/company/form-archive/old/">form</a>
        "#;
        assert_eq!(
            extract_contact_url(html, &base()).as_deref(),
            Some("https://example.co.jp/contact/")
        );
    }

    #[test]
    fn hash_contact_is_the_only_accepted_fragment() {
        let html = r##"<a href="#contact">お問い合わせ</a>"##;
        assert_eq!(
            extract_contact_url(html, &base()).as_deref(),
            Some("https://example.co.jp/#contact")
        );

        let html = r##"<a href="#top">お問い合わせ</a>"##;
        assert_eq!(extract_contact_url(html, &base()), None);
    }

    #[test]
    fn scheme_links_are_skipped() {
        let html = r#"
            <a href="mailto:info@example.co.jp">お問い合わせ</a>
            <a href="tel:0312345678">お問い合わせ</a>
            <a href="javascript:void(0)">お問い合わせ</a>
        "#;
        assert_eq!(extract_contact_url(html, &base()), None);
    }

    #[test]
    fn cross_domain_links_are_skipped() {
        let html = r#"<a href="https://forms.example.com/xyz">お問い合わせ</a>"#;
        assert_eq!(extract_contact_url(html, &base()), None);
    }

    #[test]
    fn www_prefix_is_not_cross_domain() {
        let html = r#"<a href="https://www.example.co.jp/contact/">お問い合わせ</a>"#;
        assert_eq!(
            extract_contact_url(html, &base()).as_deref(),
            Some("https://www.example.co.jp/contact/")
        );
    }

    #[test]
    fn keyword_in_text_qualifies_a_plain_href() {
        let html = r#"<a href="/info/">お問い合わせはこちら</a>"#;
        assert_eq!(
            extract_contact_url(html, &base()).as_deref(),
            Some("https://example.co.jp/info/")
        );
    }

    #[test]
    fn unrelated_links_yield_none() {
        let html = r#"<a href="/news/">ニュース</a><a href="/about/">会社概要</a>"#;
        assert_eq!(extract_contact_url(html, &base()), None);
    }
}
