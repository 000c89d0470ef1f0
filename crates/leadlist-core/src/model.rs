//! Shared data types flowing through the pipeline.

use serde::{Deserialize, Serialize};

/// A search result that passed the pre-LLM filter but has not yet been
/// cleansed.
///
/// Invariant: `domain` is the authority component of `url`, lower-cased,
/// without a `www.` prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Raw result title (rewritten to a legal-entity name by the cleanser).
    pub company_name: String,
    /// Absolute URL of the result.
    pub url: String,
    /// Lower-cased authority of `url` without `www.`.
    pub domain: String,
    /// Search-result snippet, if any.
    #[serde(default)]
    pub snippet: String,
}

impl Candidate {
    /// Build a candidate from a title and URL, deriving the domain.
    pub fn new(company_name: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        let domain = extract_domain(&url);
        Self {
            company_name: company_name.into(),
            url,
            domain,
            snippet: String::new(),
        }
    }
}

/// Outcome classification for one scraped candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeErrorKind {
    /// Top page fetched and company name verified.
    Ok,
    /// The site's top page could not be fetched.
    TopPageFailed,
    /// The top page does not carry the expected company name.
    CompanyMismatch,
}

impl ScrapeErrorKind {
    /// True for the success kind.
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// One company record enriched by the scraper.
///
/// When `error_kind` is not `Ok`, `contact_url` and `phone` are empty.
/// When it is `Ok`, both fields are best-effort and independently optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedRecord {
    /// Cleansed company name.
    pub company_name: String,
    /// Scheme + authority + "/" of the candidate URL.
    pub base_url: String,
    /// Best-effort contact page URL ("" when none found).
    pub contact_url: String,
    /// Best-effort formatted telephone number ("" when none found).
    pub phone: String,
    /// Same domain as the originating candidate.
    pub domain: String,
    /// Scrape outcome for this record.
    pub error_kind: ScrapeErrorKind,
}

impl EnrichedRecord {
    /// A failed record carries the candidate identity but no contact data.
    pub fn failed(candidate: &Candidate, base_url: String, kind: ScrapeErrorKind) -> Self {
        Self {
            company_name: candidate.company_name.clone(),
            base_url,
            contact_url: String::new(),
            phone: String::new(),
            domain: candidate.domain.clone(),
            error_kind: kind,
        }
    }

    /// True when the record found either a contact URL or a phone number.
    pub fn has_contact(&self) -> bool {
        !self.contact_url.is_empty() || !self.phone.is_empty()
    }
}

/// Extract the canonical domain from a URL: the lower-cased authority
/// (host, plus port when non-default) with any `www.` prefix removed.
/// Unparsable input yields an empty string.
pub fn extract_domain(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default().to_lowercase();
            let host = host.strip_prefix("www.").unwrap_or(&host);
            match parsed.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            }
        }
        Err(_) => String::new(),
    }
}

/// Scheme + authority + "/" of a URL ("" for unparsable input).
pub fn base_url(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => {
            let mut base = parsed.clone();
            base.set_path("/");
            base.set_query(None);
            base.set_fragment(None);
            base.to_string()
        }
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_domain_strips_www_and_lowercases() {
        assert_eq!(
            extract_domain("https://WWW.Example.CO.JP/company/"),
            "example.co.jp"
        );
    }

    #[test]
    fn extract_domain_without_www() {
        assert_eq!(extract_domain("https://corp.example.jp/"), "corp.example.jp");
    }

    #[test]
    fn extract_domain_keeps_explicit_port() {
        assert_eq!(
            extract_domain("http://127.0.0.1:4545/index.html"),
            "127.0.0.1:4545"
        );
        assert_eq!(extract_domain("https://example.co.jp:443/"), "example.co.jp");
    }

    #[test]
    fn extract_domain_invalid_url_is_empty() {
        assert_eq!(extract_domain("not a url"), "");
    }

    #[test]
    fn base_url_drops_path_query_fragment() {
        assert_eq!(
            base_url("https://example.co.jp/company/about?x=1#top"),
            "https://example.co.jp/"
        );
    }

    #[test]
    fn candidate_new_derives_domain() {
        let c = Candidate::new("株式会社テスト", "https://www.test.co.jp/about/");
        assert_eq!(c.domain, "test.co.jp");
    }

    #[test]
    fn failed_record_has_no_contact_fields() {
        let c = Candidate::new("株式会社テスト", "https://test.co.jp/");
        let r = EnrichedRecord::failed(
            &c,
            "https://test.co.jp/".to_string(),
            ScrapeErrorKind::TopPageFailed,
        );
        assert!(!r.error_kind.is_ok());
        assert!(r.contact_url.is_empty());
        assert!(r.phone.is_empty());
        assert!(!r.has_contact());
    }

    #[test]
    fn error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ScrapeErrorKind::TopPageFailed).unwrap();
        assert_eq!(json, "\"top_page_failed\"");
        let json = serde_json::to_string(&ScrapeErrorKind::Ok).unwrap();
        assert_eq!(json, "\"ok\"");
    }
}
