//! Concurrent contact scraping.
//!
//! Each candidate runs through a small state machine: fetch the top page,
//! verify the company name appears on it, extract a contact URL and phone
//! number, then enrich from the contact page or common-path probes.
//! Fetches are gated by a semaphore and input order is preserved.
//!
//! TLS verification is disabled at the transport: many small-business
//! sites present misconfigured certificates, and reachability wins over
//! verification for this pipeline.

pub mod contact;
pub mod name_match;
pub mod phone;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tokio::sync::Semaphore;

use crate::model::{Candidate, EnrichedRecord, ScrapeErrorKind};

use self::name_match::visible_text;

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Pause after each completed candidate.
const POLITENESS_DELAY: Duration = Duration::from_millis(200);

/// Common contact paths probed when the top page exposes no contact link.
const CONTACT_PATHS: &[&str] = &[
    "contact/",
    "contact.html",
    "contact.php",
    "inquiry/",
    "inquiry.html",
    "form/",
    "toiawase/",
    "otoiawase/",
    "contact-us/",
];

/// Pages probed for a phone number when the top page has none.
const INFO_PATHS: &[&str] = &["company/", "about/"];

/// Markers accepting a probed page as a contact page.
const CONTACT_PAGE_MARKERS: &[&str] = &["<form", "お問い合わせ", "contact"];

/// Concurrent scraping engine.
pub struct Scraper {
    client: reqwest::Client,
    concurrency: usize,
}

impl Scraper {
    /// Build a scraper with the given fetch concurrency and per-fetch
    /// timeout.
    pub fn new(concurrency: usize, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .user_agent(BROWSER_UA)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            client,
            concurrency: concurrency.max(1),
        })
    }

    /// Scrape all candidates, returning one record per candidate in input
    /// order.
    pub async fn scrape_companies(&self, candidates: &[Candidate]) -> Vec<EnrichedRecord> {
        tracing::info!(
            count = candidates.len(),
            concurrency = self.concurrency,
            "scraping start"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let semaphore = Arc::clone(&semaphore);
            let client = self.client.clone();
            let candidate = candidate.clone();
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let record = scrape_one(&client, &candidate).await;
                tokio::time::sleep(POLITENESS_DELAY).await;
                record
            }));
        }

        let mut records = Vec::with_capacity(candidates.len());
        for (handle, candidate) in handles.into_iter().zip(candidates) {
            match handle.await {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::error!(domain = %candidate.domain, error = %e, "scrape task failed");
                    records.push(EnrichedRecord::failed(
                        candidate,
                        crate::model::base_url(&candidate.url),
                        ScrapeErrorKind::TopPageFailed,
                    ));
                }
            }
        }

        let ok_count = records.iter().filter(|r| r.error_kind.is_ok()).count();
        tracing::info!(total = records.len(), ok = ok_count, "scraping done");
        records
    }
}

async fn scrape_one(client: &reqwest::Client, candidate: &Candidate) -> EnrichedRecord {
    let Ok(mut base) = Url::parse(&candidate.url) else {
        return EnrichedRecord::failed(candidate, String::new(), ScrapeErrorKind::TopPageFailed);
    };
    base.set_path("/");
    base.set_query(None);
    base.set_fragment(None);
    let base_str = base.to_string();

    // FETCH_TOP: one retry on transport failure.
    let Some(html) = fetch_top_page(client, base.as_str()).await else {
        return EnrichedRecord::failed(candidate, base_str, ScrapeErrorKind::TopPageFailed);
    };

    // MATCH_NAME
    if !name_match::page_matches_company(&html, &candidate.company_name) {
        tracing::debug!(domain = %candidate.domain, "company name not on top page");
        return EnrichedRecord::failed(candidate, base_str, ScrapeErrorKind::CompanyMismatch);
    }

    // EXTRACT
    let text = visible_text(&html);
    let mut contact_url = contact::extract_contact_url(&html, &base);
    let mut phone = phone::extract_phone(&html, &text);

    // ENRICH
    match &contact_url {
        Some(url) if phone.is_none() => {
            if let Some(contact_html) = fetch_page(client, url).await {
                let contact_text = visible_text(&contact_html);
                phone = phone::extract_phone(&contact_html, &contact_text);
            }
        }
        Some(_) => {}
        None => {
            contact_url = probe_contact_paths(client, &base).await;
        }
    }
    if phone.is_none() {
        phone = probe_info_paths(client, &base).await;
    }

    EnrichedRecord {
        company_name: candidate.company_name.clone(),
        base_url: base_str,
        contact_url: contact_url.unwrap_or_default(),
        phone: phone.unwrap_or_default(),
        domain: candidate.domain.clone(),
        error_kind: ScrapeErrorKind::Ok,
    }
}

async fn fetch_top_page(client: &reqwest::Client, url: &str) -> Option<String> {
    for attempt in 0..2 {
        match client.get(url).send().await {
            Ok(response) => {
                if !response.status().is_success() {
                    tracing::debug!(url, status = response.status().as_u16(), "top page not ok");
                    return None;
                }
                return response.text().await.ok();
            }
            Err(e) => {
                tracing::debug!(url, attempt, error = %e, "top page fetch failed");
            }
        }
    }
    None
}

async fn fetch_page(client: &reqwest::Client, url: &str) -> Option<String> {
    let response = client.get(url).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    response.text().await.ok()
}

async fn probe_contact_paths(client: &reqwest::Client, base: &Url) -> Option<String> {
    for path in CONTACT_PATHS {
        let Ok(url) = base.join(path) else {
            continue;
        };
        if let Some(html) = fetch_page(client, url.as_str()).await {
            let lower = html.to_lowercase();
            if CONTACT_PAGE_MARKERS.iter().any(|m| lower.contains(m)) {
                tracing::debug!(url = %url, "contact path probe hit");
                return Some(url.to_string());
            }
        }
    }
    None
}

async fn probe_info_paths(client: &reqwest::Client, base: &Url) -> Option<String> {
    for path in INFO_PATHS {
        let Ok(url) = base.join(path) else {
            continue;
        };
        if let Some(html) = fetch_page(client, url.as_str()).await {
            let text = visible_text(&html);
            if let Some(phone) = phone::extract_phone(&html, &text) {
                return Some(phone);
            }
        }
    }
    None
}
