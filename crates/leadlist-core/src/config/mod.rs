//! Configuration management for leadlist.
//!
//! All settings come from environment variables with built-in defaults.
//! Numeric variables that fail to parse fall back to their default rather
//! than aborting startup.

use std::env;

/// Application settings, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Serper.dev API key (required for search flows).
    pub serper_api_key: String,
    /// OpenAI API key. Empty means cleansing is skipped and candidates
    /// pass through unmodified.
    pub openai_api_key: String,
    /// Spreadsheet collaborator webhook URL (required for persisting flows).
    pub sheets_webhook_url: String,
    /// Slack bot token. Empty disables the notifier.
    pub slack_bot_token: String,
    /// Serper API endpoint (overridable for tests and proxies).
    pub serper_api_url: String,
    /// OpenAI API endpoint (overridable for tests and proxies).
    pub openai_api_url: String,
    /// Slack API endpoint (overridable for tests and proxies).
    pub slack_api_url: String,
    /// Upper bound accepted for `target_count` in requests.
    pub max_target_count: u32,
    /// Results requested per search page (capped at 100 by the provider).
    pub serper_results_per_query: u32,
    /// Maximum concurrent outbound scrape fetches.
    pub scrape_concurrent: usize,
    /// Per-fetch scrape timeout in seconds.
    pub scrape_timeout_secs: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            serper_api_key: String::new(),
            openai_api_key: String::new(),
            sheets_webhook_url: String::new(),
            slack_bot_token: String::new(),
            serper_api_url: "https://google.serper.dev".to_string(),
            openai_api_url: "https://api.openai.com".to_string(),
            slack_api_url: "https://slack.com".to_string(),
            max_target_count: 300,
            serper_results_per_query: 100,
            scrape_concurrent: 10,
            scrape_timeout_secs: 10.0,
        }
    }
}

impl Settings {
    /// Load settings from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load settings through an injectable lookup function (used by tests
    /// to avoid process-global environment mutation).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            serper_api_key: lookup("SERPER_API_KEY").unwrap_or_default(),
            openai_api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
            sheets_webhook_url: lookup("GAS_WEBHOOK_URL").unwrap_or_default(),
            slack_bot_token: lookup("SLACK_BOT_TOKEN").unwrap_or_default(),
            serper_api_url: lookup("SERPER_API_URL").unwrap_or(defaults.serper_api_url),
            openai_api_url: lookup("OPENAI_API_URL").unwrap_or(defaults.openai_api_url),
            slack_api_url: lookup("SLACK_API_URL").unwrap_or(defaults.slack_api_url),
            max_target_count: parse_or(&lookup, "MAX_TARGET_COUNT", defaults.max_target_count),
            serper_results_per_query: parse_or(
                &lookup,
                "SERPER_RESULTS_PER_QUERY",
                defaults.serper_results_per_query,
            ),
            scrape_concurrent: parse_or(&lookup, "SCRAPE_CONCURRENT", defaults.scrape_concurrent),
            scrape_timeout_secs: parse_or(
                &lookup,
                "SCRAPE_TIMEOUT",
                defaults.scrape_timeout_secs,
            ),
        }
    }

    /// Names of required variables that are absent.
    ///
    /// The health endpoint surfaces this list; request validation turns it
    /// into a 500 before the pipeline is reached.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.serper_api_key.is_empty() {
            missing.push("SERPER_API_KEY");
        }
        if self.sheets_webhook_url.is_empty() {
            missing.push("GAS_WEBHOOK_URL");
        }
        missing
    }

    /// True when the LLM cleansing stage is configured.
    pub fn cleansing_enabled(&self) -> bool {
        !self.openai_api_key.is_empty()
    }

    /// True when the Slack notifier is configured.
    pub fn notifier_enabled(&self) -> bool {
        !self.slack_bot_token.is_empty()
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> T {
    match lookup(name) {
        Some(raw) => raw.parse().unwrap_or(default),
        None => default,
    }
}
