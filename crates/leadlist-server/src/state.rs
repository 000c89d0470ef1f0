//! Shared application state for the leadlist server.

use std::time::Duration;

use leadlist_core::cleanse::LlmCleanser;
use leadlist_core::collab::{SheetsClient, SlackNotifier};
use leadlist_core::config::Settings;
use leadlist_core::job::JobRegistry;
use leadlist_core::search::SerperClient;
use leadlist_core::workflow::WorkflowConfig;

/// Shared application state accessible by all route handlers.
pub struct AppState {
    /// Environment-derived settings, loaded once at startup.
    pub settings: Settings,
    /// In-memory registry of asynchronous jobs.
    pub registry: JobRegistry,
}

impl AppState {
    /// Build state from settings with a default-TTL registry.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            registry: JobRegistry::with_default_ttl(),
        }
    }

    /// Search client against the configured endpoint.
    pub fn serper(&self) -> SerperClient {
        SerperClient::with_base_url(&self.settings.serper_api_key, &self.settings.serper_api_url)
            .with_results_per_page(self.settings.serper_results_per_query)
    }

    /// Cleanser, when an OpenAI key is configured.
    pub fn cleanser(&self) -> Option<LlmCleanser> {
        self.settings.cleansing_enabled().then(|| {
            LlmCleanser::with_base_url(&self.settings.openai_api_key, &self.settings.openai_api_url)
        })
    }

    /// Spreadsheet client; `override_url` (from a request body) wins over
    /// the configured webhook.
    pub fn sheets(&self, override_url: Option<&str>) -> SheetsClient {
        let url = override_url
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.settings.sheets_webhook_url);
        SheetsClient::new(url)
    }

    /// Slack notifier, when a bot token is configured.
    pub fn slack(&self) -> Option<SlackNotifier> {
        self.settings.notifier_enabled().then(|| {
            SlackNotifier::with_base_url(&self.settings.slack_bot_token, &self.settings.slack_api_url)
        })
    }

    /// Scrape-stage knobs from settings.
    pub fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig {
            scrape_concurrent: self.settings.scrape_concurrent,
            scrape_timeout: Duration::from_secs_f64(self.settings.scrape_timeout_secs.max(1.0)),
        }
    }
}
