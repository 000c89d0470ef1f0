//! Error types for the leadlist core library.
//!
//! Each external boundary has its own error enum to provide clear error
//! boundaries. The library uses `thiserror` for structured, typed errors.

/// Errors related to configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("missing required environment variable: {name}")]
    MissingVar {
        /// The name of the missing variable.
        name: String,
    },
}

/// Errors from the web-search provider (Serper).
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// HTTP request to the search endpoint failed.
    #[error("search request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Search API returned an error response.
    #[error("search API error (status {status}): {message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The error message from the API.
        message: String,
    },
}

/// Errors from the LLM cleansing provider.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// HTTP request to the LLM endpoint failed.
    #[error("LLM HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// LLM API returned an error response.
    #[error("LLM API error (status {status}): {message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The error message from the API.
        message: String,
    },

    /// LLM response could not be parsed into the cleansing envelope.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),
}

/// Errors from the spreadsheet / chat collaborators.
#[derive(Debug, thiserror::Error)]
pub enum CollabError {
    /// HTTP request to the collaborator failed.
    #[error("collaborator request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Collaborator returned an error response.
    #[error("collaborator error (status {status}): {message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The error message from the collaborator.
        message: String,
    },

    /// Collaborator response body had an unexpected shape.
    #[error("failed to parse collaborator response: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_missing_var_message() {
        let err = ConfigError::MissingVar {
            name: "SERPER_API_KEY".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "missing required environment variable: SERPER_API_KEY"
        );
    }

    #[test]
    fn search_error_api_message() {
        let err = SearchError::Api {
            status: 403,
            message: "forbidden".to_string(),
        };
        assert_eq!(err.to_string(), "search API error (status 403): forbidden");
    }

    #[test]
    fn llm_error_parse_message() {
        let err = LlmError::Parse("unexpected JSON structure".to_string());
        assert_eq!(
            err.to_string(),
            "failed to parse LLM response: unexpected JSON structure"
        );
    }

    #[test]
    fn collab_error_api_message() {
        let err = CollabError::Api {
            status: 500,
            message: "internal".to_string(),
        };
        assert_eq!(err.to_string(), "collaborator error (status 500): internal");
    }
}
