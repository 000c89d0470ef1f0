//! Route modules for the leadlist API server.

pub mod health;
pub mod jobs;
pub mod scrape;
pub mod search;

use crate::error::ApiError;
use crate::state::AppState;

/// Validate the shared fields of a search request.
pub(crate) fn validate_search_request(
    state: &AppState,
    search_keyword: &str,
    target_count: usize,
) -> Result<(), ApiError> {
    if search_keyword.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "search_keyword must not be empty".to_string(),
        ));
    }
    if target_count == 0 || target_count > state.settings.max_target_count as usize {
        return Err(ApiError::BadRequest(format!(
            "target_count must be between 1 and {}",
            state.settings.max_target_count
        )));
    }
    let missing = state.settings.missing_required();
    if !missing.is_empty() {
        return Err(ApiError::Internal(format!(
            "missing required environment variables: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}
