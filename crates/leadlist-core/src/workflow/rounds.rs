//! The search → cleanse → merge retry loop.
//!
//! Each round draws queries, searches, cleanses, and merges new companies
//! into the accumulated list under domain and name dedup, until the
//! buffered target is met or a give-up condition fires.

use std::collections::HashSet;

use crate::cleanse::{normalize_company_name, LlmCleanser};
use crate::model::Candidate;
use crate::query::{initial_queries, QueryPool};
use crate::search::SerperClient;

/// Over-booking factor compensating for scrape-stage attrition.
pub const SCRAPING_BUFFER: f64 = 1.15;

/// Fraction of the buffered target at which a low-yield round gives up.
const GIVE_UP_THRESHOLD: f64 = 0.8;

/// Buffered search target for a requested count.
pub fn buffered_target(target_count: usize) -> usize {
    (target_count as f64 * SCRAPING_BUFFER).ceil() as usize
}

/// Retry budget: one extra round per 50 requested records, within [3, 5].
pub fn max_retries(target_count: usize) -> usize {
    (target_count / 50).clamp(3, 5)
}

/// Run the round loop and return at most `buffered_target` deduplicated,
/// cleansed candidates.
pub async fn accumulate_candidates(
    serper: &SerperClient,
    cleanser: Option<&LlmCleanser>,
    search_keyword: &str,
    target_count: usize,
    existing_domains: &HashSet<String>,
    initial: Option<Vec<String>>,
) -> Vec<Candidate> {
    let buffered = buffered_target(target_count);
    let retries = max_retries(target_count);
    tracing::info!(
        target = target_count,
        buffered,
        max_retries = retries,
        "round loop start"
    );

    let existing_list: Vec<String> = existing_domains.iter().cloned().collect();
    let mut pool = QueryPool::new(search_keyword);

    let mut accumulated: Vec<Candidate> = Vec::new();
    let mut used_domains: HashSet<String> = existing_domains.clone();
    let mut used_names: HashSet<String> = HashSet::new();
    let mut used_queries: HashSet<String> = HashSet::new();

    for round in 0..=retries {
        let shortage = buffered.saturating_sub(accumulated.len());

        let queries = if round == 0 {
            initial
                .clone()
                .filter(|qs| !qs.is_empty())
                .unwrap_or_else(|| initial_queries(search_keyword))
        } else {
            let batch_size = (20usize.saturating_sub(2 * round)).max(8);
            let batch = pool.next_batch(batch_size, &used_queries);
            if batch.is_empty() {
                tracing::info!(round, "query pool exhausted");
                break;
            }
            batch
        };
        used_queries.extend(queries.iter().cloned());

        // Retry rounds double the shortfall to leave room for LLM
        // rejection.
        let search_target = if round == 0 { buffered } else { shortage * 2 };
        let pages = if round == 0 { 2 } else { 1 };

        tracing::info!(
            round,
            queries = queries.len(),
            search_target,
            accumulated = accumulated.len(),
            "round search"
        );
        let companies = serper
            .search_companies(&queries, search_target, &used_domains, pages)
            .await;

        if companies.is_empty() {
            if round == 0 {
                return Vec::new();
            }
            tracing::info!(round, "no further search results");
            break;
        }

        let cleansed = match cleanser {
            Some(cleanser) => {
                cleanser
                    .cleanse(&companies, search_keyword, &existing_list)
                    .await
            }
            None => {
                tracing::warn!("cleansing skipped: no LLM key configured");
                companies
            }
        };

        let mut new_count = 0usize;
        for candidate in cleansed {
            if !candidate.domain.is_empty() && used_domains.contains(&candidate.domain) {
                continue;
            }
            let name_key = normalize_company_name(&candidate.company_name);
            if !name_key.is_empty() && used_names.contains(&name_key) {
                continue;
            }

            if !candidate.domain.is_empty() {
                used_domains.insert(candidate.domain.clone());
            }
            if !name_key.is_empty() {
                used_names.insert(name_key);
            }
            accumulated.push(candidate);
            new_count += 1;
        }

        tracing::info!(
            round,
            new = new_count,
            accumulated = accumulated.len(),
            buffered,
            "round merged"
        );

        if accumulated.len() >= buffered {
            tracing::info!("buffered target reached");
            break;
        }
        if round == retries {
            tracing::info!("retry budget exhausted");
            break;
        }
        if new_count == 0 {
            tracing::info!("no new companies this round");
            break;
        }
        if accumulated.len() as f64 >= buffered as f64 * GIVE_UP_THRESHOLD && new_count < 3 {
            tracing::info!("near target with low yield, stopping");
            break;
        }
    }

    accumulated.truncate(buffered);
    accumulated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_target_rounds_up() {
        assert_eq!(buffered_target(5), 6);
        assert_eq!(buffered_target(100), 115);
        assert_eq!(buffered_target(200), 230);
    }

    #[test]
    fn retry_budget_is_clamped() {
        assert_eq!(max_retries(10), 3);
        assert_eq!(max_retries(100), 3);
        assert_eq!(max_retries(200), 4);
        assert_eq!(max_retries(500), 5);
    }
}
