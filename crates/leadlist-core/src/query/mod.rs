//! Query-pool generation: turn a free-form keyword into hundreds of
//! distinct search queries.
//!
//! The pool crosses region × industry-variant × attribute axes, is
//! deduplicated, and is shuffled once per pool so that retry rounds do not
//! bias toward any one region. Round 0 uses a separate, simpler generator.

mod industries;
mod regions;

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

pub use industries::industry_variants;
pub use regions::{expand_region, is_region_token, NATIONWIDE_REGIONS};

/// Attribute suffixes crossed into the pool: corporate forms, scale
/// markers, and listing markers.
const ATTRIBUTE_SUFFIXES: &[&str] = &[
    "株式会社",
    "有限会社",
    "合同会社",
    "中小企業",
    "ベンチャー",
    "上場企業",
];

/// List-page phrases crossed with regions.
const LIST_KEYWORDS: &[&str] = &["企業一覧", "会社一覧"];

/// Suffixes for the round-0 query generator.
const INITIAL_SUFFIXES: &[&str] = &[
    "株式会社",
    "有限会社",
    "合同会社",
    "会社",
    "企業",
    "法人",
    "公式サイト",
    "公式ホームページ",
    "コーポレートサイト",
    "会社概要",
    "企業情報",
    "会社案内",
    "事業内容",
    "株式会社 公式",
    "site:co.jp",
    "site:or.jp",
    "メーカー",
    "専門会社",
    "サービス会社",
    "中小企業",
    "ベンチャー",
    "スタートアップ",
    "上場企業",
    "大手企業",
    "老舗",
];

/// Keyword parsed into its region and industry parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKeyword {
    /// Region token, when one was found.
    pub region: Option<String>,
    /// Industry phrase (the whole keyword when no region was parsed).
    pub industry: String,
}

/// Split a keyword into (region, industry).
///
/// A whitespace token is a region if it is in the built-in dictionary or
/// ends in an administrative-unit suffix; the remaining tokens form the
/// industry phrase.
pub fn parse_keyword(keyword: &str) -> ParsedKeyword {
    let tokens: Vec<&str> = keyword.split_whitespace().collect();
    let region_idx = tokens.iter().position(|t| is_region_token(t));

    match region_idx {
        Some(idx) => {
            let region = tokens[idx].to_string();
            let industry: String = tokens
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, t)| *t)
                .collect::<Vec<_>>()
                .join(" ");
            ParsedKeyword {
                region: Some(region),
                industry,
            }
        }
        None => ParsedKeyword {
            region: None,
            industry: keyword.trim().to_string(),
        },
    }
}

/// Generate the round-0 queries: ~25 fixed `"<keyword> <suffix>"` patterns.
pub fn initial_queries(keyword: &str) -> Vec<String> {
    INITIAL_SUFFIXES
        .iter()
        .map(|suffix| format!("{keyword} {suffix}"))
        .collect()
}

/// The materialized query pool for one keyword.
///
/// `queries` is fixed after construction (deduplicated, shuffled once);
/// `used` grows monotonically as batches are handed out.
pub struct QueryPool {
    /// The originating keyword.
    pub keyword: String,
    /// Region parsed out of the keyword, if any.
    pub parsed_region: Option<String>,
    /// Industry phrase parsed out of the keyword.
    pub parsed_industry: String,
    queries: Vec<String>,
    used: HashSet<String>,
}

impl QueryPool {
    /// Build the pool for a keyword.
    pub fn new(keyword: &str) -> Self {
        let parsed = parse_keyword(keyword);

        let regions: Vec<String> = match &parsed.region {
            Some(r) => expand_region(r),
            // No region in the keyword: fan out across the major metros.
            None => NATIONWIDE_REGIONS.iter().map(|r| (*r).to_string()).collect(),
        };
        let variants = industry_variants(&parsed.industry);

        let mut queries: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut push = |q: String, queries: &mut Vec<String>| {
            if seen.insert(q.clone()) {
                queries.push(q);
            }
        };

        for region in &regions {
            for variant in &variants {
                push(format!("{region} {variant}"), &mut queries);
            }
        }
        for region in &regions {
            for variant in &variants {
                for attr in ATTRIBUTE_SUFFIXES {
                    push(format!("{region} {variant} {attr}"), &mut queries);
                }
            }
        }
        for attr in ATTRIBUTE_SUFFIXES {
            push(format!("{keyword} {attr}"), &mut queries);
        }
        for variant in &variants {
            push(format!("{variant} 株式会社 site:co.jp"), &mut queries);
        }
        for region in &regions {
            for list_kw in LIST_KEYWORDS {
                push(format!("{region} {list_kw}"), &mut queries);
            }
        }

        // One shuffle per pool, seeded from the keyword so the draw order
        // is stable for a given request.
        let mut rng = StdRng::seed_from_u64(seed_for(keyword));
        queries.shuffle(&mut rng);

        Self {
            keyword: keyword.to_string(),
            parsed_region: parsed.region,
            parsed_industry: parsed.industry,
            queries,
            used: HashSet::new(),
        }
    }

    /// Total number of queries in the pool.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// True when the pool holds no queries.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Hand out the next `size` unused queries in post-shuffle order.
    ///
    /// `external_used` lets the caller exclude queries it generated itself
    /// (e.g. round-0 queries). Returned queries are marked used.
    pub fn next_batch(&mut self, size: usize, external_used: &HashSet<String>) -> Vec<String> {
        let mut batch = Vec::with_capacity(size.min(self.queries.len()));
        for query in &self.queries {
            if batch.len() >= size {
                break;
            }
            if self.used.contains(query) || external_used.contains(query) {
                continue;
            }
            batch.push(query.clone());
        }
        for query in &batch {
            self.used.insert(query.clone());
        }
        batch
    }
}

fn seed_for(keyword: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    keyword.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keyword_with_region() {
        let parsed = parse_keyword("東京 IT企業");
        assert_eq!(parsed.region.as_deref(), Some("東京"));
        assert_eq!(parsed.industry, "IT企業");
    }

    #[test]
    fn parse_keyword_without_region() {
        let parsed = parse_keyword("Webマーケティング支援");
        assert_eq!(parsed.region, None);
        assert_eq!(parsed.industry, "Webマーケティング支援");
    }

    #[test]
    fn parse_keyword_region_by_suffix() {
        let parsed = parse_keyword("松本市 印刷会社");
        assert_eq!(parsed.region.as_deref(), Some("松本市"));
        assert_eq!(parsed.industry, "印刷会社");
    }

    #[test]
    fn initial_queries_prefix_keyword() {
        let queries = initial_queries("東京 IT企業");
        assert!(queries.len() >= 25);
        assert!(queries.iter().all(|q| q.starts_with("東京 IT企業 ")));
        assert!(queries.contains(&"東京 IT企業 site:co.jp".to_string()));
    }

    #[test]
    fn pool_without_region_has_at_least_fifty_queries() {
        let pool = QueryPool::new("珍しい業種");
        assert!(
            pool.len() >= 50,
            "pool should fan out nationwide, got {}",
            pool.len()
        );
    }

    #[test]
    fn pool_queries_are_distinct() {
        let pool = QueryPool::new("東京 IT企業");
        let mut seen = HashSet::new();
        let mut p = pool;
        let all = p.next_batch(usize::MAX, &HashSet::new());
        for q in &all {
            assert!(seen.insert(q.clone()), "duplicate query: {q}");
        }
    }

    #[test]
    fn pool_shuffle_is_stable_per_keyword() {
        let mut a = QueryPool::new("東京 IT企業");
        let mut b = QueryPool::new("東京 IT企業");
        let none = HashSet::new();
        assert_eq!(a.next_batch(20, &none), b.next_batch(20, &none));
    }

    #[test]
    fn next_batch_never_repeats() {
        let mut pool = QueryPool::new("大阪 製造業");
        let none = HashSet::new();
        let first = pool.next_batch(10, &none);
        let second = pool.next_batch(10, &none);
        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 10);
        assert!(first.iter().all(|q| !second.contains(q)));
    }

    #[test]
    fn next_batch_respects_external_used() {
        let mut pool = QueryPool::new("大阪 製造業");
        let none = HashSet::new();
        let probe = pool.next_batch(1, &none);
        let mut pool2 = QueryPool::new("大阪 製造業");
        let external: HashSet<String> = probe.iter().cloned().collect();
        let batch = pool2.next_batch(5, &external);
        assert!(batch.iter().all(|q| !external.contains(q)));
    }

    #[test]
    fn pool_exhaustion_yields_empty_batches() {
        let mut pool = QueryPool::new("東京 IT企業");
        let none = HashSet::new();
        let _ = pool.next_batch(usize::MAX, &none);
        assert!(pool.next_batch(10, &none).is_empty());
    }
}
