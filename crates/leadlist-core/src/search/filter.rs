//! Pre-LLM result filters: domain denylist, title denylist, and the
//! company-likelihood heuristic.

use std::sync::OnceLock;

use regex::Regex;

use crate::cleanse::has_corporate_form;

/// Domains that never host a prospect's own site: job boards, social
/// networks, news, encyclopedias, marketplaces, company-info aggregators,
/// directory/review sites, list/comparison sites, and career portals.
/// Matched by substring against the candidate domain.
const EXCLUDE_DOMAINS: &[&str] = &[
    // job boards
    "indeed.com",
    "indeed.jp",
    "mynavi.jp",
    "rikunabi.com",
    "doda.jp",
    "en-japan.com",
    "baitoru.com",
    "careerconnection.jp",
    "jobchange.jp",
    "hatarako.net",
    // news / media
    "yahoo.co.jp",
    "news.yahoo.co.jp",
    "nikkei.com",
    "asahi.com",
    "yomiuri.co.jp",
    "mainichi.jp",
    "sankei.com",
    // social networks
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "youtube.com",
    "tiktok.com",
    "linkedin.com",
    // encyclopedias
    "wikipedia.org",
    // marketplaces and big platforms
    "google.com",
    "amazon.co.jp",
    "rakuten.co.jp",
    // company-info / review aggregators
    "bizmap.jp",
    "baseconnect.in",
    "wantedly.com",
    "vorkers.com",
    "openwork.jp",
    // maps / facility search
    "navitime.co.jp",
    "mapion.co.jp",
    "mapfan.com",
    "ekiten.jp",
    "hotpepper.jp",
    "tabelog.com",
    "gnavi.co.jp",
    "retty.me",
    // career portals
    "career-x.co.jp",
    "type.jp",
    "green-japan.com",
    "mid-tenshoku.com",
    // blogs / tech media
    "note.com",
    "qiita.com",
    "zenn.dev",
    "hateblo.jp",
    "ameblo.jp",
    // press releases
    "prtimes.jp",
    "atpress.ne.jp",
    // company lists / comparison sites
    "geekly.co.jp",
    "imitsu.jp",
    "houjin.jp",
    "best100.v-tsushin.jp",
    "isms.jp",
    "itnabi.com",
    "appstars.io",
    "ikesai.com",
    "rekaizen.com",
    "careerforum.net",
    "startupclass.co.jp",
    "herp.careers",
    "readycrew.jp",
    "utilly.ne.jp",
    "hatarakigai.info",
    "officenomikata.jp",
    "cheercareer.jp",
    "boxil.jp",
    "itreview.jp",
    "ferret-plus.com",
    "liskul.com",
    "webtan.impress.co.jp",
    "seleck.cc",
    "leverages.jp",
    "techcrunch.com",
    "it-trend.jp",
    "aspic.or.jp",
    "meetsmore.com",
    "crowdworks.jp",
    "lancers.jp",
];

/// Government, municipal, and school domains are never prospects.
const EXCLUDE_DOMAIN_SUFFIXES: &[&str] = &[".go.jp", ".lg.jp", ".ed.jp", ".ac.jp"];

/// Title fragments marking roundup articles, rankings, and career content.
/// Matched case-insensitively.
const EXCLUDE_TITLE_PATTERNS: &[&str] = &[
    "ランキング",
    "一覧",
    "比較",
    "おすすめ",
    "選び方",
    "まとめ",
    "厳選",
    "徹底比較",
    "口コミ",
    "評判",
    "人気",
    "top",
    "best",
    "社を紹介",
    "社まとめ",
    "件を紹介",
    "企業を紹介",
    "転職",
    "求人",
    "採用情報",
    "年収",
    "就職",
    "インターン",
];

fn listicle_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+選").expect("listicle regex must compile"))
}

/// True when the domain is on the denylist (substring or suffix match).
pub fn is_excluded_domain(domain: &str) -> bool {
    let domain = domain.to_lowercase();
    EXCLUDE_DOMAINS.iter().any(|d| domain.contains(d))
        || EXCLUDE_DOMAIN_SUFFIXES.iter().any(|s| domain.ends_with(s))
}

/// True when the title marks a roundup/career page rather than a company.
pub fn is_excluded_title(title: &str) -> bool {
    let title = title.to_lowercase();
    EXCLUDE_TITLE_PATTERNS.iter().any(|p| title.contains(p))
}

/// Heuristic: does this result look like a company's own site?
///
/// `.co.jp` is a corporate TLD, so those domains skip the title check.
/// Listicle titles are rejected; anything else is accepted and left to the
/// downstream cleanser.
pub fn looks_like_company(title: &str, domain: &str) -> bool {
    if domain.ends_with(".co.jp") {
        return true;
    }
    if listicle_re().is_match(title) {
        return false;
    }
    if title.contains("とは") {
        return false;
    }
    if has_corporate_form(title) {
        return true;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_board_domain_is_excluded() {
        assert!(is_excluded_domain("indeed.com"));
        assert!(is_excluded_domain("jp.indeed.com"));
    }

    #[test]
    fn government_suffix_is_excluded() {
        assert!(is_excluded_domain("pref.tokyo.lg.jp"));
        assert!(is_excluded_domain("mext.go.jp"));
        assert!(is_excluded_domain("u-tokyo.ac.jp"));
    }

    #[test]
    fn corporate_domain_is_not_excluded() {
        assert!(!is_excluded_domain("example.co.jp"));
    }

    #[test]
    fn recruitment_title_is_excluded() {
        assert!(is_excluded_title("エンジニア転職なら当社"));
        assert!(is_excluded_title("IT企業おすすめ20社"));
        assert!(is_excluded_title("TOP10 IT companies"));
    }

    #[test]
    fn plain_company_title_is_not_excluded() {
        assert!(!is_excluded_title("株式会社サンプル｜公式サイト"));
    }

    #[test]
    fn co_jp_skips_title_heuristic() {
        assert!(looks_like_company("ITベンダー10選", "example.co.jp"));
    }

    #[test]
    fn listicle_title_fails_heuristic() {
        assert!(!looks_like_company("ITベンダー10選", "example.jp"));
        assert!(!looks_like_company("クラウドとは何か", "example.jp"));
    }

    #[test]
    fn corporate_form_title_passes_heuristic() {
        assert!(looks_like_company("株式会社サンプル", "example.jp"));
    }

    #[test]
    fn unknown_title_is_deferred_downstream() {
        assert!(looks_like_company("サンプル技研", "example.jp"));
    }
}
