//! Safety-net rejection of names that are not operating companies.
//!
//! The predicate is a declarative table of named rules evaluated in order;
//! the first matching rule rejects the name. Keeping the rules as a table
//! makes each one observable in isolation.

use std::sync::OnceLock;

use regex::Regex;

use super::normalize::{has_corporate_form, CORPORATE_FORMS_JP};

/// Rejection rules, most fundamental first. A rule returning `true`
/// rejects the name.
const RULES: &[(&str, fn(&str) -> bool)] = &[
    ("too_short", too_short),
    ("too_long", too_long),
    ("separator_residue", separator_residue),
    ("truncated", truncated),
    ("association", association),
    ("media", media),
    ("education", education),
    ("roundup", roundup),
    ("catchphrase", catchphrase),
    ("exclamation", exclamation),
    ("sentence_punctuation", sentence_punctuation),
    ("recruitment", recruitment),
    ("long_preamble_before_form", long_preamble_before_form),
    ("no_corporate_form", no_corporate_form),
];

/// True when the name must be dropped.
pub fn is_invalid_company_name(name: &str) -> bool {
    rejection_rule(name).is_some()
}

/// Name of the first rule that rejects this name, if any.
pub fn rejection_rule(name: &str) -> Option<&'static str> {
    for (rule, check) in RULES {
        if check(name) {
            tracing::debug!(rule, name, "company name rejected");
            return Some(rule);
        }
    }
    None
}

fn too_short(name: &str) -> bool {
    name.chars().count() < 3
}

fn too_long(name: &str) -> bool {
    name.chars().count() > 40
}

fn separator_residue(name: &str) -> bool {
    name.contains(['|', '｜', '【', '】'])
}

fn truncated(name: &str) -> bool {
    name.ends_with("...") || name.ends_with('…')
}

fn association(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"協会|連盟|懇話会|連合会|一般社団法人|公益社団法人|一般財団法人|公益財団法人")
            .expect("association regex must compile")
    });
    re.is_match(name)
        || name.ends_with("機構")
        || (name.contains("組合") && !name.contains("組合せ"))
}

fn media(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^(?:週刊|日刊|月刊)|(?:新聞社?|ニュース|メディア)$")
            .expect("media regex must compile")
    });
    re.is_match(name)
}

fn education(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"講座|養成|(?:スクール|アカデミー|塾|学校|学園)$")
            .expect("education regex must compile")
    });
    re.is_match(name)
}

fn roundup(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"\d+選|厳選|比較|おすすめ|ランキング|(?i:top)\d")
            .expect("roundup regex must compile")
    });
    re.is_match(name)
}

fn catchphrase(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"なら.{0,5}$|をお探し|を志す|を支援する|を実現|をサポート|を提供する")
            .expect("catchphrase regex must compile")
    });
    re.is_match(name)
}

fn exclamation(name: &str) -> bool {
    name.contains(['！', '!'])
}

fn sentence_punctuation(name: &str) -> bool {
    name.contains(['。', '、'])
}

fn recruitment(name: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"就活|キャリア|新卒|転職|求人|採用").expect("recruitment regex must compile")
    });
    re.is_match(name)
}

/// A corporate form buried behind a long preamble marks a sentence, not a
/// company name.
fn long_preamble_before_form(name: &str) -> bool {
    CORPORATE_FORMS_JP
        .iter()
        .filter_map(|form| name.find(form))
        .min()
        .is_some_and(|byte_idx| name[..byte_idx].chars().count() > 20)
}

fn no_corporate_form(name: &str) -> bool {
    !has_corporate_form(name)
}
