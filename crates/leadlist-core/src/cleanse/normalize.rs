//! Deterministic company-name normalization applied to every LLM-returned
//! name.
//!
//! The steps run in a fixed order and each is individually observable;
//! `normalize_company_name` is idempotent on its own output.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Japanese corporate-form markers.
pub const CORPORATE_FORMS_JP: &[&str] =
    &["株式会社", "有限会社", "合同会社", "合名会社", "合資会社"];

fn corporate_form_en_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:inc|corp|co|ltd|llc|llp|limited)\b\.?")
            .expect("corporate form regex must compile")
    })
}

/// True when the name carries a corporate-form marker, Japanese or English.
pub fn has_corporate_form(name: &str) -> bool {
    CORPORATE_FORMS_JP.iter().any(|f| name.contains(f)) || corporate_form_en_re().is_match(name)
}

fn sumitsuki_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"【[^】]*】").expect("bracket regex must compile"))
}

fn kagi_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"「[^」]*」").expect("quote regex must compile"))
}

fn paren_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*[（(][^）)]*[）)]\s*").expect("paren regex must compile"))
}

fn site_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"の(?:ホームページ|公式サイト|公式ホームページ|ウェブサイト|HP|Webサイト|WEBサイト|オフィシャルサイト)$",
        )
        .expect("site suffix regex must compile")
    })
}

fn welcome_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"へようこそ$").expect("welcome regex must compile"))
}

fn leading_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:沿革|会社概要|企業情報|会社案内|トップページ|HOME|ホーム)\s*[:：\-|｜]\s*")
            .expect("leading label regex must compile")
    })
}

fn lead_clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^((?:株式会社|有限会社|合同会社|合名会社|合資会社)[^\s、。はがを]{1,15})[はがを、。\s]",
        )
        .expect("lead clause regex must compile")
    })
}

fn lead_suffix_clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^([^\s、。はがを]{1,15}(?:株式会社|有限会社|合同会社|合名会社|合資会社))[はがを、。\s]",
        )
        .expect("lead suffix clause regex must compile")
    })
}

fn trail_clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"する((?:株式会社|有限会社|合同会社|合名会社|合資会社)[^\s、。]{0,15})$")
            .expect("trail clause regex must compile")
    })
}

fn spaced_letters_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // No trailing \b: a CJK character after the run is itself a word
    // character, so "S k y株式会社" has no boundary after the y.
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z](?: [A-Za-z]){2,}").expect("spaced letters regex must compile")
    })
}

fn multi_space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" +").expect("space regex must compile"))
}

/// Normalize an LLM-returned company name into its canonical legal form.
///
/// A name that reduces to a bare corporate-form token becomes the empty
/// string, which the invalidity predicate then rejects.
pub fn normalize_company_name(name: &str) -> String {
    // Full-width letters and digits to half-width.
    let mut name: String = name.nfkc().collect();

    name = split_on_chars(&name, &['|', '｜', '│']);
    name = split_on_str(&name, " - ");
    if name.chars().count() > 20 {
        name = split_on_chars(&name, &['。', '：', ':']);
    }

    name = strip_brackets(&name);
    name = strip_parens(&name);

    name = site_suffix_re().replace(&name, "").into_owned();
    name = welcome_re().replace(&name, "").into_owned();
    name = leading_label_re().replace(&name, "").into_owned();

    name = extract_after_catchphrase(&name);
    name = extract_clause_span(&name);

    name = spaced_letters_re()
        .replace_all(&name, |caps: &regex::Captures<'_>| {
            caps[0].replace(' ', "")
        })
        .into_owned();

    name = name.replace('\u{3000}', " ");
    name = multi_space_re().replace_all(&name, " ").trim().to_string();

    if CORPORATE_FORMS_JP.contains(&name.as_str()) {
        return String::new();
    }
    name
}

/// Split on separator characters and keep the first fragment that still
/// carries a corporate-form marker, falling back to the first fragment.
fn split_on_chars(name: &str, separators: &[char]) -> String {
    if !name.contains(separators) {
        return name.to_string();
    }
    let fragments: Vec<&str> = name
        .split(|c| separators.contains(&c))
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    pick_fragment(&fragments).unwrap_or_default()
}

fn split_on_str(name: &str, separator: &str) -> String {
    if !name.contains(separator) {
        return name.to_string();
    }
    let fragments: Vec<&str> = name
        .split(separator)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    pick_fragment(&fragments).unwrap_or_default()
}

fn pick_fragment(fragments: &[&str]) -> Option<String> {
    fragments
        .iter()
        .find(|f| has_corporate_form(f))
        .or_else(|| fragments.first())
        .map(|f| (*f).to_string())
}

fn strip_brackets(name: &str) -> String {
    let mut name = sumitsuki_re().replace_all(name, "").into_owned();
    name = kagi_re().replace_all(&name, "").into_owned();

    // An opener without its closer: prefer the post-bracket fragment when
    // it carries a corporate form, else the pre-bracket fragment.
    if let Some(idx) = name.find('【') {
        let pre = name[..idx].trim();
        let post = name[idx + '【'.len_utf8()..].trim();
        name = if has_corporate_form(post) {
            post.to_string()
        } else {
            pre.to_string()
        };
    }

    name.replace(['】', '「', '」'], "")
}

fn strip_parens(name: &str) -> String {
    let name = paren_re().replace_all(name, "").into_owned();
    name.replace(['（', '）', '(', ')'], "")
}

/// "〜なら<company>" catchphrases: keep the post-なら fragment when it
/// carries a corporate form.
fn extract_after_catchphrase(name: &str) -> String {
    let mut best: Option<&str> = None;
    for (idx, _) in name.match_indices("なら") {
        let post = &name[idx + "なら".len()..];
        if has_corporate_form(post) {
            best = Some(post);
        }
    }
    best.map_or_else(|| name.to_string(), |p| p.trim().to_string())
}

/// Clause-embedded names ("株式会社X は…", "…を支援する合同会社X"):
/// take only the corporate-form + name span.
fn extract_clause_span(name: &str) -> String {
    if let Some(caps) = lead_clause_re().captures(name) {
        return caps[1].to_string();
    }
    if let Some(caps) = lead_suffix_clause_re().captures(name) {
        return caps[1].to_string();
    }
    if let Some(caps) = trail_clause_re().captures(name) {
        return caps[1].to_string();
    }
    name.to_string()
}
