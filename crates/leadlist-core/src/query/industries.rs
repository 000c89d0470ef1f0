//! Industry-variant table keyed by substring match on the parsed industry.

/// Variant phrases per industry keyword.
///
/// A table entry applies when the parsed industry contains its key.
const INDUSTRY_VARIANTS: &[(&str, &[&str])] = &[
    (
        "IT",
        &[
            "IT企業",
            "システム開発",
            "ソフトウェア開発",
            "Web制作",
            "アプリ開発",
            "受託開発",
            "ITサービス",
        ],
    ),
    (
        "システム",
        &["システム開発", "業務システム", "システムインテグレーション"],
    ),
    (
        "ソフト",
        &["ソフトウェア開発", "パッケージソフト", "アプリ開発"],
    ),
    (
        "Web",
        &["Web制作", "ホームページ制作", "Webデザイン", "Webシステム開発"],
    ),
    (
        "広告",
        &["広告代理店", "広告制作", "ネット広告", "販促支援"],
    ),
    (
        "マーケティング",
        &["マーケティング支援", "Webマーケティング", "デジタルマーケティング"],
    ),
    ("製造", &["製造業", "メーカー", "部品メーカー", "金属加工"]),
    ("建設", &["建設会社", "工務店", "建築設計", "土木工事"]),
    ("建築", &["建築設計", "建設会社", "リフォーム"]),
    (
        "不動産",
        &["不動産会社", "不動産仲介", "不動産管理", "賃貸管理"],
    ),
    ("人材", &["人材紹介", "人材派遣", "人材サービス"]),
    ("飲食", &["飲食店運営", "外食チェーン", "フードサービス"]),
    ("物流", &["物流会社", "運送会社", "倉庫業"]),
    ("運送", &["運送会社", "物流会社", "配送サービス"]),
    ("介護", &["介護事業", "介護サービス", "福祉サービス"]),
    (
        "コンサル",
        &["コンサルティング会社", "経営コンサルティング", "ITコンサルティング"],
    ),
    ("税理士", &["税理士法人", "会計事務所"]),
    ("印刷", &["印刷会社", "印刷業"]),
    ("エネルギー", &["エネルギー関連企業", "電力会社", "再生可能エネルギー"]),
];

/// Fallback variants when the industry matches no table entry.
const GENERIC_VARIANTS: &[&str] = &["会社", "企業", "サービス会社"];

/// Expand an industry phrase into its variants plus the phrase itself.
pub fn industry_variants(industry: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    if !industry.is_empty() {
        out.push(industry.to_string());
    }
    let mut matched = false;
    for (key, variants) in INDUSTRY_VARIANTS {
        if industry.contains(key) {
            matched = true;
            for v in *variants {
                if !out.iter().any(|x| x == v) {
                    out.push((*v).to_string());
                }
            }
        }
    }
    if !matched {
        for v in GENERIC_VARIANTS {
            if !out.iter().any(|x| x == v) {
                out.push((*v).to_string());
            }
        }
    }
    out
}
