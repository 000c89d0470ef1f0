//! Prompt construction for the company-data cleansing call.

use crate::model::Candidate;

/// System prompt: the cleansing charter. Demands normalized legal-entity
/// names only, lists the exclusion classes, and pins the JSON envelope.
pub const SYSTEM_PROMPT: &str = r#"あなたは企業データクレンジングの専門家です。

## タスク
検索結果から**営業先になりうる民間企業**の情報のみを抽出・正規化してください。
**品質を最優先**にし、無効なデータは必ず除外してください。

## 処理ルール

### 1. 企業名の正規化（最重要）
**出力する企業名は正式な法人名のみにする。余計なものは全て削除。**

具体例：
- 「株式会社〇〇｜公式サイト」→「株式会社〇〇」（パイプ以降を削除）
- 「株式会社〇〇（東証上場企業）」→「株式会社〇〇」（カッコ内を削除）
- 「株式会社〇〇のホームページ」→「株式会社〇〇」（「のホームページ」を削除）
- 「Ｓ ｋ ｙ株式会社」→「Sky株式会社」（全角→半角、不要スペース削除）
- 「沿革：〇〇株式会社」→「〇〇株式会社」（接頭辞を削除）

### 2. 必ず除外するもの

**A. 法人格がないもの**
- 法人格（株式会社・有限会社・合同会社等）が不明な名称は除外

**B. キャッチコピー・文章**
- 「上京を志す、就活生へ。」のようなキャッチコピーは除外
- 法人名の前に修飾文がつく場合（「〇〇を支援する株式会社〇〇」）は法人名のみ抽出

**C. 協会・団体・連盟**
- 一般社団法人、公益社団法人、協会、連盟、懇話会は全て除外

**D. メディア・教育**
- 「週刊〇〇」「〇〇講座」「〇〇養成」は除外

**E. その他**
- まとめ記事、比較サイト、求人サイト、SNS、Wikipediaは除外
- 政府・自治体（.go.jp, .lg.jp）は除外

### 3. URL正規化
- サブページはトップページに変換

### 4. 重複排除
- 同一ドメインは1つだけ残す

## 出力形式
必ず以下のJSON形式のみで出力（説明文不要）：
{
  "cleaned_companies": [
    {
      "company_name": "株式会社〇〇",
      "url": "https://example.co.jp/",
      "domain": "example.co.jp",
      "relevance_score": 0.95
    }
  ],
  "excluded_count": 5,
  "valid_count": 25
}"#;

/// At most this many existing domains are quoted into the prompt.
const MAX_PROMPT_DOMAINS: usize = 100;

/// Build the user prompt for one batch.
pub fn build_user_prompt(
    batch: &[Candidate],
    search_keyword: &str,
    existing_domains: &[String],
) -> String {
    let input_data: Vec<serde_json::Value> = batch
        .iter()
        .enumerate()
        .map(|(i, c)| {
            serde_json::json!({
                "index": i + 1,
                "title": c.company_name,
                "url": c.url,
                "domain": c.domain,
            })
        })
        .collect();
    let data_json =
        serde_json::to_string_pretty(&input_data).unwrap_or_else(|_| "[]".to_string());

    let mut prompt = format!("## 検索キーワード\n{search_keyword}\n\n");

    if !existing_domains.is_empty() {
        let capped: Vec<&String> = existing_domains.iter().take(MAX_PROMPT_DOMAINS).collect();
        let domains_json = serde_json::to_string(&capped).unwrap_or_else(|_| "[]".to_string());
        prompt.push_str(&format!(
            "## 既存企業ドメイン（必ず除外）\n{domains_json}\n\n"
        ));
    }

    prompt.push_str(&format!(
        "## 検索結果データ（{}件）\n{data_json}\n\n\
         上記の検索結果をクレンジングし、有効な企業リストをJSON形式で出力してください。\n\
         **品質重視**: 企業名が正しく抽出できないものは除外してください。",
        batch.len()
    ));
    if !existing_domains.is_empty() {
        prompt.push_str("\n**「既存企業ドメイン」に含まれるドメインは必ず除外してください。**");
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_prompt_includes_batch_and_keyword() {
        let batch = vec![Candidate::new("株式会社アルファ", "https://alpha.co.jp/")];
        let prompt = build_user_prompt(&batch, "東京 IT企業", &[]);
        assert!(prompt.contains("東京 IT企業"));
        assert!(prompt.contains("alpha.co.jp"));
        assert!(prompt.contains("1件"));
        assert!(!prompt.contains("既存企業ドメイン"));
    }

    #[test]
    fn user_prompt_caps_existing_domains_at_one_hundred() {
        let batch = vec![Candidate::new("株式会社アルファ", "https://alpha.co.jp/")];
        let domains: Vec<String> = (0..150).map(|i| format!("d{i}.example.jp")).collect();
        let prompt = build_user_prompt(&batch, "kw", &domains);
        assert!(prompt.contains("d99.example.jp"));
        assert!(!prompt.contains("d100.example.jp"));
    }
}
