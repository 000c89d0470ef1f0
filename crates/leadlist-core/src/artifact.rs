//! CSV artifact for delivery to chat: UTF-8 with BOM so spreadsheet
//! applications open it with the right encoding.

use crate::model::EnrichedRecord;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column headers, in order.
const HEADERS: [&str; 5] = ["企業名", "URL", "お問い合わせURL", "電話番号", "ドメイン"];

/// Render records into a BOM-prefixed CSV document.
pub fn to_csv(records: &[EnrichedRecord]) -> Vec<u8> {
    let mut buf: Vec<u8> = BOM.to_vec();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        // Writing into a Vec cannot fail; errors here would mean OOM.
        let _ = writer.write_record(HEADERS);
        for record in records {
            let _ = writer.write_record([
                record.company_name.as_str(),
                record.base_url.as_str(),
                record.contact_url.as_str(),
                record.phone.as_str(),
                record.domain.as_str(),
            ]);
        }
        let _ = writer.flush();
    }
    buf
}

/// File name for the artifact, derived from the search keyword.
pub fn artifact_filename(search_keyword: &str, date: chrono::NaiveDate) -> String {
    let safe: String = search_keyword
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("営業リスト_{safe}_{}.csv", date.format("%Y%m%d"))
}
