//! Built-in region dictionary and expansion tables.

/// Main region, its sub-regions, and nearby regions used for query fan-out.
pub struct RegionEntry {
    pub main: &'static str,
    pub sub_regions: &'static [&'static str],
    pub nearby: &'static [&'static str],
}

/// Expansion table for the major metro regions.
pub const REGION_TABLE: &[RegionEntry] = &[
    RegionEntry {
        main: "東京",
        sub_regions: &["新宿", "渋谷", "港区", "千代田区", "品川"],
        nearby: &["横浜", "川崎", "さいたま", "千葉"],
    },
    RegionEntry {
        main: "大阪",
        sub_regions: &["梅田", "難波", "本町", "淀屋橋"],
        nearby: &["神戸", "京都", "堺"],
    },
    RegionEntry {
        main: "名古屋",
        sub_regions: &["栄", "名駅", "伏見"],
        nearby: &["豊田", "岐阜", "四日市"],
    },
    RegionEntry {
        main: "愛知",
        sub_regions: &["名古屋", "豊田", "岡崎"],
        nearby: &["岐阜", "三重", "静岡"],
    },
    RegionEntry {
        main: "福岡",
        sub_regions: &["博多", "天神"],
        nearby: &["北九州", "久留米"],
    },
    RegionEntry {
        main: "札幌",
        sub_regions: &["大通", "すすきの"],
        nearby: &["小樽", "旭川"],
    },
    RegionEntry {
        main: "北海道",
        sub_regions: &["札幌", "旭川", "函館"],
        nearby: &["小樽", "帯広"],
    },
    RegionEntry {
        main: "横浜",
        sub_regions: &["みなとみらい", "関内", "新横浜"],
        nearby: &["川崎", "東京", "藤沢"],
    },
    RegionEntry {
        main: "神奈川",
        sub_regions: &["横浜", "川崎", "藤沢"],
        nearby: &["東京", "相模原"],
    },
    RegionEntry {
        main: "京都",
        sub_regions: &["烏丸", "四条"],
        nearby: &["大阪", "滋賀"],
    },
    RegionEntry {
        main: "神戸",
        sub_regions: &["三宮", "元町"],
        nearby: &["大阪", "姫路"],
    },
    RegionEntry {
        main: "兵庫",
        sub_regions: &["神戸", "姫路", "西宮"],
        nearby: &["大阪", "京都"],
    },
    RegionEntry {
        main: "仙台",
        sub_regions: &["青葉区", "泉区"],
        nearby: &["山形", "福島"],
    },
    RegionEntry {
        main: "広島",
        sub_regions: &["紙屋町", "八丁堀"],
        nearby: &["岡山", "福山"],
    },
    RegionEntry {
        main: "さいたま",
        sub_regions: &["大宮", "浦和"],
        nearby: &["川越", "東京"],
    },
    RegionEntry {
        main: "埼玉",
        sub_regions: &["さいたま", "川越", "川口"],
        nearby: &["東京", "群馬"],
    },
    RegionEntry {
        main: "千葉",
        sub_regions: &["船橋", "柏"],
        nearby: &["東京", "松戸"],
    },
];

/// Regions used when the keyword carries no parseable region.
///
/// A region-less keyword still needs geographic fan-out to build a usefully
/// large pool, so the generator falls back to the major metro areas.
pub const NATIONWIDE_REGIONS: &[&str] = &[
    "東京", "大阪", "名古屋", "福岡", "札幌", "横浜", "京都", "神戸", "仙台", "広島",
];

/// Administrative-unit suffixes that mark a token as a region.
const REGION_SUFFIXES: &[char] = &['都', '道', '府', '県', '市', '区', '町', '村'];

/// Look up a region entry, tolerating a prefecture suffix ("東京都" → "東京").
pub fn lookup_region(token: &str) -> Option<&'static RegionEntry> {
    let trimmed = trim_admin_suffix(token);
    REGION_TABLE
        .iter()
        .find(|e| e.main == token || e.main == trimmed)
}

/// True when the token reads as a region: known in the dictionary or ending
/// in an administrative-unit suffix.
pub fn is_region_token(token: &str) -> bool {
    lookup_region(token).is_some() || token.chars().last().is_some_and(|c| REGION_SUFFIXES.contains(&c))
}

/// Expand a region into main + sub-regions + nearby regions.
///
/// Unknown regions expand to themselves only.
pub fn expand_region(region: &str) -> Vec<String> {
    match lookup_region(region) {
        Some(entry) => {
            let mut out = vec![entry.main.to_string()];
            out.extend(entry.sub_regions.iter().map(|s| (*s).to_string()));
            out.extend(entry.nearby.iter().map(|s| (*s).to_string()));
            out
        }
        None => vec![trim_admin_suffix(region).to_string()],
    }
}

fn trim_admin_suffix(token: &str) -> &str {
    for suffix in ['都', '府', '県'] {
        if let Some(stripped) = token.strip_suffix(suffix) {
            if !stripped.is_empty() {
                return stripped;
            }
        }
    }
    token
}
