use crate::domain::model::ReferenceLinks;

/// 由 HS 編碼導出固定的參考連結組。純函數，不打網路。
/// 取數字流的前兩碼當章、前六碼當國際根碼；編碼不足位時
/// 對應的路徑段留空，不回報錯誤。
pub fn reference_links(hs_code: &str) -> ReferenceLinks {
    let digits: String = hs_code.chars().filter(|c| c.is_ascii_digit()).collect();
    let chapter = &digits[..digits.len().min(2)];
    let root = &digits[..digits.len().min(6)];

    ReferenceLinks {
        hs_portal: "https://www.wcotradetools.org/en/harmonized-system".to_string(),
        chapter_lookup: format!("https://www.tariffnumber.com/2025/{}", chapter),
        detailed_lookup: format!("https://www.tariffnumber.com/2025/{}", root),
        code_search: format!("https://hts.usitc.gov/search?query={}", root),
    }
}
