use crate::domain::model::Classification;
use crate::utils::error::Result;
use csv::{QuoteStyle, WriterBuilder};
use std::io::Write;
use std::path::Path;

const CSV_HEADERS: [&str; 7] = [
    "Product Name",
    "HS Code",
    "Chapter",
    "Confidence",
    "Dual Use",
    "Customer",
    "Timestamp",
];

/// 把目前過濾/排序後的紀錄頁寫成 CSV。欄位一律加引號，
/// 不打網路，一筆紀錄一列。
pub fn write_csv<W: Write>(records: &[Classification], writer: W) -> Result<()> {
    let mut w = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);

    w.write_record(CSV_HEADERS)?;

    for record in records {
        let confidence = format!("{}%", record.confidence);
        let dual_use = if record.is_dual_use { "Yes" } else { "No" };
        let timestamp = record.created_at.to_rfc3339();

        w.write_record([
            record.product_name.as_str(),
            record.hs_code.as_str(),
            record.chapter.as_str(),
            confidence.as_str(),
            dual_use,
            record.customer_name.as_deref().unwrap_or(""),
            timestamp.as_str(),
        ])?;
    }

    w.flush()?;
    Ok(())
}

pub fn to_csv_string(records: &[Classification]) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(records, &mut buffer)?;
    // csv writer 只輸出 UTF-8
    Ok(String::from_utf8(buffer).expect("csv output is valid utf-8"))
}

pub fn write_csv_file<P: AsRef<Path>>(records: &[Classification], path: P) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(records, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(product: &str, customer: Option<&str>, dual_use: bool) -> Classification {
        Classification {
            id: "a1b2".to_string(),
            product_name: product.to_string(),
            customer_name: customer.map(|c| c.to_string()),
            hs_code: "8471.30.01".to_string(),
            chapter: "84 - Machines".to_string(),
            description: "Portable computers".to_string(),
            confidence: 92,
            is_dual_use: dual_use,
            reasoning: None,
            reference_links: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
        }
    }

    #[test]
    fn test_csv_header_and_row_format() {
        let records = vec![record("Laptop, 14 inch", Some("Acme GmbH"), true)];
        let csv = to_csv_string(&records).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "\"Product Name\",\"HS Code\",\"Chapter\",\"Confidence\",\"Dual Use\",\"Customer\",\"Timestamp\""
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("\"Laptop, 14 inch\",\"8471.30.01\",\"84 - Machines\",\"92%\",\"Yes\",\"Acme GmbH\","));
        assert!(row.contains("2025-03-14T09:26:53"));
    }

    #[test]
    fn test_csv_missing_customer_is_empty_field() {
        let records = vec![record("Router", None, false)];
        let csv = to_csv_string(&records).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("\"No\",\"\","));
    }

    #[test]
    fn test_csv_one_row_per_record() {
        let records = vec![
            record("A", None, false),
            record("B", None, false),
            record("C", None, true),
        ];
        let csv = to_csv_string(&records).unwrap();
        assert_eq!(csv.lines().count(), 4); // header + 3 筆
    }

    #[test]
    fn test_csv_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        write_csv_file(&[record("A", None, false)], &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("\"Product Name\""));
    }
}
