use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 已入庫的分類紀錄（store 為唯一真實來源）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub id: String,
    pub product_name: String,
    pub customer_name: Option<String>,
    pub hs_code: String,
    pub chapter: String,
    pub description: String,
    pub confidence: u8,
    pub is_dual_use: bool,
    pub reasoning: Option<String>,
    pub reference_links: Option<ReferenceLinks>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 管道輸出的候選紀錄：尚未入庫，沒有 id 與時間戳
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClassification {
    pub product_name: String,
    pub customer_name: Option<String>,
    pub hs_code: String,
    pub chapter: String,
    pub description: String,
    pub confidence: u8,
    pub is_dual_use: bool,
    pub reasoning: Option<String>,
    pub reference_links: Option<ReferenceLinks>,
}

/// 部分更新：只序列化有值的欄位，updated_at 由 store 觸發器刷新
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassificationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_dual_use: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// HS 編碼對應的固定參考連結組
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceLinks {
    pub hs_portal: String,
    pub chapter_lookup: String,
    pub detailed_lookup: String,
    pub code_search: String,
}

/// 公司產品組合分析結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub company: String,
    pub industry: String,
    pub risk_level: RiskLevel,
    pub products: Vec<AnalyzedProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedProduct {
    pub name: String,
    pub category: String,
    pub hs_code: String,
    pub chapter: String,
    pub description: String,
    pub confidence: u8,
    pub is_dual_use: bool,
    pub reasoning: Option<String>,
    pub reference_links: Option<ReferenceLinks>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// 模型輸出的風險等級字串不一定規整，無法辨識時取中間值
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "high" => RiskLevel::High,
            _ => RiskLevel::Medium,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    CreatedAt,
    Confidence,
    ProductName,
}

impl SortBy {
    pub fn column(&self) -> &'static str {
        match self {
            SortBy::CreatedAt => "created_at",
            SortBy::Confidence => "confidence",
            SortBy::ProductName => "product_name",
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "created" | "created_at" | "date" => Ok(SortBy::CreatedAt),
            "confidence" => Ok(SortBy::Confidence),
            "product" | "product_name" | "name" => Ok(SortBy::ProductName),
            other => Err(format!(
                "unknown sort field '{}', expected created | confidence | product",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{}', expected asc | desc", other)),
        }
    }
}

/// 查詢選項：所有便利查詢都是同一份契約的特化
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub search_term: Option<String>,
    pub dual_use_only: bool,
    pub hs_code_eq: Option<String>,
    pub customer_eq: Option<String>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    pub fn with_page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    pub fn with_sort(mut self, sort_by: SortBy, sort_order: SortOrder) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }

    /// HS 編碼完全相符
    pub fn by_hs_code(code: impl Into<String>) -> Self {
        Self {
            hs_code_eq: Some(code.into()),
            ..Self::default()
        }
    }

    /// 客戶名稱完全相符
    pub fn by_customer(name: impl Into<String>) -> Self {
        Self {
            customer_eq: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn dual_use_only() -> Self {
        Self {
            dual_use_only: true,
            ..Self::default()
        }
    }
}

/// 查詢結果頁：total 為未分頁前的總符合筆數
#[derive(Debug, Clone)]
pub struct RecordPage {
    pub records: Vec<Classification>,
    pub total: u64,
}

/// 統計用的欄位投影，聚合在本地進行
#[derive(Debug, Clone, Deserialize)]
pub struct StatRow {
    pub confidence: u8,
    pub is_dual_use: bool,
    pub chapter: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterCount {
    pub chapter: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    pub total: u64,
    pub dual_use_count: u64,
    pub average_confidence: u32,
    pub top_chapters: Vec<ChapterCount>,
}

/// 對外送出的單次 completion 請求
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_parse_lenient() {
        assert_eq!(RiskLevel::parse_lenient("low"), RiskLevel::Low);
        assert_eq!(RiskLevel::parse_lenient(" HIGH "), RiskLevel::High);
        assert_eq!(RiskLevel::parse_lenient("medium"), RiskLevel::Medium);
        assert_eq!(RiskLevel::parse_lenient("???"), RiskLevel::Medium);
    }

    #[test]
    fn test_sort_by_from_str() {
        assert_eq!("created".parse::<SortBy>().unwrap(), SortBy::CreatedAt);
        assert_eq!("confidence".parse::<SortBy>().unwrap(), SortBy::Confidence);
        assert_eq!("product".parse::<SortBy>().unwrap(), SortBy::ProductName);
        assert!("salience".parse::<SortBy>().is_err());
    }

    #[test]
    fn test_query_options_convenience_constructors() {
        let by_code = QueryOptions::by_hs_code("8471.30.01");
        assert_eq!(by_code.hs_code_eq.as_deref(), Some("8471.30.01"));
        assert!(by_code.search_term.is_none());

        let dual = QueryOptions::dual_use_only();
        assert!(dual.dual_use_only);
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = ClassificationPatch {
            confidence: Some(91),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "confidence": 91 }));
    }
}
