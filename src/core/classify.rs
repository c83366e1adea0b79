use crate::core::links::reference_links;
use crate::core::prompt::{
    classification_prompt, portfolio_prompt, ANALYST_SYSTEM, CLASSIFIER_SYSTEM,
    PORTFOLIO_TEMPERATURE, SINGLE_PRODUCT_TEMPERATURE,
};
use crate::domain::model::{
    AnalyzedProduct, CompletionRequest, NewClassification, PortfolioAnalysis, RiskLevel,
};
use crate::domain::ports::CompletionApi;
use crate::utils::error::{ClassifyError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// 分類管道：提示詞 → 遠端補全 → JSON 抽取 → 形狀驗證。
/// 除了那一次出站呼叫以外沒有副作用；這一層不做重試，
/// 遠端失敗直接以 ClassificationFailed 浮出
pub struct Classifier<C: CompletionApi> {
    api: C,
    max_tokens: u32,
}

/// 模型回傳的單一產品 JSON 形狀（camelCase 鍵）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassificationPayload {
    #[serde(default)]
    hs_code: String,
    #[serde(default)]
    chapter: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    confidence: Option<i64>,
    #[serde(default)]
    is_dual_use: bool,
    #[serde(default)]
    reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortfolioPayload {
    #[serde(default)]
    industry: String,
    #[serde(default)]
    risk_level: String,
    #[serde(default)]
    products: Vec<ProductPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    hs_code: String,
    #[serde(default)]
    chapter: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    confidence: Option<i64>,
    #[serde(default)]
    is_dual_use: bool,
    #[serde(default)]
    reasoning: Option<String>,
}

/// 從補全文字裡取第一個 '{' 到最後一個 '}' 的片段
fn extract_json_object(text: &str) -> Result<&str> {
    let start = text.find('{').ok_or(ClassifyError::MalformedResponse)?;
    let end = text.rfind('}').ok_or(ClassifyError::MalformedResponse)?;
    if end <= start {
        return Err(ClassifyError::MalformedResponse);
    }
    Ok(&text[start..=end])
}

fn parse_payload<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let json = extract_json_object(raw)?;
    serde_json::from_str(json).map_err(|_| ClassifyError::MalformedResponse)
}

/// hsCode / chapter / description 缺一不可
fn missing_required_fields(hs_code: &str, chapter: &str, description: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if hs_code.trim().is_empty() {
        missing.push("hsCode");
    }
    if chapter.trim().is_empty() {
        missing.push("chapter");
    }
    if description.trim().is_empty() {
        missing.push("description");
    }
    missing
}

fn clamp_confidence(confidence: Option<i64>) -> u8 {
    confidence.unwrap_or(0).clamp(0, 100) as u8
}

impl<C: CompletionApi> Classifier<C> {
    pub fn new(api: C, max_tokens: u32) -> Self {
        Self { api, max_tokens }
    }

    /// 把產品描述變成已驗證的分類候選紀錄
    pub async fn classify_product(
        &self,
        description: &str,
        customer_name: Option<&str>,
    ) -> Result<NewClassification> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ClassifyError::ValidationError {
                message: "product description cannot be empty".to_string(),
            });
        }
        let customer_name = customer_name.map(str::trim).filter(|c| !c.is_empty());

        tracing::debug!("🧠 Requesting classification for: {}", description);
        let raw = self
            .api
            .complete(CompletionRequest {
                system: CLASSIFIER_SYSTEM.to_string(),
                user: classification_prompt(description, customer_name),
                temperature: SINGLE_PRODUCT_TEMPERATURE,
                max_tokens: self.max_tokens,
            })
            .await?;

        let payload: ClassificationPayload = parse_payload(&raw)?;

        let missing = missing_required_fields(&payload.hs_code, &payload.chapter, &payload.description);
        if !missing.is_empty() {
            return Err(ClassifyError::IncompleteClassification {
                missing: missing.join(", "),
            });
        }

        let links = reference_links(&payload.hs_code);
        tracing::info!(
            "🏷️ Classified as {} ({}% confidence)",
            payload.hs_code,
            clamp_confidence(payload.confidence)
        );

        Ok(NewClassification {
            product_name: description.to_string(),
            customer_name: customer_name.map(|c| c.to_string()),
            hs_code: payload.hs_code,
            chapter: payload.chapter,
            description: payload.description,
            confidence: clamp_confidence(payload.confidence),
            is_dual_use: payload.is_dual_use,
            reasoning: payload.reasoning,
            reference_links: Some(links),
        })
    }

    /// 只憑公司名稱推測 3–6 個產品並逐一分類；
    /// 缺必要欄位的產品直接略過，全部略過視同空組合
    pub async fn analyze_portfolio(&self, company: &str) -> Result<PortfolioAnalysis> {
        let company = company.trim();
        if company.is_empty() {
            return Err(ClassifyError::ValidationError {
                message: "company name cannot be empty".to_string(),
            });
        }

        tracing::debug!("🧠 Requesting portfolio analysis for: {}", company);
        let raw = self
            .api
            .complete(CompletionRequest {
                system: ANALYST_SYSTEM.to_string(),
                user: portfolio_prompt(company),
                temperature: PORTFOLIO_TEMPERATURE,
                max_tokens: self.max_tokens,
            })
            .await?;

        let payload: PortfolioPayload = parse_payload(&raw)?;

        let products: Vec<AnalyzedProduct> = payload
            .products
            .into_iter()
            .filter(|p| missing_required_fields(&p.hs_code, &p.chapter, &p.description).is_empty())
            .map(|p| {
                let links = reference_links(&p.hs_code);
                AnalyzedProduct {
                    name: p.name,
                    category: p.category,
                    hs_code: p.hs_code,
                    chapter: p.chapter,
                    description: p.description,
                    confidence: clamp_confidence(p.confidence),
                    is_dual_use: p.is_dual_use,
                    reasoning: p.reasoning,
                    reference_links: Some(links),
                }
            })
            .collect();

        if products.is_empty() {
            return Err(ClassifyError::EmptyPortfolio);
        }

        tracing::info!(
            "🏭 Portfolio for {}: {} products, {} risk",
            company,
            products.len(),
            RiskLevel::parse_lenient(&payload.risk_level)
        );

        Ok(PortfolioAnalysis {
            company: company.to_string(),
            industry: payload.industry,
            risk_level: RiskLevel::parse_lenient(&payload.risk_level),
            products,
        })
    }
}
