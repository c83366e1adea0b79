//! 提示詞模板：單一產品分類與公司產品組合分析

/// 單一產品分類用低溫度，輸出盡量可重現
pub const SINGLE_PRODUCT_TEMPERATURE: f64 = 0.1;
/// 組合分析需要一點發散度來推測產品線
pub const PORTFOLIO_TEMPERATURE: f64 = 0.2;

pub const CLASSIFIER_SYSTEM: &str = "You are a customs tariff classification expert. \
You classify products into Harmonized System (HS) codes for export compliance. \
You always respond with a single JSON object and nothing else.";

pub const ANALYST_SYSTEM: &str = "You are an export compliance analyst. \
You infer the likely product portfolio of a company and classify each product \
into Harmonized System (HS) codes. You always respond with a single JSON object \
and nothing else.";

/// 組出單一產品的分類提示；有客戶名稱時附上當背景
pub fn classification_prompt(description: &str, customer_name: Option<&str>) -> String {
    let customer_line = match customer_name {
        Some(name) => format!("The customer buying this product is: {}\n", name),
        None => String::new(),
    };

    format!(
        "Classify the following product into a Harmonized System code.\n\
         \n\
         Product description: {description}\n\
         {customer_line}\
         \n\
         Requirements:\n\
         - \"hsCode\": an 8-digit HS code formatted as NNNN.NN.NN \
         (6-digit international root plus a 2-digit national extension)\n\
         - \"chapter\": the HS chapter formatted as \"NN - chapter description\"\n\
         - \"description\": a short plain-text description of the classified heading\n\
         - \"confidence\": an integer between 70 and 99\n\
         - \"isDualUse\": true if the product has potential dual-use \
         (civilian and military) applications, otherwise false\n\
         - \"reasoning\": a short explanation of the classification choice\n\
         \n\
         Respond with exactly one JSON object containing the keys \
         hsCode, chapter, description, confidence, isDualUse and reasoning."
    )
}

/// 組出公司產品組合的分析提示
pub fn portfolio_prompt(company: &str) -> String {
    format!(
        "Analyze the likely product portfolio of the company \"{company}\".\n\
         \n\
         Infer between 3 and 6 representative products this company sells. For each \
         product provide:\n\
         - \"name\": the product name\n\
         - \"category\": a short product category label\n\
         - \"hsCode\": an 8-digit HS code formatted as NNNN.NN.NN\n\
         - \"chapter\": the HS chapter formatted as \"NN - chapter description\"\n\
         - \"description\": a short plain-text description of the classified heading\n\
         - \"confidence\": an integer between 70 and 99\n\
         - \"isDualUse\": true if the product has potential dual-use applications\n\
         - \"reasoning\": a short explanation\n\
         \n\
         Respond with exactly one JSON object with the keys:\n\
         - \"industry\": the company's overall industry label\n\
         - \"riskLevel\": one of \"Low\", \"Medium\" or \"High\" for export-control risk\n\
         - \"products\": the array of products described above"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_prompt_embeds_description() {
        let prompt = classification_prompt("industrial laser cutter", None);
        assert!(prompt.contains("industrial laser cutter"));
        assert!(prompt.contains("hsCode"));
        assert!(prompt.contains("NNNN.NN.NN"));
        assert!(!prompt.contains("customer buying"));
    }

    #[test]
    fn test_classification_prompt_embeds_customer_when_present() {
        let prompt = classification_prompt("industrial laser cutter", Some("Acme GmbH"));
        assert!(prompt.contains("Acme GmbH"));
    }

    #[test]
    fn test_portfolio_prompt_mentions_risk_levels() {
        let prompt = portfolio_prompt("Globex Corporation");
        assert!(prompt.contains("Globex Corporation"));
        assert!(prompt.contains("riskLevel"));
        assert!(prompt.contains("between 3 and 6"));
    }
}
