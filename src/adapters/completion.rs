use crate::adapters::{kind_of_status, kind_of_transport};
use crate::config::CompletionConfig;
use crate::domain::model::CompletionRequest;
use crate::domain::ports::CompletionApi;
use crate::utils::error::{ClassifyError, ErrorKind, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// OpenAI 相容的 chat completion 客戶端。
/// 這一層不重試：遠端失敗一律以 ClassificationFailed 帶種類浮出，
/// 由呼叫端決定怎麼辦
pub struct ChatCompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl ChatCompletionClient {
    pub fn new(config: &CompletionConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn classification_failed(kind: ErrorKind, message: impl Into<String>) -> ClassifyError {
    ClassifyError::ClassificationFailed {
        kind,
        message: message.into(),
    }
}

#[async_trait]
impl CompletionApi for ChatCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        tracing::debug!(
            "📡 Sending completion request (model: {}, max_tokens: {})",
            self.model,
            request.max_tokens
        );

        let response = self
            .http
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| classification_failed(kind_of_transport(&e), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("❌ Completion service returned HTTP {}", status);
            return Err(classification_failed(
                kind_of_status(status),
                format!("HTTP {}: {}", status.as_u16(), body),
            ));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| classification_failed(ErrorKind::Invalid, e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                classification_failed(ErrorKind::Invalid, "completion response contained no choices")
            })
    }
}
