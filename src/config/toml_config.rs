use crate::config::{CompletionConfig, StoreConfig};
use crate::utils::error::{ClassifyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// TOML 設定檔。區塊可省略，省略時回退環境變數；
/// 值內可寫 ${VAR_NAME} 佔位符，載入時替換
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub completion: Option<CompletionSection>,
    pub store: Option<StoreSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSection {
    pub api_key: String,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    pub url: String,
    pub api_key: String,
}

impl TomlConfig {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ClassifyError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換 ${VAR_NAME} 形式的環境變數；變數不存在時保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// 取 completion 設定；檔案裡沒有這個區塊就回退環境變數
    pub fn completion_config(&self) -> Result<CompletionConfig> {
        match &self.completion {
            Some(section) => Ok(CompletionConfig {
                api_key: section.api_key.clone(),
                model: section
                    .model
                    .clone()
                    .unwrap_or_else(|| "gpt-4o-mini".to_string()),
                max_tokens: section.max_tokens.unwrap_or(1000),
                base_url: section
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            }),
            None => CompletionConfig::from_env(),
        }
    }

    /// 取 store 設定；檔案裡沒有這個區塊就回退環境變數
    pub fn store_config(&self) -> Result<StoreConfig> {
        match &self.store {
            Some(section) => Ok(StoreConfig {
                url: section.url.clone(),
                api_key: section.api_key.clone(),
            }),
            None => StoreConfig::from_env(),
        }
    }
}
