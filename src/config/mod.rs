pub mod toml_config;

use crate::utils::error::{ClassifyError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use std::env;

pub use toml_config::TomlConfig;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Completion 服務設定。啟動時建構一次，之後以引用傳給
/// 需要的元件，元件本身不讀環境變數
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
}

/// Supabase store 設定；兩個值缺一不可，缺了就是啟動期硬錯誤
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub completion: CompletionConfig,
    pub store: StoreConfig,
}

impl CompletionConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            api_key: env::var("OPENAI_API_KEY").map_err(|_| ClassifyError::MissingConfigError {
                field: "OPENAI_API_KEY".to_string(),
            })?,
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            max_tokens: env::var("OPENAI_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_TOKENS),
            base_url: env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        })
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("SUPABASE_URL").map_err(|_| ClassifyError::MissingConfigError {
                field: "SUPABASE_URL".to_string(),
            })?,
            api_key: env::var("SUPABASE_ANON_KEY").map_err(|_| {
                ClassifyError::MissingConfigError {
                    field: "SUPABASE_ANON_KEY".to_string(),
                }
            })?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            completion: CompletionConfig::from_env()?,
            store: StoreConfig::from_env()?,
        })
    }
}

/// 載入 completion 設定：有給 TOML 檔就讀檔（缺的區塊回退環境變數），
/// 沒給就直接讀環境變數
pub fn load_completion_config(config_path: Option<&str>) -> Result<CompletionConfig> {
    let config = match config_path {
        Some(path) => TomlConfig::from_file(path)?.completion_config()?,
        None => CompletionConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

pub fn load_store_config(config_path: Option<&str>) -> Result<StoreConfig> {
    let config = match config_path {
        Some(path) => TomlConfig::from_file(path)?.store_config()?,
        None => StoreConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

impl Validate for CompletionConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("completion.api_key", &self.api_key)?;
        validate_non_empty_string("completion.model", &self.model)?;
        validate_range("completion.max_tokens", self.max_tokens, 1, 32_768)?;
        validate_url("completion.base_url", &self.base_url)?;
        Ok(())
    }
}

impl Validate for StoreConfig {
    fn validate(&self) -> Result<()> {
        validate_url("store.url", &self.url)?;
        validate_non_empty_string("store.api_key", &self.api_key)?;
        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.completion.validate()?;
        self.store.validate()?;
        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_config_validation() {
        let config = CompletionConfig {
            api_key: "sk-test".to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: DEFAULT_BASE_URL.to_string(),
        };
        assert!(config.validate().is_ok());

        let bad = CompletionConfig {
            max_tokens: 0,
            ..config
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_store_config_validation() {
        let config = StoreConfig {
            url: "https://example.supabase.co".to_string(),
            api_key: "anon-key".to_string(),
        };
        assert!(config.validate().is_ok());

        let bad = StoreConfig {
            url: "not a url".to_string(),
            api_key: "anon-key".to_string(),
        };
        assert!(bad.validate().is_err());
    }

    // 環境變數測試共用同一組名稱，放在同一個測試裡循序跑
    #[test]
    fn test_store_config_from_env() {
        std::env::remove_var("SUPABASE_URL");
        std::env::remove_var("SUPABASE_ANON_KEY");

        let err = StoreConfig::from_env().unwrap_err();
        assert!(matches!(err, ClassifyError::MissingConfigError { .. }));

        std::env::set_var("SUPABASE_URL", "https://example.supabase.co");
        std::env::set_var("SUPABASE_ANON_KEY", "anon-key");

        let config = StoreConfig::from_env().unwrap();
        assert_eq!(config.url, "https://example.supabase.co");

        std::env::remove_var("SUPABASE_URL");
        std::env::remove_var("SUPABASE_ANON_KEY");
    }
}
