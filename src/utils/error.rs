use thiserror::Error;

/// 錯誤種類：由轉接層（completion / store）判定一次，上層依種類決定
/// 重試與顯示方式，不再比對錯誤訊息字串
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 連線層失敗（DNS 解析、連線被拒、傳輸中斷）
    Network,
    /// 請求逾時
    Timeout,
    /// 金鑰無效或未授權（HTTP 401 / 403）
    Auth,
    /// 流量限制（HTTP 429）
    RateLimited,
    /// 遠端回應非成功狀態（其他 4xx / 5xx）
    Api,
    /// 回應內容無法解讀
    Invalid,
}

impl ErrorKind {
    /// 只有連線層失敗視為暫時性；逾時與 5xx 維持不重試的窄觸發條件
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorKind::Network)
    }
}

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("No JSON object found in completion response")]
    MalformedResponse,

    #[error("Classification is missing required fields: {missing}")]
    IncompleteClassification { missing: String },

    #[error("Portfolio analysis returned no products")]
    EmptyPortfolio,

    #[error("Classification request failed: {message}")]
    ClassificationFailed { kind: ErrorKind, message: String },

    #[error("Store operation '{operation}' failed: {message}")]
    StoreOperationFailed {
        operation: String,
        kind: ErrorKind,
        message: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClassifyError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Classification,
    Store,
    Config,
    Export,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ClassifyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClassifyError::MalformedResponse
            | ClassifyError::IncompleteClassification { .. }
            | ClassifyError::EmptyPortfolio
            | ClassifyError::ClassificationFailed { .. } => ErrorCategory::Classification,
            ClassifyError::StoreOperationFailed { .. } => ErrorCategory::Store,
            ClassifyError::ConfigError { .. }
            | ClassifyError::MissingConfigError { .. }
            | ClassifyError::InvalidConfigValueError { .. }
            | ClassifyError::ValidationError { .. } => ErrorCategory::Config,
            ClassifyError::CsvError(_) => ErrorCategory::Export,
            ClassifyError::IoError(_) | ClassifyError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 遠端暫時性問題，重跑通常就會過
            ClassifyError::ClassificationFailed { .. }
            | ClassifyError::StoreOperationFailed { .. } => ErrorSeverity::Medium,
            ClassifyError::MalformedResponse
            | ClassifyError::IncompleteClassification { .. }
            | ClassifyError::EmptyPortfolio => ErrorSeverity::High,
            ClassifyError::ConfigError { .. }
            | ClassifyError::MissingConfigError { .. }
            | ClassifyError::InvalidConfigValueError { .. }
            | ClassifyError::ValidationError { .. } => ErrorSeverity::Critical,
            ClassifyError::CsvError(_)
            | ClassifyError::IoError(_)
            | ClassifyError::SerializationError(_) => ErrorSeverity::High,
        }
    }

    /// 錯誤的種類（僅遠端呼叫類錯誤帶有）
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ClassifyError::ClassificationFailed { kind, .. }
            | ClassifyError::StoreOperationFailed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ClassifyError::MalformedResponse => {
                "The AI response did not contain a readable classification".to_string()
            }
            ClassifyError::IncompleteClassification { missing } => {
                format!("The AI classification was incomplete (missing: {})", missing)
            }
            ClassifyError::EmptyPortfolio => {
                "The AI analysis did not return any products for this company".to_string()
            }
            ClassifyError::ClassificationFailed { message, .. } => {
                format!("Classification failed: {}", message)
            }
            ClassifyError::StoreOperationFailed {
                operation, message, ..
            } => {
                format!("Database {} failed: {}", operation, message)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ClassifyError::ClassificationFailed { kind, .. } => match kind {
                ErrorKind::Auth => {
                    "Check that OPENAI_API_KEY is set to a valid completion API key".to_string()
                }
                ErrorKind::RateLimited => {
                    "The completion service is rate limiting requests, wait and retry".to_string()
                }
                ErrorKind::Network | ErrorKind::Timeout => {
                    "Check your network connection and retry".to_string()
                }
                _ => "Check the completion service configuration and retry".to_string(),
            },
            ClassifyError::StoreOperationFailed { .. } => {
                "The result may only be available for this session; check SUPABASE_URL and \
                 SUPABASE_ANON_KEY, then retry"
                    .to_string()
            }
            ClassifyError::MalformedResponse
            | ClassifyError::IncompleteClassification { .. }
            | ClassifyError::EmptyPortfolio => "Retry with a more specific description".to_string(),
            ClassifyError::ConfigError { .. }
            | ClassifyError::MissingConfigError { .. }
            | ClassifyError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again".to_string()
            }
            ClassifyError::ValidationError { .. } => "Correct the input and run again".to_string(),
            ClassifyError::CsvError(_) | ClassifyError::IoError(_) => {
                "Check that the output path exists and is writable".to_string()
            }
            ClassifyError::SerializationError(_) => {
                "This is likely a bug, re-run with --verbose and report the log".to_string()
            }
        }
    }
}
