pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::completion::ChatCompletionClient;
pub use adapters::store::{RetryPolicy, SupabaseStore};
pub use config::{AppConfig, CompletionConfig, StoreConfig, TomlConfig};
pub use core::classify::Classifier;
pub use domain::model::{
    Classification, NewClassification, PortfolioAnalysis, QueryOptions, SortBy, SortOrder,
};
pub use domain::ports::{ClassificationStore, CompletionApi};
pub use utils::error::{ClassifyError, ErrorKind, Result};
