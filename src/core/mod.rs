pub mod classify;
pub mod export;
pub mod links;
pub mod prompt;
pub mod stats;

pub use crate::domain::model::{
    AnalyzedProduct, ChapterCount, Classification, ClassificationPatch, CompletionRequest,
    NewClassification, PortfolioAnalysis, QueryOptions, RecordPage, ReferenceLinks, RiskLevel,
    SortBy, SortOrder, StatRow, Statistics,
};
pub use crate::domain::ports::{ClassificationStore, CompletionApi};
pub use crate::utils::error::Result;
