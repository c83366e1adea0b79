use crate::domain::model::{
    Classification, ClassificationPatch, CompletionRequest, NewClassification, QueryOptions,
    RecordPage, StatRow, Statistics,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 對遠端文字補全服務的出站埠；回傳原始補全文字
#[async_trait]
pub trait CompletionApi: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// 分類紀錄的持久層契約。過濾、排序、分頁、計數都交給後端查詢引擎；
/// 只有統計聚合走投影 + 本地彙總（statistics 留在介面上，之後要換成
/// 伺服器端聚合時不動呼叫端）
#[async_trait]
pub trait ClassificationStore: Send + Sync {
    async fn insert(&self, record: &NewClassification) -> Result<Classification>;

    async fn query(&self, options: &QueryOptions) -> Result<RecordPage>;

    /// 找不到回 Ok(None)，與錯誤區分
    async fn get_by_id(&self, id: &str) -> Result<Option<Classification>>;

    async fn update(&self, id: &str, patch: &ClassificationPatch) -> Result<Classification>;

    /// 刪除不存在的 id 不視為錯誤
    async fn delete(&self, id: &str) -> Result<()>;

    /// 統計投影：(confidence, is_dual_use, chapter) 全表掃描
    async fn stat_rows(&self) -> Result<Vec<StatRow>>;

    async fn statistics(&self) -> Result<Statistics>;
}
