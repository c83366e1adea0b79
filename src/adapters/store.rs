use crate::adapters::{kind_of_status, kind_of_transport};
use crate::config::StoreConfig;
use crate::core::stats::aggregate;
use crate::domain::model::{
    Classification, ClassificationPatch, NewClassification, QueryOptions, RecordPage, StatRow,
    Statistics,
};
use crate::domain::ports::ClassificationStore;
use crate::utils::error::{ClassifyError, ErrorKind, Result};
use async_trait::async_trait;
use regex::Regex;
use std::future::Future;
use std::time::Duration;

const TABLE: &str = "classifications";

/// 持久層專用的有界重試：只在錯誤種類為暫時性（網路層）時重試，
/// 最多補打 2 次，延遲依 1.5 倍放寬。沒有抖動，也沒有總時長上限
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// 第 n 次重試前的等待：base × 1.5^n
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as f64;
        Duration::from_millis((base_ms * 1.5f64.powi(attempt as i32)) as u64)
    }

    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let transient = err.kind().map(ErrorKind::is_transient).unwrap_or(false);
                    if !transient || attempt >= self.max_retries {
                        return Err(err);
                    }

                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        "🔁 {} hit a transient network error, retry {}/{} in {:?}",
                        operation,
                        attempt + 1,
                        self.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Supabase（PostgREST）上 `classifications` 表的閘道。
/// 過濾、排序、分頁、計數都下推給查詢引擎；
/// 只有統計聚合拉投影回來在本地算
pub struct SupabaseStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

fn store_err(operation: &str, kind: ErrorKind, message: impl Into<String>) -> ClassifyError {
    ClassifyError::StoreOperationFailed {
        operation: operation.to_string(),
        kind,
        message: message.into(),
    }
}

/// 寬鬆的 HS 編碼外形：四位數字，後面可選兩段 .NN
fn is_hs_code_shape(term: &str) -> bool {
    Regex::new(r"^\d{4}(\.\d{2}(\.\d{2})?)?$")
        .unwrap()
        .is_match(term)
}

/// 把查詢選項翻成 PostgREST 參數。
/// 搜尋詞長得像 HS 編碼時只比對 hs_code 欄位，
/// 否則對產品名、客戶名、HS 編碼做 OR 子字串比對
fn query_params(options: &QueryOptions) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = vec![("select".to_string(), "*".to_string())];

    if let Some(code) = &options.hs_code_eq {
        params.push(("hs_code".to_string(), format!("eq.{}", code)));
    }
    if let Some(customer) = &options.customer_eq {
        params.push(("customer_name".to_string(), format!("eq.{}", customer)));
    }
    if options.dual_use_only {
        params.push(("is_dual_use".to_string(), "eq.true".to_string()));
    }

    if let Some(term) = options.search_term.as_deref().map(str::trim) {
        if !term.is_empty() {
            if is_hs_code_shape(term) {
                params.push(("hs_code".to_string(), format!("ilike.*{}*", term)));
            } else {
                params.push((
                    "or".to_string(),
                    format!(
                        "(product_name.ilike.*{term}*,customer_name.ilike.*{term}*,hs_code.ilike.*{term}*)"
                    ),
                ));
            }
        }
    }

    params.push((
        "order".to_string(),
        format!(
            "{}.{}",
            options.sort_by.column(),
            options.sort_order.keyword()
        ),
    ));

    if let Some(limit) = options.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(offset) = options.offset {
        params.push(("offset".to_string(), offset.to_string()));
    }

    params
}

/// Content-Range 形如 "0-9/42" 或 "*/0"，斜線後是未分頁總數
fn parse_content_range(value: &str) -> Option<u64> {
    value.split('/').nth(1)?.trim().parse().ok()
}

impl SupabaseStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_retry(config, RetryPolicy::default())
    }

    pub fn with_retry(config: &StoreConfig, retry: RetryPolicy) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            retry,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn check_status(operation: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::error!("❌ Store {} returned HTTP {}", operation, status);
        Err(store_err(
            operation,
            kind_of_status(status),
            format!("HTTP {}: {}", status.as_u16(), body),
        ))
    }

    async fn do_insert(&self, record: &NewClassification) -> Result<Classification> {
        let response = self
            .authed(self.http.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await
            .map_err(|e| store_err("insert", kind_of_transport(&e), e.to_string()))?;

        let response = Self::check_status("insert", response).await?;
        let mut rows: Vec<Classification> = response
            .json()
            .await
            .map_err(|e| store_err("insert", ErrorKind::Invalid, e.to_string()))?;

        if rows.is_empty() {
            return Err(store_err(
                "insert",
                ErrorKind::Invalid,
                "store returned an empty representation",
            ));
        }
        Ok(rows.remove(0))
    }

    async fn do_query(&self, options: &QueryOptions) -> Result<RecordPage> {
        let response = self
            .authed(self.http.get(self.table_url()))
            .header("Prefer", "count=exact")
            .query(&query_params(options))
            .send()
            .await
            .map_err(|e| store_err("query", kind_of_transport(&e), e.to_string()))?;

        let response = Self::check_status("query", response).await?;
        let total_header = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);

        let records: Vec<Classification> = response
            .json()
            .await
            .map_err(|e| store_err("query", ErrorKind::Invalid, e.to_string()))?;

        // 沒有計數標頭就退回本頁筆數
        let total = total_header.unwrap_or(records.len() as u64);
        Ok(RecordPage { records, total })
    }

    async fn do_get_by_id(&self, id: &str) -> Result<Option<Classification>> {
        let id_filter = format!("eq.{}", id);
        let response = self
            .authed(self.http.get(self.table_url()))
            .query(&[("select", "*"), ("id", id_filter.as_str()), ("limit", "1")])
            .send()
            .await
            .map_err(|e| store_err("get_by_id", kind_of_transport(&e), e.to_string()))?;

        let response = Self::check_status("get_by_id", response).await?;
        let rows: Vec<Classification> = response
            .json()
            .await
            .map_err(|e| store_err("get_by_id", ErrorKind::Invalid, e.to_string()))?;

        Ok(rows.into_iter().next())
    }

    async fn do_update(&self, id: &str, patch: &ClassificationPatch) -> Result<Classification> {
        let response = self
            .authed(self.http.patch(self.table_url()))
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", id))])
            .json(patch)
            .send()
            .await
            .map_err(|e| store_err("update", kind_of_transport(&e), e.to_string()))?;

        let response = Self::check_status("update", response).await?;
        let mut rows: Vec<Classification> = response
            .json()
            .await
            .map_err(|e| store_err("update", ErrorKind::Invalid, e.to_string()))?;

        if rows.is_empty() {
            return Err(store_err(
                "update",
                ErrorKind::Invalid,
                format!("no row with id {}", id),
            ));
        }
        Ok(rows.remove(0))
    }

    async fn do_delete(&self, id: &str) -> Result<()> {
        let response = self
            .authed(self.http.delete(self.table_url()))
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await
            .map_err(|e| store_err("delete", kind_of_transport(&e), e.to_string()))?;

        // 刪除不存在的列也是 2xx，天然冪等
        Self::check_status("delete", response).await?;
        Ok(())
    }

    async fn do_stat_rows(&self) -> Result<Vec<StatRow>> {
        let response = self
            .authed(self.http.get(self.table_url()))
            .query(&[("select", "confidence,is_dual_use,chapter")])
            .send()
            .await
            .map_err(|e| store_err("statistics", kind_of_transport(&e), e.to_string()))?;

        let response = Self::check_status("statistics", response).await?;
        response
            .json()
            .await
            .map_err(|e| store_err("statistics", ErrorKind::Invalid, e.to_string()))
    }
}

#[async_trait]
impl ClassificationStore for SupabaseStore {
    async fn insert(&self, record: &NewClassification) -> Result<Classification> {
        self.retry.run("insert", || self.do_insert(record)).await
    }

    async fn query(&self, options: &QueryOptions) -> Result<RecordPage> {
        self.retry.run("query", || self.do_query(options)).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Classification>> {
        self.retry.run("get_by_id", || self.do_get_by_id(id)).await
    }

    async fn update(&self, id: &str, patch: &ClassificationPatch) -> Result<Classification> {
        self.retry.run("update", || self.do_update(id, patch)).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.retry.run("delete", || self.do_delete(id)).await
    }

    async fn stat_rows(&self) -> Result<Vec<StatRow>> {
        self.retry.run("statistics", || self.do_stat_rows()).await
    }

    async fn statistics(&self) -> Result<Statistics> {
        Ok(aggregate(&self.stat_rows().await?))
    }
}
