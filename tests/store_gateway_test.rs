use httpmock::prelude::*;
use hs_classify::adapters::store::RetryPolicy;
use hs_classify::config::StoreConfig;
use hs_classify::domain::model::{QueryOptions, SortBy, SortOrder};
use hs_classify::utils::error::{ClassifyError, ErrorKind};
use hs_classify::{ClassificationStore, SupabaseStore};
use std::time::Duration;

fn store_config(server: &MockServer) -> StoreConfig {
    StoreConfig {
        url: server.base_url(),
        api_key: "anon-key".to_string(),
    }
}

fn record_json(id: &str, product: &str, hs_code: &str, confidence: u8) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "product_name": product,
        "customer_name": null,
        "hs_code": hs_code,
        "chapter": "84 - Machines",
        "description": "Portable computers",
        "confidence": confidence,
        "is_dual_use": false,
        "reasoning": null,
        "reference_links": null,
        "created_at": "2025-03-14T09:26:53Z",
        "updated_at": "2025-03-14T09:26:53Z"
    })
}

#[tokio::test]
async fn test_query_returns_page_and_total_count() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/classifications")
            .header("Prefer", "count=exact")
            .query_param("select", "*")
            .query_param("order", "created_at.desc")
            .query_param("limit", "2")
            .query_param("offset", "0");
        then.status(200)
            .header("Content-Range", "0-1/42")
            .json_body(serde_json::json!([
                record_json("id-1", "Laptop", "8471.30.01", 87),
                record_json("id-2", "Router", "8517.62.00", 91),
            ]));
    });

    let store = SupabaseStore::new(&store_config(&server));
    let page = store
        .query(&QueryOptions::new().with_page(2, 0))
        .await
        .unwrap();

    mock.assert();
    assert_eq!(page.records.len(), 2);
    assert_eq!(page.total, 42);
    assert_eq!(page.records[0].product_name, "Laptop");
}

#[tokio::test]
async fn test_query_is_idempotent_against_unchanged_store() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/classifications");
        then.status(200)
            .header("Content-Range", "0-0/1")
            .json_body(serde_json::json!([record_json("id-1", "Laptop", "8471.30.01", 87)]));
    });

    let store = SupabaseStore::new(&store_config(&server));
    let options = QueryOptions::new()
        .with_search("laptop")
        .with_sort(SortBy::Confidence, SortOrder::Asc)
        .with_page(10, 0);

    let first = store.query(&options).await.unwrap();
    let second = store.query(&options).await.unwrap();

    mock.assert_hits(2);
    assert_eq!(first.total, second.total);
    assert_eq!(first.records.len(), second.records.len());
    assert_eq!(first.records[0].id, second.records[0].id);
}

#[tokio::test]
async fn test_hs_shaped_search_filters_hs_code_only_on_the_wire() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/classifications")
            .query_param("hs_code", "ilike.*8471.30*");
        then.status(200)
            .header("Content-Range", "*/0")
            .json_body(serde_json::json!([]));
    });

    let store = SupabaseStore::new(&store_config(&server));
    let page = store
        .query(&QueryOptions::new().with_search("8471.30"))
        .await
        .unwrap();

    mock.assert();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_free_text_search_uses_or_filter_on_the_wire() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/classifications").query_param(
            "or",
            "(product_name.ilike.*router*,customer_name.ilike.*router*,hs_code.ilike.*router*)",
        );
        then.status(200)
            .header("Content-Range", "*/0")
            .json_body(serde_json::json!([]));
    });

    let store = SupabaseStore::new(&store_config(&server));
    store
        .query(&QueryOptions::new().with_search("router"))
        .await
        .unwrap();

    mock.assert();
}

#[tokio::test]
async fn test_get_by_id_found_and_not_found() {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/classifications")
            .query_param("id", "eq.id-1");
        then.status(200)
            .json_body(serde_json::json!([record_json("id-1", "Laptop", "8471.30.01", 87)]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/classifications")
            .query_param("id", "eq.missing");
        then.status(200).json_body(serde_json::json!([]));
    });

    let store = SupabaseStore::new(&store_config(&server));

    let found = store.get_by_id("id-1").await.unwrap();
    assert_eq!(found.unwrap().product_name, "Laptop");

    // 找不到是 None，不是 Err
    let missing = store.get_by_id("missing").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_update_patches_row() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::PATCH)
            .path("/rest/v1/classifications")
            .query_param("id", "eq.id-1")
            .header("Prefer", "return=representation")
            .json_body_partial(r#"{"confidence": 95}"#);
        then.status(200)
            .json_body(serde_json::json!([record_json("id-1", "Laptop", "8471.30.01", 95)]));
    });

    let store = SupabaseStore::new(&store_config(&server));
    let patch = hs_classify::domain::model::ClassificationPatch {
        confidence: Some(95),
        ..Default::default()
    };
    let updated = store.update("id-1", &patch).await.unwrap();

    mock.assert();
    assert_eq!(updated.confidence, 95);
}

#[tokio::test]
async fn test_delete_is_silent_on_missing_row() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::DELETE)
            .path("/rest/v1/classifications")
            .query_param("id", "eq.ghost");
        then.status(204);
    });

    let store = SupabaseStore::new(&store_config(&server));
    store.delete("ghost").await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn test_statistics_aggregates_projection() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/classifications")
            .query_param("select", "confidence,is_dual_use,chapter");
        then.status(200).json_body(serde_json::json!([
            { "confidence": 80, "is_dual_use": false, "chapter": "84 - Machines" },
            { "confidence": 90, "is_dual_use": true, "chapter": "84 - Machines" },
            { "confidence": 100, "is_dual_use": false, "chapter": "85 - Electrical" },
        ]));
    });

    let store = SupabaseStore::new(&store_config(&server));
    let stats = store.statistics().await.unwrap();

    mock.assert();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.dual_use_count, 1);
    assert_eq!(stats.average_confidence, 90);
    assert_eq!(stats.top_chapters[0].chapter, "84");
    assert_eq!(stats.top_chapters[0].count, 2);
}

#[tokio::test]
async fn test_connection_failure_maps_to_network_kind_and_retries() {
    // 沒有任何服務在聽這個位址，連線層直接失敗
    let config = StoreConfig {
        url: "http://127.0.0.1:1".to_string(),
        api_key: "anon-key".to_string(),
    };
    let store = SupabaseStore::with_retry(
        &config,
        RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
        },
    );

    let err = store.query(&QueryOptions::new()).await.unwrap_err();
    match err {
        ClassifyError::StoreOperationFailed { operation, kind, .. } => {
            assert_eq!(operation, "query");
            assert_eq!(kind, ErrorKind::Network);
        }
        other => panic!("expected StoreOperationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_error_fails_immediately_without_retry() {
    let server = MockServer::start();

    let mock = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/classifications");
        then.status(500).body("boom");
    });

    let store = SupabaseStore::with_retry(
        &store_config(&server),
        RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
        },
    );

    let err = store.query(&QueryOptions::new()).await.unwrap_err();

    // 5xx 不在窄觸發條件內，不重試
    mock.assert_hits(1);
    assert_eq!(err.kind(), Some(ErrorKind::Api));
}
