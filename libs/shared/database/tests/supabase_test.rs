use assert_matches::assert_matches;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::{AppConfig, BookingPolicy, StoreBackend};
use shared_database::{Predicate, Query, StoreGateway, SupabaseStore};
use shared_models::{Collection, Fields, StoreError};

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        supabase_url: base_url.to_string(),
        supabase_anon_key: "test-anon-key".to_string(),
        supabase_service_token: None,
        store_backend: StoreBackend::Supabase,
        booking_policy: BookingPolicy::BestEffort,
        api_port: 0,
    }
}

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_get_returns_document_without_id_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/slots"))
        .and(query_param("id", "eq.s1"))
        .and(header("apikey", "test-anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s1", "doctorId": "d1", "isBooked": false }
        ])))
        .mount(&mock_server)
        .await;

    let store = SupabaseStore::new(&test_config(&mock_server.uri()));
    let doc = store.get(Collection::Slots, "s1").await.unwrap().unwrap();

    assert_eq!(doc.id, "s1");
    assert_eq!(doc.get("doctorId"), Some(&json!("d1")));
    assert!(doc.get("id").is_none());
}

#[tokio::test]
async fn test_get_missing_row_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let store = SupabaseStore::new(&test_config(&mock_server.uri()));
    assert!(store.get(Collection::Appointments, "a1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_query_sends_filters_and_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/slots"))
        .and(query_param("doctorId", "eq.d1"))
        .and(query_param("isBooked", "eq.false"))
        .and(query_param("order", "date.asc,time.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s1", "date": "2024-03-01", "time": "09:00" },
            { "id": "s2", "date": "2024-03-01", "time": "10:00" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = SupabaseStore::new(&test_config(&mock_server.uri()));
    let query = Query::new()
        .filter_eq("doctorId", "d1")
        .filter_eq("isBooked", false)
        .order_by("date")
        .order_by("time");

    let docs = store.query(Collection::Slots, &query).await.unwrap();
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2"]);
}

#[tokio::test]
async fn test_create_posts_generated_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(header("Prefer", "return=representation"))
        .and(body_partial_json(json!({ "status": "CONFIRMED" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": "a-42", "status": "CONFIRMED" }
        ])))
        .mount(&mock_server)
        .await;

    let store = SupabaseStore::new(&test_config(&mock_server.uri()));
    let id = store
        .create(Collection::Appointments, fields(json!({ "status": "CONFIRMED" })))
        .await
        .unwrap();

    assert_eq!(id, "a-42");
}

#[tokio::test]
async fn test_update_of_missing_row_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/slots"))
        .and(query_param("id", "eq.ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let store = SupabaseStore::new(&test_config(&mock_server.uri()));
    let result = store
        .update(Collection::Slots, "ghost", fields(json!({ "isBooked": true })))
        .await;

    assert_matches!(result, Err(StoreError::NotFound { .. }));
}

#[tokio::test]
async fn test_conditional_update_not_applied_when_condition_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/slots"))
        .and(query_param("id", "eq.s1"))
        .and(query_param("isBooked", "eq.false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/slots"))
        .and(query_param("id", "eq.s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s1", "isBooked": true }
        ])))
        .mount(&mock_server)
        .await;

    let store = SupabaseStore::new(&test_config(&mock_server.uri()));
    let applied = store
        .update_if(
            Collection::Slots,
            "s1",
            &Predicate::Eq("isBooked".into(), json!(false)),
            fields(json!({ "isBooked": true })),
        )
        .await
        .unwrap();

    assert!(!applied);
}

#[tokio::test]
async fn test_http_errors_are_classified() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied for table doctors"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let store = SupabaseStore::new(&test_config(&mock_server.uri()));

    let denied = store.delete(Collection::Doctors, "d1").await;
    assert_matches!(denied, Err(StoreError::Permission(_)));

    let failed = store.query(Collection::Users, &Query::new()).await;
    assert_matches!(failed, Err(StoreError::Backend { status: 500, .. }));
}

#[tokio::test]
async fn test_unreachable_store_is_transport_error() {
    // Nothing listens on port 9 of localhost.
    let store = SupabaseStore::new(&test_config("http://127.0.0.1:9"));
    let result = store.get(Collection::Slots, "s1").await;
    assert_matches!(result, Err(StoreError::Transport(_)));
}
