use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;

use appointment_cell::models::AppointmentError;
use appointment_cell::services::lifecycle::StatusReconciler;
use shared_database::{InMemoryStore, StoreOp};
use shared_models::{Collection, StoreError};
use shared_utils::test_utils::{as_fields, StoreFixtures};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn status_of(store: &InMemoryStore, id: &str) -> String {
    store
        .snapshot(Collection::Appointments, id)
        .await
        .and_then(|fields| fields.get("status").and_then(|v| v.as_str()).map(str::to_string))
        .unwrap_or_default()
}

#[tokio::test]
async fn test_past_confirmed_appointments_are_completed() {
    let store = Arc::new(InMemoryStore::new());
    StoreFixtures::seed_appointment(&store, "past", "s1", "2024-02-28", "CONFIRMED").await;
    StoreFixtures::seed_appointment(&store, "today", "s2", "2024-03-01", "CONFIRMED").await;
    StoreFixtures::seed_appointment(&store, "future", "s3", "2024-03-09", "CONFIRMED").await;
    StoreFixtures::seed_appointment(&store, "cancelled", "s4", "2024-01-10", "CANCELLED").await;

    let reconciler = StatusReconciler::new(store.clone());
    let completed = reconciler.reconcile_as_of(day("2024-03-01")).await.unwrap();

    assert_eq!(completed, 1);
    assert_eq!(status_of(&store, "past").await, "COMPLETED");
    assert_eq!(status_of(&store, "today").await, "CONFIRMED");
    assert_eq!(status_of(&store, "future").await, "CONFIRMED");
    assert_eq!(status_of(&store, "cancelled").await, "CANCELLED");
}

#[tokio::test]
async fn test_second_sweep_is_a_no_op() {
    let store = Arc::new(InMemoryStore::new());
    StoreFixtures::seed_appointment(&store, "a1", "s1", "2024-02-01", "CONFIRMED").await;
    StoreFixtures::seed_appointment(&store, "a2", "s2", "2024-02-02", "CONFIRMED").await;

    let reconciler = StatusReconciler::new(store.clone());
    assert_eq!(reconciler.reconcile_as_of(day("2024-03-01")).await.unwrap(), 2);
    assert_eq!(reconciler.reconcile_as_of(day("2024-03-01")).await.unwrap(), 0);

    assert_eq!(status_of(&store, "a1").await, "COMPLETED");
    assert_eq!(status_of(&store, "a2").await, "COMPLETED");
}

#[tokio::test]
async fn test_sweep_stops_at_failed_write_and_resumes() {
    let store = Arc::new(InMemoryStore::new());
    StoreFixtures::seed_appointment(&store, "a1", "s1", "2024-02-01", "CONFIRMED").await;
    StoreFixtures::seed_appointment(&store, "a2", "s2", "2024-02-02", "CONFIRMED").await;
    StoreFixtures::seed_appointment(&store, "a3", "s3", "2024-02-03", "CONFIRMED").await;
    store.fail_after(StoreOp::Update, Collection::Appointments, 1);

    let reconciler = StatusReconciler::new(store.clone());
    let first = reconciler.reconcile_as_of(day("2024-03-01")).await;
    assert_matches!(first, Err(AppointmentError::Store(StoreError::Unavailable(_))));

    let completed_so_far = ["a1", "a2", "a3"];
    let mut done = 0;
    for id in completed_so_far {
        if status_of(&store, id).await == "COMPLETED" {
            done += 1;
        }
    }
    assert_eq!(done, 1);

    let second = reconciler.reconcile_as_of(day("2024-03-01")).await.unwrap();
    assert_eq!(second, 2);
    for id in completed_so_far {
        assert_eq!(status_of(&store, id).await, "COMPLETED");
    }
}

#[tokio::test]
async fn test_failed_query_is_reported() {
    let store = Arc::new(InMemoryStore::new());
    StoreFixtures::seed_appointment(&store, "a1", "s1", "2024-02-01", "CONFIRMED").await;
    store.fail_next(StoreOp::Query, Collection::Appointments);

    let reconciler = StatusReconciler::new(store.clone());
    assert_matches!(
        reconciler.reconcile_as_of(day("2024-03-01")).await,
        Err(AppointmentError::Store(_))
    );
    assert_eq!(status_of(&store, "a1").await, "CONFIRMED");
}

#[tokio::test]
async fn test_empty_store_completes_nothing() {
    let store = Arc::new(InMemoryStore::new());
    let reconciler = StatusReconciler::new(store);

    assert_eq!(reconciler.auto_update_appointment_statuses().await.unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_appointment_does_not_block_sweep() {
    let store = Arc::new(InMemoryStore::new());
    store
        .seed(
            Collection::Appointments,
            "a0",
            as_fields(json!({ "status": "CONFIRMED", "date": "2020-01-01" })),
        )
        .await;
    StoreFixtures::seed_appointment(&store, "a1", "s1", "2020-01-01", "CONFIRMED").await;

    let reconciler = StatusReconciler::new(store.clone());
    assert_eq!(reconciler.reconcile_as_of(day("2025-01-01")).await.unwrap(), 1);
    assert_eq!(reconciler.reconcile_as_of(day("2025-01-01")).await.unwrap(), 0);

    assert_eq!(status_of(&store, "a1").await, "COMPLETED");
    assert_eq!(status_of(&store, "a0").await, "CONFIRMED");
}
