use std::sync::Arc;

use serde_json::{json, Value};

use shared_config::{AppConfig, BookingPolicy, StoreBackend};
use shared_database::{AppState, InMemoryStore, StoreGateway};
use shared_models::{Collection, Fields};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub booking_policy: BookingPolicy,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            booking_policy: BookingPolicy::BestEffort,
        }
    }
}

impl TestConfig {
    pub fn with_policy(policy: BookingPolicy) -> Self {
        Self {
            booking_policy: policy,
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_service_token: None,
            store_backend: StoreBackend::Memory,
            booking_policy: self.booking_policy,
            api_port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }

    /// Router state over the given in-memory store.
    pub fn to_state(&self, store: Arc<InMemoryStore>) -> AppState {
        let gateway: Arc<dyn StoreGateway> = store;
        AppState::new(self.to_arc(), gateway)
    }
}

pub fn as_fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

/// Canned documents for seeding the in-memory store.
pub struct StoreFixtures;

impl StoreFixtures {
    pub fn slot(doctor_id: &str, date: &str, time: &str, is_booked: bool) -> Fields {
        as_fields(json!({
            "doctorId": doctor_id,
            "doctorName": format!("Dr. {}", doctor_id.to_uppercase()),
            "date": date,
            "time": time,
            "isBooked": is_booked
        }))
    }

    pub fn appointment(slot_id: &str, date: &str, status: &str) -> Fields {
        as_fields(json!({
            "patientId": "p1",
            "doctorId": "d1",
            "slotId": slot_id,
            "date": date,
            "time": "10:00",
            "status": status,
            "bookedAt": 1_700_000_000_000i64
        }))
    }

    pub async fn seed_slot(
        store: &InMemoryStore,
        id: &str,
        doctor_id: &str,
        date: &str,
        time: &str,
        is_booked: bool,
    ) {
        store
            .seed(Collection::Slots, id, Self::slot(doctor_id, date, time, is_booked))
            .await;
    }

    pub async fn seed_appointment(store: &InMemoryStore, id: &str, slot_id: &str, date: &str, status: &str) {
        store
            .seed(Collection::Appointments, id, Self::appointment(slot_id, date, status))
            .await;
    }
}
