// libs/slot-cell/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::{NewSlot, SlotError};
use crate::services::ledger::SlotLedger;

#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    pub doctor_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SlotsByDateQuery {
    pub date: String,
}

impl From<SlotError> for AppError {
    fn from(err: SlotError) -> Self {
        match err {
            SlotError::NotFound(id) => AppError::NotFound(format!("Slot {} not found", id)),
            SlotError::ValidationError(msg) => AppError::ValidationError(msg),
            SlotError::Store(e) => e.into(),
        }
    }
}

#[axum::debug_handler]
pub async fn list_available_slots(
    State(state): State<AppState>,
    Query(params): Query<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let ledger = SlotLedger::new(state.store.clone());
    let slots = ledger.list_available(&params.doctor_id).await?;

    Ok(Json(json!({
        "slots": slots,
        "total": slots.len()
    })))
}

#[axum::debug_handler]
pub async fn list_slots_by_date(
    State(state): State<AppState>,
    Query(params): Query<SlotsByDateQuery>,
) -> Result<Json<Value>, AppError> {
    crate::models::validate_date(&params.date)?;

    let ledger = SlotLedger::new(state.store.clone());
    let slots = ledger.list_by_date(&params.date).await?;

    Ok(Json(json!({
        "slots": slots,
        "total": slots.len()
    })))
}

#[axum::debug_handler]
pub async fn create_slot(
    State(state): State<AppState>,
    Json(request): Json<NewSlot>,
) -> Result<Json<Value>, AppError> {
    let ledger = SlotLedger::new(state.store.clone());
    let slot_id = ledger.create(request).await?;

    Ok(Json(json!({
        "success": true,
        "slot_id": slot_id
    })))
}

#[axum::debug_handler]
pub async fn delete_slot(
    State(state): State<AppState>,
    Path(slot_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ledger = SlotLedger::new(state.store.clone());
    ledger.delete(&slot_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Slot deleted"
    })))
}
