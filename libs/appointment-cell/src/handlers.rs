// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, AppointmentStatus, BookAppointmentRequest, CancelAppointmentRequest,
    UpdateStatusRequest,
};
use crate::services::booking::AppointmentCoordinator;
use crate::services::lifecycle::StatusReconciler;

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound(id) => AppError::NotFound(format!("Appointment {} not found", id)),
            AppointmentError::SlotNotAvailable(_) => {
                AppError::Conflict("Appointment slot no longer available".to_string())
            }
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            e @ AppointmentError::InconsistentState { .. } => AppError::Internal(e.to_string()),
            AppointmentError::Store(e) => e.into(),
        }
    }
}

fn coordinator(state: &AppState) -> AppointmentCoordinator {
    AppointmentCoordinator::with_policy(state.store.clone(), state.config.booking_policy)
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppState>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let slot_id = request.slot_id.clone();
    let appointment_id = coordinator(&state).book(request).await?;

    Ok(Json(json!({
        "success": true,
        "appointment_id": appointment_id,
        "slot_id": slot_id,
        "status": AppointmentStatus::Confirmed,
        "message": "Appointment booked successfully"
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    coordinator(&state).cancel(&appointment_id, &request.slot_id).await?;

    Ok(Json(json!({
        "success": true,
        "appointment_id": appointment_id,
        "status": AppointmentStatus::Cancelled,
        "message": "Appointment cancelled successfully"
    })))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    coordinator(&state).update_status(&appointment_id, request.status).await?;

    Ok(Json(json!({
        "success": true,
        "appointment_id": appointment_id,
        "status": request.status
    })))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    coordinator(&state).delete(&appointment_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment deleted"
    })))
}

// ==============================================================================
// READ HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointment = coordinator(&state)
        .get(&appointment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Appointment {} not found", appointment_id)))?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointments = coordinator(&state).list_for_patient(&patient_id).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<AppState>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointments = coordinator(&state).list_for_doctor(&doctor_id).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

// ==============================================================================
// MAINTENANCE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn reconcile_appointments(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let reconciler = StatusReconciler::new(state.store.clone());
    let completed = reconciler.auto_update_appointment_statuses().await?;

    Ok(Json(json!({
        "success": true,
        "completed": completed
    })))
}
