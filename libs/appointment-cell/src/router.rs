// libs/appointment-cell/src/router.rs
use axum::{
    routing::{get, patch, post},
    Router,
};

use shared_database::AppState;

use crate::handlers;

pub fn appointment_routes(state: AppState) -> Router {
    Router::new()
        // Booking lifecycle
        .route("/", post(handlers::book_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment).delete(handlers::delete_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/{appointment_id}/status", patch(handlers::update_appointment_status))

        // Appointment listings
        .route("/patients/{patient_id}", get(handlers::get_patient_appointments))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor_appointments))

        // Maintenance
        .route("/reconcile", post(handlers::reconcile_appointments))
        .with_state(state)
}
