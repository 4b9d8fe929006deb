use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use hospital_cell::router::hospital_routes;
use shared_database::AppState;
use slot_cell::router::slot_routes;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "CareSlot API is running!" }))
        .nest("/slots", slot_routes(state.clone()))
        .nest("/appointments", appointment_routes(state))
        .nest("/hospitals", hospital_routes())
}
