// libs/slot-cell/src/router.rs
use axum::{
    routing::{delete, get, post},
    Router,
};

use shared_database::AppState;

use crate::handlers;

pub fn slot_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(handlers::create_slot))
        .route("/available", get(handlers::list_available_slots))
        .route("/by-date", get(handlers::list_slots_by_date))
        .route("/{slot_id}", delete(handlers::delete_slot))
        .with_state(state)
}
