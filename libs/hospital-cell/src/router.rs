// libs/hospital-cell/src/router.rs
use axum::{routing::get, Router};

use crate::handlers;

pub fn hospital_routes() -> Router {
    Router::new().route("/nearby", get(handlers::nearby_hospitals))
}
