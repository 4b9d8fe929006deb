// libs/hospital-cell/src/handlers.rs
use axum::{extract::Query, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{GeoPoint, HospitalError};
use crate::services::locator::HospitalLocator;

const DEFAULT_RADIUS_KM: f64 = 10.0;

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: Option<f64>,
}

impl From<HospitalError> for AppError {
    fn from(err: HospitalError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[axum::debug_handler]
pub async fn nearby_hospitals(Query(query): Query<NearbyQuery>) -> Result<Json<Value>, AppError> {
    let origin = GeoPoint::new(query.lat, query.lon)?;
    let radius_km = query.radius_km.unwrap_or(DEFAULT_RADIUS_KM);

    let hospitals = HospitalLocator::default().nearby(origin, radius_km)?;

    Ok(Json(json!({
        "hospitals": hospitals,
        "total": hospitals.len(),
        "radius_km": radius_km
    })))
}
