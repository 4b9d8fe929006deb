// libs/hospital-cell/src/models.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hospital {
    pub name: &'static str,
    pub address: &'static str,
    pub phone: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl Hospital {
    pub fn location(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, HospitalError> {
        if !latitude.is_finite() || !longitude.is_finite() || latitude.abs() > 90.0 || longitude.abs() > 180.0 {
            return Err(HospitalError::InvalidCoordinates { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyHospital {
    #[serde(flatten)]
    pub hospital: Hospital,
    pub distance_km: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum HospitalError {
    #[error("Invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("Invalid search radius {0} km")]
    InvalidRadius(f64),
}
