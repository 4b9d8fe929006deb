use tracing::debug;

use crate::models::{GeoPoint, Hospital, HospitalError, NearbyHospital};
use crate::services::directory::HOSPITALS;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    // Rounding can push `h` past 1 for near-antipodal points.
    2.0 * EARTH_RADIUS_KM * h.min(1.0).sqrt().asin()
}

pub struct HospitalLocator {
    hospitals: Vec<Hospital>,
}

impl Default for HospitalLocator {
    fn default() -> Self {
        Self::new(HOSPITALS.to_vec())
    }
}

impl HospitalLocator {
    pub fn new(hospitals: Vec<Hospital>) -> Self {
        Self { hospitals }
    }

    /// Hospitals within `radius_km` of `origin`, closest first.
    pub fn nearby(&self, origin: GeoPoint, radius_km: f64) -> Result<Vec<NearbyHospital>, HospitalError> {
        let origin = GeoPoint::new(origin.latitude, origin.longitude)?;
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(HospitalError::InvalidRadius(radius_km));
        }

        let found: Vec<NearbyHospital> = self
            .ranked(origin)
            .into_iter()
            .take_while(|h| h.distance_km <= radius_km)
            .collect();

        debug!("{} hospitals within {} km of ({}, {})",
               found.len(), radius_km, origin.latitude, origin.longitude);
        Ok(found)
    }

    /// The `limit` closest hospitals regardless of distance.
    pub fn nearest(&self, origin: GeoPoint, limit: usize) -> Result<Vec<NearbyHospital>, HospitalError> {
        let origin = GeoPoint::new(origin.latitude, origin.longitude)?;
        let mut ranked = self.ranked(origin);
        ranked.truncate(limit);
        Ok(ranked)
    }

    fn ranked(&self, origin: GeoPoint) -> Vec<NearbyHospital> {
        let mut ranked: Vec<NearbyHospital> = self
            .hospitals
            .iter()
            .map(|hospital| NearbyHospital {
                hospital: hospital.clone(),
                distance_km: haversine_km(origin, hospital.location()),
            })
            .collect();
        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        ranked
    }
}
