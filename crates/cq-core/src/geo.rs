use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mean earth radius in meters, matching the geography backends the data
/// originally came from.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub const MIN_RADIUS_KM: f64 = 0.1;
pub const MAX_RADIUS_KM: f64 = 20.0;

/// A WGS84 coordinate pair. Kept in sync with the owning entity's stored
/// latitude/longitude columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle (haversine) distance to `other`, in meters.
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        let lat_a = self.latitude.to_radians();
        let lat_b = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();

        let h = (d_lat / 2.0).sin().powi(2)
            + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * h.sqrt().asin()
    }
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), String> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("latitude must be within -90..90, got {latitude}"));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(format!(
            "longitude must be within -180..180, got {longitude}"
        ));
    }
    Ok(())
}

/// Out-of-range radii are clamped rather than rejected.
pub fn clamp_radius_km(radius_km: f64) -> f64 {
    if !radius_km.is_finite() {
        return MIN_RADIUS_KM;
    }
    radius_km.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let p = GeoPoint::new(41.0, 29.0);
        assert_eq!(p.distance_m(&p), 0.0);
    }

    #[test]
    fn distance_matches_known_reference() {
        // 0.01 deg of longitude at 41N is roughly 840 meters.
        let a = GeoPoint::new(41.0, 29.0);
        let b = GeoPoint::new(41.0, 29.01);
        let d = a.distance_m(&b);
        assert!((d - 840.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(10.0, 10.0);
        let b = GeoPoint::new(41.0, 29.0);
        assert!((a.distance_m(&b) - b.distance_m(&a)).abs() < 1e-6);
    }

    #[test]
    fn radius_clamps_both_ends() {
        assert_eq!(clamp_radius_km(0.0), MIN_RADIUS_KM);
        assert_eq!(clamp_radius_km(50.0), MAX_RADIUS_KM);
        assert_eq!(clamp_radius_km(5.0), 5.0);
    }

    #[test]
    fn coordinate_bounds_enforced() {
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(-91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, -181.0).is_err());
        assert!(validate_coordinates(0.0, 181.0).is_err());
        assert!(validate_coordinates(90.0, 180.0).is_ok());
    }
}
