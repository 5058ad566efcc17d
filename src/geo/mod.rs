mod index;

pub use index::{GeoIndex, GeoPoint, NearbyHit};

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;
/// Length of one degree of latitude in meters.
pub const METERS_PER_DEGREE: f64 = 111_195.08;

/// Finest grid accepted; smaller cells make polar scans walk too many meridians.
pub const MIN_GEO_CELL_DEGREES: f64 = 0.01;
pub const MAX_GEO_CELL_DEGREES: f64 = 90.0;

/// Great-circle distance in meters.
pub fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
}

pub fn is_valid_coord(lat: f64, lng: f64) -> bool {
    lat.is_finite() && lng.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}
