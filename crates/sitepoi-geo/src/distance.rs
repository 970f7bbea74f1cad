//! Haversine great-circle distance

use geo::Point;

/// Sphere radius used for all proximity distances, in metres
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Convert degrees to radians
pub fn to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// Great-circle distance in metres between two lat/lon pairs given in degrees
///
/// Deltas are computed as target minus source.
pub fn haversine_m(source_lat: f64, source_lon: f64, target_lat: f64, target_lon: f64) -> f64 {
    let phi1 = to_radians(source_lat);
    let phi2 = to_radians(target_lat);
    let d_phi = to_radians(target_lat - source_lat);
    let d_lambda = to_radians(target_lon - source_lon);

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);

    // Rounding can push `a` a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
}

/// Great-circle distance in metres between two points (x = lon, y = lat)
pub fn haversine_distance(source: Point, target: Point) -> f64 {
    haversine_m(source.y(), source.x(), target.y(), target.x())
}
