//! Great-circle distance on the mean-radius sphere.

const EARTH_RADIUS_M: f64 = 6_371_000.0;
const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;

/// Distance in meters between two `(latitude, longitude)` points given in
/// degrees.
///
/// Haversine formula — numerically stable at the short ranges the arbiter
/// compares against provider accuracy radii, and more than accurate enough
/// against provider noise at any range.
pub fn distance_m(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = from;
    let (lat2, lon2) = to;

    let phi1 = lat1 * DEG_TO_RAD;
    let phi2 = lat2 * DEG_TO_RAD;
    let d_phi = (lat2 - lat1) * DEG_TO_RAD;
    let d_lambda = (lon2 - lon1) * DEG_TO_RAD;

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}
