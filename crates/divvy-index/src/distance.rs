//! Great-circle distance between WGS84 coordinates

use geo::Point;

/// Earth radius used for all distances, in miles
pub const EARTH_RADIUS_MILES: f64 = 3963.1;

/// Distance in miles between (`lat1`, `lon1`) and (`lat2`, `lon2`), all in degrees
///
/// Uses the spherical law of cosines. Identical coordinates are exactly 0 apart, and the
/// cosine of the central angle is clamped to [-1, 1] so that rounding near either end cannot
/// push it out of the domain of `acos`. Non-finite inputs produce NaN.
#[inline]
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    distance_with_radius(lat1, lon1, lat2, lon2, EARTH_RADIUS_MILES)
}

/// Same as [`distance`] on a sphere of the given radius; the result is in the radius' unit
#[inline]
pub fn distance_with_radius(lat1: f64, lon1: f64, lat2: f64, lon2: f64, radius: f64) -> f64 {
    // acos loses ~1e-8 rad of precision next to 1, far more than the query tolerance
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }

    let lat1 = lat1.to_radians();
    let lon1 = lon1.to_radians();
    let lat2 = lat2.to_radians();
    let lon2 = lon2.to_radians();

    let cos_angle = lat1.cos() * lon1.cos() * lat2.cos() * lon2.cos()
        + lat1.cos() * lon1.sin() * lat2.cos() * lon2.sin()
        + lat1.sin() * lat2.sin();

    radius * cos_angle.clamp(-1.0, 1.0).acos()
}

/// [`distance`] between two points stored as (x = longitude, y = latitude)
#[inline]
pub fn distance_between(a: Point<f64>, b: Point<f64>) -> f64 {
    distance(a.y(), a.x(), b.y(), b.x())
}
