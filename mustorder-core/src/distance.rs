//! Great-circle distance helpers.

use geo::Coord;

/// Mean Earth radius used by [`distance_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two latitude/longitude pairs.
///
/// Inputs are degrees. Identical points yield exactly `0.0`, the result is
/// symmetric, and a `NaN` in any input propagates to the output.
///
/// # Examples
/// ```
/// use mustorder_core::distance_km;
///
/// let km = distance_km(30.2672, -97.7431, 29.4241, -98.4936);
/// assert!((110.0..130.0).contains(&km));
/// assert_eq!(distance_km(1.0, 2.0, 1.0, 2.0), 0.0);
/// ```
#[must_use]
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let half_chord = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let angle = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());
    EARTH_RADIUS_KM * angle
}

/// [`distance_km`] over `geo` coordinates (`x = longitude`, `y = latitude`).
#[must_use]
pub fn distance_between(a: Coord<f64>, b: Coord<f64>) -> f64 {
    distance_km(a.y, a.x, b.y, b.x)
}

/// Render a distance for display.
///
/// Below one kilometre the value is shown in whole metres, otherwise in
/// kilometres with one decimal place.
///
/// # Examples
/// ```
/// use mustorder_core::format_distance;
///
/// assert_eq!(format_distance(0.85), "850m");
/// assert_eq!(format_distance(12.34), "12.3km");
/// ```
#[must_use]
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0}m", (km * 1000.0).round())
    } else {
        format!("{km:.1}km")
    }
}
