//! Unit conversions applied to source datasets before scoring.

/// Convert a temperature from Kelvin to Fahrenheit.
pub fn kelvin_to_fahrenheit(k: f32) -> f32 {
    k * 1.8 - 459.67
}

/// Convert a longitude from the [0°, 360°) range used by the climate grids
/// to the (−180°, 180°] range used everywhere else.
pub fn wrap_longitude(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else {
        lon
    }
}
