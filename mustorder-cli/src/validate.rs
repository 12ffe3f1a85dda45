//! Request validation shared by the query subcommands.

use geo::Coord;
use mustorder_search::{DEFAULT_LIMIT, MAX_LIMIT};

use crate::{ARG_LAT, ARG_LNG, CliError};

/// Apply the default limit and reject values outside `1..=MAX_LIMIT`.
pub(crate) fn resolve_limit(limit: Option<usize>) -> Result<usize, CliError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if (1..=MAX_LIMIT).contains(&limit) {
        Ok(limit)
    } else {
        Err(CliError::InvalidLimit {
            limit,
            max: MAX_LIMIT,
        })
    }
}

pub(crate) fn validate_price_level(price_level: Option<u8>) -> Result<Option<u8>, CliError> {
    match price_level {
        Some(level) if !(1..=4).contains(&level) => Err(CliError::InvalidPriceLevel {
            price_level: level,
        }),
        other => Ok(other),
    }
}

pub(crate) fn validate_radius(radius_km: f64) -> Result<f64, CliError> {
    if radius_km.is_finite() && radius_km >= 0.0 {
        Ok(radius_km)
    } else {
        Err(CliError::InvalidRadius { radius_km })
    }
}

/// Build an origin from a latitude/longitude pair.
///
/// Both halves must be present together; a lone half is an incomplete geo
/// filter.
pub(crate) fn resolve_origin(
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<Option<Coord<f64>>, CliError> {
    match (lat, lng) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(CliError::IncompleteGeoFilter { missing: ARG_LNG }),
        (None, Some(_)) => Err(CliError::IncompleteGeoFilter { missing: ARG_LAT }),
        (Some(lat), Some(lng)) => origin(lat, lng).map(Some),
    }
}

/// Validate a coordinate and return it as longitude/latitude.
pub(crate) fn origin(lat: f64, lng: f64) -> Result<Coord<f64>, CliError> {
    let in_range = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng);
    if in_range {
        Ok(Coord { x: lng, y: lat })
    } else {
        Err(CliError::InvalidCoordinate { lat, lng })
    }
}
