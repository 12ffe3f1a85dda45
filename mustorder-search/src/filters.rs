//! Filters shared by semantic and text search.

use geo::Coord;
use mustorder_core::{DishQuery, Restaurant, distance_between};

/// Optional narrowing applied to every search.
///
/// The geo filter is active only when both `origin` and `radius_km` are set.
/// An origin alone still attaches distances to results.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use mustorder_search::SearchFilters;
///
/// let origin = Coord { x: -97.7431, y: 30.2672 };
/// assert!(SearchFilters::default().with_origin(origin).geo_filter().is_none());
/// assert!(SearchFilters::default().near(origin, 25.0).geo_filter().is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    /// Dishes must carry at least one of these tags (case-insensitive).
    pub tags: Vec<String>,
    /// Restaurants must have exactly this price level.
    pub price_level: Option<u8>,
    /// Point distances are measured from, as longitude/latitude.
    pub origin: Option<Coord<f64>>,
    /// Maximum distance from `origin`, in kilometres.
    pub radius_km: Option<f64>,
}

/// Outcome of checking a restaurant against the location filters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Placement {
    /// Rejected by an active geo filter.
    Excluded,
    /// Kept, with its distance from the origin when known.
    Included(Option<f64>),
}

impl SearchFilters {
    /// Require any of `tags`.
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Require an exact price level.
    #[must_use]
    pub const fn with_price_level(mut self, price_level: u8) -> Self {
        self.price_level = Some(price_level);
        self
    }

    /// Measure distances from `origin` without excluding anything.
    #[must_use]
    pub const fn with_origin(mut self, origin: Coord<f64>) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Keep only restaurants within `radius_km` of `origin`.
    #[must_use]
    pub const fn near(mut self, origin: Coord<f64>, radius_km: f64) -> Self {
        self.origin = Some(origin);
        self.radius_km = Some(radius_km);
        self
    }

    /// The origin and radius when the geo filter is active.
    #[must_use]
    pub const fn geo_filter(&self) -> Option<(Coord<f64>, f64)> {
        match (self.origin, self.radius_km) {
            (Some(origin), Some(radius)) => Some((origin, radius)),
            _ => None,
        }
    }

    pub(crate) fn dish_query(&self) -> DishQuery {
        DishQuery::default()
            .with_tags(self.tags.iter().cloned())
            .with_price_level(self.price_level)
    }

    /// Attach a distance and apply the geo filter.
    ///
    /// With an active filter, restaurants without a location are excluded.
    pub(crate) fn place(&self, restaurant: &Restaurant) -> Placement {
        let distance = self
            .origin
            .zip(restaurant.location)
            .map(|(origin, location)| distance_between(origin, location));
        match (self.radius_km.filter(|_| self.origin.is_some()), distance) {
            (None, _) => Placement::Included(distance),
            (Some(radius), Some(km)) if km <= radius => Placement::Included(distance),
            (Some(_), _) => Placement::Excluded,
        }
    }
}
