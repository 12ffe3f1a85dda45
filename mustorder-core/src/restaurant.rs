use std::fmt;

use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a [`Restaurant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RestaurantId(pub u64);

impl From<u64> for RestaurantId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for RestaurantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "restaurant {}", self.0)
    }
}

/// A venue serving one or more dishes.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. A
/// restaurant without a location never passes a radius filter.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use mustorder_core::{Restaurant, RestaurantId};
///
/// let restaurant = Restaurant::new(RestaurantId(3), "Kreuz Market", "Lockhart")
///     .with_region("TX")
///     .with_price_level(2)
///     .with_location(Coord { x: -97.67, y: 29.88 });
///
/// assert_eq!(restaurant.region.as_deref(), Some("TX"));
/// assert!(restaurant.trending_rank.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub city: String,
    pub region: Option<String>,
    /// Price band from 1 (cheap) to 4 (expensive).
    pub price_level: Option<u8>,
    pub location: Option<Coord<f64>>,
    /// Mean of the top three dish destination scores.
    pub score_cache: f64,
    /// 1-based position by summed dish trending score; `None` when unranked.
    pub trending_rank: Option<u32>,
}

impl Restaurant {
    /// Construct a restaurant with no region, price level, location or scores.
    pub fn new(id: RestaurantId, name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            city: city.into(),
            region: None,
            price_level: None,
            location: None,
            score_cache: 0.0,
            trending_rank: None,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub const fn with_price_level(mut self, price_level: u8) -> Self {
        self.price_level = Some(price_level);
        self
    }

    #[must_use]
    pub const fn with_location(mut self, location: Coord<f64>) -> Self {
        self.location = Some(location);
        self
    }

    /// Seed the cached aggregate scores, as read back from a store.
    #[must_use]
    pub const fn with_cached_scores(mut self, score_cache: f64, trending_rank: Option<u32>) -> Self {
        self.score_cache = score_cache;
        self.trending_rank = trending_rank;
        self
    }
}
