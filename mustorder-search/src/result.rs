//! Search result shape and limits.

use mustorder_core::{Dish, Restaurant};
#[cfg(feature = "serde")]
use mustorder_core::{DishId, RestaurantId};
#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};

/// Number of results returned when the caller does not ask for a limit.
pub const DEFAULT_LIMIT: usize = 20;

/// Largest limit a request layer should accept.
pub const MAX_LIMIT: usize = 50;

/// A ranked dish with its restaurant.
///
/// Serialised results carry the dish without its embedding.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SearchResult {
    /// Matching dish.
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_listed_dish"))]
    pub dish: Dish,
    /// Restaurant serving the dish.
    pub restaurant: Restaurant,
    /// Cosine similarity to the query; always `1.0` for text matches.
    pub similarity: f64,
    /// Great-circle distance from the search origin, when both points are known.
    pub distance_km: Option<f64>,
}

#[cfg(feature = "serde")]
#[derive(Serialize)]
struct ListedDish<'a> {
    id: DishId,
    restaurant_id: RestaurantId,
    name: &'a str,
    description: Option<&'a str>,
    tags: &'a [String],
    must_order: bool,
    destination_worthy_score: f64,
    trend_cache: f64,
}

#[cfg(feature = "serde")]
fn serialize_listed_dish<S>(dish: &Dish, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    ListedDish {
        id: dish.id,
        restaurant_id: dish.restaurant_id,
        name: &dish.name,
        description: dish.description.as_deref(),
        tags: &dish.tags,
        must_order: dish.must_order,
        destination_worthy_score: dish.destination_worthy_score,
        trend_cache: dish.trend_cache,
    }
    .serialize(serializer)
}
