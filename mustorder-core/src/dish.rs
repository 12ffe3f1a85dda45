//! Dishes: the unit every score and search result is computed for.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::RestaurantId;

/// Identifier of a [`Dish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DishId(pub u64);

impl From<u64> for DishId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for DishId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dish {}", self.0)
    }
}

/// A dish served by exactly one restaurant.
///
/// `destination_worthy_score` and `trend_cache` are cached outputs of the
/// scoring pipeline; every other field is owned by the catalogue.
///
/// # Examples
/// ```
/// use mustorder_core::{Dish, DishId, RestaurantId};
///
/// let dish = Dish::new(DishId(7), RestaurantId(1), "Brisket")
///     .with_tags(["bbq", "signature"])
///     .with_embedding(vec![0.1, 0.2, 0.3]);
/// assert!(dish.has_tag("BBQ"));
/// assert_eq!(dish.embedding.as_deref().map(<[f32]>::len), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dish {
    /// Unique identifier.
    pub id: DishId,
    /// Owning restaurant.
    pub restaurant_id: RestaurantId,
    /// Display name.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Free-form tags such as `"bbq"` or `"vegan"`.
    pub tags: Vec<String>,
    /// Marks a can't-miss recommendation.
    pub must_order: bool,
    /// Cached Destination-Worthy Score in `0.0..=100.0`.
    pub destination_worthy_score: f64,
    /// Cached Trending Score, never negative.
    pub trend_cache: f64,
    /// Semantic embedding; dishes without one are invisible to semantic search.
    pub embedding: Option<Vec<f32>>,
}

impl Dish {
    /// Construct a dish with no tags, description, scores or embedding.
    pub fn new(id: DishId, restaurant_id: RestaurantId, name: impl Into<String>) -> Self {
        Self {
            id,
            restaurant_id,
            name: name.into(),
            description: None,
            tags: Vec::new(),
            must_order: false,
            destination_worthy_score: 0.0,
            trend_cache: 0.0,
            embedding: None,
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the tag list.
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Attach an embedding vector.
    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Flag the dish as must-order.
    #[must_use]
    pub const fn with_must_order(mut self, must_order: bool) -> Self {
        self.must_order = must_order;
        self
    }

    /// Seed the cached scores, as read back from a store.
    #[must_use]
    pub const fn with_cached_scores(mut self, destination_worthy_score: f64, trend_cache: f64) -> Self {
        self.destination_worthy_score = destination_worthy_score;
        self.trend_cache = trend_cache;
        self
    }

    /// Report whether any tag equals `tag` after Unicode lowercasing.
    pub fn has_tag(&self, tag: &str) -> bool {
        let needle = tag.to_lowercase();
        self.tags.iter().any(|own| own.to_lowercase() == needle)
    }
}
