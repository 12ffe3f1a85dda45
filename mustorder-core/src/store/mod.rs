//! Data access traits for the catalogue, its activity, and the score cache.
//!
//! Reads are split by concern: [`CatalogueStore`] lists dishes and
//! restaurants, [`ActivityStore`] returns the raw signals the scorer consumes,
//! and [`CacheStore`] persists the derived values. One backend usually
//! implements all three.

use std::time::SystemTime;

use crate::{
    Checkin, Dish, DishId, DishScores, Photo, Restaurant, RestaurantId, RestaurantScores, Review,
    VenueSourceKind, Vote,
};

mod error;
#[cfg(feature = "store-sqlite")]
mod schema;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use error::{BackendError, StoreError};
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteStore, SqliteStoreError};

/// Typed catalogue filter used by search.
///
/// Every populated criterion must hold for a dish to match:
///
/// - `text`: the name or description contains the text, or a tag equals it
///   (all comparisons case-insensitive);
/// - `tags`: the dish carries at least one of the tags;
/// - `price_level`: the restaurant has exactly this price level;
/// - `require_embedding`: the dish carries an embedding.
///
/// # Examples
/// ```
/// use mustorder_core::{Dish, DishId, DishQuery, Restaurant, RestaurantId};
///
/// let restaurant = Restaurant::new(RestaurantId(1), "Valentina's", "Austin").with_price_level(2);
/// let dish = Dish::new(DishId(1), RestaurantId(1), "Smoked Brisket Taco").with_tags(["tex-mex"]);
///
/// let query = DishQuery::default().with_text("BRISKET").with_price_level(Some(2));
/// assert!(query.matches(&dish, &restaurant));
/// assert!(!query.clone().requiring_embedding().matches(&dish, &restaurant));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DishQuery {
    /// Substring of the name or description, or an exact tag.
    pub text: Option<String>,
    /// Tags of which the dish must carry at least one; empty disables the check.
    pub tags: Vec<String>,
    /// Exact restaurant price level in `1..=4`.
    pub price_level: Option<u8>,
    /// Only match dishes that carry an embedding.
    pub require_embedding: bool,
}

impl DishQuery {
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn with_price_level(mut self, price_level: Option<u8>) -> Self {
        self.price_level = price_level;
        self
    }

    #[must_use]
    pub const fn requiring_embedding(mut self) -> Self {
        self.require_embedding = true;
        self
    }

    /// Report whether `dish`, served by `restaurant`, satisfies the query.
    pub fn matches(&self, dish: &Dish, restaurant: &Restaurant) -> bool {
        if self.require_embedding && dish.embedding.is_none() {
            return false;
        }
        if self
            .price_level
            .is_some_and(|level| restaurant.price_level != Some(level))
        {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|tag| dish.has_tag(tag)) {
            return false;
        }
        self.text
            .as_deref()
            .is_none_or(|text| matches_text(dish, text))
    }
}

fn matches_text(dish: &Dish, text: &str) -> bool {
    let needle = text.to_lowercase();
    dish.name.to_lowercase().contains(&needle)
        || dish
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(&needle))
        || dish.has_tag(&needle)
}

/// A dish returned by [`CatalogueStore::find_dishes`] with its restaurant.
#[derive(Debug, Clone, PartialEq)]
pub struct DishMatch {
    /// Matching dish.
    pub dish: Dish,
    /// Restaurant serving the dish.
    pub restaurant: Restaurant,
}

/// Read access to dishes and restaurants.
///
/// Listings are returned in ascending identifier order so callers observe a
/// stable "store order".
pub trait CatalogueStore {
    /// Every dish identifier.
    fn dish_ids(&self) -> Result<Vec<DishId>, StoreError>;

    /// Every restaurant identifier.
    fn restaurant_ids(&self) -> Result<Vec<RestaurantId>, StoreError>;

    /// Look a dish up; `Ok(None)` when it does not exist.
    fn dish(&self, id: DishId) -> Result<Option<Dish>, StoreError>;

    /// Look a restaurant up; `Ok(None)` when it does not exist.
    fn restaurant(&self, id: RestaurantId) -> Result<Option<Restaurant>, StoreError>;

    /// Every restaurant.
    fn restaurants(&self) -> Result<Vec<Restaurant>, StoreError>;

    /// Dishes served by `id`; empty for unknown restaurants.
    fn dishes_for_restaurant(&self, id: RestaurantId) -> Result<Vec<Dish>, StoreError>;

    /// Dishes matching `query`, paired with their restaurant.
    fn find_dishes(&self, query: &DishQuery) -> Result<Vec<DishMatch>, StoreError>;
}

/// Read access to the activity signals behind the scores.
///
/// `since` bounds are inclusive; `None` returns the full history.
pub trait ActivityStore {
    /// Votes cast for `dish`.
    fn votes_for_dish(&self, dish: DishId, since: Option<SystemTime>)
    -> Result<Vec<Vote>, StoreError>;

    /// At most `limit` reviews of `dish`, newest first.
    fn recent_reviews(&self, dish: DishId, limit: usize) -> Result<Vec<Review>, StoreError>;

    /// Check-ins at `restaurant` that name `dish`.
    fn checkins_for_dish(
        &self,
        restaurant: RestaurantId,
        dish: DishId,
        since: Option<SystemTime>,
    ) -> Result<Vec<Checkin>, StoreError>;

    /// Photos uploaded for `dish`.
    fn photos_for_dish(&self, dish: DishId, since: Option<SystemTime>)
    -> Result<Vec<Photo>, StoreError>;

    /// Whether `restaurant` was listed from a source of `kind`.
    fn has_venue_source(
        &self,
        restaurant: RestaurantId,
        kind: &VenueSourceKind,
    ) -> Result<bool, StoreError>;
}

/// Write access to the derived, cached fields.
///
/// Writes to unknown identifiers fail with [`StoreError::NotFound`].
pub trait CacheStore {
    /// Persist both dish scores together.
    fn write_dish_scores(&self, dish: DishId, scores: DishScores) -> Result<(), StoreError>;

    /// Persist both restaurant aggregates together.
    fn write_restaurant_scores(
        &self,
        restaurant: RestaurantId,
        scores: RestaurantScores,
    ) -> Result<(), StoreError>;

    /// Persist a dish embedding.
    fn write_dish_embedding(&self, dish: DishId, embedding: &[f32]) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryStore, sample_catalogue};
    use rstest::rstest;

    fn brisket() -> (Dish, Restaurant) {
        let restaurant =
            Restaurant::new(RestaurantId(1), "Franklin Barbecue", "Austin").with_price_level(3);
        let dish = Dish::new(DishId(10), RestaurantId(1), "Brisket")
            .with_description("Post oak smoked, sold by the pound")
            .with_tags(["bbq", "Signature"]);
        (dish, restaurant)
    }

    #[rstest]
    #[case(DishQuery::default(), true)]
    #[case(DishQuery::default().with_text("brisk"), true)]
    #[case(DishQuery::default().with_text("POST OAK"), true)]
    #[case(DishQuery::default().with_text("signature"), true)]
    #[case(DishQuery::default().with_text("sign"), false)]
    #[case(DishQuery::default().with_tags(["vegan", "BBQ"]), true)]
    #[case(DishQuery::default().with_tags(["vegan"]), false)]
    #[case(DishQuery::default().with_price_level(Some(3)), true)]
    #[case(DishQuery::default().with_price_level(Some(1)), false)]
    #[case(DishQuery::default().requiring_embedding(), false)]
    fn query_matching(#[case] query: DishQuery, #[case] expected: bool) {
        let (dish, restaurant) = brisket();
        assert_eq!(query.matches(&dish, &restaurant), expected);
    }

    #[rstest]
    fn price_filter_excludes_unpriced_restaurants() {
        let (dish, restaurant) = brisket();
        let unpriced = Restaurant {
            price_level: None,
            ..restaurant
        };
        let query = DishQuery::default().with_price_level(Some(3));
        assert!(!query.matches(&dish, &unpriced));
    }

    #[rstest]
    #[case(DishQuery::default().with_text("CRÈME BRÛLÉE"))]
    #[case(DishQuery::default().with_tags(["CRÈME BRÛLÉE"]))]
    fn text_and_tag_matching_fold_case_alike(#[case] query: DishQuery) {
        let (dish, restaurant) = brisket();
        let dish = dish.with_tags(["crème brûlée"]);
        assert!(query.matches(&dish, &restaurant));
    }

    #[rstest]
    fn memory_store_find_dishes_returns_store_order() {
        let store = MemoryStore::from(sample_catalogue());
        let found = store
            .find_dishes(&DishQuery::default().with_tags(["bbq"]))
            .expect("memory store never fails");
        let ids: Vec<_> = found.iter().map(|m| m.dish.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        assert!(found.iter().all(|m| m.dish.restaurant_id == m.restaurant.id));
    }

    #[rstest]
    fn memory_store_rejects_writes_to_unknown_dish() {
        let store = MemoryStore::default();
        let err = store
            .write_dish_scores(DishId(404), DishScores::default())
            .expect_err("unknown dish should fail");
        assert!(matches!(err, StoreError::NotFound { ref entity } if entity == "dish 404"));
    }
}
