//! Test-only fixtures shared by unit, behaviour, and downstream crate tests.
//!
//! [`CatalogueFixture`] describes a catalogue plus its activity. It seeds
//! either the in-memory [`MemoryStore`] or a `SqliteStore`, so the same
//! scenario runs against both backends.

use std::{
    collections::HashMap,
    sync::{
        PoisonError, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use geo::Coord;

use crate::{
    ActivityStore, CacheStore, CatalogueStore, Checkin, Dish, DishId, DishMatch, DishQuery,
    DishScores, EmbeddingError, EmbeddingProvider, Photo, Restaurant, RestaurantId,
    RestaurantScores, Review, StoreError, VenueSource, VenueSourceKind, Vote,
};

const SECONDS_PER_DAY: u64 = 86_400;

/// Fixed reference instant used across tests: 2025-06-15T00:00:00Z.
pub fn fixed_now() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_749_945_600)
}

/// The instant `days` whole days before `now`.
pub fn days_ago(now: SystemTime, days: u64) -> SystemTime {
    now - Duration::from_secs(days * SECONDS_PER_DAY)
}

/// The instant `days` whole days after `now`.
pub fn days_ahead(now: SystemTime, days: u64) -> SystemTime {
    now + Duration::from_secs(days * SECONDS_PER_DAY)
}

/// A catalogue and its activity, assembled with builder calls.
#[derive(Debug, Clone, Default)]
pub struct CatalogueFixture {
    pub restaurants: Vec<Restaurant>,
    pub dishes: Vec<Dish>,
    pub votes: Vec<Vote>,
    pub reviews: Vec<Review>,
    pub checkins: Vec<Checkin>,
    pub photos: Vec<Photo>,
    pub venue_sources: Vec<VenueSource>,
}

impl CatalogueFixture {
    #[must_use]
    pub fn restaurant(mut self, restaurant: Restaurant) -> Self {
        self.restaurants.push(restaurant);
        self
    }

    #[must_use]
    pub fn dish(mut self, dish: Dish) -> Self {
        self.dishes.push(dish);
        self
    }

    #[must_use]
    pub fn vote(mut self, user_id: u64, dish_id: DishId, created_at: SystemTime) -> Self {
        self.votes.push(Vote {
            user_id,
            dish_id,
            created_at,
        });
        self
    }

    #[must_use]
    pub fn review(mut self, dish_id: DishId, rating: u8, created_at: SystemTime) -> Self {
        self.reviews.push(Review {
            dish_id,
            rating,
            text: format!("{rating} stars"),
            created_at,
        });
        self
    }

    #[must_use]
    pub fn checkin(
        mut self,
        restaurant_id: RestaurantId,
        dish_id: Option<DishId>,
        created_at: SystemTime,
    ) -> Self {
        self.checkins.push(Checkin {
            restaurant_id,
            dish_id,
            created_at,
        });
        self
    }

    #[must_use]
    pub fn photo(mut self, dish_id: DishId, created_at: SystemTime) -> Self {
        self.photos.push(Photo {
            dish_id,
            created_at,
        });
        self
    }

    #[must_use]
    pub fn venue_source(mut self, restaurant_id: RestaurantId, kind: &str) -> Self {
        self.venue_sources.push(VenueSource {
            restaurant_id,
            kind: VenueSourceKind::from(kind.to_owned()),
        });
        self
    }

    /// Write every entity into `store`.
    #[cfg(feature = "store-sqlite")]
    pub fn seed_sqlite(&self, store: &crate::SqliteStore) -> Result<(), StoreError> {
        for restaurant in &self.restaurants {
            store.insert_restaurant(restaurant)?;
        }
        for dish in &self.dishes {
            store.insert_dish(dish)?;
        }
        for vote in &self.votes {
            store.record_vote(vote)?;
        }
        for review in &self.reviews {
            store.record_review(review)?;
        }
        for checkin in &self.checkins {
            store.record_checkin(checkin)?;
        }
        for photo in &self.photos {
            store.record_photo(photo)?;
        }
        for source in &self.venue_sources {
            store.add_venue_source(source)?;
        }
        Ok(())
    }
}

/// Barbecue joints around central Texas with embedded dishes.
///
/// Restaurant 4 has no location, restaurant 5 has no dishes and dish 31 has
/// no embedding.
pub fn sample_catalogue() -> CatalogueFixture {
    CatalogueFixture::default()
        .restaurant(
            Restaurant::new(RestaurantId(1), "Franklin Barbecue", "Austin")
                .with_region("TX")
                .with_price_level(3)
                .with_location(Coord { x: -97.7312, y: 30.2701 }),
        )
        .restaurant(
            Restaurant::new(RestaurantId(2), "Valentina's Tex Mex BBQ", "Austin")
                .with_region("TX")
                .with_price_level(2)
                .with_location(Coord { x: -97.8060, y: 30.1640 }),
        )
        .restaurant(
            Restaurant::new(RestaurantId(3), "Kreuz Market", "Lockhart")
                .with_region("TX")
                .with_price_level(2)
                .with_location(Coord { x: -97.6700, y: 29.8850 }),
        )
        .restaurant(
            Restaurant::new(RestaurantId(4), "The Pit Room", "Houston")
                .with_region("TX")
                .with_price_level(2),
        )
        .restaurant(Restaurant::new(RestaurantId(5), "Empty Kitchen", "Austin"))
        .dish(
            Dish::new(DishId(10), RestaurantId(1), "Brisket")
                .with_description("Post oak smoked, sold by the pound")
                .with_tags(["bbq", "signature"])
                .with_must_order(true)
                .with_embedding(vec![1.0, 0.0, 0.0]),
        )
        .dish(
            Dish::new(DishId(11), RestaurantId(1), "Pork Ribs")
                .with_tags(["bbq"])
                .with_embedding(vec![0.8, 0.6, 0.0]),
        )
        .dish(
            Dish::new(DishId(20), RestaurantId(2), "Smoked Brisket Taco")
                .with_description("Brisket, guacamole and serrano salsa")
                .with_tags(["tex-mex", "bbq"])
                .with_embedding(vec![0.9, 0.1, 0.0]),
        )
        .dish(
            Dish::new(DishId(21), RestaurantId(2), "Migas Taco")
                .with_tags(["tex-mex", "breakfast"])
                .with_embedding(vec![0.0, 1.0, 0.0]),
        )
        .dish(
            Dish::new(DishId(30), RestaurantId(3), "Shoulder Clod")
                .with_tags(["bbq"])
                .with_embedding(vec![0.95, 0.05, 0.0]),
        )
        .dish(
            Dish::new(DishId(31), RestaurantId(3), "Jalapeno Sausage")
                .with_tags(["bbq", "sausage"]),
        )
        .dish(
            Dish::new(DishId(40), RestaurantId(4), "Beef Rib")
                .with_tags(["bbq"])
                .with_embedding(vec![0.99, 0.01, 0.0]),
        )
}

/// In-memory implementation of every store trait.
///
/// The store performs linear scans and is intended only for small datasets.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<CatalogueFixture>,
}

impl From<CatalogueFixture> for MemoryStore {
    fn from(fixture: CatalogueFixture) -> Self {
        Self {
            state: RwLock::new(fixture),
        }
    }
}

impl MemoryStore {
    /// Clone of the current contents, including cached scores.
    pub fn snapshot(&self) -> CatalogueFixture {
        self.read(Clone::clone)
    }

    fn read<T>(&self, f: impl FnOnce(&CatalogueFixture) -> T) -> T {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut CatalogueFixture) -> T) -> T {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

fn sorted_by_key<T, K: Ord>(mut items: Vec<T>, key: impl FnMut(&T) -> K) -> Vec<T> {
    items.sort_by_key(key);
    items
}

fn within(since: Option<SystemTime>, at: SystemTime) -> bool {
    since.is_none_or(|cutoff| at >= cutoff)
}

impl CatalogueStore for MemoryStore {
    fn dish_ids(&self) -> Result<Vec<DishId>, StoreError> {
        Ok(self.read(|s| sorted_by_key(s.dishes.iter().map(|d| d.id).collect(), |id| *id)))
    }

    fn restaurant_ids(&self) -> Result<Vec<RestaurantId>, StoreError> {
        Ok(self.read(|s| sorted_by_key(s.restaurants.iter().map(|r| r.id).collect(), |id| *id)))
    }

    fn dish(&self, id: DishId) -> Result<Option<Dish>, StoreError> {
        Ok(self.read(|s| s.dishes.iter().find(|d| d.id == id).cloned()))
    }

    fn restaurant(&self, id: RestaurantId) -> Result<Option<Restaurant>, StoreError> {
        Ok(self.read(|s| s.restaurants.iter().find(|r| r.id == id).cloned()))
    }

    fn restaurants(&self) -> Result<Vec<Restaurant>, StoreError> {
        Ok(self.read(|s| sorted_by_key(s.restaurants.clone(), |r| r.id)))
    }

    fn dishes_for_restaurant(&self, id: RestaurantId) -> Result<Vec<Dish>, StoreError> {
        Ok(self.read(|s| {
            let dishes = s
                .dishes
                .iter()
                .filter(|d| d.restaurant_id == id)
                .cloned()
                .collect();
            sorted_by_key(dishes, |d| d.id)
        }))
    }

    fn find_dishes(&self, query: &DishQuery) -> Result<Vec<DishMatch>, StoreError> {
        Ok(self.read(|s| {
            let matches = s
                .dishes
                .iter()
                .filter_map(|dish| {
                    let restaurant = s.restaurants.iter().find(|r| r.id == dish.restaurant_id)?;
                    query.matches(dish, restaurant).then(|| DishMatch {
                        dish: dish.clone(),
                        restaurant: restaurant.clone(),
                    })
                })
                .collect();
            sorted_by_key(matches, |m: &DishMatch| m.dish.id)
        }))
    }
}

impl ActivityStore for MemoryStore {
    fn votes_for_dish(
        &self,
        dish: DishId,
        since: Option<SystemTime>,
    ) -> Result<Vec<Vote>, StoreError> {
        Ok(self.read(|s| {
            s.votes
                .iter()
                .filter(|v| v.dish_id == dish && within(since, v.created_at))
                .cloned()
                .collect()
        }))
    }

    fn recent_reviews(&self, dish: DishId, limit: usize) -> Result<Vec<Review>, StoreError> {
        Ok(self.read(|s| {
            let mut reviews: Vec<_> = s
                .reviews
                .iter()
                .filter(|r| r.dish_id == dish)
                .cloned()
                .collect();
            reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            reviews.truncate(limit);
            reviews
        }))
    }

    fn checkins_for_dish(
        &self,
        restaurant: RestaurantId,
        dish: DishId,
        since: Option<SystemTime>,
    ) -> Result<Vec<Checkin>, StoreError> {
        Ok(self.read(|s| {
            s.checkins
                .iter()
                .filter(|c| {
                    c.restaurant_id == restaurant
                        && c.dish_id == Some(dish)
                        && within(since, c.created_at)
                })
                .cloned()
                .collect()
        }))
    }

    fn photos_for_dish(
        &self,
        dish: DishId,
        since: Option<SystemTime>,
    ) -> Result<Vec<Photo>, StoreError> {
        Ok(self.read(|s| {
            s.photos
                .iter()
                .filter(|p| p.dish_id == dish && within(since, p.created_at))
                .cloned()
                .collect()
        }))
    }

    fn has_venue_source(
        &self,
        restaurant: RestaurantId,
        kind: &VenueSourceKind,
    ) -> Result<bool, StoreError> {
        Ok(self.read(|s| {
            s.venue_sources
                .iter()
                .any(|v| v.restaurant_id == restaurant && &v.kind == kind)
        }))
    }
}

impl CacheStore for MemoryStore {
    fn write_dish_scores(&self, dish: DishId, scores: DishScores) -> Result<(), StoreError> {
        self.write(|s| {
            let target = s
                .dishes
                .iter_mut()
                .find(|d| d.id == dish)
                .ok_or_else(|| StoreError::not_found(dish))?;
            target.destination_worthy_score = scores.destination_worthy_score;
            target.trend_cache = scores.trend_cache;
            Ok(())
        })
    }

    fn write_restaurant_scores(
        &self,
        restaurant: RestaurantId,
        scores: RestaurantScores,
    ) -> Result<(), StoreError> {
        self.write(|s| {
            let target = s
                .restaurants
                .iter_mut()
                .find(|r| r.id == restaurant)
                .ok_or_else(|| StoreError::not_found(restaurant))?;
            target.score_cache = scores.score_cache;
            target.trending_rank = scores.trending_rank;
            Ok(())
        })
    }

    fn write_dish_embedding(&self, dish: DishId, embedding: &[f32]) -> Result<(), StoreError> {
        self.write(|s| {
            let target = s
                .dishes
                .iter_mut()
                .find(|d| d.id == dish)
                .ok_or_else(|| StoreError::not_found(dish))?;
            target.embedding = Some(embedding.to_vec());
            Ok(())
        })
    }
}

/// Deterministic `EmbeddingProvider` keyed by exact input text.
///
/// Unknown text falls back to the default vector when one is configured,
/// otherwise to an HTTP 404 error. A configured error wins over everything.
#[derive(Debug, Default)]
pub struct StubEmbeddingProvider {
    vectors: HashMap<String, Vec<f32>>,
    default_vector: Option<Vec<f32>>,
    error: Option<EmbeddingError>,
    calls: AtomicUsize,
}

impl StubEmbeddingProvider {
    #[must_use]
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }

    #[must_use]
    pub fn with_default_vector(mut self, vector: Vec<f32>) -> Self {
        self.default_vector = Some(vector);
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: EmbeddingError) -> Self {
        self.error = Some(error);
        self
    }

    /// Number of `embed` calls observed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for StubEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        if text.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        self.vectors
            .get(text)
            .or(self.default_vector.as_ref())
            .cloned()
            .ok_or_else(|| EmbeddingError::Http {
                status: 404,
                message: format!("no stub vector for {text:?}"),
            })
    }
}
