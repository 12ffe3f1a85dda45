//! Store-backed dish scoring.
//!
//! [`DishScorer`] gathers the windowed signals for one dish from an
//! [`ActivityStore`] and feeds them to the pure score functions.

use std::{fmt, sync::Arc, time::SystemTime};

use mustorder_core::{
    ActivityStore, CatalogueStore, Dish, DishId, DishScores, StoreError, VenueSourceKind,
};

use crate::decay::{age_days, window_start};
use crate::destination::{
    DestinationSignals, DiversityBonus, NoDiversityBonus, RatedAge, destination_worthy_score,
};
use crate::error::ScoringError;
use crate::trending::{TrendingSignals, trending_score};
use crate::types::{DestinationWeights, TrendingWeights};

/// Computes destination and trending scores for dishes held in a store.
///
/// Every method takes an explicit `now`, so repeated calls over unchanged
/// data return identical scores.
pub struct DishScorer<'s, S: ?Sized> {
    store: &'s S,
    destination: DestinationWeights,
    trending: TrendingWeights,
    diversity: Arc<dyn DiversityBonus>,
}

impl<S: ?Sized> fmt::Debug for DishScorer<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DishScorer")
            .field("destination", &self.destination)
            .field("trending", &self.trending)
            .finish_non_exhaustive()
    }
}

impl<S: ?Sized> Clone for DishScorer<'_, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store,
            destination: self.destination,
            trending: self.trending,
            diversity: Arc::clone(&self.diversity),
        }
    }
}

impl<'s, S> DishScorer<'s, S>
where
    S: CatalogueStore + ActivityStore + ?Sized,
{
    /// Score dishes from `store` with default weights and no diversity bonus.
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            destination: DestinationWeights::default(),
            trending: TrendingWeights::default(),
            diversity: Arc::new(NoDiversityBonus),
        }
    }

    /// Replace the destination weights.
    #[must_use]
    pub const fn with_destination_weights(mut self, weights: DestinationWeights) -> Self {
        self.destination = weights;
        self
    }

    /// Replace the trending weights.
    #[must_use]
    pub const fn with_trending_weights(mut self, weights: TrendingWeights) -> Self {
        self.trending = weights;
        self
    }

    /// Install a diversity bonus.
    #[must_use]
    pub fn with_diversity_bonus(mut self, bonus: impl DiversityBonus + 'static) -> Self {
        self.diversity = Arc::new(bonus);
        self
    }

    /// Destination-Worthy Score of the dish with `id`; `0.0` when it does
    /// not exist.
    ///
    /// # Errors
    /// Returns [`ScoringError`] when the store fails.
    pub fn destination_score(&self, id: DishId, now: SystemTime) -> Result<f64, ScoringError> {
        let Some(dish) = self.lookup(id)? else {
            return Ok(0.0);
        };
        let signals = self.destination_signals(&dish, now)?;
        Ok(destination_worthy_score(&signals, &self.destination))
    }

    /// Trending Score of the dish with `id`; `0.0` when it does not exist.
    ///
    /// # Errors
    /// Returns [`ScoringError`] when the store fails.
    pub fn trending_score(&self, id: DishId, now: SystemTime) -> Result<f64, ScoringError> {
        let Some(dish) = self.lookup(id)? else {
            return Ok(0.0);
        };
        let signals = self.trending_signals(&dish, now)?;
        Ok(trending_score(&signals, &self.trending))
    }

    /// Both scores for an already loaded dish.
    ///
    /// # Errors
    /// Returns [`ScoringError`] when the store fails.
    pub fn score_dish(&self, dish: &Dish, now: SystemTime) -> Result<DishScores, ScoringError> {
        let destination = self.destination_signals(dish, now)?;
        let trending = self.trending_signals(dish, now)?;
        Ok(DishScores {
            destination_worthy_score: destination_worthy_score(&destination, &self.destination),
            trend_cache: trending_score(&trending, &self.trending),
        })
    }

    /// Gather the windowed inputs of the destination score.
    ///
    /// # Errors
    /// Returns [`ScoringError`] when the store fails.
    pub fn destination_signals(
        &self,
        dish: &Dish,
        now: SystemTime,
    ) -> Result<DestinationSignals, ScoringError> {
        let weights = &self.destination;
        let vote_count = self
            .store
            .votes_for_dish(dish.id, None)
            .map_err(signal_error(dish.id, "votes"))?
            .len();

        let recent_reviews = self
            .store
            .recent_reviews(dish.id, weights.review_cap)
            .map_err(signal_error(dish.id, "reviews"))?
            .into_iter()
            .map(|review| RatedAge {
                rating: review.rating,
                age_days: age_days(now, review.created_at),
            })
            .filter(|review| review.age_days <= weights.review_window_days)
            .collect();

        let recent_checkin_ages = self
            .store
            .checkins_for_dish(
                dish.restaurant_id,
                dish.id,
                window_start(now, weights.checkin_window_days),
            )
            .map_err(signal_error(dish.id, "checkins"))?
            .into_iter()
            .map(|checkin| age_days(now, checkin.created_at))
            .filter(|&age| age <= weights.checkin_window_days)
            .collect();

        let has_provenance = self
            .store
            .has_venue_source(dish.restaurant_id, &VenueSourceKind::Ddd)
            .map_err(signal_error(dish.id, "venue sources"))?;

        Ok(DestinationSignals {
            vote_count,
            recent_reviews,
            recent_checkin_ages,
            has_provenance,
            diversity_bonus: self.diversity.bonus(dish),
        })
    }

    /// Gather the windowed inputs of the trending score.
    ///
    /// # Errors
    /// Returns [`ScoringError`] when the store fails.
    pub fn trending_signals(
        &self,
        dish: &Dish,
        now: SystemTime,
    ) -> Result<TrendingSignals, ScoringError> {
        let since = window_start(now, self.trending.window_days);
        let ages = |times: Vec<SystemTime>| -> Vec<f64> {
            times.into_iter().map(|at| age_days(now, at)).collect()
        };

        let votes = self
            .store
            .votes_for_dish(dish.id, since)
            .map_err(signal_error(dish.id, "votes"))?;
        let checkins = self
            .store
            .checkins_for_dish(dish.restaurant_id, dish.id, since)
            .map_err(signal_error(dish.id, "checkins"))?;
        let photos = self
            .store
            .photos_for_dish(dish.id, since)
            .map_err(signal_error(dish.id, "photos"))?;

        Ok(TrendingSignals {
            vote_ages: ages(votes.into_iter().map(|v| v.created_at).collect()),
            checkin_ages: ages(checkins.into_iter().map(|c| c.created_at).collect()),
            photo_ages: ages(photos.into_iter().map(|p| p.created_at).collect()),
        })
    }

    fn lookup(&self, id: DishId) -> Result<Option<Dish>, ScoringError> {
        self.store.dish(id).map_err(signal_error(id, "dish"))
    }
}

fn signal_error(dish: DishId, signal: &'static str) -> impl FnOnce(StoreError) -> ScoringError {
    move |source| ScoringError::Signals {
        dish,
        signal,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mustorder_core::test_support::{
        CatalogueFixture, MemoryStore, days_ago, days_ahead, fixed_now,
    };
    use mustorder_core::{Restaurant, RestaurantId};
    use rstest::{fixture, rstest};

    const DISH: DishId = DishId(1);
    const RESTAURANT: RestaurantId = RestaurantId(1);

    #[fixture]
    fn catalogue() -> CatalogueFixture {
        CatalogueFixture::default()
            .restaurant(Restaurant::new(RESTAURANT, "Louie Mueller", "Taylor"))
            .dish(Dish::new(DISH, RESTAURANT, "Beef Rib"))
    }

    struct FixedBonus(f64);

    impl DiversityBonus for FixedBonus {
        fn bonus(&self, _dish: &Dish) -> f64 {
            self.0
        }
    }

    #[rstest]
    fn unknown_dish_scores_zero(catalogue: CatalogueFixture) {
        let store = MemoryStore::from(catalogue);
        let scorer = DishScorer::new(&store);
        assert_eq!(
            scorer.destination_score(DishId(404), fixed_now()).expect("score"),
            0.0
        );
        assert_eq!(
            scorer.trending_score(DishId(404), fixed_now()).expect("score"),
            0.0
        );
    }

    #[rstest]
    fn dish_without_activity_scores_zero(catalogue: CatalogueFixture) {
        let store = MemoryStore::from(catalogue);
        let scorer = DishScorer::new(&store);
        let dish = store.dish(DISH).expect("read").expect("dish exists");
        assert_eq!(
            scorer.score_dish(&dish, fixed_now()).expect("score"),
            DishScores::default()
        );
    }

    #[rstest]
    fn only_the_newest_fifty_reviews_count(catalogue: CatalogueFixture) {
        let now = fixed_now();
        let mut fixture = catalogue;
        for day in 0..50 {
            fixture = fixture.review(DISH, 5, days_ago(now, day));
        }
        for day in 50..60 {
            fixture = fixture.review(DISH, 1, days_ago(now, day));
        }
        let store = MemoryStore::from(fixture);
        let dish = store.dish(DISH).expect("read").expect("dish exists");
        let signals = DishScorer::new(&store)
            .destination_signals(&dish, now)
            .expect("signals");
        assert_eq!(signals.recent_reviews.len(), 50);
        assert!(signals.recent_reviews.iter().all(|r| r.rating == 5));
    }

    #[rstest]
    fn reviews_outside_a_year_are_ignored(catalogue: CatalogueFixture) {
        let now = fixed_now();
        let store = MemoryStore::from(
            catalogue
                .review(DISH, 5, days_ago(now, 365))
                .review(DISH, 5, days_ago(now, 366)),
        );
        let dish = store.dish(DISH).expect("read").expect("dish exists");
        let signals = DishScorer::new(&store)
            .destination_signals(&dish, now)
            .expect("signals");
        assert_eq!(signals.recent_reviews.len(), 1);
    }

    #[rstest]
    fn checkins_must_name_the_dish(catalogue: CatalogueFixture) {
        let now = fixed_now();
        let store = MemoryStore::from(
            catalogue
                .checkin(RESTAURANT, Some(DISH), days_ago(now, 1))
                .checkin(RESTAURANT, None, days_ago(now, 1))
                .checkin(RESTAURANT, Some(DISH), days_ago(now, 181)),
        );
        let dish = store.dish(DISH).expect("read").expect("dish exists");
        let signals = DishScorer::new(&store)
            .destination_signals(&dish, now)
            .expect("signals");
        assert_eq!(signals.recent_checkin_ages, vec![1.0]);
    }

    #[rstest]
    #[case("DDD", true)]
    #[case("ddd", true)]
    #[case("yelp", false)]
    fn provenance_requires_ddd_source(
        catalogue: CatalogueFixture,
        #[case] kind: &str,
        #[case] expected: bool,
    ) {
        let store = MemoryStore::from(catalogue.venue_source(RESTAURANT, kind));
        let dish = store.dish(DISH).expect("read").expect("dish exists");
        let signals = DishScorer::new(&store)
            .destination_signals(&dish, fixed_now())
            .expect("signals");
        assert_eq!(signals.has_provenance, expected);
    }

    #[rstest]
    fn diversity_bonus_is_pluggable(catalogue: CatalogueFixture) {
        let store = MemoryStore::from(catalogue);
        let scorer = DishScorer::new(&store).with_diversity_bonus(FixedBonus(7.0));
        assert_eq!(
            scorer.destination_score(DISH, fixed_now()).expect("score"),
            7.0
        );
    }

    #[rstest]
    fn future_events_trend_above_their_weight(catalogue: CatalogueFixture) {
        let now = fixed_now();
        let store = MemoryStore::from(catalogue.photo(DISH, days_ahead(now, 10)));
        let score = DishScorer::new(&store)
            .trending_score(DISH, now)
            .expect("score");
        assert!((score - 6.0).abs() < 1e-9);
    }

    #[rstest]
    fn trending_ignores_old_events(catalogue: CatalogueFixture) {
        let now = fixed_now();
        let store = MemoryStore::from(
            catalogue
                .vote(1, DISH, days_ago(now, 31))
                .photo(DISH, days_ago(now, 45)),
        );
        let score = DishScorer::new(&store)
            .trending_score(DISH, now)
            .expect("score");
        assert_eq!(score, 0.0);
    }
}
