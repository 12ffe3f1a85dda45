//! Batch recomputation of every cached score.
//!
//! A pass runs two strictly sequential phases. The dish phase scores every
//! dish and persists both scores together. The restaurant phase then reads
//! the freshly written dish caches, derives each restaurant's score cache
//! and trending rank, and persists those together.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::SystemTime,
};

use log::{debug, info, warn};
use mustorder_core::{
    ActivityStore, CacheStore, CatalogueStore, DishId, RestaurantId, RestaurantScores,
};

use crate::error::{EntityError, RecomputeError};
use crate::restaurant::{restaurant_score_cache, trending_ranks};
use crate::scorer::DishScorer;

const LOG_TARGET: &str = "mustorder::recompute";

/// What to do when a single dish or restaurant fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the pass and return the failure.
    #[default]
    Abort,
    /// Log the failure, record it in the report, and continue.
    Isolate,
}

/// Token preventing overlapping passes.
///
/// Clones share state, so recomputers built with clones of one token never
/// run concurrently.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    running: Arc<AtomicBool>,
}

impl SingleFlight {
    /// Claim the token; `None` while another holder is active.
    #[must_use]
    pub fn try_acquire(&self) -> Option<FlightGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                running: Arc::clone(&self.running),
            })
    }

    /// Whether a pass currently holds the token.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Releases its [`SingleFlight`] token on drop.
#[derive(Debug)]
pub struct FlightGuard {
    running: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// An entity skipped under [`FailurePolicy::Isolate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolatedFailure {
    /// Entity reference, e.g. `dish 7`.
    pub entity: String,
    /// Rendered error chain.
    pub message: String,
}

/// Summary of a completed pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecomputeReport {
    /// Dishes whose scores were written.
    pub dishes_scored: usize,
    /// Restaurants whose aggregates were written.
    pub restaurants_scored: usize,
    /// Restaurants that received a trending rank.
    pub ranked_restaurants: usize,
    /// Entities skipped under [`FailurePolicy::Isolate`].
    pub failures: Vec<IsolatedFailure>,
}

/// Runs full recomputation passes against a store.
///
/// # Examples
/// ```
/// use mustorder_core::test_support::{MemoryStore, fixed_now, sample_catalogue};
/// use mustorder_scorer::Recomputer;
///
/// let store = MemoryStore::from(sample_catalogue());
/// let report = Recomputer::new(&store).recompute_all_at(fixed_now())?;
/// assert_eq!(report.dishes_scored, 7);
/// assert_eq!(report.ranked_restaurants, 4);
/// # Ok::<(), mustorder_scorer::RecomputeError>(())
/// ```
pub struct Recomputer<'s, S: ?Sized> {
    store: &'s S,
    scorer: DishScorer<'s, S>,
    policy: FailurePolicy,
    flight: SingleFlight,
}

impl<S: ?Sized> fmt::Debug for Recomputer<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recomputer")
            .field("scorer", &self.scorer)
            .field("policy", &self.policy)
            .field("flight", &self.flight)
            .finish_non_exhaustive()
    }
}

/// Restaurant aggregates computed before ranks are known.
struct Aggregate {
    id: RestaurantId,
    score_cache: f64,
    trend_total: Option<f64>,
}

impl<'s, S> Recomputer<'s, S>
where
    S: CatalogueStore + ActivityStore + CacheStore + ?Sized,
{
    /// Recompute against `store` with default weights, abort-on-failure, and
    /// a private single-flight token.
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            scorer: DishScorer::new(store),
            policy: FailurePolicy::default(),
            flight: SingleFlight::default(),
        }
    }

    /// Replace the dish scorer, e.g. to change weights.
    #[must_use]
    pub fn with_scorer(mut self, scorer: DishScorer<'s, S>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Choose how per-entity failures are handled.
    #[must_use]
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Share a single-flight token with other recomputers.
    #[must_use]
    pub fn with_single_flight(mut self, flight: SingleFlight) -> Self {
        self.flight = flight;
        self
    }

    /// The token guarding this recomputer's passes.
    #[must_use]
    pub const fn single_flight(&self) -> &SingleFlight {
        &self.flight
    }

    /// Run a pass measured against the wall clock.
    ///
    /// # Errors
    /// See [`Recomputer::recompute_all_at`].
    pub fn recompute_all(&self) -> Result<RecomputeReport, RecomputeError> {
        self.recompute_all_at(SystemTime::now())
    }

    /// Run a pass measured against `now`.
    ///
    /// # Errors
    /// Returns [`RecomputeError::AlreadyRunning`] when the single-flight
    /// token is held, [`RecomputeError::Listing`] when dishes or restaurants
    /// cannot be listed, and a per-entity error on the first failure under
    /// [`FailurePolicy::Abort`].
    pub fn recompute_all_at(&self, now: SystemTime) -> Result<RecomputeReport, RecomputeError> {
        let Some(_guard) = self.flight.try_acquire() else {
            return Err(RecomputeError::AlreadyRunning);
        };
        info!(target: LOG_TARGET, "recompute pass started");

        let mut report = RecomputeReport::default();
        self.dish_phase(now, &mut report)?;
        self.restaurant_phase(&mut report)?;

        info!(
            target: LOG_TARGET,
            "recompute pass finished: {} dishes, {} restaurants, {} ranked, {} isolated failures",
            report.dishes_scored,
            report.restaurants_scored,
            report.ranked_restaurants,
            report.failures.len()
        );
        Ok(report)
    }

    fn dish_phase(
        &self,
        now: SystemTime,
        report: &mut RecomputeReport,
    ) -> Result<(), RecomputeError> {
        let ids = self
            .store
            .dish_ids()
            .map_err(|source| RecomputeError::Listing {
                what: "dishes",
                source,
            })?;
        debug!(target: LOG_TARGET, "scoring {} dishes", ids.len());

        for id in ids {
            match self.score_and_persist(id, now) {
                Ok(true) => report.dishes_scored += 1,
                Ok(false) => debug!(target: LOG_TARGET, "{id} vanished before scoring"),
                Err(source) => self.handle_failure(
                    report,
                    id.to_string(),
                    RecomputeError::Dish { dish: id, source },
                )?,
            }
        }
        Ok(())
    }

    fn score_and_persist(&self, id: DishId, now: SystemTime) -> Result<bool, EntityError> {
        let Some(dish) = self.store.dish(id)? else {
            return Ok(false);
        };
        let scores = self.scorer.score_dish(&dish, now)?;
        self.store.write_dish_scores(id, scores)?;
        Ok(true)
    }

    fn restaurant_phase(&self, report: &mut RecomputeReport) -> Result<(), RecomputeError> {
        let ids = self
            .store
            .restaurant_ids()
            .map_err(|source| RecomputeError::Listing {
                what: "restaurants",
                source,
            })?;
        debug!(target: LOG_TARGET, "aggregating {} restaurants", ids.len());

        let mut aggregates = Vec::with_capacity(ids.len());
        for id in ids {
            match self.aggregate(id) {
                Ok(aggregate) => aggregates.push(aggregate),
                Err(source) => self.handle_failure(
                    report,
                    id.to_string(),
                    RecomputeError::Restaurant {
                        restaurant: id,
                        source,
                    },
                )?,
            }
        }

        let ranks = trending_ranks(aggregates.iter().map(|a| (a.id, a.trend_total)));
        report.ranked_restaurants = ranks.len();

        for aggregate in aggregates {
            let scores = RestaurantScores {
                score_cache: aggregate.score_cache,
                trending_rank: ranks.get(&aggregate.id).copied(),
            };
            match self.store.write_restaurant_scores(aggregate.id, scores) {
                Ok(()) => report.restaurants_scored += 1,
                Err(source) => self.handle_failure(
                    report,
                    aggregate.id.to_string(),
                    RecomputeError::Restaurant {
                        restaurant: aggregate.id,
                        source: source.into(),
                    },
                )?,
            }
        }
        Ok(())
    }

    fn aggregate(&self, id: RestaurantId) -> Result<Aggregate, EntityError> {
        let dishes = self.store.dishes_for_restaurant(id)?;
        let trend_total = if dishes.is_empty() {
            None
        } else {
            Some(dishes.iter().map(|dish| dish.trend_cache).sum::<f64>())
        };
        Ok(Aggregate {
            id,
            score_cache: restaurant_score_cache(
                dishes.iter().map(|dish| dish.destination_worthy_score),
            ),
            trend_total,
        })
    }

    fn handle_failure(
        &self,
        report: &mut RecomputeReport,
        entity: String,
        error: RecomputeError,
    ) -> Result<(), RecomputeError> {
        match self.policy {
            FailurePolicy::Abort => Err(error),
            FailurePolicy::Isolate => {
                let message = error_chain(&error);
                warn!(target: LOG_TARGET, "skipping {entity}: {message}");
                report.failures.push(IsolatedFailure { entity, message });
                Ok(())
            }
        }
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
