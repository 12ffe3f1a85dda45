//! Error types raised while scoring dishes and recomputing caches.
#![forbid(unsafe_code)]

use mustorder_core::{DishId, RestaurantId, StoreError};
use thiserror::Error;

/// Errors raised while gathering the signals for a dish score.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Reading one of the activity signals failed.
    #[error("failed to read {signal} for {dish}")]
    Signals {
        /// Dish being scored.
        dish: DishId,
        /// Signal that could not be read, e.g. `votes`.
        signal: &'static str,
        /// Source error from the store.
        #[source]
        source: StoreError,
    },
}

/// Failure while processing a single entity in a recomputation phase.
#[derive(Debug, Error)]
pub enum EntityError {
    /// Computing the entity's scores failed.
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    /// Reading or writing the entity failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised by [`crate::Recomputer`].
#[derive(Debug, Error)]
pub enum RecomputeError {
    /// Another pass holds the same single-flight token.
    #[error("a recomputation pass is already running")]
    AlreadyRunning,
    /// Listing the entities of a phase failed; the pass was aborted.
    #[error("failed to list {what}")]
    Listing {
        /// Entity kind being listed.
        what: &'static str,
        /// Source error from the store.
        #[source]
        source: StoreError,
    },
    /// Scoring or persisting a dish failed under [`crate::FailurePolicy::Abort`].
    #[error("failed to recompute {dish}")]
    Dish {
        /// Dish that failed.
        dish: DishId,
        /// Underlying failure.
        #[source]
        source: EntityError,
    },
    /// Aggregating or persisting a restaurant failed under
    /// [`crate::FailurePolicy::Abort`].
    #[error("failed to recompute {restaurant}")]
    Restaurant {
        /// Restaurant that failed.
        restaurant: RestaurantId,
        /// Underlying failure.
        #[source]
        source: EntityError,
    },
}
