//! Scoring and recomputation for must-order dishes.
//!
//! The crate provides two layers:
//! - **Pure score functions**: [`destination_worthy_score`] (how far a diner
//!   should travel for a dish, `0.0..=100.0`), [`trending_score`]
//!   (recency-weighted momentum), and the restaurant aggregates
//!   [`restaurant_score_cache`] and [`trending_ranks`].
//! - **Store-backed orchestration**: [`DishScorer`] gathers windowed signals
//!   from an [`ActivityStore`](mustorder_core::ActivityStore) and
//!   [`Recomputer`] runs the two-phase batch pass that refreshes every cached
//!   score.
//!
//! # Examples
//!
//! ```
//! use mustorder_core::test_support::{MemoryStore, fixed_now, sample_catalogue};
//! use mustorder_core::{CatalogueStore, RestaurantId};
//! use mustorder_scorer::{FailurePolicy, Recomputer};
//!
//! let store = MemoryStore::from(sample_catalogue());
//! Recomputer::new(&store)
//!     .with_failure_policy(FailurePolicy::Isolate)
//!     .recompute_all_at(fixed_now())?;
//!
//! let empty = store.restaurant(RestaurantId(5))?.expect("restaurant 5 exists");
//! assert_eq!(empty.trending_rank, None);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod decay;
mod destination;
mod error;
mod recompute;
mod restaurant;
mod scorer;
mod trending;
mod types;

pub use decay::age_days;
pub use destination::{
    DestinationSignals, DiversityBonus, NoDiversityBonus, RatedAge, destination_worthy_score,
};
pub use error::{EntityError, RecomputeError, ScoringError};
pub use recompute::{
    FailurePolicy, FlightGuard, IsolatedFailure, RecomputeReport, Recomputer, SingleFlight,
};
pub use restaurant::{restaurant_score_cache, trending_ranks};
pub use scorer::DishScorer;
pub use trending::{TrendingSignals, trending_score};
pub use types::{DestinationWeights, TrendingWeights};
