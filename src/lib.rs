//! Facade crate for the must-order ranking engine.
//!
//! This crate re-exports the core domain types and exposes the scoring,
//! search, storage, and HTTP embedding layers behind feature flags.

#![forbid(unsafe_code)]

pub use mustorder_core::{
    ActivityStore, CacheStore, CatalogueStore, Dish, DishId, DishQuery, DishScores,
    EmbeddingError, EmbeddingProvider, Restaurant, RestaurantId, RestaurantScores,
    SimilarityError, StoreError, cosine_similarity, distance_between, format_distance,
};

#[cfg(feature = "store-sqlite")]
pub use mustorder_core::{SqliteStore, SqliteStoreError};

#[cfg(feature = "scorer")]
pub use mustorder_scorer::{
    DestinationWeights, DishScorer, FailurePolicy, RecomputeError, RecomputeReport, Recomputer,
    SingleFlight, TrendingWeights,
};

#[cfg(feature = "search")]
pub use mustorder_search::{
    EmbeddingIndexer, SearchEngine, SearchError, SearchFilters, SearchResult, nearby_restaurants,
};

#[cfg(feature = "embedding-http")]
pub use mustorder_data::{HttpEmbeddingProvider, HttpEmbeddingProviderConfig};
