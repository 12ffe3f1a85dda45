//! Error types for semantic search, the dispatcher, and embedding backfill.

use mustorder_core::{DishId, EmbeddingError, SimilarityError, StoreError};
use thiserror::Error;

/// Errors raised by [`crate::semantic_search`].
#[derive(Debug, Error)]
pub enum SemanticSearchError {
    /// The embedding provider could not embed the query.
    #[error("failed to embed the search query")]
    Provider(#[source] EmbeddingError),
    /// Loading candidate dishes failed.
    #[error("failed to load search candidates")]
    Store(#[source] StoreError),
    /// A stored embedding cannot be compared with the query embedding.
    #[error("cannot compare the query with {dish}")]
    Similarity {
        /// Dish whose embedding has the wrong dimension.
        dish: DishId,
        /// Source error from the similarity check.
        #[source]
        source: SimilarityError,
    },
}

/// Errors raised by [`crate::SearchEngine::search`].
///
/// Provider failures never surface here; they trigger the text fallback.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Semantic search failed for a reason other than the provider.
    #[error(transparent)]
    Semantic(#[from] SemanticSearchError),
    /// The text search, direct or fallback, could not read the store.
    #[error("text search failed")]
    Text(#[source] StoreError),
}

/// Errors raised by [`crate::EmbeddingIndexer::backfill`].
#[derive(Debug, Error)]
pub enum IndexerError {
    /// Listing the dishes awaiting an embedding failed.
    #[error("failed to list dishes awaiting embeddings")]
    Listing(#[source] StoreError),
    /// The provider failed for a dish; the backfill stopped there.
    #[error("failed to embed {dish}")]
    Embed {
        /// Dish being embedded.
        dish: DishId,
        /// Source error from the provider.
        #[source]
        source: EmbeddingError,
    },
    /// Persisting an embedding failed.
    #[error("failed to store the embedding for {dish}")]
    Persist {
        /// Dish being embedded.
        dish: DishId,
        /// Source error from the store.
        #[source]
        source: StoreError,
    },
}
