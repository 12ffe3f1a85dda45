//! Dish search for the must-order engine.
//!
//! [`SearchEngine`] ranks dishes by the cosine similarity between their
//! stored embedding and an embedding of the query. When the embedding
//! provider is unavailable it falls back to a case-insensitive text search,
//! so a search only fails when the catalogue itself cannot be read or holds
//! inconsistent embeddings.
//!
//! The crate also finds restaurants near a point ([`nearby_restaurants`])
//! and backfills embeddings for dishes created without one
//! ([`EmbeddingIndexer`]).

#![forbid(unsafe_code)]

mod engine;
mod error;
mod filters;
mod indexer;
mod nearby;
mod ordering;
mod result;
mod semantic;
mod text;

pub use engine::SearchEngine;
pub use error::{IndexerError, SearchError, SemanticSearchError};
pub use filters::SearchFilters;
pub use indexer::{BackfillReport, EmbeddingIndexer};
pub use nearby::{NearbyRestaurant, nearby_restaurants};
pub use ordering::{SIMILARITY_TIE_BAND, compare_results};
pub use result::{DEFAULT_LIMIT, MAX_LIMIT, SearchResult};
pub use semantic::semantic_search;
pub use text::{TEXT_MATCH_SIMILARITY, text_search};

const LOG_TARGET: &str = "mustorder::search";
