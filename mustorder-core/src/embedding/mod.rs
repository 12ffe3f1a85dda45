//! Turn dish text into embedding vectors.
//!
//! The `EmbeddingProvider` trait abstracts the external vector generator.
//! Search embeds the user's query through it and the indexer embeds dishes
//! that do not yet carry a vector. Every vector produced by one provider is
//! expected to share the same dimensionality.

mod error;
mod provider;

pub use error::EmbeddingError;
pub use provider::{EmbeddingProvider, dish_embedding_text};
