//! HTTP embedding provider for OpenAI-compatible services.
//!
//! [`HttpEmbeddingProvider`] implements [`mustorder_core::EmbeddingProvider`]
//! by posting `{"model", "input"}` to `{base_url}/embeddings` and returning
//! the first vector of the response.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use mustorder_core::EmbeddingProvider;
//! use mustorder_data::embedding::{HttpEmbeddingProvider, HttpEmbeddingProviderConfig};
//!
//! let config = HttpEmbeddingProviderConfig::new("http://localhost:11434/v1")
//!     .with_model("nomic-embed-text")
//!     .with_timeout(Duration::from_secs(10));
//! let provider = HttpEmbeddingProvider::with_config(config)?;
//! let vector = provider.embed("smoked brisket")?;
//! println!("{} dimensions", vector.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod provider;
mod wire;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_USER_AGENT, HttpEmbeddingProvider,
    HttpEmbeddingProviderConfig, ProviderBuildError,
};
