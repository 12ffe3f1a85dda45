//! Adapters connecting the must-order engine to external services.
//!
//! The [`embedding`] module provides [`HttpEmbeddingProvider`], the
//! network-backed implementation of [`mustorder_core::EmbeddingProvider`]
//! used by search and embedding backfill.

#![forbid(unsafe_code)]

pub mod embedding;

pub use embedding::{HttpEmbeddingProvider, HttpEmbeddingProviderConfig, ProviderBuildError};
