//! Error types emitted by the must-order CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use mustorder_core::SqliteStoreError;
use mustorder_data::ProviderBuildError;
use mustorder_scorer::RecomputeError;
use mustorder_search::{IndexerError, SearchError};
use thiserror::Error;

/// Errors emitted by the must-order CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The result limit is outside `1..=max`.
    #[error("limit {limit} is outside 1..={max}")]
    InvalidLimit { limit: usize, max: usize },
    /// The price level is outside `1..=4`.
    #[error("price level {price_level} is outside 1..=4")]
    InvalidPriceLevel { price_level: u8 },
    /// Latitude or longitude is out of range or not a number.
    #[error("invalid coordinate (lat {lat}, lng {lng})")]
    InvalidCoordinate { lat: f64, lng: f64 },
    /// The radius is negative or not a number.
    #[error("radius {radius_km} km must be a finite, non-negative number")]
    InvalidRadius { radius_km: f64 },
    /// Only part of a geo filter was supplied.
    #[error("incomplete geo filter: --{missing} is required")]
    IncompleteGeoFilter { missing: &'static str },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error(transparent)]
    OpenStore(#[from] SqliteStoreError),
    /// Constructing the embedding provider failed.
    #[error("failed to build embedding provider for {base_url:?}: {source}")]
    BuildEmbeddingProvider {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// The recompute pass failed.
    #[error("recompute failed: {0}")]
    Recompute(#[source] RecomputeError),
    /// The search failed.
    #[error("search failed: {0}")]
    Search(#[source] SearchError),
    /// Listing nearby restaurants failed.
    #[error("nearby lookup failed: {0}")]
    Nearby(#[source] mustorder_core::StoreError),
    /// The embedding backfill failed.
    #[error("embedding backfill failed: {0}")]
    Backfill(#[source] IndexerError),
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Creating the output file failed.
    #[error("failed to create output file {path:?}: {source}")]
    CreateOutput {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
