//! Search command implementation.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use mustorder_search::{SearchEngine, SearchFilters};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::embedding::{
    EmbeddingProviderBuilder, EmbeddingSettings, HttpEmbeddingProviderBuilder,
};
use crate::validate::{resolve_limit, resolve_origin, validate_price_level, validate_radius};
use crate::{
    ARG_DATABASE, ARG_EMBEDDING_API_KEY, ARG_EMBEDDING_BASE_URL, ARG_EMBEDDING_MODEL,
    ARG_EMBEDDING_TIMEOUT_SECS, ARG_LAT, ARG_LIMIT, ARG_LNG, ARG_OUTPUT, ARG_PRICE_LEVEL,
    ARG_QUERY, ARG_RADIUS_KM, ARG_TAG, CliError, ENV_SEARCH_DATABASE, ENV_SEARCH_QUERY,
    output::write_json, store::open_store,
};

/// CLI arguments for the `search` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "search",
    long_about = "Rank dishes by semantic similarity to the query using the \
                 configured embedding service. When the service is \
                 unavailable the command falls back to case-insensitive \
                 text matching. Results are printed as JSON.",
    about = "Search dishes"
)]
#[ortho_config(prefix = "MUSTORDER")]
pub(crate) struct SearchArgs {
    /// Free-text query, e.g. "smoked brisket".
    #[arg(value_name = ARG_QUERY)]
    #[serde(default)]
    pub(crate) query: Option<String>,
    /// Path to the SQLite catalogue.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Keep dishes carrying any of these tags; repeat for several.
    #[arg(long = ARG_TAG, value_name = "tag")]
    #[serde(default)]
    pub(crate) tag: Vec<String>,
    /// Keep restaurants with this price level (1-4).
    #[arg(long = ARG_PRICE_LEVEL, value_name = "level")]
    #[serde(default)]
    pub(crate) price_level: Option<u8>,
    /// Latitude of the search origin.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the search origin.
    #[arg(long = ARG_LNG, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lng: Option<f64>,
    /// Keep restaurants within this many kilometres of the origin.
    #[arg(long = ARG_RADIUS_KM, value_name = "km")]
    #[serde(default)]
    pub(crate) radius_km: Option<f64>,
    /// Maximum number of results (1-50, default 20).
    #[arg(long = ARG_LIMIT, value_name = "n")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Write results to this file instead of stdout.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Root of the OpenAI-compatible embedding API.
    #[arg(long = ARG_EMBEDDING_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) embedding_base_url: Option<String>,
    /// Embedding model identifier.
    #[arg(long = ARG_EMBEDDING_MODEL, value_name = "model")]
    #[serde(default)]
    pub(crate) embedding_model: Option<String>,
    /// Bearer token for the embedding API.
    #[arg(long = ARG_EMBEDDING_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) embedding_api_key: Option<String>,
    /// Embedding request timeout in seconds.
    #[arg(long = ARG_EMBEDDING_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) embedding_timeout_secs: Option<u64>,
}

impl SearchArgs {
    pub(crate) fn into_config(self) -> Result<SearchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SearchConfig::try_from(merged)
    }
}

/// Resolved `search` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct SearchConfig {
    pub(crate) query: String,
    pub(crate) database: Utf8PathBuf,
    pub(crate) filters: SearchFilters,
    pub(crate) limit: usize,
    pub(crate) output: Option<Utf8PathBuf>,
    pub(crate) embedding: EmbeddingSettings,
}

impl TryFrom<SearchArgs> for SearchConfig {
    type Error = CliError;

    fn try_from(args: SearchArgs) -> Result<Self, Self::Error> {
        let query = args
            .query
            .filter(|query| !query.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_QUERY,
                env: ENV_SEARCH_QUERY,
            })?;
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_SEARCH_DATABASE,
        })?;
        let limit = resolve_limit(args.limit)?;
        let filters = build_filters(
            &args.tag,
            args.price_level,
            args.lat,
            args.lng,
            args.radius_km,
        )?;
        let embedding = EmbeddingSettings::resolve(
            args.embedding_base_url,
            args.embedding_model,
            args.embedding_api_key,
            args.embedding_timeout_secs,
        );
        Ok(Self {
            query,
            database,
            filters,
            limit,
            output: args.output,
            embedding,
        })
    }
}

fn build_filters(
    tags: &[String],
    price_level: Option<u8>,
    lat: Option<f64>,
    lng: Option<f64>,
    radius_km: Option<f64>,
) -> Result<SearchFilters, CliError> {
    let mut filters = SearchFilters::default().with_tags(tags.iter().map(String::as_str));
    if let Some(level) = validate_price_level(price_level)? {
        filters = filters.with_price_level(level);
    }
    let origin = resolve_origin(lat, lng)?;
    filters = match (origin, radius_km) {
        (Some(point), Some(radius)) => filters.near(point, validate_radius(radius)?),
        (Some(point), None) => filters.with_origin(point),
        (None, Some(_)) => return Err(CliError::IncompleteGeoFilter { missing: ARG_LAT }),
        (None, None) => filters,
    };
    Ok(filters)
}

pub(super) fn run_search(args: SearchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_search_with(args, &HttpEmbeddingProviderBuilder, &mut stdout)
}

pub(super) fn run_search_with(
    args: SearchArgs,
    builder: &dyn EmbeddingProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_search(&config, builder, writer)
}

pub(super) fn execute_search(
    config: &SearchConfig,
    builder: &dyn EmbeddingProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let store = open_store(&config.database, ARG_DATABASE)?;
    let provider = builder.build(&config.embedding)?;
    let results = SearchEngine::new(&store, provider.as_ref())
        .search(&config.query, &config.filters, config.limit)
        .map_err(CliError::Search)?;
    write_json(&results, config.output.as_deref(), writer)
}

#[cfg(test)]
pub(crate) fn search_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SearchConfig, CliError> {
    let merged = SearchArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SearchConfig::try_from(merged)
}
