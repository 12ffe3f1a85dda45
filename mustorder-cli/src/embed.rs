//! Embed command implementation.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use mustorder_search::EmbeddingIndexer;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::embedding::{
    EmbeddingProviderBuilder, EmbeddingSettings, HttpEmbeddingProviderBuilder,
};
use crate::{
    ARG_DATABASE, ARG_EMBEDDING_API_KEY, ARG_EMBEDDING_BASE_URL, ARG_EMBEDDING_MODEL,
    ARG_EMBEDDING_TIMEOUT_SECS, CliError, ENV_EMBED_DATABASE, output::write_json,
    store::open_store,
};

/// CLI arguments for the `embed` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "embed",
    long_about = "Embed every dish that has no embedding yet, using the \
                 dish name and tags as the embedded text. The first \
                 provider failure stops the backfill; dishes embedded \
                 before it keep their vectors.",
    about = "Backfill dish embeddings"
)]
#[ortho_config(prefix = "MUSTORDER")]
pub(crate) struct EmbedArgs {
    /// Path to the SQLite catalogue.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
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

impl EmbedArgs {
    pub(crate) fn into_config(self) -> Result<EmbedConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        EmbedConfig::try_from(merged)
    }
}

/// Resolved `embed` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct EmbedConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) embedding: EmbeddingSettings,
}

impl TryFrom<EmbedArgs> for EmbedConfig {
    type Error = CliError;

    fn try_from(args: EmbedArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_EMBED_DATABASE,
        })?;
        Ok(Self {
            database,
            embedding: EmbeddingSettings::resolve(
                args.embedding_base_url,
                args.embedding_model,
                args.embedding_api_key,
                args.embedding_timeout_secs,
            ),
        })
    }
}

/// JSON summary of a finished backfill.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct EmbedSummary {
    pub(crate) embedded: usize,
    pub(crate) skipped: usize,
}

pub(super) fn run_embed(args: EmbedArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_embed_with(args, &HttpEmbeddingProviderBuilder, &mut stdout)
}

pub(super) fn run_embed_with(
    args: EmbedArgs,
    builder: &dyn EmbeddingProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_embed(&config, builder, writer)
}

pub(super) fn execute_embed(
    config: &EmbedConfig,
    builder: &dyn EmbeddingProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let store = open_store(&config.database, ARG_DATABASE)?;
    let provider = builder.build(&config.embedding)?;
    info!(
        target: "mustorder::cli",
        "backfilling embeddings with model {}",
        config.embedding.provider.model
    );
    let report = EmbeddingIndexer::new(&store, provider.as_ref())
        .backfill()
        .map_err(CliError::Backfill)?;
    let summary = EmbedSummary {
        embedded: report.embedded,
        skipped: report.skipped,
    };
    write_json(&summary, None, writer)
}
