//! Recompute command implementation.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use mustorder_scorer::{FailurePolicy, IsolatedFailure, RecomputeReport, Recomputer};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DATABASE, ARG_ISOLATE_FAILURES, CliError, ENV_RECOMPUTE_DATABASE, output::write_json,
    store::open_store,
};

/// CLI arguments for the `recompute` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "recompute",
    long_about = "Run a full recomputation pass: score every dish, then \
                 aggregate restaurant scores and trending ranks from the \
                 fresh dish caches. Prints a JSON summary of the pass.",
    about = "Recompute every cached score"
)]
#[ortho_config(prefix = "MUSTORDER")]
pub(crate) struct RecomputeArgs {
    /// Path to the SQLite catalogue.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Skip failing dishes and restaurants instead of aborting the pass.
    #[arg(
        long = ARG_ISOLATE_FAILURES,
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "bool"
    )]
    #[serde(default)]
    pub(crate) isolate_failures: Option<bool>,
}

impl RecomputeArgs {
    pub(crate) fn into_config(self) -> Result<RecomputeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RecomputeConfig::try_from(merged)
    }
}

/// Resolved `recompute` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecomputeConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) policy: FailurePolicy,
}

impl TryFrom<RecomputeArgs> for RecomputeConfig {
    type Error = CliError;

    fn try_from(args: RecomputeArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_RECOMPUTE_DATABASE,
        })?;
        let policy = if args.isolate_failures.unwrap_or(false) {
            FailurePolicy::Isolate
        } else {
            FailurePolicy::Abort
        };
        Ok(Self { database, policy })
    }
}

/// JSON summary of a finished pass.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct RecomputeSummary {
    pub(crate) dishes_scored: usize,
    pub(crate) restaurants_scored: usize,
    pub(crate) ranked_restaurants: usize,
    pub(crate) failures: Vec<FailureSummary>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct FailureSummary {
    pub(crate) entity: String,
    pub(crate) message: String,
}

impl From<RecomputeReport> for RecomputeSummary {
    fn from(report: RecomputeReport) -> Self {
        Self {
            dishes_scored: report.dishes_scored,
            restaurants_scored: report.restaurants_scored,
            ranked_restaurants: report.ranked_restaurants,
            failures: report
                .failures
                .into_iter()
                .map(|IsolatedFailure { entity, message }| FailureSummary { entity, message })
                .collect(),
        }
    }
}

pub(super) fn run_recompute(args: RecomputeArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_recompute_with(args, &mut stdout)
}

pub(super) fn run_recompute_with(
    args: RecomputeArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_recompute(&config, writer)
}

pub(super) fn execute_recompute(
    config: &RecomputeConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let store = open_store(&config.database, ARG_DATABASE)?;
    let report = Recomputer::new(&store)
        .with_failure_policy(config.policy)
        .recompute_all()
        .map_err(CliError::Recompute)?;
    write_json(&RecomputeSummary::from(report), None, writer)
}

#[cfg(test)]
pub(crate) fn recompute_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RecomputeConfig, CliError> {
    let merged = RecomputeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RecomputeConfig::try_from(merged)
}
