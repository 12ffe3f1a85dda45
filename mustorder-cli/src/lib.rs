//! Command-line interface for the must-order engine.
//!
//! Every subcommand reads its settings from CLI flags, `MUSTORDER_CMDS_*`
//! environment variables, and configuration files, in that order of
//! precedence, and writes JSON to stdout.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod embed;
mod embedding;
mod error;
mod fs;
mod nearby;
mod output;
mod recompute;
mod search;
mod store;
mod validate;

pub use error::CliError;

use embed::EmbedArgs;
use nearby::NearbyArgs;
use recompute::RecomputeArgs;
use search::SearchArgs;

const ARG_DATABASE: &str = "database";
const ARG_ISOLATE_FAILURES: &str = "isolate-failures";
const ARG_QUERY: &str = "query";
const ARG_TAG: &str = "tag";
const ARG_PRICE_LEVEL: &str = "price-level";
const ARG_LAT: &str = "lat";
const ARG_LNG: &str = "lng";
const ARG_RADIUS_KM: &str = "radius-km";
const ARG_LIMIT: &str = "limit";
const ARG_OUTPUT: &str = "output";
const ARG_EMBEDDING_BASE_URL: &str = "embedding-base-url";
const ARG_EMBEDDING_MODEL: &str = "embedding-model";
const ARG_EMBEDDING_API_KEY: &str = "embedding-api-key";
const ARG_EMBEDDING_TIMEOUT_SECS: &str = "embedding-timeout-secs";

const ENV_RECOMPUTE_DATABASE: &str = "MUSTORDER_CMDS_RECOMPUTE_DATABASE";
const ENV_SEARCH_DATABASE: &str = "MUSTORDER_CMDS_SEARCH_DATABASE";
const ENV_SEARCH_QUERY: &str = "MUSTORDER_CMDS_SEARCH_QUERY";
const ENV_NEARBY_DATABASE: &str = "MUSTORDER_CMDS_NEARBY_DATABASE";
const ENV_NEARBY_LAT: &str = "MUSTORDER_CMDS_NEARBY_LAT";
const ENV_NEARBY_LNG: &str = "MUSTORDER_CMDS_NEARBY_LNG";
const ENV_NEARBY_RADIUS_KM: &str = "MUSTORDER_CMDS_NEARBY_RADIUS_KM";
const ENV_EMBED_DATABASE: &str = "MUSTORDER_CMDS_EMBED_DATABASE";

/// Run the must-order CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Recompute(args) => recompute::run_recompute(args),
        Command::Search(args) => search::run_search(args),
        Command::Nearby(args) => nearby::run_nearby(args),
        Command::Embed(args) => embed::run_embed(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "mustorder",
    about = "Score, index, and search must-order dishes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recompute every cached dish and restaurant score.
    Recompute(RecomputeArgs),
    /// Search dishes by meaning, falling back to text matching.
    Search(SearchArgs),
    /// List restaurants near a point.
    Nearby(NearbyArgs),
    /// Embed every dish that lacks an embedding.
    Embed(EmbedArgs),
}

#[cfg(test)]
mod tests;
