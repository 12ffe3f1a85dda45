//! Nearby command implementation.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use geo::Coord;
use mustorder_search::nearby_restaurants;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::validate::{origin, resolve_limit, validate_radius};
use crate::{
    ARG_DATABASE, ARG_LAT, ARG_LIMIT, ARG_LNG, ARG_OUTPUT, ARG_RADIUS_KM, CliError,
    ENV_NEARBY_DATABASE, ENV_NEARBY_LAT, ENV_NEARBY_LNG, ENV_NEARBY_RADIUS_KM,
    output::write_json, store::open_store,
};

/// CLI arguments for the `nearby` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "nearby",
    long_about = "List restaurants within a radius of a point, closest \
                 first. Restaurants without a location are never listed.",
    about = "List nearby restaurants"
)]
#[ortho_config(prefix = "MUSTORDER")]
pub(crate) struct NearbyArgs {
    /// Path to the SQLite catalogue.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Latitude of the origin.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the origin.
    #[arg(long = ARG_LNG, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lng: Option<f64>,
    /// Search radius in kilometres.
    #[arg(long = ARG_RADIUS_KM, value_name = "km")]
    #[serde(default)]
    pub(crate) radius_km: Option<f64>,
    /// Maximum number of restaurants (1-50, default 20).
    #[arg(long = ARG_LIMIT, value_name = "n")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Write results to this file instead of stdout.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl NearbyArgs {
    pub(crate) fn into_config(self) -> Result<NearbyConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        NearbyConfig::try_from(merged)
    }
}

/// Resolved `nearby` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NearbyConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) origin: Coord<f64>,
    pub(crate) radius_km: f64,
    pub(crate) limit: usize,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TryFrom<NearbyArgs> for NearbyConfig {
    type Error = CliError;

    fn try_from(args: NearbyArgs) -> Result<Self, Self::Error> {
        let database = args.database.ok_or(CliError::MissingArgument {
            field: ARG_DATABASE,
            env: ENV_NEARBY_DATABASE,
        })?;
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_NEARBY_LAT,
        })?;
        let lng = args.lng.ok_or(CliError::MissingArgument {
            field: ARG_LNG,
            env: ENV_NEARBY_LNG,
        })?;
        let radius_km = args.radius_km.ok_or(CliError::MissingArgument {
            field: ARG_RADIUS_KM,
            env: ENV_NEARBY_RADIUS_KM,
        })?;
        Ok(Self {
            database,
            origin: origin(lat, lng)?,
            radius_km: validate_radius(radius_km)?,
            limit: resolve_limit(args.limit)?,
            output: args.output,
        })
    }
}

pub(super) fn run_nearby(args: NearbyArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_nearby_with(args, &mut stdout)
}

pub(super) fn run_nearby_with(args: NearbyArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_nearby(&config, writer)
}

pub(super) fn execute_nearby(
    config: &NearbyConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let store = open_store(&config.database, ARG_DATABASE)?;
    let restaurants = nearby_restaurants(&store, config.origin, config.radius_km, config.limit)
        .map_err(CliError::Nearby)?;
    write_json(&restaurants, config.output.as_deref(), writer)
}

#[cfg(test)]
pub(crate) fn nearby_config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<NearbyConfig, CliError> {
    let merged = NearbyArgs::merge_from_layers(layers).map_err(CliError::from)?;
    NearbyConfig::try_from(merged)
}
