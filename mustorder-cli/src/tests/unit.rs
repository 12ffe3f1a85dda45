//! Unit tests covering argument resolution and configuration layering.

use super::*;
use crate::nearby::{NearbyArgs, NearbyConfig, nearby_config_from_layers_for_test};
use crate::recompute::{RecomputeArgs, RecomputeConfig, recompute_config_from_layers_for_test};
use crate::search::{SearchArgs, SearchConfig, search_config_from_layers_for_test};
use camino::Utf8PathBuf;
use geo::Coord;
use mustorder_scorer::FailurePolicy;
use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::json;

fn search_args() -> SearchArgs {
    SearchArgs {
        query: Some("brisket".to_owned()),
        database: Some(Utf8PathBuf::from("catalogue.db")),
        ..SearchArgs::default()
    }
}

#[rstest]
fn recompute_requires_a_database() {
    let err = RecomputeConfig::try_from(RecomputeArgs::default()).expect_err("missing database");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_DATABASE);
            assert_eq!(env, ENV_RECOMPUTE_DATABASE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case(None, FailurePolicy::Abort)]
#[case(Some(false), FailurePolicy::Abort)]
#[case(Some(true), FailurePolicy::Isolate)]
fn isolate_flag_selects_failure_policy(
    #[case] isolate_failures: Option<bool>,
    #[case] expected: FailurePolicy,
) {
    let args = RecomputeArgs {
        database: Some(Utf8PathBuf::from("catalogue.db")),
        isolate_failures,
    };
    let config = RecomputeConfig::try_from(args).expect("config should build");
    assert_eq!(config.policy, expected);
}

#[rstest]
#[case::missing_query(None, Some("catalogue.db"), ARG_QUERY, ENV_SEARCH_QUERY)]
#[case::blank_query(Some("   "), Some("catalogue.db"), ARG_QUERY, ENV_SEARCH_QUERY)]
#[case::missing_database(Some("brisket"), None, ARG_DATABASE, ENV_SEARCH_DATABASE)]
fn search_reports_missing_arguments(
    #[case] query: Option<&str>,
    #[case] database: Option<&str>,
    #[case] expected_field: &str,
    #[case] expected_env: &str,
) {
    let args = SearchArgs {
        query: query.map(str::to_owned),
        database: database.map(Utf8PathBuf::from),
        ..SearchArgs::default()
    };
    match SearchConfig::try_from(args) {
        Err(CliError::MissingArgument { field, env }) => {
            assert_eq!(field, expected_field);
            assert_eq!(env, expected_env);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn search_defaults_limit_and_leaves_filters_empty() {
    let config = SearchConfig::try_from(search_args()).expect("config should build");
    assert_eq!(config.limit, 20);
    assert!(config.filters.tags.is_empty());
    assert!(config.filters.geo_filter().is_none());
    assert!(config.output.is_none());
}

#[rstest]
fn search_builds_every_filter() {
    let args = SearchArgs {
        tag: vec!["bbq".to_owned(), "tex-mex".to_owned()],
        price_level: Some(2),
        lat: Some(30.2672),
        lng: Some(-97.7431),
        radius_km: Some(25.0),
        limit: Some(5),
        ..search_args()
    };
    let config = SearchConfig::try_from(args).expect("config should build");
    assert_eq!(config.filters.tags, vec!["bbq", "tex-mex"]);
    assert_eq!(config.filters.price_level, Some(2));
    assert_eq!(
        config.filters.geo_filter(),
        Some((Coord { x: -97.7431, y: 30.2672 }, 25.0))
    );
    assert_eq!(config.limit, 5);
}

#[rstest]
fn origin_without_radius_only_attaches_distances() {
    let args = SearchArgs {
        lat: Some(30.2672),
        lng: Some(-97.7431),
        ..search_args()
    };
    let config = SearchConfig::try_from(args).expect("config should build");
    assert!(config.filters.origin.is_some());
    assert!(config.filters.geo_filter().is_none());
}

#[rstest]
#[case::radius_without_origin(None, None, Some(10.0), ARG_LAT)]
#[case::latitude_only(Some(30.0), None, Some(10.0), ARG_LNG)]
#[case::longitude_only(None, Some(-97.0), None, ARG_LAT)]
fn search_rejects_incomplete_geo_filters(
    #[case] lat: Option<f64>,
    #[case] lng: Option<f64>,
    #[case] radius_km: Option<f64>,
    #[case] expected: &str,
) {
    let args = SearchArgs {
        lat,
        lng,
        radius_km,
        ..search_args()
    };
    match SearchConfig::try_from(args) {
        Err(CliError::IncompleteGeoFilter { missing }) => assert_eq!(missing, expected),
        other => panic!("expected IncompleteGeoFilter, found {other:?}"),
    }
}

#[rstest]
#[case::zero_limit(SearchArgs { limit: Some(0), ..search_args() })]
#[case::limit_above_max(SearchArgs { limit: Some(51), ..search_args() })]
fn search_rejects_out_of_range_limits(#[case] args: SearchArgs) {
    assert!(matches!(
        SearchConfig::try_from(args),
        Err(CliError::InvalidLimit { .. })
    ));
}

#[rstest]
fn search_rejects_unknown_price_levels() {
    let args = SearchArgs {
        price_level: Some(7),
        ..search_args()
    };
    assert!(matches!(
        SearchConfig::try_from(args),
        Err(CliError::InvalidPriceLevel { price_level: 7 })
    ));
}

#[rstest]
#[case::latitude(None, Some(-97.7), Some(5.0), ARG_LAT, ENV_NEARBY_LAT)]
#[case::longitude(Some(30.2), None, Some(5.0), ARG_LNG, ENV_NEARBY_LNG)]
#[case::radius(Some(30.2), Some(-97.7), None, ARG_RADIUS_KM, ENV_NEARBY_RADIUS_KM)]
fn nearby_requires_a_complete_origin_and_radius(
    #[case] lat: Option<f64>,
    #[case] lng: Option<f64>,
    #[case] radius_km: Option<f64>,
    #[case] expected_field: &str,
    #[case] expected_env: &str,
) {
    let args = NearbyArgs {
        database: Some(Utf8PathBuf::from("catalogue.db")),
        lat,
        lng,
        radius_km,
        ..NearbyArgs::default()
    };
    match NearbyConfig::try_from(args) {
        Err(CliError::MissingArgument { field, env }) => {
            assert_eq!(field, expected_field);
            assert_eq!(env, expected_env);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn parses_negative_coordinates_from_the_command_line() {
    let cli = Cli::try_parse_from([
        "mustorder",
        "nearby",
        "--database",
        "catalogue.db",
        "--lat",
        "30.2672",
        "--lng",
        "-97.7431",
        "--radius-km",
        "5",
    ])
    .expect("arguments should parse");
    let Command::Nearby(args) = cli.command else {
        panic!("expected nearby command");
    };
    let config = NearbyConfig::try_from(args).expect("config should build");
    assert_eq!(config.origin, Coord { x: -97.7431, y: 30.2672 });
}

#[rstest]
fn bare_isolate_flag_enables_isolation() {
    let cli = Cli::try_parse_from([
        "mustorder",
        "recompute",
        "--database",
        "catalogue.db",
        "--isolate-failures",
    ])
    .expect("arguments should parse");
    let Command::Recompute(args) = cli.command else {
        panic!("expected recompute command");
    };
    assert_eq!(args.isolate_failures, Some(true));
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "database": 42 }));

    let err = recompute_config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honour_cli_over_environment_over_file() {
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "database": "from-file.db",
            "limit": 5,
            "embedding_model": "from-file-model",
        }),
        None,
    );
    composer.push_environment(json!({
        "database": "from-env.db",
        "limit": 10,
    }));
    composer.push_cli(json!({
        "query": "brisket",
        "limit": 15,
    }));

    let config =
        search_config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.query, "brisket");
    assert_eq!(config.database, Utf8PathBuf::from("from-env.db"));
    assert_eq!(config.limit, 15);
    assert_eq!(config.embedding.provider.model, "from-file-model");
}

#[rstest]
fn merge_layers_supply_nearby_geometry_from_file() {
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "database": "catalogue.db",
            "lat": 30.2672,
            "lng": -97.7431,
            "radius_km": 50.0,
        }),
        None,
    );
    composer.push_cli(json!({ "limit": 2 }));

    let config =
        nearby_config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.origin, Coord { x: -97.7431, y: 30.2672 });
    assert_eq!(config.radius_km, 50.0);
    assert_eq!(config.limit, 2);
}
