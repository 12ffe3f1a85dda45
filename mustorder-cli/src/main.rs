//! Entry point for the `mustorder` binary.
#![forbid(unsafe_code)]

use mustorder_cli::CliError;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info";

fn main() {
    init_logging();
    if let Err(err) = mustorder_cli::run() {
        if let CliError::ArgumentParsing(parse_err) = &err {
            parse_err.exit();
        }
        eprintln!("mustorder: {err}");
        std::process::exit(1);
    }
}

/// Route `log` records and spans to stderr, filtered by `RUST_LOG`.
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("mustorder: logging disabled: {err}");
    }
}
