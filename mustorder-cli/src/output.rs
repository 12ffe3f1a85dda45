//! JSON output for every subcommand.

use std::io::Write;

use camino::Utf8Path;
use serde::Serialize;

use crate::{CliError, fs::create_utf8_file};

/// Write `value` as pretty JSON to `path`, or to `stdout` when no path is set.
pub(crate) fn write_json<T: Serialize + ?Sized>(
    value: &T,
    path: Option<&Utf8Path>,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    match path {
        Some(path) => {
            let mut file = create_utf8_file(path).map_err(|source| CliError::CreateOutput {
                path: path.to_path_buf(),
                source,
            })?;
            write_payload(&mut file, &payload)
        }
        None => write_payload(stdout, &payload),
    }
}

fn write_payload(writer: &mut dyn Write, payload: &str) -> Result<(), CliError> {
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    writer.flush().map_err(CliError::WriteOutput)
}
