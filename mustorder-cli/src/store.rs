//! Opening the SQLite catalogue named on the command line.

use camino::Utf8Path;
use mustorder_core::SqliteStore;

use crate::{CliError, fs::file_is_file};

/// Fail unless `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Open an existing database. Opening never creates a new file.
pub(crate) fn open_store(path: &Utf8Path, field: &'static str) -> Result<SqliteStore, CliError> {
    require_existing(path, field)?;
    Ok(SqliteStore::open(path.as_std_path())?)
}
