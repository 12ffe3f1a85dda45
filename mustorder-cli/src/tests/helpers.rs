//! Test helpers: seeded catalogue databases and canned embedding providers.

use camino::Utf8PathBuf;
use mustorder_core::test_support::{StubEmbeddingProvider, sample_catalogue};
use mustorder_core::{EmbeddingError, EmbeddingProvider, SqliteStore};
use tempfile::TempDir;

use crate::CliError;
use crate::embedding::{EmbeddingProviderBuilder, EmbeddingSettings};

/// A temporary directory holding `catalogue.db`.
pub(super) struct CatalogueFiles {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) database: Utf8PathBuf,
}

impl CatalogueFiles {
    /// Paths only; no database is written.
    pub(super) fn empty() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root =
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        let database = root.join("catalogue.db");
        Self {
            _dir: dir,
            root,
            database,
        }
    }

    /// A database seeded with the sample catalogue.
    pub(super) fn seeded() -> Self {
        let files = Self::empty();
        files.seed();
        files
    }

    /// Write the sample catalogue into `catalogue.db`.
    pub(super) fn seed(&self) {
        let store = SqliteStore::open(self.database.as_std_path()).expect("create database");
        sample_catalogue()
            .seed_sqlite(&store)
            .expect("seed sample catalogue");
    }

    pub(super) fn open(&self) -> SqliteStore {
        SqliteStore::open(self.database.as_std_path()).expect("reopen database")
    }
}

/// Builds [`StubEmbeddingProvider`]s with a fixed behaviour.
#[derive(Debug, Clone, Default)]
pub(super) struct StubProviderBuilder {
    vectors: Vec<(String, Vec<f32>)>,
    default_vector: Option<Vec<f32>>,
    error: Option<EmbeddingError>,
}

impl StubProviderBuilder {
    /// A provider mapping "brisket" onto the brisket axis of the sample
    /// catalogue.
    pub(super) fn understands_brisket() -> Self {
        Self {
            vectors: vec![("brisket".to_owned(), vec![1.0, 0.0, 0.0])],
            ..Self::default()
        }
    }

    /// A provider embedding everything onto one vector.
    pub(super) fn constant(vector: Vec<f32>) -> Self {
        Self {
            default_vector: Some(vector),
            ..Self::default()
        }
    }

    /// A provider whose every call fails with `error`.
    pub(super) fn failing(error: EmbeddingError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

impl EmbeddingProviderBuilder for StubProviderBuilder {
    fn build(
        &self,
        _settings: &EmbeddingSettings,
    ) -> Result<Box<dyn EmbeddingProvider>, CliError> {
        let mut provider = StubEmbeddingProvider::default();
        for (text, vector) in &self.vectors {
            provider = provider.with_vector(text.clone(), vector.clone());
        }
        if let Some(vector) = &self.default_vector {
            provider = provider.with_default_vector(vector.clone());
        }
        if let Some(error) = &self.error {
            provider = provider.with_error(error.clone());
        }
        Ok(Box::new(provider))
    }
}

/// Parse command output as JSON.
pub(super) fn parse_output(stdout: &[u8]) -> serde_json::Value {
    let text = std::str::from_utf8(stdout).expect("stdout utf-8");
    serde_json::from_str(text).expect("output should be JSON")
}

/// Dish ids of a serialised search result list.
pub(super) fn result_dish_ids(output: &serde_json::Value) -> Vec<u64> {
    output
        .as_array()
        .expect("search output should be an array")
        .iter()
        .map(|result| result["dish"]["id"].as_u64().expect("dish id"))
        .collect()
}
