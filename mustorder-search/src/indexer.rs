//! Embedding backfill for dishes created without one.

use log::{debug, info};
use mustorder_core::{CacheStore, CatalogueStore, Dish, EmbeddingProvider, dish_embedding_text};

use crate::LOG_TARGET;
use crate::error::IndexerError;

/// Counts from a completed backfill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// Dishes that received an embedding.
    pub embedded: usize,
    /// Dishes that already had one.
    pub skipped: usize,
}

/// Embeds dishes lacking an embedding and persists the vectors.
///
/// # Examples
/// ```
/// use mustorder_core::CatalogueStore;
/// use mustorder_core::test_support::{MemoryStore, StubEmbeddingProvider, sample_catalogue};
/// use mustorder_search::EmbeddingIndexer;
///
/// let store = MemoryStore::from(sample_catalogue());
/// let provider = StubEmbeddingProvider::default().with_default_vector(vec![0.0, 0.0, 1.0]);
/// let report = EmbeddingIndexer::new(&store, &provider).backfill()?;
/// assert_eq!(report.embedded, 1);
/// # Ok::<(), mustorder_search::IndexerError>(())
/// ```
#[derive(Debug)]
pub struct EmbeddingIndexer<'a, S: ?Sized, P: ?Sized> {
    store: &'a S,
    provider: &'a P,
}

impl<'a, S, P> EmbeddingIndexer<'a, S, P>
where
    S: CatalogueStore + CacheStore + ?Sized,
    P: EmbeddingProvider + ?Sized,
{
    /// Build an indexer writing to `store`.
    pub const fn new(store: &'a S, provider: &'a P) -> Self {
        Self { store, provider }
    }

    /// Embed every dish without an embedding, in store order. An empty
    /// stored embedding counts as missing.
    ///
    /// Each dish is embedded from its lowercased name followed by its tags.
    /// Dishes persisted before a failure keep their embeddings.
    ///
    /// # Errors
    /// Returns [`IndexerError::Embed`] naming the first dish the provider
    /// rejects, or a store error while listing or persisting.
    pub fn backfill(&self) -> Result<BackfillReport, IndexerError> {
        let mut report = BackfillReport::default();
        for id in self.store.dish_ids().map_err(IndexerError::Listing)? {
            let dish = self.store.dish(id).map_err(IndexerError::Listing)?;
            let missing = |d: &Dish| d.embedding.as_ref().is_none_or(Vec::is_empty);
            let Some(dish) = dish.filter(missing) else {
                report.skipped += 1;
                continue;
            };
            let text = dish_embedding_text(&dish);
            debug!(target: LOG_TARGET, "embedding {id} from {text:?}");
            let embedding = self
                .provider
                .embed(&text)
                .map_err(|source| IndexerError::Embed { dish: id, source })?;
            self.store
                .write_dish_embedding(id, &embedding)
                .map_err(|source| IndexerError::Persist { dish: id, source })?;
            report.embedded += 1;
        }
        info!(
            target: LOG_TARGET,
            "embedding backfill finished: {} embedded, {} skipped",
            report.embedded,
            report.skipped
        );
        Ok(report)
    }
}
