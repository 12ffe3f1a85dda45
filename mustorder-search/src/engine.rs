//! Search dispatcher: semantic first, text when the provider is down.

use log::warn;
use mustorder_core::{CatalogueStore, EmbeddingProvider};

use crate::error::{SearchError, SemanticSearchError};
use crate::filters::SearchFilters;
use crate::semantic::semantic_search;
use crate::text::text_search;
use crate::{LOG_TARGET, SearchResult};

/// Searches a catalogue with an embedding provider.
///
/// # Examples
/// ```
/// use mustorder_core::EmbeddingError;
/// use mustorder_core::test_support::{MemoryStore, StubEmbeddingProvider, sample_catalogue};
/// use mustorder_search::{SearchEngine, SearchFilters};
///
/// let store = MemoryStore::from(sample_catalogue());
/// let offline = StubEmbeddingProvider::default().with_error(EmbeddingError::Timeout {
///     timeout: std::time::Duration::from_secs(5),
/// });
/// let engine = SearchEngine::new(&store, &offline);
/// let results = engine.search("taco", &SearchFilters::default(), 20)?;
/// assert!(results.iter().all(|r| r.similarity == 1.0));
/// # Ok::<(), mustorder_search::SearchError>(())
/// ```
#[derive(Debug)]
pub struct SearchEngine<'a, S: ?Sized, P: ?Sized> {
    store: &'a S,
    provider: &'a P,
}

impl<'a, S, P> SearchEngine<'a, S, P>
where
    S: CatalogueStore + ?Sized,
    P: EmbeddingProvider + ?Sized,
{
    /// Build an engine over `store` using `provider` for query embeddings.
    pub const fn new(store: &'a S, provider: &'a P) -> Self {
        Self { store, provider }
    }

    /// Run a semantic search, falling back to text search when the query
    /// cannot be embedded.
    ///
    /// # Errors
    /// Store failures and dimension mismatches are returned; provider
    /// failures are logged and never returned.
    pub fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        match semantic_search(self.store, self.provider, query, filters, limit) {
            Ok(results) => Ok(results),
            Err(SemanticSearchError::Provider(cause)) => {
                warn!(
                    target: LOG_TARGET,
                    "semantic search unavailable, falling back to text search: {cause}"
                );
                self.text(query, filters, limit)
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Run a text search directly.
    ///
    /// # Errors
    /// Returns [`SearchError::Text`] when the store cannot be read.
    pub fn text(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        text_search(self.store, query, filters, limit).map_err(SearchError::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mustorder_core::test_support::{MemoryStore, StubEmbeddingProvider, sample_catalogue};
    use mustorder_core::{Dish, DishId, EmbeddingError, RestaurantId};
    use rstest::{fixture, rstest};
    use std::time::Duration;

    #[fixture]
    fn store() -> MemoryStore {
        MemoryStore::from(sample_catalogue())
    }

    #[rstest]
    #[case(EmbeddingError::EmptyInput)]
    #[case(EmbeddingError::Network { message: "refused".to_owned() })]
    #[case(EmbeddingError::Timeout { timeout: Duration::from_secs(2) })]
    #[case(EmbeddingError::Http { status: 503, message: "busy".to_owned() })]
    #[case(EmbeddingError::Parse { message: "not json".to_owned() })]
    #[case(EmbeddingError::EmptyEmbedding)]
    fn provider_failures_fall_back_to_text(store: MemoryStore, #[case] error: EmbeddingError) {
        let provider = StubEmbeddingProvider::default().with_error(error);
        let engine = SearchEngine::new(&store, &provider);
        let filters = SearchFilters::default().with_price_level(2);

        let results = engine.search("bbq", &filters, 20).expect("fallback succeeds");
        let expected = engine.text("bbq", &filters, 20).expect("text succeeds");
        assert_eq!(results, expected);
        assert_eq!(provider.calls(), 1);
    }

    #[rstest]
    fn semantic_results_are_preferred(store: MemoryStore) {
        let provider = StubEmbeddingProvider::default().with_vector("migas", vec![0.0, 1.0, 0.0]);
        let engine = SearchEngine::new(&store, &provider);
        let results = engine
            .search("Migas", &SearchFilters::default(), 1)
            .expect("search succeeds");
        assert_eq!(results.first().map(|r| r.dish.id), Some(DishId(21)));
    }

    #[rstest]
    fn dimension_mismatch_is_not_masked(store: MemoryStore) {
        let provider = StubEmbeddingProvider::default().with_default_vector(vec![1.0]);
        let engine = SearchEngine::new(&store, &provider);
        let err = engine
            .search("brisket", &SearchFilters::default(), 5)
            .expect_err("mismatch surfaces");
        assert!(matches!(
            err,
            SearchError::Semantic(SemanticSearchError::Similarity { .. })
        ));
    }

    #[rstest]
    fn empty_stored_embedding_does_not_fail_the_search() {
        let mut catalogue = sample_catalogue();
        catalogue
            .dishes
            .push(Dish::new(DishId(98), RestaurantId(1), "Blank").with_embedding(vec![]));
        let store = MemoryStore::from(catalogue);
        let provider =
            StubEmbeddingProvider::default().with_vector("brisket", vec![1.0, 0.0, 0.0]);
        let results = SearchEngine::new(&store, &provider)
            .search("brisket", &SearchFilters::default(), 20)
            .expect("search succeeds");
        assert_eq!(results.first().map(|r| r.dish.id), Some(DishId(10)));
        assert!(results.iter().all(|r| r.dish.id != DishId(98)));
    }
}
