//! Embedding-based search over dishes that already carry an embedding.

use log::debug;
use mustorder_core::{CatalogueStore, EmbeddingProvider, cosine_similarity};

use crate::error::SemanticSearchError;
use crate::filters::{Placement, SearchFilters};
use crate::ordering::rank;
use crate::{LOG_TARGET, SearchResult};

/// Rank dishes by cosine similarity between their embedding and `query`'s.
///
/// The query is lowercased before it is embedded. Candidates with an empty
/// embedding, or whose similarity is undefined (a zero-magnitude vector),
/// are skipped; non-empty embeddings of a different dimension abort the
/// search.
///
/// # Errors
/// Returns [`SemanticSearchError::Provider`] when the query cannot be
/// embedded, [`SemanticSearchError::Store`] when candidates cannot be loaded,
/// and [`SemanticSearchError::Similarity`] on a dimension mismatch.
///
/// # Examples
/// ```
/// use mustorder_core::test_support::{MemoryStore, StubEmbeddingProvider, sample_catalogue};
/// use mustorder_search::{SearchFilters, semantic_search};
///
/// let store = MemoryStore::from(sample_catalogue());
/// let provider = StubEmbeddingProvider::default().with_vector("brisket", vec![1.0, 0.0, 0.0]);
/// let results = semantic_search(&store, &provider, "Brisket", &SearchFilters::default(), 3)?;
/// assert_eq!(results.len(), 3);
/// assert_eq!(results.first().map(|r| r.dish.name.as_str()), Some("Brisket"));
/// # Ok::<(), mustorder_search::SemanticSearchError>(())
/// ```
pub fn semantic_search<S, P>(
    store: &S,
    provider: &P,
    query: &str,
    filters: &SearchFilters,
    limit: usize,
) -> Result<Vec<SearchResult>, SemanticSearchError>
where
    S: CatalogueStore + ?Sized,
    P: EmbeddingProvider + ?Sized,
{
    let query_embedding = provider
        .embed(&query.to_lowercase())
        .map_err(SemanticSearchError::Provider)?;
    let candidates = store
        .find_dishes(&filters.dish_query().requiring_embedding())
        .map_err(SemanticSearchError::Store)?;
    debug!(target: LOG_TARGET, "comparing {} candidates", candidates.len());

    let mut results = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let Some(embedding) = candidate
            .dish
            .embedding
            .as_deref()
            .filter(|embedding| !embedding.is_empty())
        else {
            continue;
        };
        let similarity = cosine_similarity(&query_embedding, embedding).map_err(|source| {
            SemanticSearchError::Similarity {
                dish: candidate.dish.id,
                source,
            }
        })?;
        if similarity.is_nan() {
            continue;
        }
        let Placement::Included(distance_km) = filters.place(&candidate.restaurant) else {
            continue;
        };
        results.push(SearchResult {
            dish: candidate.dish,
            restaurant: candidate.restaurant,
            similarity,
            distance_km,
        });
    }

    let mut ranked = rank(results);
    ranked.truncate(limit);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use mustorder_core::test_support::{MemoryStore, StubEmbeddingProvider, sample_catalogue};
    use mustorder_core::{Dish, DishId, EmbeddingError, RestaurantId, SimilarityError};
    use rstest::{fixture, rstest};

    const DOWNTOWN_AUSTIN: Coord<f64> = Coord {
        x: -97.7431,
        y: 30.2672,
    };

    #[fixture]
    fn store() -> MemoryStore {
        MemoryStore::from(sample_catalogue())
    }

    #[fixture]
    fn provider() -> StubEmbeddingProvider {
        StubEmbeddingProvider::default().with_vector("brisket", vec![1.0, 0.0, 0.0])
    }

    fn ids(results: &[SearchResult]) -> Vec<u64> {
        results.iter().map(|r| r.dish.id.0).collect()
    }

    #[rstest]
    fn ranks_every_embedded_dish(store: MemoryStore, provider: StubEmbeddingProvider) {
        let results = semantic_search(&store, &provider, "BRISKET", &SearchFilters::default(), 50)
            .expect("search should succeed");
        // The top four are within the tie band of each other and keep store
        // order. Jalapeno Sausage (31) has no embedding.
        assert_eq!(ids(&results), vec![10, 20, 30, 40, 11, 21]);
        assert!(results.windows(2).all(|pair| match pair {
            [a, b] => a.similarity + 0.01 >= b.similarity,
            _ => true,
        }));
    }

    #[rstest]
    fn applies_tag_and_price_filters(store: MemoryStore, provider: StubEmbeddingProvider) {
        let filters = SearchFilters::default()
            .with_tags(["BBQ"])
            .with_price_level(2);
        let results = semantic_search(&store, &provider, "brisket", &filters, 50)
            .expect("search should succeed");
        assert_eq!(ids(&results), vec![20, 30, 40]);
    }

    #[rstest]
    fn geo_filter_excludes_distant_and_unlocated(
        store: MemoryStore,
        provider: StubEmbeddingProvider,
    ) {
        let filters = SearchFilters::default().near(DOWNTOWN_AUSTIN, 25.0);
        let results = semantic_search(&store, &provider, "brisket", &filters, 50)
            .expect("search should succeed");
        assert_eq!(ids(&results), vec![10, 20, 11, 21]);
        assert!(
            results
                .iter()
                .all(|r| r.distance_km.is_some_and(|km| km <= 25.0))
        );
    }

    #[rstest]
    fn truncates_to_limit(store: MemoryStore, provider: StubEmbeddingProvider) {
        let results = semantic_search(&store, &provider, "brisket", &SearchFilters::default(), 2)
            .expect("search should succeed");
        assert_eq!(ids(&results), vec![10, 20]);
    }

    #[rstest]
    fn provider_failure_is_reported(store: MemoryStore) {
        let provider = StubEmbeddingProvider::default().with_error(EmbeddingError::Network {
            message: "connection refused".to_owned(),
        });
        let err = semantic_search(&store, &provider, "brisket", &SearchFilters::default(), 5)
            .expect_err("search should fail");
        assert!(matches!(err, SemanticSearchError::Provider(_)));
    }

    #[rstest]
    fn dimension_mismatch_is_surfaced(store: MemoryStore) {
        let provider = StubEmbeddingProvider::default().with_vector("brisket", vec![1.0, 0.0]);
        let err = semantic_search(&store, &provider, "brisket", &SearchFilters::default(), 5)
            .expect_err("search should fail");
        assert!(matches!(
            err,
            SemanticSearchError::Similarity {
                dish: DishId(10),
                source: SimilarityError::DimensionMismatch { left: 2, right: 3 },
            }
        ));
    }

    #[rstest]
    fn zero_vectors_are_skipped(provider: StubEmbeddingProvider) {
        let mut catalogue = sample_catalogue();
        catalogue.dishes.push(
            Dish::new(DishId(99), RestaurantId(1), "Blank").with_embedding(vec![0.0, 0.0, 0.0]),
        );
        let store = MemoryStore::from(catalogue);
        let results = semantic_search(&store, &provider, "brisket", &SearchFilters::default(), 50)
            .expect("search should succeed");
        assert!(results.iter().all(|r| r.dish.id != DishId(99)));
    }

    #[rstest]
    fn empty_embeddings_are_skipped(provider: StubEmbeddingProvider) {
        let mut catalogue = sample_catalogue();
        catalogue
            .dishes
            .push(Dish::new(DishId(98), RestaurantId(1), "Blank").with_embedding(vec![]));
        let store = MemoryStore::from(catalogue);
        let results = semantic_search(&store, &provider, "brisket", &SearchFilters::default(), 50)
            .expect("an empty embedding should not fail the search");
        assert_eq!(ids(&results), vec![10, 20, 30, 40, 11, 21]);
    }
}
