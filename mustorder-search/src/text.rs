//! Substring and tag search used when embeddings are unavailable.

use mustorder_core::{CatalogueStore, StoreError};

use crate::SearchResult;
use crate::filters::{Placement, SearchFilters};

/// Similarity reported for every text match.
pub const TEXT_MATCH_SIMILARITY: f64 = 1.0;

/// Find dishes whose name or description contains `query`, or that carry it
/// as a tag, in store order.
///
/// # Errors
/// Returns the store error when candidates cannot be loaded.
///
/// # Examples
/// ```
/// use mustorder_core::test_support::{MemoryStore, sample_catalogue};
/// use mustorder_search::{SearchFilters, text_search};
///
/// let store = MemoryStore::from(sample_catalogue());
/// let results = text_search(&store, "taco", &SearchFilters::default(), 20)?;
/// let names: Vec<_> = results.iter().map(|r| r.dish.name.as_str()).collect();
/// assert_eq!(names, ["Smoked Brisket Taco", "Migas Taco"]);
/// # Ok::<(), mustorder_core::StoreError>(())
/// ```
pub fn text_search<S>(
    store: &S,
    query: &str,
    filters: &SearchFilters,
    limit: usize,
) -> Result<Vec<SearchResult>, StoreError>
where
    S: CatalogueStore + ?Sized,
{
    let matches = store.find_dishes(&filters.dish_query().with_text(query))?;
    let results = matches
        .into_iter()
        .filter_map(|candidate| match filters.place(&candidate.restaurant) {
            Placement::Included(distance_km) => Some(SearchResult {
                dish: candidate.dish,
                restaurant: candidate.restaurant,
                similarity: TEXT_MATCH_SIMILARITY,
                distance_km,
            }),
            Placement::Excluded => None,
        })
        .take(limit)
        .collect();
    Ok(results)
}
