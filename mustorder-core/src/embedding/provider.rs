//! Embedding provider trait and the canonical dish embedding text.

use crate::Dish;

use super::error::EmbeddingError;

/// Produce an embedding vector for a piece of text.
///
/// Implementations must be thread-safe so a single provider can serve
/// concurrent searches. The call is synchronous; network-backed providers
/// bridge to their own runtime.
///
/// # Examples
///
/// ```rust
/// use mustorder_core::{EmbeddingError, EmbeddingProvider};
///
/// struct LengthProvider;
///
/// impl EmbeddingProvider for LengthProvider {
///     fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
///         if text.is_empty() {
///             return Err(EmbeddingError::EmptyInput);
///         }
///         Ok(vec![1.0, 0.0])
///     }
/// }
///
/// assert_eq!(LengthProvider.embed("brisket")?, vec![1.0, 0.0]);
/// # Ok::<(), EmbeddingError>(())
/// ```
pub trait EmbeddingProvider: Send + Sync {
    /// Return the embedding vector for `text`.
    ///
    /// Implementations must return `Err(EmbeddingError::EmptyInput)` when
    /// `text` is empty.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for &P {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<P> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }
}

/// Text embedded for a dish: its lowercased name followed by its tags.
///
/// # Examples
/// ```
/// use mustorder_core::{Dish, DishId, RestaurantId, dish_embedding_text};
///
/// let dish = Dish::new(DishId(1), RestaurantId(1), "Beef Rib").with_tags(["bbq", "smoked"]);
/// assert_eq!(dish_embedding_text(&dish), "beef rib bbq smoked");
/// ```
pub fn dish_embedding_text(dish: &Dish) -> String {
    let name = dish.name.to_lowercase();
    if dish.tags.is_empty() {
        name
    } else {
        format!("{name} {}", dish.tags.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubEmbeddingProvider;
    use crate::{DishId, RestaurantId};
    use rstest::rstest;

    #[rstest]
    fn stub_returns_configured_vector() {
        let provider = StubEmbeddingProvider::default().with_vector("brisket", vec![0.5, 0.5]);
        let vector = provider.embed("brisket").expect("configured vector");
        assert_eq!(vector, vec![0.5, 0.5]);
    }

    #[rstest]
    fn stub_rejects_empty_text() {
        let provider = StubEmbeddingProvider::default();
        let err = provider.embed("").expect_err("empty input should fail");
        assert_eq!(err, EmbeddingError::EmptyInput);
    }

    #[rstest]
    fn boxed_provider_delegates() {
        let provider: Box<dyn EmbeddingProvider> =
            Box::new(StubEmbeddingProvider::default().with_vector("taco", vec![1.0]));
        assert_eq!(provider.embed("taco").expect("delegated"), vec![1.0]);
    }

    #[rstest]
    #[case(&[], "queso")]
    #[case(&["tex-mex"], "queso tex-mex")]
    fn embedding_text_joins_tags(#[case] tags: &[&str], #[case] expected: &str) {
        let dish = Dish::new(DishId(1), RestaurantId(1), "Queso").with_tags(tags.iter().copied());
        assert_eq!(dish_embedding_text(&dish), expected);
    }
}
