//! Cosine similarity between embedding vectors.

use thiserror::Error;

/// Errors from [`cosine_similarity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimilarityError {
    /// The vectors have different lengths.
    #[error("cannot compare vectors of length {left} and {right}")]
    DimensionMismatch {
        /// Length of the first vector.
        left: usize,
        /// Length of the second vector.
        right: usize,
    },
}

/// Cosine of the angle between `a` and `b`, accumulated in `f64`.
///
/// The result lies in `-1.0..=1.0` for non-zero inputs. A zero-magnitude
/// vector yields `NaN`; callers drop such candidates.
///
/// # Examples
/// ```
/// use mustorder_core::{SimilarityError, cosine_similarity};
///
/// assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0])?, 1.0);
/// assert!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]).is_err());
/// # Ok::<(), SimilarityError>(())
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0_f64, 0.0_f64, 0.0_f64),
        |(dot, norm_a, norm_b), (&x, &y)| {
            let (x, y) = (f64::from(x), f64::from(y));
            (dot + x * y, norm_a + x * x, norm_b + y * y)
        },
    );

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
