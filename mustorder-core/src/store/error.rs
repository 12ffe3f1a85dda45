use std::error::Error as StdError;

use thiserror::Error;

/// Boxed backend failure carried by [`StoreError::Backend`].
pub type BackendError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors raised by the store traits.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying storage engine failed.
    #[error("store operation `{operation}` failed: {source}")]
    Backend {
        /// Name of the store operation that failed.
        operation: &'static str,
        /// Error reported by the storage engine.
        #[source]
        source: BackendError,
    },
    /// A write targeted an entity the store does not hold.
    #[error("{entity} not found")]
    NotFound {
        /// Human-readable entity reference, e.g. `dish 7`.
        entity: String,
    },
    /// A persisted value could not be decoded.
    #[error("corrupt {field} for {entity}: {message}")]
    Corrupt {
        /// Human-readable entity reference.
        entity: String,
        /// Column or field that failed to decode.
        field: &'static str,
        /// Decoder message.
        message: String,
    },
}

impl StoreError {
    /// Wrap a backend error raised by `operation`.
    pub fn backend<E>(operation: &'static str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Backend {
            operation,
            source: Box::new(source),
        }
    }

    /// Build a [`StoreError::NotFound`] for any displayable identifier.
    pub fn not_found(entity: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
        }
    }
}
