use std::time::Duration;

use thiserror::Error;

/// Errors from [`crate::EmbeddingProvider::embed`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbeddingError {
    /// No text was supplied.
    #[error("cannot embed empty text")]
    EmptyInput,
    /// The provider could not be reached.
    #[error("embedding service unreachable: {message}")]
    Network {
        /// Description of the transport failure.
        message: String,
    },
    /// The provider did not answer within the configured timeout.
    #[error("embedding request timed out after {timeout:?}")]
    Timeout {
        /// Timeout that elapsed.
        timeout: Duration,
    },
    /// The provider answered with a non-success status.
    #[error("embedding service returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },
    /// The provider answered with an unreadable payload.
    #[error("failed to parse embedding response: {message}")]
    Parse {
        /// Decoder error message.
        message: String,
    },
    /// The provider answered successfully but without a vector.
    #[error("embedding service returned no vector")]
    EmptyEmbedding,
}
