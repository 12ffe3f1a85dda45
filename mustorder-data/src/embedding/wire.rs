//! Request and response bodies of the `/embeddings` endpoint.
//!
//! The shapes follow the OpenAI embeddings API, which most hosted and
//! self-hosted embedding services also accept.

use serde::{Deserialize, Serialize};

/// Body posted to `{base_url}/embeddings`.
#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    /// Model identifier, e.g. `text-embedding-ada-002`.
    pub model: &'a str,
    /// Text to embed.
    pub input: &'a str,
}

/// Successful response body.
#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    /// One entry per input; a single-input request yields one.
    #[serde(default)]
    pub data: Vec<EmbeddingData>,
}

/// A single embedding in [`EmbeddingResponse::data`].
#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    /// The vector.
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl EmbeddingResponse {
    /// The first non-empty vector, if any.
    pub fn into_vector(self) -> Option<Vec<f32>> {
        self.data
            .into_iter()
            .next()
            .map(|entry| entry.embedding)
            .filter(|vector| !vector.is_empty())
    }
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error details.
    pub error: ErrorDetail,
}

/// Details inside [`ErrorResponse`].
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable message.
    pub message: String,
}

/// Best description of a failed response: the API's error message when the
/// body carries one, otherwise the raw body.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map_or_else(|_| body.trim().to_owned(), |parsed| parsed.error.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn serialises_request() {
        let body = serde_json::to_value(EmbeddingRequest {
            model: "text-embedding-ada-002",
            input: "brisket bbq",
        })
        .expect("should serialise");
        assert_eq!(
            body,
            serde_json::json!({"model": "text-embedding-ada-002", "input": "brisket bbq"})
        );
    }

    #[rstest]
    fn deserialise_success_response() {
        let json = r#"{
            "object": "list",
            "data": [{"object": "embedding", "index": 0, "embedding": [0.25, -0.5, 1.0]}],
            "model": "text-embedding-ada-002"
        }"#;
        let response: EmbeddingResponse = serde_json::from_str(json).expect("should deserialise");
        assert_eq!(response.into_vector(), Some(vec![0.25, -0.5, 1.0]));
    }

    #[rstest]
    #[case(r#"{"data": []}"#)]
    #[case(r#"{"data": [{"embedding": []}]}"#)]
    #[case(r#"{}"#)]
    fn missing_vectors_yield_none(#[case] json: &str) {
        let response: EmbeddingResponse = serde_json::from_str(json).expect("should deserialise");
        assert_eq!(response.into_vector(), None);
    }

    #[rstest]
    #[case(r#"{"error": {"message": "Rate limit reached", "type": "requests"}}"#, "Rate limit reached")]
    #[case("  upstream unavailable \n", "upstream unavailable")]
    fn extracts_error_message(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(error_message(body), expected);
    }
}
