//! HTTP-backed `EmbeddingProvider`.
//!
//! [`EmbeddingProvider`] is synchronous so the search engine stays usable
//! from plain threads. This provider bridges to async `reqwest` calls by
//! blocking on a Tokio runtime it owns.

use std::thread;
use std::time::Duration;

use log::debug;
use mustorder_core::{EmbeddingError, EmbeddingProvider};
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::wire::{EmbeddingRequest, EmbeddingResponse, error_message};

const LOG_TARGET: &str = "mustorder::embedding";

/// Default user agent for embedding requests.
pub const DEFAULT_USER_AGENT: &str = "mustorder-embedding/0.1";

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default embedding model.
pub const DEFAULT_MODEL: &str = "text-embedding-ada-002";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors building an [`HttpEmbeddingProvider`].
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// The base URL is not an absolute URL.
    #[error("invalid embedding base URL `{url}`")]
    InvalidBaseUrl {
        /// Rejected URL.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// The base URL does not use `http` or `https`.
    #[error("embedding base URL `{url}` must use http or https, not `{scheme}`")]
    UnsupportedScheme {
        /// Rejected URL.
        url: String,
        /// Scheme found in the URL.
        scheme: String,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`HttpEmbeddingProvider`].
#[derive(Clone)]
pub struct HttpEmbeddingProviderConfig {
    /// API root; requests go to `{base_url}/embeddings`.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Bearer token, when the service requires one.
    pub api_key: Option<String>,
    /// Connect and request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl std::fmt::Debug for HttpEmbeddingProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbeddingProviderConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl Default for HttpEmbeddingProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpEmbeddingProviderConfig {
    /// Create a configuration for the service rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Authenticate with a bearer token.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Embedding provider calling an OpenAI-compatible `/embeddings` endpoint.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the provider blocks on its own current-thread
/// runtime. Inside a multi-threaded runtime it reuses that runtime's handle
/// through [`tokio::task::block_in_place`]. Inside a `current_thread`
/// runtime, where neither of those is allowed, the request runs on its own
/// runtime from a scoped worker thread; the caller's executor is blocked
/// until the request completes.
pub struct HttpEmbeddingProvider {
    client: Client,
    config: HttpEmbeddingProviderConfig,
    endpoint: Url,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbeddingProvider")
            .field("config", &self.config)
            .field("endpoint", &self.endpoint.as_str())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpEmbeddingProvider {
    /// Create a provider for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpEmbeddingProviderConfig::new(base_url))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn with_config(config: HttpEmbeddingProviderConfig) -> Result<Self, ProviderBuildError> {
        let endpoint = embeddings_url(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            endpoint,
            runtime,
        })
    }

    /// The configuration the provider was built with.
    #[must_use]
    pub const fn config(&self) -> &HttpEmbeddingProviderConfig {
        &self.config
    }

    /// The URL requests are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn embed_async(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let body = EmbeddingRequest {
            model: &self.config.model,
            input: text,
        };
        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;
        let status = response.status();
        let payload = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;

        if !status.is_success() {
            return Err(EmbeddingError::Http {
                status: status.as_u16(),
                message: error_message(&payload),
            });
        }
        parse_embedding(&payload)
    }

    /// Convert a reqwest error to an `EmbeddingError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error) -> EmbeddingError {
        if error.is_timeout() {
            return EmbeddingError::Timeout {
                timeout: self.config.timeout,
            };
        }
        if let Some(status) = error.status() {
            return EmbeddingError::Http {
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        if error.is_decode() {
            return EmbeddingError::Parse {
                message: error.to_string(),
            };
        }
        EmbeddingError::Network {
            message: error.to_string(),
        }
    }
}

impl EmbeddingProvider for HttpEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        debug!(target: LOG_TARGET, "embedding {} characters via {}", text.len(), self.endpoint);

        let future = self.embed_async(text);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            // `Runtime::block_on` panics on a thread already driving a runtime.
            Ok(_) => thread::scope(|scope| {
                scope
                    .spawn(|| self.runtime.block_on(future))
                    .join()
                    .unwrap_or_else(|_| {
                        Err(EmbeddingError::Network {
                            message: "embedding worker thread panicked".to_owned(),
                        })
                    })
            }),
            Err(_) => self.runtime.block_on(future),
        }
    }
}

fn embeddings_url(base_url: &str) -> Result<Url, ProviderBuildError> {
    let joined = format!("{}/embeddings", base_url.trim_end_matches('/'));
    let url = Url::parse(&joined).map_err(|source| ProviderBuildError::InvalidBaseUrl {
        url: base_url.to_owned(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ProviderBuildError::UnsupportedScheme {
            url: base_url.to_owned(),
            scheme: scheme.to_owned(),
        }),
    }
}

fn parse_embedding(payload: &str) -> Result<Vec<f32>, EmbeddingError> {
    let response: EmbeddingResponse =
        serde_json::from_str(payload).map_err(|err| EmbeddingError::Parse {
            message: err.to_string(),
        })?;
    response.into_vector().ok_or(EmbeddingError::EmptyEmbedding)
}
