//! Embedding provider settings shared by `search` and `embed`.

use std::time::Duration;

use mustorder_core::EmbeddingProvider;
use mustorder_data::{HttpEmbeddingProvider, HttpEmbeddingProviderConfig};

use crate::CliError;

/// Provider settings after configuration merging.
#[derive(Debug, Clone)]
pub(crate) struct EmbeddingSettings {
    pub(crate) provider: HttpEmbeddingProviderConfig,
}

impl EmbeddingSettings {
    /// Overlay the supplied values on the provider defaults.
    pub(crate) fn resolve(
        base_url: Option<String>,
        model: Option<String>,
        api_key: Option<String>,
        timeout_secs: Option<u64>,
    ) -> Self {
        let mut provider = HttpEmbeddingProviderConfig::default();
        if let Some(url) = base_url {
            provider.base_url = url;
        }
        if let Some(name) = model {
            provider.model = name;
        }
        provider.api_key = api_key.filter(|key| !key.trim().is_empty());
        if let Some(secs) = timeout_secs {
            provider.timeout = Duration::from_secs(secs);
        }
        Self { provider }
    }
}

/// Builds the embedding provider for the current invocation.
pub(crate) trait EmbeddingProviderBuilder {
    fn build(&self, settings: &EmbeddingSettings)
    -> Result<Box<dyn EmbeddingProvider>, CliError>;
}

/// Builds an [`HttpEmbeddingProvider`] from the merged settings.
pub(crate) struct HttpEmbeddingProviderBuilder;

impl EmbeddingProviderBuilder for HttpEmbeddingProviderBuilder {
    fn build(
        &self,
        settings: &EmbeddingSettings,
    ) -> Result<Box<dyn EmbeddingProvider>, CliError> {
        let provider =
            HttpEmbeddingProvider::with_config(settings.provider.clone()).map_err(|source| {
                CliError::BuildEmbeddingProvider {
                    base_url: settings.provider.base_url.clone(),
                    source,
                }
            })?;
        Ok(Box::new(provider))
    }
}
