use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::MetadataConfig;
use crate::types::errors::{ClientError, Result};
use crate::utils::gateway_url;

/// Display metadata behind a `metadataURI`. Every field is optional on the
/// wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    pub name: String,
    #[serde(alias = "bio")]
    pub description: String,
    #[serde(alias = "image")]
    pub image_url: String,
    pub features: Vec<String>,
}

/// Metadata plus whether it is the placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetadata {
    pub metadata: Metadata,
    pub fallback: bool,
}

#[derive(Debug, Clone)]
pub struct MetadataResolver {
    client: reqwest::Client,
    gateway: String,
    fallback_image: String,
}

impl MetadataResolver {
    pub fn new(config: &MetadataConfig) -> Result<Self> {
        Self::with_timeout(&config.gateway, &config.fallback_image, config.timeout())
    }

    pub fn with_timeout(gateway: &str, fallback_image: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("metadata http client: {e}")))?;
        Ok(Self {
            client,
            gateway: gateway.to_string(),
            fallback_image: fallback_image.to_string(),
        })
    }

    pub fn gateway(&self) -> &str {
        &self.gateway
    }

    pub fn placeholder(&self, name: &str) -> Metadata {
        Metadata {
            name: name.to_string(),
            description: String::new(),
            image_url: self.fallback_image.clone(),
            features: Vec::new(),
        }
    }

    pub async fn fetch(&self, uri: &str) -> Result<Metadata> {
        let unavailable = |message: String| ClientError::MetadataUnavailable {
            uri: uri.to_string(),
            message,
        };

        // Some registrations store the JSON document itself.
        if uri.trim_start().starts_with('{') {
            return serde_json::from_str(uri).map_err(|e| unavailable(e.to_string()));
        }
        if uri.trim().is_empty() {
            return Err(unavailable("empty URI".to_string()));
        }

        let url = gateway_url(uri, &self.gateway);
        debug!(%url, "fetching metadata");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable(e.to_string()))?;
        response
            .json::<Metadata>()
            .await
            .map_err(|e| unavailable(e.to_string()))
    }

    /// Never fails: on any error the placeholder named `fallback_name` is
    /// returned. Blank fields are filled from the placeholder too.
    pub async fn resolve(&self, uri: &str, fallback_name: &str) -> ResolvedMetadata {
        match self.fetch(uri).await {
            Ok(mut metadata) => {
                if metadata.name.trim().is_empty() {
                    metadata.name = fallback_name.to_string();
                }
                if metadata.image_url.trim().is_empty() {
                    metadata.image_url = self.fallback_image.clone();
                }
                ResolvedMetadata {
                    metadata,
                    fallback: false,
                }
            }
            Err(err) => {
                warn!(error = %err, fallback = fallback_name, "using placeholder metadata");
                ResolvedMetadata {
                    metadata: self.placeholder(fallback_name),
                    fallback: true,
                }
            }
        }
    }
}
