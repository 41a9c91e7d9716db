//! HTTP client for the remote update catalog.
//!
//! The catalog exposes a small PHP-style API; the only endpoint this crate
//! needs is the one that resolves an update id + language + edition into a
//! file manifest.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::UpdateManifest;
use super::CatalogError;

/// Catalog client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.uupdump.net".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Update catalog API client.
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

/// The catalog wraps every payload in a `response` envelope; a missing
/// envelope means there is nothing to download for the request.
#[derive(Deserialize)]
struct ApiEnvelope {
    #[serde(default)]
    response: Option<UpdateManifest>,
}

impl CatalogClient {
    /// Creates a new catalog client.
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolves the file manifest for one update/language/edition.
    pub async fn resolve_manifest(
        &self,
        update_id: &str,
        lang: &str,
        edition: &str,
    ) -> Result<UpdateManifest, CatalogError> {
        let url = format!("{}/get.php", self.base_url);

        debug!(
            "resolving manifest: id={}, lang={}, edition={}",
            update_id, lang, edition
        );

        let response = self
            .client
            .get(&url)
            .query(&[("id", update_id), ("lang", lang), ("edition", edition)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: ApiEnvelope = response.json().await.map_err(|e| {
            CatalogError::ParseError(format!("Failed to parse manifest response: {}", e))
        })?;

        let manifest = envelope.response.ok_or(CatalogError::EmptyResponse)?;
        debug!(
            "resolved '{}' with {} files ({} downloadable)",
            manifest.update_name,
            manifest.files.len(),
            manifest.downloadable_count()
        );

        Ok(manifest)
    }
}
