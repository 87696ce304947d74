use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::catalog::{CatalogSource, PageResponse, PokemonResponse};
use crate::error::{Error, Result};

/// Catalog source backed by the PokeAPI REST service
///
/// Endpoints:
/// ```text
/// GET {base_url}/pokemon?limit={limit}&offset={offset}
/// GET {base_url}/pokemon/{id}
/// ```
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::network("Failed to build HTTP client", e))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn list_url(&self) -> String {
        format!("{}/pokemon", self.base_url)
    }

    fn pokemon_url(&self, id: u32) -> String {
        format!("{}/pokemon/{}", self.base_url, id)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn list_page(&self, limit: u32, offset: u32) -> Result<PageResponse> {
        let url = self.list_url();
        debug!("GET {} limit={} offset={}", url, limit, offset);

        self.client
            .get(&url)
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::network("Failed to load catalog page", e))?
            .json()
            .await
            .map_err(|e| Error::network("Failed to load catalog page", e))
    }

    async fn pokemon(&self, id: u32) -> Result<PokemonResponse> {
        let url = self.pokemon_url(id);
        debug!("GET {}", url);

        self.client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::network(format!("Failed to load #{}", id), e))?
            .json()
            .await
            .map_err(|e| Error::network(format!("Failed to load #{}", id), e))
    }
}
