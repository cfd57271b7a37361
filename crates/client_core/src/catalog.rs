use async_trait::async_trait;
use reqwest::Client;
use shared::{domain::Candidate, protocol::OmdbSearchResponse};
use tracing::debug;
use url::Url;

use crate::{error::CatalogError, transport::normalize_base_url};

pub const OMDB_BASE_URL: &str = "http://www.omdbapi.com/";

/// Title lookup against an external movie catalog.
///
/// An empty vector means the catalog answered but had no matches; errors are
/// reserved for transport or upstream failures.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, CatalogError>;
}

pub struct OmdbCatalog {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl OmdbCatalog {
    pub fn new(api_key: impl Into<String>) -> Result<Self, CatalogError> {
        Self::with_base_url(OMDB_BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: &str, api_key: impl Into<String>) -> Result<Self, CatalogError> {
        Ok(Self {
            http: Client::new(),
            base_url: normalize_base_url(base_url)?,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl CatalogService for OmdbCatalog {
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, CatalogError> {
        let response = self
            .http
            .get(self.base_url.clone())
            .query(&[("apikey", self.api_key.as_str()), ("s", query)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        let body: OmdbSearchResponse = response.json().await?;
        if body.is_success() {
            let candidates: Vec<Candidate> = body
                .search
                .unwrap_or_default()
                .into_iter()
                .map(Candidate::from)
                .collect();
            debug!(
                query,
                matches = candidates.len(),
                total = body.total_results.as_deref().unwrap_or("?"),
                "catalog search completed"
            );
            return Ok(candidates);
        }
        if body.is_not_found() {
            debug!(query, "catalog search found nothing");
            return Ok(Vec::new());
        }

        Err(CatalogError::Upstream(
            body.error
                .unwrap_or_else(|| "catalog reported failure without a reason".to_string()),
        ))
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
