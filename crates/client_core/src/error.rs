use shared::error::{ApiException, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("catalog answered with HTTP {status}")]
    Status { status: u16 },
    #[error("catalog rejected the search: {0}")]
    Upstream(String),
    #[error("invalid catalog url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("list service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("not signed in to the list service")]
    Unauthorized,
    #[error("movie not found")]
    NotFound,
    #[error("list service error: {0}")]
    Api(ApiException),
    #[error("invalid list service response: {0}")]
    InvalidResponse(String),
    #[error("invalid service url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid request: {0}")]
    Validation(String),
}

impl From<ApiException> for StoreError {
    fn from(value: ApiException) -> Self {
        match value.code {
            ErrorCode::Unauthorized => Self::Unauthorized,
            ErrorCode::NotFound => Self::NotFound,
            _ => Self::Api(value),
        }
    }
}

impl StoreError {
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
