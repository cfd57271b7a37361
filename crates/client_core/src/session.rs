use async_trait::async_trait;
use tracing::info;
use url::Url;

use crate::{
    error::StoreError,
    transport::{expect_success, ServiceClient},
};

/// Where the front end should go after a session change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Login,
    Dashboard,
}

/// Redirect-based sign in. The provider behind `/login` is opaque to the client.
#[async_trait]
pub trait SessionService: Send + Sync {
    fn login_url(&self) -> Result<Url, StoreError>;
    async fn logout(&self) -> Result<Navigation, StoreError>;
}

pub struct HttpSession {
    client: ServiceClient,
}

impl HttpSession {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionService for HttpSession {
    fn login_url(&self) -> Result<Url, StoreError> {
        self.client.endpoint("login")
    }

    async fn logout(&self) -> Result<Navigation, StoreError> {
        let response = self
            .client
            .http()
            .post(self.client.endpoint("logout")?)
            .send()
            .await?;
        expect_success(response).await?;
        info!(base_url = %self.client.base_url(), "logged out");
        Ok(Navigation::Login)
    }
}
