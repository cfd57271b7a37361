//! HTTP plumbing shared by the list store and session clients.

use std::sync::Arc;

use reqwest::{cookie::Jar, Client, Response};
use shared::error::ApiException;
use tracing::debug;
use url::Url;

use crate::error::StoreError;

/// Cookie name the list service uses for its signed session.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Cookie-carrying client bound to the list service base URL.
#[derive(Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: Url,
}

impl ServiceClient {
    pub fn new(base_url: &str, session_cookie: Option<&str>) -> Result<Self, StoreError> {
        let base_url = normalize_base_url(base_url)?;
        let jar = Arc::new(Jar::default());
        if let Some(cookie) = session_cookie.map(str::trim).filter(|c| !c.is_empty()) {
            let cookie = if cookie.contains('=') {
                cookie.to_string()
            } else {
                format!("{SESSION_COOKIE_NAME}={cookie}")
            };
            jar.add_cookie_str(&cookie, &base_url);
            debug!(base_url = %base_url, "seeded list service session cookie");
        }
        let http = Client::builder().cookie_provider(jar).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
}

/// Parses a base URL and makes sure relative joins append instead of replacing
/// the last path segment.
pub fn normalize_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

pub(crate) async fn expect_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiException::from_body(status.as_u16(), &body).into())
}
