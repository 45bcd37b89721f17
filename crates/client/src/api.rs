//! Feature-access endpoint client.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use orthodash_auth::PermissionEntry;

use crate::config::ClientConfig;
use crate::session::SessionStore;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("feature access request timed out")]
    Timeout,

    #[error("API error ({0}): {1}")]
    Api(u16, String),

    #[error("backend reported success=false")]
    Rejected,

    #[error("malformed feature access response: {0}")]
    Malformed(String),

    #[error("feature access list is empty")]
    Empty,
}

impl FetchError {
    /// Client errors (4xx) will not change on retry; everything else might.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::Api(status, _) if (400..500).contains(status))
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Wire shape of `GET <feature-access-endpoint>`.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureAccessResponse {
    pub success: bool,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl FeatureAccessResponse {
    /// `success: false` and a non-array `data` are both failures.
    pub fn into_entries(self) -> Result<Vec<PermissionEntry>, FetchError> {
        if !self.success {
            return Err(FetchError::Rejected);
        }
        if !self.data.is_array() {
            return Err(FetchError::Malformed("data is not an array".to_string()));
        }
        serde_json::from_value(self.data).map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

/// Where permission lists come from.
#[async_trait]
pub trait FeatureAccessSource: Send + Sync {
    async fn fetch_features(&self) -> Result<Vec<PermissionEntry>, FetchError>;
}

/// `reqwest`-backed source talking to the dashboard backend.
///
/// The bearer token is read from the session on every request, so a login
/// or logout after construction is picked up by the next fetch.
#[derive(Clone)]
pub struct HttpFeatureAccessClient {
    http: reqwest::Client,
    url: String,
    session: Arc<dyn SessionStore>,
}

impl core::fmt::Debug for HttpFeatureAccessClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HttpFeatureAccessClient")
            .field("url", &self.url)
            .field("authenticated", &self.session.is_authenticated())
            .finish()
    }
}

impl HttpFeatureAccessClient {
    pub fn new(config: &ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(FetchError::from_reqwest)?;

        Ok(Self {
            http,
            url: config.feature_access_url(),
            session,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeatureAccessSource for HttpFeatureAccessClient {
    async fn fetch_features(&self) -> Result<Vec<PermissionEntry>, FetchError> {
        let mut req = self.http.get(&self.url);

        if let Some(token) = self.session.token() {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(FetchError::from_reqwest)?;

        if !resp.status().is_success() {
            return Err(FetchError::Api(
                resp.status().as_u16(),
                resp.text().await.unwrap_or_default(),
            ));
        }

        let body: FeatureAccessResponse = resp
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        let entries = body.into_entries()?;
        tracing::debug!(url = %self.url, features = entries.len(), "fetched feature access");
        Ok(entries)
    }
}
