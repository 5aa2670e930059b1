use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::debug;

use super::model::{LocalityQuery, LocalityRecord, Page};
use crate::config::DirectoryConfig;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("address directory unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("address directory answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("address directory returned an unreadable payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Lookup backend so the controller can be exercised without the network.
#[async_trait]
pub trait AddressDirectory: Send + Sync {
    async fn search(
        &self,
        query: &LocalityQuery,
        page: Page,
    ) -> Result<Vec<LocalityRecord>, DirectoryError>;
}

#[async_trait]
impl<T> AddressDirectory for Arc<T>
where
    T: AddressDirectory + ?Sized,
{
    async fn search(
        &self,
        query: &LocalityQuery,
        page: Page,
    ) -> Result<Vec<LocalityRecord>, DirectoryError> {
        (**self).search(query, page).await
    }
}

/// HTTP client for the OpenPLZ `Localities` endpoint.
#[derive(Debug, Clone)]
pub struct OpenPlzClient {
    http: Client,
    endpoint: String,
}

impl OpenPlzClient {
    pub fn new(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        let http = Client::builder().build()?;
        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: Client, config: &DirectoryConfig) -> Self {
        Self {
            http,
            endpoint: format!("{}/Localities", config.base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AddressDirectory for OpenPlzClient {
    async fn search(
        &self,
        query: &LocalityQuery,
        page: Page,
    ) -> Result<Vec<LocalityRecord>, DirectoryError> {
        let (key, value) = query.parameter();
        debug!(%query, %page, "querying address directory");

        let response = self
            .http
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .query(&[(key, value.to_string()), ("page", page.get().to_string())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
