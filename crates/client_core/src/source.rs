use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{IdeasResponse, ListState},
    error::ErrorBody,
    protocol::gateway_query,
};
use tracing::debug;
use url::Url;

use crate::error::FetchError;

/// Where pages of ideas come from.
#[async_trait]
pub trait IdeasSource: Send + Sync {
    async fn fetch_page(&self, state: &ListState) -> Result<IdeasResponse, FetchError>;
}

/// Loads pages through the same-origin gateway endpoint.
pub struct GatewaySource {
    http: Client,
    gateway_url: Url,
}

impl GatewaySource {
    pub fn new(gateway_url: Url) -> Self {
        Self {
            http: Client::new(),
            gateway_url,
        }
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let gateway_url =
            Url::parse(raw.trim()).with_context(|| format!("invalid gateway url '{raw}'"))?;
        Ok(Self::new(gateway_url))
    }

    pub fn request_url(&self, state: &ListState) -> Url {
        let mut url = self.gateway_url.clone();
        url.set_query(Some(&gateway_query(state)));
        url
    }
}

#[async_trait]
impl IdeasSource for GatewaySource {
    async fn fetch_page(&self, state: &ListState) -> Result<IdeasResponse, FetchError> {
        let url = self.request_url(state);
        debug!(%url, "requesting ideas page");

        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|envelope| envelope.error)
                .unwrap_or_else(|_| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string()
                });
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}
