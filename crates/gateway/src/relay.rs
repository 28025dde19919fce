use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use reqwest::Client;
use shared::error::ErrorBody;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::AppState;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream responded with status {0}")]
    UpstreamStatus(reqwest::StatusCode),
    #[error("upstream body is not valid json: {0}")]
    InvalidBody(#[source] serde_json::Error),
}

/// Appends the inbound query text to the upstream base. Keys, order and
/// existing escapes are kept; bytes that may not appear raw in a query
/// (space, quotes, `<`, `>`) are percent-encoded on the way.
pub fn upstream_request_url(upstream: &Url, query: Option<&str>) -> Url {
    let mut url = upstream.clone();
    url.set_query(query.filter(|query| !query.is_empty()));
    url
}

pub async fn forward(
    http: &Client,
    upstream: &Url,
    query: Option<&str>,
) -> Result<Bytes, RelayError> {
    let url = upstream_request_url(upstream, query);
    debug!(%url, "relaying ideas request");

    let response = http
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(RelayError::UpstreamStatus(status));
    }

    let body = response.bytes().await?;
    serde_json::from_slice::<serde::de::IgnoredAny>(&body).map_err(RelayError::InvalidBody)?;
    Ok(body)
}

pub(crate) async fn relay_ideas(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Response {
    match forward(&state.http, &state.upstream_url, query.as_deref()).await {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(error) => {
            error!(%error, query = query.as_deref().unwrap_or_default(), "ideas relay failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::fetch_failed()),
            )
                .into_response()
        }
    }
}
