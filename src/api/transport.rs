//! @acp:module "Transport"
//! @acp:summary "Raw HTTP requests against the question bank server"
//! @acp:domain cli
//! @acp:layer io
//!
//! Raw request transport
//!
//! [`Transport`] is the seam between the typed clients and the network.
//! Statuses are never turned into errors here; interpreting them is the job
//! of [`super::outcome`].

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, TestbankError};

/// Status, content type and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    /// JSON response with the given status code
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            content_type: Some("application/json".to_string()),
            body: body.to_string().into_bytes(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn parse_json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// Sends requests to the question bank server.
///
/// Paths are endpoint paths from [`crate::config::Endpoints`]; the transport
/// owns the base URL.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn post_json(&self, path: &str, body: &Value) -> Result<RawResponse>;

    async fn post_form(&self, path: &str, fields: &[(&str, String)]) -> Result<RawResponse>;

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<RawResponse>;
}

/// HTTP transport backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(server_url).map_err(|e| TestbankError::InvalidUrl {
            url: server_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(TestbankError::InvalidUrl {
                url: server_url.to_string(),
                reason: "not a base URL".to_string(),
            });
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    /// Joins an endpoint path onto the base URL, keeping any base path prefix.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn finish(&self, path: &str, response: reqwest::Response) -> Result<RawResponse> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();
        debug!(path, status = status.as_u16(), bytes = body.len(), "response received");

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

impl Transport for HttpTransport {
    async fn post_json(&self, path: &str, body: &Value) -> Result<RawResponse> {
        debug!(path, "POST json");
        let response = self.http.post(self.url(path)).json(body).send().await?;
        self.finish(path, response).await
    }

    async fn post_form(&self, path: &str, fields: &[(&str, String)]) -> Result<RawResponse> {
        debug!(path, "POST form");
        let response = self.http.post(self.url(path)).form(fields).send().await?;
        self.finish(path, response).await
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<RawResponse> {
        debug!(path, "GET");
        let response = self.http.get(self.url(path)).query(query).send().await?;
        self.finish(path, response).await
    }
}
