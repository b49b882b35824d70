//! Wise (TransferWise) REST API client.
//!
//! API docs: https://docs.wise.com/api-docs/api-reference
//! Hosts: `api.transferwise.com` (production), `api.sandbox.transferwise.tech`
//! Auth: static `Authorization: Bearer {token}` on every request.
//!
//! Responses are decoded straight into the typed records in `types`.
//! Any status other than 200 is an error.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::TransferProvider;
use crate::config::Environment;
use crate::types::{
    CreateQuoteRequest, CreateTransferRequest, LiveRate, Quote, Transfer, TransferQuery,
    WiselyError, WiselyResult,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const TRANSFERS_PATH: &str = "v1/transfers";
const QUOTES_PATH: &str = "v2/quotes";
const RATES_PATH: &str = "v1/rates";
const CANCEL_TRANSFER_PATH: &str = "v1/transfers/{transferId}/cancel";

const USER_AGENT: &str = "Transferwisely/0.1.0";

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTPS gateway to the Wise API.
pub struct WiseClient {
    http: Client,
    /// Always ends with `/`.
    base_url: String,
    api_token: SecretString,
}

impl WiseClient {
    /// Create a client for the given deployment.
    pub fn new(
        environment: Environment,
        api_token: SecretString,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        Self::with_base_url(environment.base_url(), api_token, timeout)
    }

    /// Create a client against an explicit base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_token: SecretString,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for Wise")?;

        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            http,
            base_url,
            api_token,
        })
    }

    /// Absolute URL for an API path such as `v1/transfers`.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Path of the cancel endpoint for one transfer.
    pub fn cancel_path(transfer_id: u64) -> String {
        CANCEL_TRANSFER_PATH.replace("{transferId}", &transfer_id.to_string())
    }

    // -- Internal helpers ------------------------------------------------

    /// Start an authenticated JSON request.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.endpoint_url(path))
            .bearer_auth(self.api_token.expose_secret())
            .header(CONTENT_TYPE, "application/json")
    }

    /// Send a request and require HTTP 200.
    async fn send(&self, endpoint: &str, request: RequestBuilder) -> WiselyResult<Response> {
        debug!(endpoint, "Wise API request");

        let resp = request.send().await.map_err(|e| WiselyError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        if resp.status() != StatusCode::OK {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(WiselyError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp)
    }

    /// Send a request and decode the 200 body into `T`.
    async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> WiselyResult<T> {
        let resp = self.send(endpoint, request).await?;
        let bytes = resp.bytes().await.map_err(|e| WiselyError::Transport {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        serde_json::from_slice(&bytes).map_err(|e| WiselyError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// TransferProvider trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl TransferProvider for WiseClient {
    async fn list_transfers(&self, query: &TransferQuery) -> WiselyResult<Vec<Transfer>> {
        let request = self.request(Method::GET, TRANSFERS_PATH).query(&[
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
            ("status", query.status.clone()),
        ]);
        self.call("GET v1/transfers", request).await
    }

    async fn live_rates(&self, source: &str, target: &str) -> WiselyResult<Vec<LiveRate>> {
        let request = self
            .request(Method::GET, RATES_PATH)
            .query(&[("source", source), ("target", target)]);
        self.call("GET v1/rates", request).await
    }

    async fn create_quote(&self, request: &CreateQuoteRequest) -> WiselyResult<Quote> {
        let request = self.request(Method::POST, QUOTES_PATH).json(request);
        self.call("POST v2/quotes", request).await
    }

    async fn quote(&self, quote_id: &str) -> WiselyResult<Quote> {
        let path = format!("{QUOTES_PATH}/{quote_id}");
        let request = self.request(Method::GET, &path);
        self.call("GET v2/quotes/{id}", request).await
    }

    async fn create_transfer(&self, request: &CreateTransferRequest) -> WiselyResult<Transfer> {
        let request = self.request(Method::POST, TRANSFERS_PATH).json(request);
        self.call("POST v1/transfers", request).await
    }

    async fn cancel_transfer(&self, transfer_id: u64) -> WiselyResult<()> {
        let request = self.request(Method::PUT, &Self::cancel_path(transfer_id));
        self.send("PUT v1/transfers/{id}/cancel", request).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
