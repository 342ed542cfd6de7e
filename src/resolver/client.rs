//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Connect and per-read timeouts (no cap on total transfer time, so
//!   large source archives can stream for as long as data keeps arriving)
//! - Configurable User-Agent
//! - GitHub API headers and optional token authentication
//! - Status classification (non-2xx responses become errors)
//!
//! Requests are never retried; the first failure is returned to the caller.

use crate::error::ResolverError;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Default connect and per-read timeout (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("flatup/", env!("CARGO_PKG_VERSION"));

/// Accept header for GitHub REST API v3
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// HTTP client wrapper
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    github_token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, ResolverError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    ///
    /// `timeout` bounds connecting and each individual read, not the whole
    /// request.
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, ResolverError> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                ResolverError::network_error(
                    "",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            github_token: None,
        })
    }

    /// Send a bearer token with GitHub API requests
    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token.filter(|t| !t.is_empty());
        self
    }

    /// Perform a GET request, failing on transport errors and non-2xx statuses
    pub async fn get(&self, url: &str) -> Result<Response, ResolverError> {
        self.send(url, self.client.get(url)).await
    }

    /// Perform a GET request against the GitHub REST API
    pub async fn get_github(&self, url: &str) -> Result<Response, ResolverError> {
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        if let Some(token) = &self.github_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(url, request).await
    }

    /// Fetch a page body as text
    pub async fn get_text(&self, url: &str) -> Result<String, ResolverError> {
        let response = self.get(url).await?;
        response.text().await.map_err(|e| {
            ResolverError::invalid_response(url, format!("failed to read body: {}", e))
        })
    }

    /// Fetch and decode a GitHub API JSON document
    pub async fn get_github_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ResolverError> {
        let response = self.get_github(url).await?;
        response.json::<T>().await.map_err(|e| {
            ResolverError::invalid_response(url, format!("failed to parse JSON: {}", e))
        })
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> Result<Response, ResolverError> {
        debug!(url, "GET");
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ResolverError::network_error(url, "request timed out")
            } else {
                ResolverError::network_error(url, e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}
