//! HTTP client for the tribute API.
//!
//! This module provides [`HttpLookup`], which fetches a product's tax
//! attributes with `GET {server_url}/produto/{code}`. The backend answers
//! 200 with the product row as a JSON object, or 404 when the code is not
//! registered.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::TributeLookup;
use crate::record::TributeRecord;

/// Placeholder replaced by the scanned code in the lookup path.
const CODE_PLACEHOLDER: &str = "{code}";

/// Tribute API client.
#[derive(Debug, Clone)]
pub struct HttpLookup {
    client: Client,
    server_url: String,
    lookup_path: String,
}

impl HttpLookup {
    /// Creates a new client.
    ///
    /// # Arguments
    ///
    /// * `server_url` - Base URL of the tribute API
    /// * `lookup_path` - Path template containing `{code}`
    /// * `timeout` - Per-request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(server_url: String, lookup_path: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_client(client, server_url, lookup_path))
    }

    /// Creates a lookup with a pre-configured HTTP client.
    pub fn with_client(client: Client, server_url: String, lookup_path: String) -> Self {
        Self {
            client,
            server_url,
            lookup_path,
        }
    }

    /// Returns the server URL.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Builds the lookup URL for `code`.
    ///
    /// Each path segment is percent-encoded, so codes containing `/` or
    /// spaces cannot escape their segment. A template without `{code}` gets
    /// the code appended as the last segment.
    pub fn url_for(&self, code: &str) -> Result<Url> {
        let mut url = Url::parse(&self.server_url)
            .with_context(|| format!("Invalid server URL: {}", self.server_url))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| anyhow!("Server URL cannot carry a path: {}", self.server_url))?;
            segments.pop_if_empty();

            let mut placed = false;
            for segment in self.lookup_path.split('/').filter(|s| !s.is_empty()) {
                if segment.contains(CODE_PLACEHOLDER) {
                    placed = true;
                    segments.push(&segment.replace(CODE_PLACEHOLDER, code));
                } else {
                    segments.push(segment);
                }
            }
            if !placed {
                segments.push(code);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl TributeLookup for HttpLookup {
    fn name(&self) -> &str {
        "http"
    }

    async fn lookup(&self, code: &str) -> Result<Option<TributeRecord>> {
        let url = self.url_for(code)?;
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Lookup request for {} failed", code))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            anyhow::bail!("Lookup for {} failed: {}", code, status);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .with_context(|| format!("Invalid lookup response body for {}", code))?;

        TributeRecord::from_json(code, body).map(Some)
    }
}
