// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for uploads.
//!
//! The engine only needs "send these bytes to this path, did it work?".
//! [`HttpTransport`] does that over HTTPS; tests substitute a mock.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::error::{Result, SyncError};

/// Future returned by transport operations.
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Sends encoded upload bodies to the remote service.
pub trait Transport: Send + Sync {
    /// POST a JSON body to `path` relative to the service base URL.
    ///
    /// Resolves to `Ok(())` only for a 2xx response.
    fn post(&self, path: &str, body: Vec<u8>) -> TransportFuture<'_>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn post(&self, path: &str, body: Vec<u8>) -> TransportFuture<'_> {
        (**self).post(path, body)
    }
}

/// HTTP transport built on reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(HttpTransport { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    fn post(&self, path: &str, body: Vec<u8>) -> TransportFuture<'_> {
        let url = format!("{}{}", self.base_url, path);
        Box::pin(async move {
            let response = self
                .client
                .post(&url)
                .header(CONTENT_TYPE, "application/json")
                .header(ACCEPT, "application/json")
                .body(body)
                .send()
                .await
                .map_err(|e| SyncError::Transport(e.to_string()))?;

            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(SyncError::Server { status: status.as_u16() })
            }
        })
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
