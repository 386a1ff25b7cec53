//! Payment QR code encoding.
//!
//! A draw's payment QR code is produced by an external image service. The
//! draw engine only needs a URL back, and treats a missing URL as a degraded
//! but valid outcome.

use crate::config::club::QrConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use url::Url;

/// What a payment QR code encodes
#[derive(Debug, Clone, Copy)]
pub struct QrRequest<'a> {
    /// Amount each member pays
    pub amount: f64,
    /// Draw reference token
    pub reference: &'a str,
    /// Free text shown by payment apps
    pub description: &'a str,
    /// When the code was requested
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct QrPayload<'a> {
    amount: f64,
    reference: &'a str,
    description: &'a str,
    timestamp: String,
}

/// Maps a payment request to a displayable QR code URL.
pub trait QrEncoder: Send + Sync {
    /// Returns the image URL, or `None` if no code could be produced.
    fn encode(&self, request: &QrRequest<'_>) -> Option<String>;
}

/// Encoder backed by an HTTP QR image service taking `size` and `data`
/// query parameters.
#[derive(Debug, Clone)]
pub struct QrServerEncoder {
    base_url: String,
    size: String,
}

impl QrServerEncoder {
    /// Creates an encoder for the given service endpoint and image size.
    #[must_use]
    pub fn new(base_url: impl Into<String>, size: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            size: size.into(),
        }
    }

    /// Creates an encoder from the `[qr]` section of config.toml.
    #[must_use]
    pub fn from_config(config: &QrConfig) -> Self {
        Self::new(config.base_url.clone(), config.size.clone())
    }
}

impl QrEncoder for QrServerEncoder {
    fn encode(&self, request: &QrRequest<'_>) -> Option<String> {
        let payload = QrPayload {
            amount: request.amount,
            reference: request.reference,
            description: request.description,
            timestamp: request.timestamp.to_rfc3339(),
        };
        let data = serde_json::to_string(&payload)
            .inspect_err(|e| warn!("Could not serialise QR payload: {}", e))
            .ok()?;

        Url::parse_with_params(
            &self.base_url,
            &[("size", self.size.as_str()), ("data", data.as_str())],
        )
        .inspect_err(|e| warn!("Invalid QR service URL {}: {}", self.base_url, e))
        .ok()
        .map(String::from)
    }
}

/// Encoder that never produces a code, for offline use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQrEncoder;

impl QrEncoder for NoQrEncoder {
    fn encode(&self, _request: &QrRequest<'_>) -> Option<String> {
        None
    }
}
