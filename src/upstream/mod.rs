//! HTTP clients for the marketplace's external collaborators.
//!
//! Every client funnels its request through [`fetch_json`], so a response
//! either becomes the typed value or a tagged [`UpstreamError`].

pub mod contract;
pub mod indexer;
pub mod ipfs;
pub mod payments;
pub mod profiles;

pub use contract::ContractReader;
pub use indexer::IndexerClient;
pub use ipfs::MetadataClient;
pub use payments::PaymentLinkClient;
pub use profiles::ProfileClient;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("{service} request failed: {message}")]
    Request {
        service: &'static str,
        message: String,
    },
    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },
    #[error("{service} returned an unexpected shape: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

impl UpstreamError {
    #[cfg(test)]
    pub fn service(&self) -> &'static str {
        match self {
            Self::Request { service, .. }
            | Self::Status { service, .. }
            | Self::Decode { service, .. } => service,
        }
    }

    pub(crate) fn request(service: &'static str, message: impl Into<String>) -> Self {
        Self::Request {
            service,
            message: message.into(),
        }
    }

    pub(crate) fn decode(service: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            service,
            message: message.into(),
        }
    }
}

/// Sends one request and parses the body as `T`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    service: &'static str,
) -> Result<T, UpstreamError> {
    let response = request
        .send()
        .await
        .map_err(|err| UpstreamError::request(service, err.to_string()))?;
    decode_json(response, service).await
}

async fn decode_json<T: DeserializeOwned>(
    response: Response,
    service: &'static str,
) -> Result<T, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            service,
            status: status.as_u16(),
        });
    }
    let body = response
        .bytes()
        .await
        .map_err(|err| UpstreamError::request(service, err.to_string()))?;
    serde_json::from_slice(&body).map_err(|err| UpstreamError::decode(service, err.to_string()))
}
