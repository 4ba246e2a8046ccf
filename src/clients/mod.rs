mod http;

pub use http::{HttpFraudClient, HttpNotificationClient};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::utils::{IsTransient, RetryConfig};

// ============================================================================
// Collaborator Contracts
// ============================================================================
//
// Typed clients for the services the customer service calls. Timeout and
// retry are chosen per call through CallOptions.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudCheckResponse {
    pub is_fraudster: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub to_customer_id: i64,
    pub to_customer_email: String,
    pub message: String,
}

/// Per-call transport settings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    /// Request timeout; `None` keeps the transport default
    pub timeout: Option<Duration>,
    pub retry: RetryConfig,
}

impl CallOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The connection was never established, so nothing reached the server
    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} responded with status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    /// Whether a non-idempotent request may be sent again after this error.
    /// Only failures where the server cannot have acted on the request qualify.
    pub fn is_safe_to_resend(&self) -> bool {
        match self {
            ClientError::Connect { .. } => true,
            ClientError::Status { status, .. } => *status >= 500,
            ClientError::Transport { .. } | ClientError::Timeout { .. } => false,
            ClientError::Decode { .. } => false,
        }
    }
}

impl IsTransient for ClientError {
    fn is_transient(&self) -> bool {
        match self {
            ClientError::Connect { .. }
            | ClientError::Transport { .. }
            | ClientError::Timeout { .. } => true,
            ClientError::Status { status, .. } => *status >= 500,
            ClientError::Decode { .. } => false,
        }
    }
}

#[async_trait]
pub trait FraudClient: Send + Sync {
    async fn is_fraudster(
        &self,
        customer_id: i64,
        options: &CallOptions,
    ) -> Result<FraudCheckResponse, ClientError>;
}

#[async_trait]
pub trait NotificationClient: Send + Sync {
    async fn send(
        &self,
        request: &NotificationRequest,
        options: &CallOptions,
    ) -> Result<(), ClientError>;
}
