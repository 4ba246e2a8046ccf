use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use super::model::CustomerId;
use crate::clients::ClientError;
use crate::storage::StorageError;

/// Services the registration workflow depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collaborator {
    Fraud,
    Notification,
}

impl Collaborator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collaborator::Fraud => "fraud",
            Collaborator::Notification => "notification",
        }
    }
}

impl std::fmt::Display for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Customer Errors
// ============================================================================
//
// The failing variants after persistence carry the id of the customer that
// was left in storage; it is logged but never returned to the caller.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    #[error("failed to persist customer: {0}")]
    Persistence(#[from] StorageError),

    #[error("customer {customer_id} was flagged as a fraudster")]
    FraudDetected { customer_id: CustomerId },

    #[error("{collaborator} service call failed for customer {customer_id}: {source}")]
    DownstreamUnavailable {
        collaborator: Collaborator,
        customer_id: CustomerId,
        #[source]
        source: ClientError,
    },
}

impl CustomerError {
    /// Message safe to return to the HTTP caller
    pub fn public_message(&self) -> String {
        match self {
            CustomerError::Persistence(_) => "failed to persist customer".to_string(),
            CustomerError::FraudDetected { .. } => "Fraudster".to_string(),
            CustomerError::DownstreamUnavailable { collaborator, .. } => {
                format!("{} service unavailable", collaborator)
            }
        }
    }
}

impl ResponseError for CustomerError {
    fn status_code(&self) -> StatusCode {
        match self {
            CustomerError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CustomerError::FraudDetected { .. } => StatusCode::CONFLICT,
            CustomerError::DownstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.public_message()
        }))
    }
}
