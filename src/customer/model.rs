use serde::{Deserialize, Serialize};

use crate::storage::Entity;

pub type CustomerId = i64;

// ============================================================================
// Customer Models
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Option<CustomerId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Customer {
    /// A customer that has not been persisted yet
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }
}

impl Entity for Customer {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<CustomerRegistrationRequest> for Customer {
    fn from(request: CustomerRegistrationRequest) -> Self {
        Customer::new(request.first_name, request.last_name, request.email)
    }
}

/// Where a registration attempt stopped
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegistrationStage {
    Received,
    Persisted,
    FraudChecked,
    Rejected,
    Notified,
    Done,
    Failed,
}

impl RegistrationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStage::Received => "received",
            RegistrationStage::Persisted => "persisted",
            RegistrationStage::FraudChecked => "fraud_checked",
            RegistrationStage::Rejected => "rejected",
            RegistrationStage::Notified => "notified",
            RegistrationStage::Done => "done",
            RegistrationStage::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RegistrationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
