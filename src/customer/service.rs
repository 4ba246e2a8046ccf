use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use super::errors::{Collaborator, CustomerError};
use super::model::{Customer, CustomerId, CustomerRegistrationRequest, RegistrationStage};
use crate::clients::{CallOptions, ClientError, FraudClient, NotificationClient, NotificationRequest};
use crate::metrics::CustomerMetrics;
use crate::storage::{Entity, Repository};

pub const FIRST_NAME_PLACEHOLDER: &str = "{first_name}";

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerServiceConfig {
    /// Welcome message; `{first_name}` is replaced with the customer's first name
    pub welcome_template: String,
    pub fraud_call: CallOptions,
    pub notification_call: CallOptions,
}

impl Default for CustomerServiceConfig {
    fn default() -> Self {
        Self {
            welcome_template: "Hi {first_name}, Welcome to IssamCode.".to_string(),
            fraud_call: CallOptions::default(),
            notification_call: CallOptions::default(),
        }
    }
}

impl CustomerServiceConfig {
    pub fn welcome_message(&self, first_name: &str) -> String {
        self.welcome_template.replace(FIRST_NAME_PLACEHOLDER, first_name)
    }
}

// ============================================================================
// Customer Service - registration workflow
// ============================================================================
//
// Received → Persisted → FraudChecked → {Rejected | Notified} → Done
//
// Every step is awaited before the next one starts. A failure after the
// customer was persisted leaves the record in storage: there is no rollback
// on fraud rejection and no compensation when the notification call fails.
//
// ============================================================================

pub struct CustomerService {
    customers: Arc<dyn Repository<Customer>>,
    fraud_client: Arc<dyn FraudClient>,
    notification_client: Arc<dyn NotificationClient>,
    config: CustomerServiceConfig,
    metrics: Arc<CustomerMetrics>,
}

impl CustomerService {
    pub fn new(
        customers: Arc<dyn Repository<Customer>>,
        fraud_client: Arc<dyn FraudClient>,
        notification_client: Arc<dyn NotificationClient>,
        config: CustomerServiceConfig,
        metrics: Arc<CustomerMetrics>,
    ) -> Self {
        Self {
            customers,
            fraud_client,
            notification_client,
            config,
            metrics,
        }
    }

    /// Register a customer, check it for fraud and ask for a welcome
    /// notification.
    pub async fn register_customer(
        &self,
        request: CustomerRegistrationRequest,
    ) -> Result<(), CustomerError> {
        let correlation_id = Uuid::new_v4();

        tracing::debug!(
            correlation_id = %correlation_id,
            stage = %RegistrationStage::Received,
            email = %request.email,
            "Registration received"
        );

        let result = self.run_registration(correlation_id, request).await;

        match &result {
            Ok(()) => {
                self.metrics.record_registration("registered");
                tracing::info!(
                    correlation_id = %correlation_id,
                    stage = %RegistrationStage::Done,
                    "✅ Customer registered"
                );
            }
            Err(CustomerError::FraudDetected { customer_id }) => {
                self.metrics.record_registration("fraud_rejected");
                tracing::warn!(
                    correlation_id = %correlation_id,
                    customer_id = customer_id,
                    stage = %RegistrationStage::Rejected,
                    "Registration rejected by fraud check, customer record kept"
                );
            }
            Err(error) => {
                self.metrics.record_registration("failed");
                tracing::error!(
                    correlation_id = %correlation_id,
                    stage = %RegistrationStage::Failed,
                    error = %error,
                    "Registration failed"
                );
            }
        }

        result
    }

    async fn run_registration(
        &self,
        correlation_id: Uuid,
        request: CustomerRegistrationRequest,
    ) -> Result<(), CustomerError> {
        // Email is neither validated nor checked for uniqueness.
        let mut customer = Customer::from(request);
        let customer_id = self.customers.insert(customer.clone()).await?;
        customer.assign_id(customer_id);

        tracing::debug!(
            correlation_id = %correlation_id,
            customer_id = customer_id,
            stage = %RegistrationStage::Persisted,
            "Customer persisted"
        );

        let fraud_check = self
            .call_collaborator(
                Collaborator::Fraud,
                customer_id,
                self.fraud_client
                    .is_fraudster(customer_id, &self.config.fraud_call),
            )
            .await?;

        tracing::debug!(
            correlation_id = %correlation_id,
            customer_id = customer_id,
            is_fraudster = fraud_check.is_fraudster,
            stage = %RegistrationStage::FraudChecked,
            "Fraud check completed"
        );

        if fraud_check.is_fraudster {
            return Err(CustomerError::FraudDetected { customer_id });
        }

        let notification = NotificationRequest {
            to_customer_id: customer_id,
            to_customer_email: customer.email.clone(),
            message: self.config.welcome_message(&customer.first_name),
        };

        self.call_collaborator(
            Collaborator::Notification,
            customer_id,
            self.notification_client
                .send(&notification, &self.config.notification_call),
        )
        .await?;

        tracing::debug!(
            correlation_id = %correlation_id,
            customer_id = customer_id,
            stage = %RegistrationStage::Notified,
            "Notification requested"
        );

        Ok(())
    }

    /// Await a collaborator call, recording its duration and outcome
    async fn call_collaborator<T, F>(
        &self,
        collaborator: Collaborator,
        customer_id: CustomerId,
        call: F,
    ) -> Result<T, CustomerError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        let started = Instant::now();
        let result = call.await;

        self.metrics.record_downstream_call(
            collaborator.as_str(),
            started.elapsed().as_secs_f64(),
            result.is_ok(),
        );

        result.map_err(|source| CustomerError::DownstreamUnavailable {
            collaborator,
            customer_id,
            source,
        })
    }

    /// All customers in storage order, unfiltered
    pub async fn list_customers(&self) -> Result<Vec<Customer>, CustomerError> {
        Ok(self.customers.list_all().await?)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::storage::{InMemoryRepository, StorageError};
    use async_trait::async_trait;
    use std::time::Duration;

    #[tokio::test]
    async fn test_registration_persists_customer_and_notification() {
        let harness = Harness::new(FraudBehaviour::Clean, false);

        harness
            .service
            .register_customer(registration("Ada", "Lovelace", "ada@x.io"))
            .await
            .unwrap();

        let customers = harness.service.list_customers().await.unwrap();
        assert_eq!(customers.len(), 1);
        let ada = &customers[0];
        assert_eq!(ada.first_name, "Ada");
        assert_eq!(ada.last_name, "Lovelace");
        assert_eq!(ada.email, "ada@x.io");

        let notifications = harness.notifications.list_notifications().await.unwrap();
        assert_eq!(notifications.len(), 1);
        let welcome = &notifications[0];
        assert_eq!(Some(welcome.target_customer_id), ada.id);
        assert_eq!(welcome.target_customer_email, ada.email);
        assert_eq!(welcome.message, "Hi Ada, Welcome to IssamCode.");
        assert_eq!(welcome.sender, "IssamCode");

        assert_eq!(harness.metrics.registrations.with_label_values(&["registered"]).get(), 1);
    }

    #[tokio::test]
    async fn test_fraud_check_runs_after_persist_with_assigned_id() {
        let harness = Harness::new(FraudBehaviour::Clean, false);

        harness
            .service
            .register_customer(registration("Ada", "Lovelace", "ada@x.io"))
            .await
            .unwrap();

        let calls = harness.fraud.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (checked_id, _, stored_at_call) = &calls[0];
        assert_eq!(*checked_id, 1);
        assert_eq!(*stored_at_call, 1);
    }

    #[tokio::test]
    async fn test_fraudster_is_rejected_but_not_rolled_back() {
        let harness = Harness::new(FraudBehaviour::Fraudster, false);

        let result = harness
            .service
            .register_customer(registration("Eve", "Mallory", "eve@x.io"))
            .await;

        let eve_id = match result {
            Err(CustomerError::FraudDetected { customer_id }) => customer_id,
            other => panic!("expected fraud rejection, got {:?}", other),
        };

        let customers = harness.service.list_customers().await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].id, Some(eve_id));
        assert_eq!(customers[0].first_name, "Eve");

        let notifications = harness.notifications.list_notifications().await.unwrap();
        assert!(notifications.iter().all(|n| n.target_customer_id != eve_id));
        assert!(notifications.is_empty());
        assert!(harness.notifier.calls.lock().unwrap().is_empty());

        assert_eq!(
            harness.metrics.registrations.with_label_values(&["fraud_rejected"]).get(),
            1
        );
    }

    #[tokio::test]
    async fn test_notification_failure_leaves_customer_without_notification() {
        let harness = Harness::new(FraudBehaviour::Clean, true);

        let result = harness
            .service
            .register_customer(registration("Ada", "Lovelace", "ada@x.io"))
            .await;

        assert!(matches!(
            result,
            Err(CustomerError::DownstreamUnavailable {
                collaborator: Collaborator::Notification,
                customer_id: 1,
                ..
            })
        ));
        assert_eq!(harness.service.list_customers().await.unwrap().len(), 1);
        assert!(harness.notifications.list_notifications().await.unwrap().is_empty());
        assert_eq!(harness.notifier.calls.lock().unwrap().len(), 1);
        assert_eq!(
            harness
                .metrics
                .downstream_calls
                .with_label_values(&["notification", "error"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn test_unreachable_fraud_service_fails_registration() {
        let harness = Harness::new(FraudBehaviour::Unreachable, false);

        let result = harness
            .service
            .register_customer(registration("Ada", "Lovelace", "ada@x.io"))
            .await;

        assert!(matches!(
            result,
            Err(CustomerError::DownstreamUnavailable {
                collaborator: Collaborator::Fraud,
                source: ClientError::Timeout { .. },
                ..
            })
        ));
        assert_eq!(harness.service.list_customers().await.unwrap().len(), 1);
        assert!(harness.notifier.calls.lock().unwrap().is_empty());
        assert_eq!(harness.metrics.registrations.with_label_values(&["failed"]).get(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_not_deduplicated() {
        let harness = Harness::new(FraudBehaviour::Clean, false);

        harness
            .service
            .register_customer(registration("Ada", "Lovelace", "same@x.io"))
            .await
            .unwrap();
        harness
            .service
            .register_customer(registration("Ada", "Byron", "same@x.io"))
            .await
            .unwrap();

        let customers = harness.service.list_customers().await.unwrap();
        assert_eq!(customers.len(), 2);
        assert_ne!(customers[0].id, customers[1].id);
        assert!(customers.iter().all(|c| c.email == "same@x.io"));
        assert_eq!(harness.notifications.list_notifications().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_returns_every_persisted_customer() {
        let harness = Harness::new(FraudBehaviour::Fraudster, false);

        for (first, email) in [("Eve", "eve@x.io"), ("Mal", "mal@x.io"), ("Oscar", "o@x.io")] {
            let _ = harness
                .service
                .register_customer(registration(first, "X", email))
                .await;
        }

        let names: Vec<_> = harness
            .service
            .list_customers()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.first_name)
            .collect();

        assert_eq!(names, vec!["Eve", "Mal", "Oscar"]);
        assert_eq!(harness.customers.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_config_drives_message_and_call_options() {
        let config = CustomerServiceConfig {
            welcome_template: "Welcome aboard, {first_name}!".to_string(),
            fraud_call: CallOptions::default().with_timeout(Duration::from_millis(250)),
            notification_call: CallOptions::default()
                .with_retry(crate::utils::RetryConfig::with_attempts(2)),
        };
        let harness = Harness::with_config(FraudBehaviour::Clean, false, config.clone());

        harness
            .service
            .register_customer(registration("Grace", "Hopper", "grace@x.io"))
            .await
            .unwrap();

        let fraud_calls = harness.fraud.calls.lock().unwrap();
        assert_eq!(fraud_calls[0].1, config.fraud_call);

        let notifier_calls = harness.notifier.calls.lock().unwrap();
        assert_eq!(notifier_calls[0].0.message, "Welcome aboard, Grace!");
        assert_eq!(notifier_calls[0].1, config.notification_call);
    }

    struct BrokenRepository;

    #[async_trait]
    impl Repository<Customer> for BrokenRepository {
        async fn insert(&self, _record: Customer) -> Result<i64, StorageError> {
            Err(StorageError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn list_all(&self) -> Result<Vec<Customer>, StorageError> {
            Err(StorageError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn test_storage_failure_stops_before_fraud_check() {
        let harness = Harness::new(FraudBehaviour::Clean, false);
        let service = CustomerService::new(
            Arc::new(BrokenRepository),
            harness.fraud.clone(),
            harness.notifier.clone(),
            CustomerServiceConfig::default(),
            harness.metrics.clone(),
        );

        let result = service
            .register_customer(registration("Ada", "Lovelace", "ada@x.io"))
            .await;

        assert!(matches!(result, Err(CustomerError::Persistence(_))));
        assert!(harness.fraud.calls.lock().unwrap().is_empty());
        assert!(harness.notifier.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_welcome_message_template() {
        let config = CustomerServiceConfig::default();
        assert_eq!(config.welcome_message("Ada"), "Hi Ada, Welcome to IssamCode.");
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let harness = Harness::new(FraudBehaviour::Clean, false);
        let service = CustomerService::new(
            Arc::new(InMemoryRepository::new()),
            harness.fraud.clone(),
            harness.notifier.clone(),
            CustomerServiceConfig::default(),
            harness.metrics.clone(),
        );

        assert!(service.list_customers().await.unwrap().is_empty());
    }
}
