// ============================================================================
// Notification Service
// ============================================================================
//
// Records the intent to notify a customer. "Sending" persists a record and
// nothing else; no email or SMS leaves the service.
//
// ============================================================================

pub mod errors;
pub mod handlers;
pub mod model;
pub mod service;

pub use errors::NotificationError;
pub use handlers::routes;
pub use model::{Notification, NotificationId};
pub use service::{NotificationService, NotificationServiceConfig};
