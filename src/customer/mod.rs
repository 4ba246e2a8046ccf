// ============================================================================
// Customer Service
// ============================================================================
//
// Owns customer records and runs the registration workflow:
// persist → fraud check → notify, strictly in that order.
//
// ============================================================================

pub mod errors;
pub mod handlers;
pub mod model;
pub mod service;

pub use errors::{Collaborator, CustomerError};
pub use handlers::routes;
pub use model::{Customer, CustomerId, CustomerRegistrationRequest, RegistrationStage};
pub use service::{CustomerService, CustomerServiceConfig};
