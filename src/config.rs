use std::str::FromStr;
use std::time::Duration;

use crate::clients::CallOptions;
use crate::customer::CustomerServiceConfig;
use crate::notification::NotificationServiceConfig;
use crate::utils::RetryConfig;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Loaded once at startup from the environment (plus an optional .env file).
// Parsing goes through `from_lookup` so tests never touch process state.
//
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("unknown service '{0}', expected 'customer' or 'notification'")]
    UnknownService(String),
}

/// Which service this process runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServiceRole {
    Customer,
    Notification,
}

impl FromStr for ServiceRole {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(ServiceRole::Customer),
            "notification" => Ok(ServiceRole::Notification),
            other => Err(ConfigError::UnknownService(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub service: ServiceRole,
    pub http_host: String,
    pub customer_port: u16,
    pub notification_port: u16,
    /// Postgres URL; the in-memory store is used when absent
    pub database_url: Option<String>,
    pub fraud_service_url: String,
    pub notification_service_url: String,
    pub downstream_timeout: Option<Duration>,
    pub fraud_max_attempts: u32,
    pub notification_max_attempts: u32,
    pub notification_sender: String,
    pub welcome_template: String,
}

impl AppConfig {
    /// Load from the process environment.
    /// `service_override` (usually the first CLI argument) wins over `SERVICE`.
    pub fn from_env(service_override: Option<String>) -> Result<Self, ConfigError> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| {
            if key == "SERVICE" {
                if let Some(service) = &service_override {
                    return Some(service.clone());
                }
            }
            std::env::var(key).ok()
        })
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service = lookup("SERVICE")
            .unwrap_or_else(|| "customer".to_string())
            .parse()?;

        let downstream_timeout = parse_optional::<u64>(&lookup, "DOWNSTREAM_TIMEOUT_MS")?
            .map(Duration::from_millis);

        // Per-collaborator settings fall back to the shared one
        let downstream_max_attempts =
            parse_attempts(&lookup, "DOWNSTREAM_MAX_ATTEMPTS")?.unwrap_or(1);
        let fraud_max_attempts =
            parse_attempts(&lookup, "FRAUD_MAX_ATTEMPTS")?.unwrap_or(downstream_max_attempts);
        let notification_max_attempts = parse_attempts(&lookup, "NOTIFICATION_MAX_ATTEMPTS")?
            .unwrap_or(downstream_max_attempts);

        Ok(Self {
            service,
            http_host: lookup("HTTP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            customer_port: parse_optional(&lookup, "CUSTOMER_PORT")?.unwrap_or(8080),
            notification_port: parse_optional(&lookup, "NOTIFICATION_PORT")?.unwrap_or(8082),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            fraud_service_url: lookup("FRAUD_SERVICE_URL")
                .unwrap_or_else(|| "http://localhost:8081".to_string()),
            notification_service_url: lookup("NOTIFICATION_SERVICE_URL")
                .unwrap_or_else(|| "http://localhost:8082".to_string()),
            downstream_timeout,
            fraud_max_attempts,
            notification_max_attempts,
            notification_sender: lookup("NOTIFICATION_SENDER")
                .unwrap_or_else(|| "IssamCode".to_string()),
            welcome_template: lookup("WELCOME_MESSAGE_TEMPLATE")
                .unwrap_or_else(|| "Hi {first_name}, Welcome to IssamCode.".to_string()),
        })
    }

    fn call_options(&self, max_attempts: u32) -> CallOptions {
        CallOptions {
            timeout: self.downstream_timeout,
            retry: RetryConfig::with_attempts(max_attempts),
        }
    }

    pub fn customer_service(&self) -> CustomerServiceConfig {
        CustomerServiceConfig {
            welcome_template: self.welcome_template.clone(),
            fraud_call: self.call_options(self.fraud_max_attempts),
            notification_call: self.call_options(self.notification_max_attempts),
        }
    }

    pub fn notification_service(&self) -> NotificationServiceConfig {
        NotificationServiceConfig {
            sender: self.notification_sender.clone(),
        }
    }

    /// Port of the service this process runs
    pub fn port(&self) -> u16 {
        match self.service {
            ServiceRole::Customer => self.customer_port,
            ServiceRole::Notification => self.notification_port,
        }
    }
}

fn parse_optional<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{}': {}", raw, e),
            }),
    }
}

fn parse_attempts(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<u32>, ConfigError> {
    match parse_optional::<u32>(lookup, key)? {
        Some(0) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be at least 1".to_string(),
        }),
        attempts => Ok(attempts),
    }
}
