use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use crate::clients::{HttpFraudClient, HttpNotificationClient};
use crate::config::{AppConfig, ServiceRole};
use crate::customer::{self, Customer, CustomerService};
use crate::metrics::{self, CustomerMetrics, Metrics, NotificationMetrics};
use crate::notification::{self, Notification, NotificationService};
use crate::storage::{InMemoryRepository, PgRepository, Repository};

// ============================================================================
// Service Composition
// ============================================================================
//
// Each service is wired by hand: store → service → routes. The customer
// service additionally gets HTTP clients for its two collaborators.
//
// ============================================================================

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    match config.service {
        ServiceRole::Customer => run_customer_service(config).await,
        ServiceRole::Notification => run_notification_service(config).await,
    }
}

async fn customer_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Repository<Customer>>> {
    match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting customer store to Postgres...");
            let repo = PgRepository::connect(url).await?;
            repo.ensure_customer_schema().await?;
            Ok(Arc::new(repo))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, customers are kept in memory");
            Ok(Arc::new(InMemoryRepository::<Customer>::new()))
        }
    }
}

async fn notification_store(
    config: &AppConfig,
) -> anyhow::Result<Arc<dyn Repository<Notification>>> {
    match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting notification store to Postgres...");
            let repo = PgRepository::connect(url).await?;
            repo.ensure_notification_schema().await?;
            Ok(Arc::new(repo))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, notifications are kept in memory");
            Ok(Arc::new(InMemoryRepository::<Notification>::new()))
        }
    }
}

async fn run_customer_service(config: AppConfig) -> anyhow::Result<()> {
    let customers = customer_store(&config).await?;
    let metrics = Arc::new(Metrics::new("customer"));
    let customer_metrics = Arc::new(CustomerMetrics::register(metrics.registry())?);
    let http = reqwest::Client::builder().build()?;

    let timeout_ms = config.downstream_timeout.map(|t| t.as_millis());
    tracing::info!(
        fraud_url = %config.fraud_service_url,
        notification_url = %config.notification_service_url,
        timeout_ms = ?timeout_ms,
        fraud_max_attempts = config.fraud_max_attempts,
        notification_max_attempts = config.notification_max_attempts,
        "Collaborators configured"
    );

    let service = web::Data::new(CustomerService::new(
        customers,
        Arc::new(HttpFraudClient::new(http.clone(), config.fraud_service_url.clone())),
        Arc::new(HttpNotificationClient::new(
            http,
            config.notification_service_url.clone(),
        )),
        config.customer_service(),
        customer_metrics,
    ));
    let metrics = web::Data::new(metrics);

    let port = config.port();
    tracing::info!("🚀 Customer service listening on http://{}:{}", config.http_host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(metrics.clone())
            .configure(customer::routes)
            .configure(metrics::configure)
    })
    .bind((config.http_host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}

async fn run_notification_service(config: AppConfig) -> anyhow::Result<()> {
    let notifications = notification_store(&config).await?;
    let metrics = Arc::new(Metrics::new("notification"));
    let notification_metrics = Arc::new(NotificationMetrics::register(metrics.registry())?);

    let service = web::Data::new(NotificationService::new(
        notifications,
        config.notification_service(),
        notification_metrics,
    ));
    let metrics = web::Data::new(metrics);

    let port = config.port();
    tracing::info!("🚀 Notification service listening on http://{}:{}", config.http_host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(metrics.clone())
            .configure(notification::routes)
            .configure(metrics::configure)
    })
    .bind((config.http_host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
