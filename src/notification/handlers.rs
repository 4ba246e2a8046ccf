use actix_web::{web, HttpResponse};

use super::errors::NotificationError;
use super::service::NotificationService;
use crate::clients::NotificationRequest;

// ============================================================================
// HTTP Routes: /api/v1/notifications
// ============================================================================

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/notifications")
            .route("", web::post().to(send))
            .route("/all", web::get().to(list_all)),
    );
}

async fn send(
    service: web::Data<NotificationService>,
    request: web::Json<NotificationRequest>,
) -> Result<HttpResponse, NotificationError> {
    let request = request.into_inner();
    tracing::info!(
        customer_id = request.to_customer_id,
        email = %request.to_customer_email,
        "New notification request"
    );

    service.send(request).await?;
    Ok(HttpResponse::Ok().finish())
}

async fn list_all(
    service: web::Data<NotificationService>,
) -> Result<HttpResponse, NotificationError> {
    let notifications = service.list_notifications().await?;
    tracing::debug!(count = notifications.len(), "Listing notifications");
    Ok(HttpResponse::Ok().json(notifications))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::NotificationMetrics;
    use crate::notification::{Notification, NotificationServiceConfig};
    use crate::storage::InMemoryRepository;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use std::sync::Arc;

    fn notification_service() -> web::Data<NotificationService> {
        web::Data::new(NotificationService::new(
            Arc::new(InMemoryRepository::new()),
            NotificationServiceConfig::default(),
            Arc::new(NotificationMetrics::register(&prometheus::Registry::new()).unwrap()),
        ))
    }

    #[actix_web::test]
    async fn test_post_then_list() {
        let app = test::init_service(
            App::new()
                .app_data(notification_service())
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/notifications")
            .set_json(serde_json::json!({
                "toCustomerId": 3,
                "toCustomerEmail": "ada@x.io",
                "message": "Hi Ada, Welcome to IssamCode."
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(body.is_empty());

        let req = test::TestRequest::get()
            .uri("/api/v1/notifications/all")
            .to_request();
        let notifications: Vec<Notification> = test::call_and_read_body_json(&app, req).await;

        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].target_customer_id, 3);
        assert_eq!(notifications[0].sender, "IssamCode");
    }

    #[actix_web::test]
    async fn test_malformed_body_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(notification_service())
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/notifications")
            .set_json(serde_json::json!({ "message": "missing target" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
