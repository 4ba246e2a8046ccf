use actix_web::{web, HttpResponse};

use super::errors::CustomerError;
use super::model::CustomerRegistrationRequest;
use super::service::CustomerService;

// ============================================================================
// HTTP Routes: /api/v1/customers
// ============================================================================

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/customers")
            .route("", web::post().to(register_customer))
            .route("/all", web::get().to(list_all)),
    );
}

async fn register_customer(
    service: web::Data<CustomerService>,
    request: web::Json<CustomerRegistrationRequest>,
) -> Result<HttpResponse, CustomerError> {
    let request = request.into_inner();
    tracing::info!(
        first_name = %request.first_name,
        last_name = %request.last_name,
        email = %request.email,
        "New customer registration"
    );

    service.register_customer(request).await?;
    Ok(HttpResponse::Ok().finish())
}

async fn list_all(service: web::Data<CustomerService>) -> Result<HttpResponse, CustomerError> {
    let customers = service.list_customers().await?;
    Ok(HttpResponse::Ok().json(customers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::service::test_support::{FraudBehaviour, Harness};
    use crate::customer::Customer;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    fn register(first_name: &str, email: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/v1/customers")
            .set_json(serde_json::json!({
                "firstName": first_name,
                "lastName": "Lovelace",
                "email": email
            }))
    }

    fn list() -> test::TestRequest {
        test::TestRequest::get().uri("/api/v1/customers/all")
    }

    #[actix_web::test]
    async fn test_register_returns_empty_ok() {
        let harness = Harness::new(FraudBehaviour::Clean, false);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(harness.service))
                .configure(routes),
        )
        .await;

        let resp = test::call_service(&app, register("Ada", "ada@x.io").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(test::read_body(resp).await.is_empty());

        let customers: Vec<Customer> = test::call_and_read_body_json(&app, list().to_request()).await;
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].id, Some(1));
        assert_eq!(customers[0].first_name, "Ada");
    }

    #[actix_web::test]
    async fn test_fraudster_gets_conflict_and_record_stays() {
        let harness = Harness::new(FraudBehaviour::Fraudster, false);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(harness.service))
                .configure(routes),
        )
        .await;

        let resp = test::call_service(&app, register("Eve", "eve@x.io").to_request()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, serde_json::json!({ "error": "Fraudster" }));

        let customers: Vec<Customer> = test::call_and_read_body_json(&app, list().to_request()).await;
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].first_name, "Eve");
    }

    #[actix_web::test]
    async fn test_downstream_failure_is_bad_gateway() {
        let harness = Harness::new(FraudBehaviour::Clean, true);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(harness.service))
                .configure(routes),
        )
        .await;

        let resp = test::call_service(&app, register("Ada", "ada@x.io").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "notification service unavailable");
    }

    #[actix_web::test]
    async fn test_missing_fields_are_rejected() {
        let harness = Harness::new(FraudBehaviour::Clean, false);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(harness.service))
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/customers")
            .set_json(serde_json::json!({ "firstName": "Ada" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let customers: Vec<Customer> = test::call_and_read_body_json(&app, list().to_request()).await;
        assert!(customers.is_empty());
    }
}
