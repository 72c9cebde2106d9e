use crate::AppContext;
use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::Local;
use serde::Serialize;
use serde_json::Value;

const APPLICATION_NAME: &str = "DevOps Demo Application";
const APPLICATION_DESCRIPTION: &str = "Demo application for the DevOps project";

pub fn route(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(info)
        .service(echo)
        .service(metrics);
}

#[derive(Serialize)]
struct HealthResponse<'a> {
    status: &'a str,
    version: &'a str,
    environment: &'a str,
}

#[derive(Serialize)]
struct InfoResponse<'a> {
    application: &'a str,
    version: &'a str,
    environment: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct EchoResponse {
    received: Value,
    timestamp: String,
}

/// Liveness/readiness probe target.
#[get("/")]
pub async fn health_check(context: web::Data<AppContext>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        version: &context.config.version,
        environment: &context.config.environment,
    })
}

#[get("/api/info")]
pub async fn info(context: web::Data<AppContext>) -> impl Responder {
    HttpResponse::Ok().json(InfoResponse {
        application: APPLICATION_NAME,
        version: &context.config.version,
        environment: &context.config.environment,
        description: APPLICATION_DESCRIPTION,
    })
}

/// Returns the posted JSON back to the caller. Malformed bodies are rejected
/// by the extractor with a client error before this handler runs.
#[post("/api/echo")]
pub async fn echo(body: web::Json<Value>) -> impl Responder {
    let received = body.into_inner();
    tracing::info!(payload = %received, "Received echo payload");

    HttpResponse::Ok().json(EchoResponse {
        received,
        timestamp: Local::now().to_rfc3339(),
    })
}

/// Text exposition of the process-wide metrics registry.
#[get("/metrics")]
pub async fn metrics(context: web::Data<AppContext>) -> actix_web::Result<HttpResponse> {
    let body = context
        .metrics
        .render()
        .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use crate::AppConfig;
    use actix_web::{test, App};
    use serde_json::json;

    fn test_context(version: &str, environment: &str) -> web::Data<AppContext> {
        let config = AppConfig {
            version: version.to_string(),
            environment: environment.to_string(),
            port: 5000,
        };
        let metrics_registry = Metrics::new().unwrap();
        metrics_registry.set_app_info(&config.version, &config.environment);
        web::Data::new(AppContext::new(config, metrics_registry))
    }

    #[actix_web::test]
    async fn health_check_reports_configured_build() {
        let app = test::init_service(
            App::new()
                .app_data(test_context("2.3.0", "staging"))
                .configure(route),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({
                "status": "healthy",
                "version": "2.3.0",
                "environment": "staging",
            })
        );
    }

    #[actix_web::test]
    async fn info_returns_static_description() {
        let app = test::init_service(
            App::new()
                .app_data(test_context("1.0.0", "development"))
                .configure(route),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/info").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["application"], "DevOps Demo Application");
        assert_eq!(body["version"], "1.0.0");
        assert_eq!(body["environment"], "development");
        assert!(body["description"].is_string());
    }

    #[actix_web::test]
    async fn echo_returns_posted_body_verbatim() {
        let app = test::init_service(
            App::new()
                .app_data(test_context("1.0.0", "development"))
                .configure(route),
        )
        .await;

        let payload = json!({"message": "test", "value": 123});
        let req = test::TestRequest::post()
            .uri("/api/echo")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["received"], payload);
        assert!(body["timestamp"].is_string());
    }

    #[actix_web::test]
    async fn echo_round_trips_nested_structures() {
        let app = test::init_service(
            App::new()
                .app_data(test_context("1.0.0", "development"))
                .configure(route),
        )
        .await;

        let payload = json!({
            "items": [1, 2, 3],
            "nested": {"flag": true, "name": null},
        });
        let req = test::TestRequest::post()
            .uri("/api/echo")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["received"], payload);
    }

    #[actix_web::test]
    async fn echo_rejects_malformed_body() {
        let app = test::init_service(
            App::new()
                .app_data(test_context("1.0.0", "development"))
                .configure(route),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/echo")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn metrics_endpoint_serves_text_exposition() {
        let context = test_context("1.0.0", "development");
        let app = test::init_service(App::new().app_data(context.clone()).configure(route)).await;

        // Complete one instrumented-equivalent request so the vector
        // families have samples to expose.
        context
            .metrics
            .observe_request("GET", "/api/info", 200, std::time::Duration::from_millis(1));

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        assert!(resp
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/plain"));

        let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(body.contains("http_requests_total"));
        assert!(body.contains("http_request_duration_seconds"));
        assert!(body.contains("http_requests_active"));
        assert!(body.contains("app_info"));
    }
}
