use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use devops_demo::api::route;
use devops_demo::metrics::Metrics;
use devops_demo::middleware::metrics::HttpMetrics;
use devops_demo::telemetry::init_subscriber;
use devops_demo::{AppConfig, AppContext};
use tracing::info;

#[actix_web::main]
async fn main() -> Result<()> {
    init_subscriber();

    let config = AppConfig::from_env().context("failed to read configuration")?;
    let metrics = Metrics::new().context("failed to register metrics")?;
    metrics.set_app_info(&config.version, &config.environment);

    info!(
        version = %config.version,
        environment = %config.environment,
        port = config.port,
        "Starting devops-demo"
    );

    let port = config.port;
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(AppContext::new(
                config.clone(),
                metrics.clone(),
            )))
            .wrap(Logger::default())
            .wrap(HttpMetrics::new(metrics.clone()))
            .configure(route)
    })
    .bind(("0.0.0.0", port))
    .with_context(|| format!("failed to bind 0.0.0.0:{port}"))?
    .run()
    .await
    .context("server error")?;

    Ok(())
}
