use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use insight_service::config::Config;
use insight_service::handlers::{self, AppState};
use insight_service::services::Scorer;
use insight_service::tikhub::TikHubClient;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

    // LOG_FORMAT=json switches to structured output
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

fn build_cors(allowed_origins: &str) -> Cors {
    let mut cors = Cors::default();
    for origin in allowed_origins.split(',') {
        let origin = origin.trim();
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else if !origin.is_empty() {
            cors = cors.allowed_origin(origin);
        }
    }
    cors.allow_any_method().allow_any_header().max_age(3600)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!(
        "Starting {} v{}",
        config.app.name,
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Environment: {}", config.app.env);

    if config.tikhub.api_key.is_empty() {
        tracing::warn!("TIKHUB_API_KEY is not set; upstream requests will be unauthenticated");
    }

    let client = TikHubClient::new(&config.tikhub).context("Failed to build TikHub client")?;
    tracing::info!(base_url = %config.tikhub.base_url, "TikHub client initialized");

    let scorer = Scorer::new(
        config.scoring.interaction_weights(),
        config.scoring.heat_weights(),
    );
    let state = web::Data::new(AppState::new(
        config.app.clone(),
        Arc::new(client),
        scorer,
        config.ranking.clone(),
    ));

    let bind_addr = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Listening on {}", bind_addr);

    let cors_origins = config.app.cors_allowed_origins.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(build_cors(&cors_origins))
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}
