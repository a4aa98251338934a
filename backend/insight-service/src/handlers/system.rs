use actix_web::{web, HttpResponse};
use serde_json::json;

use super::AppState;
use crate::models::ApiResponse;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health))
        .route("/api/info", web::get().to(api_info));
}

/// GET /
async fn root(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        json!({
            "service": state.app.name,
            "version": env!("CARGO_PKG_VERSION"),
            "status": "running",
        }),
        "Service is running",
    ))
}

/// GET /health
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        json!({ "status": "healthy" }),
        "OK",
    ))
}

/// GET /api/info
async fn api_info(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(
        json!({
            "name": state.app.name,
            "version": env!("CARGO_PKG_VERSION"),
            "environment": state.app.env,
            "endpoints": {
                "rank": "/api/v1/rank/{entity}",
                "popular_videos": "/api/v1/popular-videos",
                "competitor_accounts": "/api/v1/competitor-accounts",
                "product_sales": "/api/v1/product-sales",
            },
            "product_categories": state.pipeline.config().product_categories,
        }),
        "API information",
    ))
}
