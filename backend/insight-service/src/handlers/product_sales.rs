use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::{check_limit, default_product_limit, AppState};
use crate::error::Result;
use crate::models::ApiResponse;
use crate::services::pipeline::DEFAULT_TIME_WINDOW_DAYS;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/product-sales")
            .route("/top-sales", web::get().to(top_sales))
            .route("/category/{category}", web::get().to(by_category))
            .route("/summary", web::get().to(summary)),
    );
}

fn default_time_window() -> u32 {
    DEFAULT_TIME_WINDOW_DAYS
}

#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    #[serde(default = "default_product_limit")]
    pub limit: i64,
    #[serde(default = "default_time_window")]
    pub time_window_days: u32,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(default = "default_time_window")]
    pub time_range: u32,
}

/// GET /api/v1/product-sales/top-sales
async fn top_sales(
    query: web::Query<SalesQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let limit = check_limit(query.limit)?;
    let report = state
        .product_sales
        .top_sales(limit, query.time_window_days)
        .await?;
    let message = format!(
        "Found {} products over {} days",
        report.len(),
        query.time_window_days
    );
    Ok(HttpResponse::Ok().json(ApiResponse::success(report, message)))
}

/// GET /api/v1/product-sales/category/{category}
async fn by_category(
    path: web::Path<String>,
    query: web::Query<SalesQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let limit = check_limit(query.limit)?;
    let category = path.into_inner();
    let report = state
        .product_sales
        .by_category(&category, limit, query.time_window_days)
        .await?;
    let message = format!("Found {} products in {}", report.len(), category);
    Ok(HttpResponse::Ok().json(ApiResponse::success(report, message)))
}

/// GET /api/v1/product-sales/summary?time_range=7
async fn summary(
    query: web::Query<SummaryQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let summary = state.product_sales.summary(query.time_range).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary, "Product sales summary")))
}
