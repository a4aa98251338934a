use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::{check_limit, default_limit, AppState};
use crate::error::Result;
use crate::models::ApiResponse;

pub fn configure(cfg: &mut web::ServiceConfig) {
    // Fixed segments are registered before the parameterised ones
    cfg.service(
        web::scope("/competitor-accounts")
            .route("/heat-ranking", web::get().to(heat_ranking))
            .route("/heat-ranking/{account_type}", web::get().to(heat_ranking_by_type))
            .route("/same-level", web::get().to(same_level))
            .route("/verified-ranking", web::get().to(verified_ranking))
            .route("/{account_id}/heat", web::get().to(account_heat)),
    );
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct FollowerRangeQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub min_followers: Option<i64>,
    pub max_followers: Option<i64>,
}

/// GET /api/v1/competitor-accounts/{account_id}/heat
async fn account_heat(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let account = state.competitor_accounts.account_heat(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(account, "Account heat score")))
}

/// GET /api/v1/competitor-accounts/heat-ranking
async fn heat_ranking(
    query: web::Query<LimitQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let limit = check_limit(query.limit)?;
    let report = state.competitor_accounts.heat_ranking(limit).await?;
    let message = format!("Found {} accounts", report.len());
    Ok(HttpResponse::Ok().json(ApiResponse::success(report, message)))
}

/// GET /api/v1/competitor-accounts/heat-ranking/{account_type}
async fn heat_ranking_by_type(
    path: web::Path<String>,
    query: web::Query<LimitQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let limit = check_limit(query.limit)?;
    let account_type = path.into_inner();
    let report = state
        .competitor_accounts
        .heat_ranking_by_type(&account_type, limit)
        .await?;
    let message = format!("Found {} {} accounts", report.len(), account_type);
    Ok(HttpResponse::Ok().json(ApiResponse::success(report, message)))
}

/// GET /api/v1/competitor-accounts/same-level
async fn same_level(
    query: web::Query<FollowerRangeQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let limit = check_limit(query.limit)?;
    let report = state
        .competitor_accounts
        .by_follower_range(query.min_followers, query.max_followers, limit)
        .await?;
    let message = format!("Found {} accounts in range", report.len());
    Ok(HttpResponse::Ok().json(ApiResponse::success(report, message)))
}

/// GET /api/v1/competitor-accounts/verified-ranking
async fn verified_ranking(
    query: web::Query<LimitQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let limit = check_limit(query.limit)?;
    let report = state.competitor_accounts.verified_ranking(limit).await?;
    let message = format!("Found {} verified accounts", report.len());
    Ok(HttpResponse::Ok().json(ApiResponse::success(report, message)))
}
