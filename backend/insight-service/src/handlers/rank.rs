use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::debug;

use super::{check_limit, default_limit, AppState};
use crate::error::{AppError, Result};
use crate::models::{ApiResponse, EntityKind};
use crate::services::{CohortFilter, FollowerRange, PercentileBand};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/rank/{entity}", web::get().to(rank));
}

/// Query parameters for GET /api/v1/rank/{entity}
#[derive(Debug, Deserialize)]
pub struct RankQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub min_followers: Option<i64>,
    pub max_followers: Option<i64>,
    pub account_type: Option<String>,
    pub category: Option<String>,
    /// Percentile band, both ends required together
    pub percentile_lo: Option<f64>,
    pub percentile_hi: Option<f64>,
}

impl RankQuery {
    /// Build the cohort filter; omitted parameters add no clause
    pub fn cohort_filter(&self) -> Result<CohortFilter> {
        let mut filter = CohortFilter::new();

        if self.min_followers.is_some() || self.max_followers.is_some() {
            filter = filter.with_follower_range(FollowerRange::new(
                self.min_followers,
                self.max_followers,
            )?);
        }
        if let Some(account_type) = &self.account_type {
            filter = filter.with_account_type(account_type.clone());
        }
        if let Some(category) = &self.category {
            filter = filter.with_category(category.clone());
        }
        match (self.percentile_lo, self.percentile_hi) {
            (Some(lo), Some(hi)) => {
                filter = filter.with_percentile_band(PercentileBand::new(lo, hi)?);
            }
            (None, None) => {}
            _ => {
                return Err(AppError::BadRequest(
                    "percentile_lo and percentile_hi must be given together".to_string(),
                ))
            }
        }

        Ok(filter)
    }
}

fn parse_entity(s: &str) -> Result<EntityKind> {
    EntityKind::from_tag(s).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid entity: {}. Must be one of: video, account, product",
            s
        ))
    })
}

/// GET /api/v1/rank/{entity}
async fn rank(
    path: web::Path<String>,
    query: web::Query<RankQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let kind = parse_entity(&path)?;
    let limit = check_limit(query.limit)?;
    let filter = query.cohort_filter()?;

    debug!(entity = kind.as_str(), limit, ?filter, "Rank request");

    let report = state.pipeline.rank(kind, &filter, limit).await?;
    let message = format!("Ranked {} {} records", report.len(), kind.as_str());

    Ok(HttpResponse::Ok().json(ApiResponse::success(report, message)))
}
