pub mod competitor_account;
pub mod popular_video;
pub mod product_sales;
pub mod rank;
pub mod system;

use actix_web::web;
use std::sync::Arc;

use crate::config::{AppConfig, RankingConfig};
use crate::error::{AppError, Result};
use crate::services::{
    CompetitorAccountService, PopularVideoService, ProductSalesService, RankingPipeline, Scorer,
    UpstreamSource,
};

/// Upper bound on `limit` accepted over HTTP
pub const MAX_LIMIT: i64 = 100;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub app: AppConfig,
    pub pipeline: RankingPipeline,
    pub popular_videos: PopularVideoService,
    pub competitor_accounts: CompetitorAccountService,
    pub product_sales: ProductSalesService,
}

impl AppState {
    pub fn new(
        app: AppConfig,
        upstream: Arc<dyn UpstreamSource>,
        scorer: Scorer,
        ranking: RankingConfig,
    ) -> Self {
        let pipeline = RankingPipeline::new(upstream, scorer, ranking);

        Self {
            app,
            popular_videos: PopularVideoService::new(pipeline.clone()),
            competitor_accounts: CompetitorAccountService::new(pipeline.clone()),
            product_sales: ProductSalesService::new(pipeline.clone()),
            pipeline,
        }
    }
}

/// Register every route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config());
    system::configure(cfg);
    cfg.service(
        web::scope("/api/v1")
            .configure(rank::configure)
            .configure(popular_video::configure)
            .configure(competitor_account::configure)
            .configure(product_sales::configure),
    );
}

/// Malformed query strings get the JSON error envelope
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

fn default_limit() -> i64 {
    20
}

fn default_product_limit() -> i64 {
    10
}

/// HTTP-level bound on `limit`
fn check_limit(limit: i64) -> Result<i64> {
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIMIT, limit
        )));
    }
    Ok(limit)
}
