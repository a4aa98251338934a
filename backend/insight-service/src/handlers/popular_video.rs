use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::{check_limit, default_limit, AppState};
use crate::error::{AppError, Result};
use crate::models::{ApiResponse, VideoKind};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/popular-videos")
            .route("/full-popular", web::get().to(full_popular))
            .route("/same-level", web::get().to(same_level))
            .route("/low-fan", web::get().to(low_fan))
            .route("/ranking", web::get().to(ranking))
            .route("/{video_id}/interaction", web::get().to(video_interaction)),
    );
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct FollowerQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub min_followers: Option<i64>,
    pub max_followers: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LowFanQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub max_followers: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub video_type: Option<String>,
}

fn parse_video_kind(s: Option<&str>) -> Result<VideoKind> {
    match s {
        None => Ok(VideoKind::default()),
        Some(tag) => VideoKind::from_tag(tag).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid video_type: {}. Must be one of: full_popular, same_level, low_fan",
                tag
            ))
        }),
    }
}

/// GET /api/v1/popular-videos/{video_id}/interaction
async fn video_interaction(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let video = state.popular_videos.video_interaction(&path).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(video, "Video interaction score")))
}

/// GET /api/v1/popular-videos/full-popular
async fn full_popular(
    query: web::Query<LimitQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let limit = check_limit(query.limit)?;
    let report = state.popular_videos.full_popular(limit).await?;
    let message = format!("Found {} popular videos", report.report.len());
    Ok(HttpResponse::Ok().json(ApiResponse::success(report, message)))
}

/// GET /api/v1/popular-videos/same-level
async fn same_level(
    query: web::Query<FollowerQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let limit = check_limit(query.limit)?;
    let report = state
        .popular_videos
        .same_level(query.min_followers, query.max_followers, limit)
        .await?;
    let message = format!("Found {} same-level popular videos", report.report.len());
    Ok(HttpResponse::Ok().json(ApiResponse::success(report, message)))
}

/// GET /api/v1/popular-videos/low-fan
async fn low_fan(
    query: web::Query<LowFanQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let limit = check_limit(query.limit)?;
    let report = state
        .popular_videos
        .low_fan(query.max_followers, limit)
        .await?;
    let message = format!("Found {} low-fan popular videos", report.report.len());
    Ok(HttpResponse::Ok().json(ApiResponse::success(report, message)))
}

/// GET /api/v1/popular-videos/ranking?video_type=...
async fn ranking(
    query: web::Query<RankingQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let kind = parse_video_kind(query.video_type.as_deref())?;
    let limit = check_limit(query.limit)?;
    let report = state.popular_videos.ranking(kind, limit).await?;
    let message = format!("Found {} {} videos", report.report.len(), kind.as_str());
    Ok(HttpResponse::Ok().json(ApiResponse::success(report, message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_kind() {
        assert_eq!(parse_video_kind(None).unwrap(), VideoKind::FullPopular);
        assert_eq!(
            parse_video_kind(Some("same_level")).unwrap(),
            VideoKind::SameLevel
        );
        assert_eq!(parse_video_kind(Some("low_fan")).unwrap(), VideoKind::LowFan);
        assert!(parse_video_kind(Some("viral")).is_err());
    }

    #[test]
    fn test_low_fan_query_takes_only_a_ceiling() {
        let query = web::Query::<LowFanQuery>::from_query("max_followers=5000").unwrap();
        assert_eq!(query.limit, default_limit());
        assert_eq!(query.max_followers, Some(5_000));

        let query = web::Query::<LowFanQuery>::from_query("limit=3").unwrap();
        assert_eq!(query.limit, 3);
        assert_eq!(query.max_followers, None);
    }
}
