mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::Value;
use std::sync::Arc;

use common::{numbered_feed, product, FakeUpstream};
use insight_service::config::{AppConfig, RankingConfig};
use insight_service::handlers::{self, AppState};
use insight_service::services::Scorer;

fn state(upstream: FakeUpstream) -> web::Data<AppState> {
    web::Data::new(AppState::new(
        AppConfig::default(),
        Arc::new(upstream),
        Scorer::default(),
        RankingConfig::default(),
    ))
}

fn catalog() -> FakeUpstream {
    FakeUpstream::new()
        .with_feed(numbered_feed(50))
        .with_products(vec![
            product("p1", "beauty", 300.0),
            product("p2", "food", 900.0),
        ])
}

#[actix_web::test]
async fn test_health() {
    let app = test::init_service(
        App::new()
            .app_data(state(FakeUpstream::new()))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}

#[actix_web::test]
async fn test_rank_videos_envelope() {
    let app = test::init_service(
        App::new()
            .app_data(state(catalog()))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get()
        // limit 3 fetches a single page of 20
        .uri("/api/v1/rank/video?limit=3&min_followers=1000")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["entity"], "video");

    let items = body["data"]["report"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["video_id"], "v20");
    assert_eq!(items[0]["rank"], 1);
    assert_eq!(items[0]["score"], 20.0);
    assert_eq!(body["data"]["report"]["limit"], 3);
}

#[actix_web::test]
async fn test_invalid_requests_are_bad_request() {
    let app = test::init_service(
        App::new()
            .app_data(state(catalog()))
            .configure(handlers::configure),
    )
    .await;

    for uri in [
        "/api/v1/rank/video?limit=0",
        "/api/v1/rank/video?limit=-5",
        "/api/v1/rank/video?limit=abc",
        "/api/v1/rank/channel",
        "/api/v1/rank/video?account_type=verified",
        "/api/v1/rank/video?percentile_lo=50&percentile_hi=10",
        "/api/v1/popular-videos/ranking?video_type=viral",
        "/api/v1/product-sales/summary?time_range=31",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false, "{}", uri);
        assert!(body["data"].is_null(), "{}", uri);
    }
}

#[actix_web::test]
async fn test_unknown_account_type_is_empty_not_error() {
    let app = test::init_service(
        App::new()
            .app_data(state(catalog()))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/competitor-accounts/heat-ranking/vip")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn test_missing_video_is_not_found() {
    let app = test::init_service(
        App::new()
            .app_data(state(catalog()))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/popular-videos/nope/interaction")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_upstream_failure_is_service_unavailable() {
    let app = test::init_service(
        App::new()
            .app_data(state(FakeUpstream::failing()))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/popular-videos/full-popular")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn test_product_summary_route() {
    let app = test::init_service(
        App::new()
            .app_data(state(catalog()))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/product-sales/summary")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["time_range_days"], 7);
    assert_eq!(body["data"]["total_revenue"], 1200.0);
    assert_eq!(body["data"]["top_categories"][0]["category"], "food");
}

#[actix_web::test]
async fn test_low_fan_route_applies_ceiling() {
    let app = test::init_service(
        App::new()
            .app_data(state(catalog()))
            .configure(handlers::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/v1/popular-videos/low-fan?max_followers=1000&limit=100")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["video_kind"], "low_fan");
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(items[0]["video_id"], "v10");
    assert_eq!(items[9]["video_id"], "v1");
}
