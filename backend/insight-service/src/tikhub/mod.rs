// ============================================
// TikHub upstream client
// ============================================
//
// Authenticated GET requests against TikHub's Douyin web endpoints.
// Each attempt is bounded by a deadline; timeouts, connection failures,
// 5xx and 429 are retried with exponential backoff, everything else
// fails immediately.

pub mod dto;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::Client as HttpClient;
use resilience::{
    http_external_config, with_retry, with_timeout_result, RetryError, ServiceConfig,
    TimeoutError,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::TikHubConfig;
use crate::models::{AccountProfile, ProductRecord, VideoRecord};
use crate::services::{Page, PageRequest, ProductQuery, UpstreamSource};
use dto::{Envelope, ProductListDto, UserDataDto, VideoListDto};

const CLIENT_USER_AGENT: &str = "DouyinInsight/1.0.0";

pub const HOME_FEED_PATH: &str = "/api/v1/douyin/web/fetch_home_feed";
pub const ONE_VIDEO_PATH: &str = "/api/v1/douyin/web/fetch_one_video";
pub const USER_DETAIL_PATH: &str = "/api/v1/douyin/web/fetch_user_detail";
pub const USER_POSTS_PATH: &str = "/api/v1/douyin/web/fetch_user_post_videos";

#[derive(Debug, Error)]
pub enum TikHubError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("TikHub API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<TikHubError>,
    },
}

impl TikHubError {
    /// Whether another attempt could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            TikHubError::Timeout(_) | TikHubError::Transport(_) => true,
            TikHubError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for TikHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TikHubError::Decode(err.to_string())
        } else {
            TikHubError::Transport(err.to_string())
        }
    }
}

/// TikHub API client
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct TikHubClient {
    http: HttpClient,
    base_url: String,
    product_sales_path: String,
    resilience: ServiceConfig,
}

impl TikHubClient {
    pub fn new(config: &TikHubConfig) -> Result<Self, TikHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        if !config.api_key.is_empty() {
            let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .map_err(|e| TikHubError::InvalidConfig(format!("api key: {}", e)))?;
            headers.insert(AUTHORIZATION, bearer);
        }

        let http = HttpClient::builder()
            .default_headers(headers)
            .connect_timeout(config.timeout())
            .build()
            .map_err(|e| TikHubError::InvalidConfig(e.to_string()))?;

        let resilience = http_external_config()
            .with_timeout(config.timeout())
            .with_max_retries(config.max_retries)
            .with_initial_backoff(config.initial_backoff());

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            product_sales_path: config.product_sales_path.clone(),
            resilience,
        })
    }

    /// GET `endpoint` and return the envelope's `data`
    async fn get_data(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<Value, TikHubError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let url = url.as_str();
        let started = Instant::now();

        let result = with_retry(&self.resilience.retry, TikHubError::is_transient, move || {
            self.attempt(url, params)
        })
        .await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(data) => {
                debug!(endpoint, elapsed_ms, "TikHub request succeeded");
                Ok(data)
            }
            Err(RetryError::Exhausted { attempts, last }) => {
                warn!(endpoint, attempts, elapsed_ms, error = %last, "TikHub request failed");
                Err(TikHubError::RetriesExhausted {
                    attempts,
                    last: Box::new(last),
                })
            }
            Err(RetryError::Permanent(e)) => {
                warn!(endpoint, elapsed_ms, error = %e, "TikHub request rejected");
                Err(e)
            }
        }
    }

    async fn attempt(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<Value, TikHubError> {
        match with_timeout_result(self.resilience.timeout.duration, self.send(url, params)).await
        {
            Ok(data) => Ok(data),
            Err(TimeoutError::Elapsed(after)) => Err(TikHubError::Timeout(after)),
            Err(TimeoutError::Failed(e)) => Err(e),
        }
    }

    async fn send(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<Value, TikHubError> {
        let response = self.http.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TikHubError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope = response.json().await?;
        if !envelope.is_success() {
            return Err(TikHubError::Api {
                code: envelope.code().unwrap_or_default(),
                message: envelope.message.unwrap_or_default(),
            });
        }

        Ok(envelope.data)
    }
}

/// Decode `data`, treating null as an empty payload
fn decode<T: DeserializeOwned + Default>(data: Value) -> Result<T, TikHubError> {
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data).map_err(|e| TikHubError::Decode(e.to_string()))
}

fn video_page(list: VideoListDto, with_statistics_only: bool) -> Page<VideoRecord> {
    let items = list
        .aweme_list
        .unwrap_or_default()
        .into_iter()
        .filter(|v| !with_statistics_only || v.has_statistics())
        .filter_map(dto::VideoDto::into_record)
        .collect();

    Page {
        items,
        has_more: list.has_more,
    }
}

#[async_trait]
impl UpstreamSource for TikHubClient {
    async fn fetch_feed_page(&self, page: PageRequest) -> Result<Page<VideoRecord>, TikHubError> {
        info!(cursor = page.cursor(), count = page.size, "Fetching home feed page");

        let params = [
            ("count", page.size.to_string()),
            ("max_cursor", page.cursor().to_string()),
        ];
        let data = self.get_data(HOME_FEED_PATH, &params).await?;

        Ok(video_page(decode(data)?, false))
    }

    async fn fetch_video(&self, video_id: &str) -> Result<Option<VideoRecord>, TikHubError> {
        info!(video_id, "Fetching video");

        let params = [("aweme_id", video_id.to_string())];
        let data = self.get_data(ONE_VIDEO_PATH, &params).await?;

        let video = dto::single_video(data).map_err(|e| TikHubError::Decode(e.to_string()))?;
        Ok(video.and_then(dto::VideoDto::into_record))
    }

    async fn fetch_account_profile(
        &self,
        account_id: &str,
    ) -> Result<Option<AccountProfile>, TikHubError> {
        debug!(account_id, "Fetching account profile");

        let params = [("sec_user_id", account_id.to_string())];
        let data = self.get_data(USER_DETAIL_PATH, &params).await?;

        let user: UserDataDto = decode(data)?;
        Ok(user.into_profile(account_id))
    }

    async fn fetch_account_videos(
        &self,
        account_id: &str,
        page: PageRequest,
    ) -> Result<Page<VideoRecord>, TikHubError> {
        debug!(account_id, count = page.size, "Fetching account videos");

        let params = [
            ("sec_user_id", account_id.to_string()),
            ("max_cursor", page.cursor().to_string()),
            ("count", page.size.to_string()),
        ];
        let data = self.get_data(USER_POSTS_PATH, &params).await?;

        Ok(video_page(decode(data)?, true))
    }

    async fn fetch_product_page(
        &self,
        query: ProductQuery,
        page: PageRequest,
    ) -> Result<Page<ProductRecord>, TikHubError> {
        info!(
            page = page.number(),
            days = query.time_window_days,
            category = query.category.as_deref().unwrap_or("*"),
            "Fetching product sales page"
        );

        let mut params = vec![
            ("page", page.number().to_string()),
            ("count", page.size.to_string()),
            ("days", query.time_window_days.to_string()),
        ];
        if let Some(category) = &query.category {
            params.push(("category", category.clone()));
        }
        let data = self.get_data(&self.product_sales_path, &params).await?;

        let list: ProductListDto = decode(data)?;
        let items = list
            .list
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.into_record(query.time_window_days))
            .collect();

        Ok(Page {
            items,
            has_more: list.has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(TikHubError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(TikHubError::Transport("reset".into()).is_transient());
        assert!(TikHubError::Status {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(TikHubError::Status {
            status: 429,
            body: String::new()
        }
        .is_transient());

        assert!(!TikHubError::Status {
            status: 404,
            body: String::new()
        }
        .is_transient());
        assert!(!TikHubError::Api {
            code: 400,
            message: "bad aweme_id".into()
        }
        .is_transient());
        assert!(!TikHubError::Decode("eof".into()).is_transient());
    }

    #[test]
    fn test_client_trims_base_url() {
        let config = TikHubConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..Default::default()
        };
        let client = TikHubClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_decode_null_is_empty() {
        let list: VideoListDto = decode(Value::Null).unwrap();
        assert!(list.aweme_list.is_none());
    }
}
