use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::services::scoring::{HeatWeights, InteractionWeights};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub tikhub: TikHubConfig,
    pub ranking: RankingConfig,
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_app_env")]
    pub env: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Comma separated origins, `*` allows any
    #[serde(default = "default_cors_allowed_origins")]
    pub cors_allowed_origins: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            env: default_app_env(),
            host: default_host(),
            port: default_port(),
            cors_allowed_origins: default_cors_allowed_origins(),
        }
    }
}

/// TikHub upstream settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TikHubConfig {
    #[serde(default = "default_tikhub_base_url")]
    pub base_url: String,

    /// Bearer token; requests go out unauthenticated when empty
    #[serde(default)]
    pub api_key: String,

    /// Per-attempt deadline
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Product sales ranking endpoint
    #[serde(default = "default_product_sales_path")]
    pub product_sales_path: String,
}

impl TikHubConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}

impl Default for TikHubConfig {
    fn default() -> Self {
        Self {
            base_url: default_tikhub_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            product_sales_path: default_product_sales_path(),
        }
    }
}

/// Candidate pool sizing and cohort vocabulary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Items requested per upstream page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Hard cap on pages fetched for one ranking
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Candidate pool = limit * multiplier
    #[serde(default = "default_candidate_multiplier")]
    pub candidate_multiplier: u32,

    #[serde(default = "default_account_lookup_concurrency")]
    pub account_lookup_concurrency: usize,

    /// Recent videos used for an account's averages
    #[serde(default = "default_account_video_sample")]
    pub account_video_sample: u32,

    #[serde(default = "default_product_categories")]
    pub product_categories: Vec<String>,
}

impl RankingConfig {
    /// Pages needed for `limit` results, at least one and at most `max_pages`
    pub fn pages_for(&self, limit: usize) -> u32 {
        let wanted = limit.saturating_mul(self.candidate_multiplier.max(1) as usize);
        let page_size = self.page_size.max(1) as usize;
        let pages = wanted.div_ceil(page_size).max(1);
        pages.min(self.max_pages.max(1) as usize) as u32
    }

    pub fn is_known_category(&self, category: &str) -> bool {
        self.product_categories.iter().any(|c| c == category)
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            candidate_multiplier: default_candidate_multiplier(),
            account_lookup_concurrency: default_account_lookup_concurrency(),
            account_video_sample: default_account_video_sample(),
            product_categories: default_product_categories(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_like_weight")]
    pub like_weight: f64,
    #[serde(default = "default_comment_weight")]
    pub comment_weight: f64,
    #[serde(default = "default_share_weight")]
    pub share_weight: f64,
    #[serde(default = "default_collect_weight")]
    pub collect_weight: f64,

    #[serde(default = "default_heat_follower_weight")]
    pub heat_follower_weight: f64,
    #[serde(default = "default_heat_play_weight")]
    pub heat_play_weight: f64,
    #[serde(default = "default_heat_like_weight")]
    pub heat_like_weight: f64,
    #[serde(default = "default_heat_comment_weight")]
    pub heat_comment_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            like_weight: default_like_weight(),
            comment_weight: default_comment_weight(),
            share_weight: default_share_weight(),
            collect_weight: default_collect_weight(),
            heat_follower_weight: default_heat_follower_weight(),
            heat_play_weight: default_heat_play_weight(),
            heat_like_weight: default_heat_like_weight(),
            heat_comment_weight: default_heat_comment_weight(),
        }
    }
}

impl ScoringConfig {
    pub fn interaction_weights(&self) -> InteractionWeights {
        InteractionWeights {
            like: self.like_weight,
            comment: self.comment_weight,
            share: self.share_weight,
            collect: self.collect_weight,
        }
    }

    pub fn heat_weights(&self) -> HeatWeights {
        HeatWeights {
            follower: self.heat_follower_weight,
            avg_play: self.heat_play_weight,
            avg_like: self.heat_like_weight,
            avg_comment: self.heat_comment_weight,
        }
    }
}

fn default_app_name() -> String {
    "douyin-insight-service".to_string()
}

fn default_app_env() -> String {
    "development".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_allowed_origins() -> String {
    "*".to_string()
}

fn default_tikhub_base_url() -> String {
    "https://api.tikhub.io".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000 // 1s, 2s, 4s
}

fn default_product_sales_path() -> String {
    "/api/v1/douyin/billboard/fetch_hot_product_sales_list".to_string()
}

fn default_page_size() -> u32 {
    20
}

fn default_max_pages() -> u32 {
    5
}

fn default_candidate_multiplier() -> u32 {
    3
}

fn default_account_lookup_concurrency() -> usize {
    8
}

fn default_account_video_sample() -> u32 {
    20
}

fn default_product_categories() -> Vec<String> {
    [
        "beauty",
        "fashion",
        "food",
        "digital",
        "home",
        "mother_baby",
        "sports",
        "books",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

fn default_like_weight() -> f64 {
    1.0
}

fn default_comment_weight() -> f64 {
    1.5
}

fn default_share_weight() -> f64 {
    1.0
}

fn default_collect_weight() -> f64 {
    1.5
}

fn default_heat_follower_weight() -> f64 {
    0.3
}

fn default_heat_play_weight() -> f64 {
    0.4
}

fn default_heat_like_weight() -> f64 {
    0.2
}

fn default_heat_comment_weight() -> f64 {
    0.1
}

impl Config {
    /// Load configuration from `.env` and the process environment
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        Ok(Config {
            app: envy::prefixed("APP_").from_env()?,
            tikhub: envy::prefixed("TIKHUB_").from_env()?,
            ranking: envy::prefixed("RANKING_").from_env()?,
            scoring: envy::prefixed("SCORING_").from_env()?,
        })
    }
}
