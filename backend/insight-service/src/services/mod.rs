/// Ranking services
///
/// Turns TikHub result sets into ranked reports.
///
/// # Architecture
/// - **Scoring**: pure weighted-sum scores per entity type
/// - **Cohort**: follower ranges, account types, categories, percentile bands
/// - **Pipeline**: fetch -> score -> filter -> sort -> truncate
/// - **Reports**: popular videos, competitor accounts, product sales
pub mod cohort;
pub mod competitor_account;
pub mod pipeline;
pub mod popular_video;
pub mod product_sales;
pub mod scoring;

pub use cohort::{CohortFilter, FollowerRange, PercentileBand};
pub use competitor_account::CompetitorAccountService;
pub use pipeline::RankingPipeline;
pub use popular_video::PopularVideoService;
pub use product_sales::ProductSalesService;
pub use scoring::Scorer;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AccountProfile, ProductRecord, VideoRecord};
use crate::tikhub::TikHubError;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown {field}: {value}")]
    UnknownCohortValue { field: &'static str, value: String },

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] TikHubError),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, RankingError>;
pub type UpstreamResult<T> = std::result::Result<T, TikHubError>;

/// One page of an upstream listing, addressed by offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 0-based page index
    pub index: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    /// Offset cursor: items before this page
    pub fn cursor(&self) -> u64 {
        u64::from(self.index) * u64::from(self.size)
    }

    /// 1-based page number
    pub fn number(&self) -> u32 {
        self.index + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
        }
    }
}

/// Upstream product listing parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub time_window_days: u32,
    /// Narrows the upstream listing; the cohort filter still applies
    pub category: Option<String>,
}

/// Data source the ranking pipeline reads from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    /// A page of the recommendation feed
    async fn fetch_feed_page(&self, page: PageRequest) -> UpstreamResult<Page<VideoRecord>>;

    async fn fetch_video(&self, video_id: &str) -> UpstreamResult<Option<VideoRecord>>;

    /// `Ok(None)` when the upstream has no user payload for the id
    async fn fetch_account_profile(
        &self,
        account_id: &str,
    ) -> UpstreamResult<Option<AccountProfile>>;

    /// Recent posts of an account, newest first
    async fn fetch_account_videos(
        &self,
        account_id: &str,
        page: PageRequest,
    ) -> UpstreamResult<Page<VideoRecord>>;

    async fn fetch_product_page(
        &self,
        query: ProductQuery,
        page: PageRequest,
    ) -> UpstreamResult<Page<ProductRecord>>;
}
