//! In-memory upstream for integration tests
//!
//! Serves a fixed feed, profile table and product catalog without any
//! network access, and can be switched into a failing mode.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use insight_service::config::RankingConfig;
use insight_service::models::{AccountProfile, ProductRecord, VideoRecord};
use insight_service::services::{
    Page, PageRequest, ProductQuery, RankingPipeline, Scorer, UpstreamResult, UpstreamSource,
};
use insight_service::tikhub::TikHubError;

#[derive(Default)]
pub struct FakeUpstream {
    feed: Vec<VideoRecord>,
    profiles: HashMap<String, AccountProfile>,
    products: Vec<ProductRecord>,
    failing: bool,
    feed_calls: AtomicUsize,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, feed: Vec<VideoRecord>) -> Self {
        self.feed = feed;
        self
    }

    pub fn with_profile(mut self, profile: AccountProfile) -> Self {
        self.profiles.insert(profile.account_id.clone(), profile);
        self
    }

    pub fn with_products(mut self, products: Vec<ProductRecord>) -> Self {
        self.products = products;
        self
    }

    /// Every call fails with a 503
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn feed_calls(&self) -> usize {
        self.feed_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> UpstreamResult<()> {
        if self.failing {
            return Err(TikHubError::Status {
                status: 503,
                body: "upstream down".to_string(),
            });
        }
        Ok(())
    }
}

fn slice_page<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    let start = (page.cursor() as usize).min(items.len());
    let end = (start + page.size as usize).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        has_more: end < items.len(),
    }
}

#[async_trait]
impl UpstreamSource for FakeUpstream {
    async fn fetch_feed_page(&self, page: PageRequest) -> UpstreamResult<Page<VideoRecord>> {
        self.feed_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(slice_page(&self.feed, page))
    }

    async fn fetch_video(&self, video_id: &str) -> UpstreamResult<Option<VideoRecord>> {
        self.check()?;
        Ok(self.feed.iter().find(|v| v.video_id == video_id).cloned())
    }

    async fn fetch_account_profile(
        &self,
        account_id: &str,
    ) -> UpstreamResult<Option<AccountProfile>> {
        self.check()?;
        Ok(self.profiles.get(account_id).cloned())
    }

    async fn fetch_account_videos(
        &self,
        account_id: &str,
        page: PageRequest,
    ) -> UpstreamResult<Page<VideoRecord>> {
        self.check()?;
        let posts: Vec<VideoRecord> = self
            .feed
            .iter()
            .filter(|v| v.author_id == account_id)
            .cloned()
            .collect();
        Ok(slice_page(&posts, page))
    }

    async fn fetch_product_page(
        &self,
        query: ProductQuery,
        page: PageRequest,
    ) -> UpstreamResult<Page<ProductRecord>> {
        self.check()?;
        let products: Vec<ProductRecord> = self
            .products
            .iter()
            .filter(|p| match &query.category {
                Some(category) => p.category.as_deref() == Some(category.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        Ok(slice_page(&products, page))
    }
}

pub fn video(id: &str, author: &str, likes: i64, followers: i64) -> VideoRecord {
    VideoRecord {
        video_id: id.to_string(),
        title: Some(format!("video {}", id)),
        author_id: author.to_string(),
        author_name: format!("author {}", author),
        follower_count: followers,
        like_count: likes,
        ..Default::default()
    }
}

pub fn profile(id: &str, followers: i64, verification_type: i64) -> AccountProfile {
    AccountProfile {
        account_id: id.to_string(),
        account_name: format!("account {}", id),
        follower_count: followers,
        verification_type,
        ..Default::default()
    }
}

pub fn product(id: &str, category: &str, revenue: f64) -> ProductRecord {
    ProductRecord {
        product_id: id.to_string(),
        product_name: format!("product {}", id),
        category: Some(category.to_string()),
        sales_count: 1,
        sales_amount: revenue,
        time_window_days: 7,
        ..Default::default()
    }
}

/// Feed of `n` videos with distinct like counts 1..=n, one author each
pub fn numbered_feed(n: usize) -> Vec<VideoRecord> {
    (1..=n)
        .map(|i| video(&format!("v{}", i), &format!("a{}", i), i as i64, i as i64 * 100))
        .collect()
}

/// Pages of 20, up to 5 pages: at most 100 candidates
pub fn ranking_config() -> RankingConfig {
    RankingConfig::default()
}

pub fn pipeline(upstream: FakeUpstream) -> RankingPipeline {
    RankingPipeline::new(Arc::new(upstream), Scorer::default(), ranking_config())
}
