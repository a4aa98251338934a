use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Vocabulary
// ============================================

/// Entity types the ranking pipeline knows how to rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Video,
    Account,
    Product,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Video => "video",
            EntityKind::Account => "account",
            EntityKind::Product => "product",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "video" => Some(EntityKind::Video),
            "account" => Some(EntityKind::Account),
            "product" => Some(EntityKind::Product),
            _ => None,
        }
    }
}

/// Account classification derived from upstream verification fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Normal, // 普通账号
    Verified,   // 认证账号
    Enterprise, // 企业账号
}

impl AccountType {
    pub const ALL: [AccountType; 3] = [
        AccountType::Normal,
        AccountType::Verified,
        AccountType::Enterprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Normal => "normal",
            AccountType::Verified => "verified",
            AccountType::Enterprise => "enterprise",
        }
    }

    /// Exact, case-sensitive lookup
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

/// Which popular-video list an item was ranked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoKind {
    #[default]
    FullPopular, // 全量爆款
    SameLevel, // 同层级爆款
    LowFan,    // 低粉爆款
}

impl VideoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoKind::FullPopular => "full_popular",
            VideoKind::SameLevel => "same_level",
            VideoKind::LowFan => "low_fan",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "full_popular" => Some(VideoKind::FullPopular),
            "same_level" => Some(VideoKind::SameLevel),
            "low_fan" => Some(VideoKind::LowFan),
            _ => None,
        }
    }
}

/// Named follower-count brackets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowerLevel {
    Low,
    Medium,
    High,
    Super,
}

impl FollowerLevel {
    /// Inclusive `(min, max)` follower bounds; `None` max means unbounded
    pub fn bounds(&self) -> (i64, Option<i64>) {
        match self {
            FollowerLevel::Low => (0, Some(10_000)),
            FollowerLevel::Medium => (10_000, Some(100_000)),
            FollowerLevel::High => (100_000, Some(1_000_000)),
            FollowerLevel::Super => (1_000_000, None),
        }
    }
}

// ============================================
// Raw records
// ============================================

/// A video as returned by the feed / single-video endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub video_id: String,
    pub title: Option<String>,
    pub author_id: String,
    pub author_name: String,
    pub follower_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub share_count: i64,
    pub collect_count: i64,
    pub play_count: i64,
    pub create_time: Option<DateTime<Utc>>,
    pub cover_url: Option<String>,
    pub play_url: Option<String>,
}

/// Account profile as returned by the user-detail endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountProfile {
    pub account_id: String,
    pub account_name: String,
    pub avatar_url: Option<String>,
    pub signature: Option<String>,
    pub follower_count: i64,
    pub following_count: i64,
    pub video_count: i64,
    pub total_like_count: i64,
    pub verification_type: i64,
    pub custom_verify: Option<String>,
}

/// Account with averages computed from its recent videos
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_id: String,
    pub account_name: String,
    pub avatar_url: Option<String>,
    pub description: Option<String>,
    pub follower_count: i64,
    pub following_count: i64,
    pub video_count: i64,
    pub total_like_count: i64,
    pub avg_play_count: f64,
    pub avg_like_count: f64,
    pub avg_comment_count: f64,
    pub avg_share_count: f64,
    pub account_type: AccountType,
    pub verified: bool,
}

/// A product's sales over a time window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: String,
    pub product_name: String,
    pub product_image: Option<String>,
    pub price: f64,
    pub video_id: Option<String>,
    pub sales_count: i64,
    pub sales_amount: f64,
    pub commission_rate: f64,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub shop_name: Option<String>,
    pub time_window_days: u32,
}

// ============================================
// Ranked output
// ============================================

/// A record paired with its score. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord<T> {
    #[serde(flatten)]
    record: T,
    score: f64,
    rank: usize,
}

impl<T> ScoredRecord<T> {
    pub fn new(record: T, score: f64) -> Self {
        Self {
            record,
            score,
            rank: 0,
        }
    }

    pub fn record(&self) -> &T {
        &self.record
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// 1-based position in its report; 0 before placement
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub(crate) fn placed_at(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }
}

/// Ordered, truncated, filtered output of one ranking run
#[derive(Debug, Clone, Serialize)]
pub struct RankedReport<T> {
    items: Vec<ScoredRecord<T>>,
    limit: usize,
    candidate_count: usize,
    generated_at: DateTime<Utc>,
}

impl<T> RankedReport<T> {
    /// Assign ranks 1..n to already-sorted items
    pub(crate) fn from_sorted(
        items: Vec<ScoredRecord<T>>,
        limit: usize,
        candidate_count: usize,
    ) -> Self {
        let items = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| item.placed_at(i + 1))
            .collect();

        Self {
            items,
            limit,
            candidate_count,
            generated_at: Utc::now(),
        }
    }

    pub fn empty(limit: usize) -> Self {
        Self::from_sorted(Vec::new(), limit, 0)
    }

    pub fn items(&self) -> &[ScoredRecord<T>] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ScoredRecord<T>> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Candidates considered before filtering and truncation
    pub fn candidate_count(&self) -> usize {
        self.candidate_count
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn scores(&self) -> Vec<f64> {
        self.items.iter().map(ScoredRecord::score).collect()
    }
}

// generated_at is bookkeeping, not content
impl<T: PartialEq> PartialEq for RankedReport<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
            && self.limit == other.limit
            && self.candidate_count == other.candidate_count
    }
}

/// Report for whichever entity type was requested
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "entity", content = "report", rename_all = "snake_case")]
pub enum EntityReport {
    Video(RankedReport<VideoRecord>),
    Account(RankedReport<AccountRecord>),
    Product(RankedReport<ProductRecord>),
}

impl EntityReport {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityReport::Video(_) => EntityKind::Video,
            EntityReport::Account(_) => EntityKind::Account,
            EntityReport::Product(_) => EntityKind::Product,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EntityReport::Video(r) => r.len(),
            EntityReport::Account(r) => r.len(),
            EntityReport::Product(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn scores(&self) -> Vec<f64> {
        match self {
            EntityReport::Video(r) => r.scores(),
            EntityReport::Account(r) => r.scores(),
            EntityReport::Product(r) => r.scores(),
        }
    }
}

/// Popular-video ranking labelled with the list it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularVideoReport {
    pub video_kind: VideoKind,
    #[serde(flatten)]
    pub report: RankedReport<VideoRecord>,
}

/// Revenue rolled up per category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySales {
    pub category: String,
    pub sales_count: i64,
    pub revenue: f64,
}

/// Aggregate product sales over a time window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSalesSummary {
    pub total_sales: i64,
    pub total_revenue: f64,
    pub top_categories: Vec<CategorySales>,
    pub top_products: Vec<ScoredRecord<ProductRecord>>,
    pub time_range_days: u32,
    pub analysis_time: DateTime<Utc>,
}

// ============================================
// API envelope
// ============================================

/// Response envelope shared by every HTTP route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            timestamp: Utc::now(),
        }
    }
}
