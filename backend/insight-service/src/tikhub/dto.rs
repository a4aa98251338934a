// ============================================
// TikHub wire types (Douyin web endpoints)
// ============================================
//
// TikHub mirrors Douyin's own JSON, which is loose: numbers may be null,
// `has_more` is sometimes 0/1, media URLs are either plain strings or
// `{ "url_list": [...] }` objects. Everything here is decoded leniently
// and converted into the typed records in `crate::models`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::{AccountProfile, ProductRecord, VideoRecord};

/// Response envelope; some endpoints send `code`, others `status_code`
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// `code` wins over `status_code`; absent means success
    pub fn code(&self) -> Option<i64> {
        self.code.or(self.status_code)
    }

    pub fn is_success(&self) -> bool {
        matches!(self.code(), None | Some(0) | Some(200))
    }
}

// ============================================
// Videos
// ============================================

#[derive(Debug, Default, Deserialize)]
pub struct VideoDto {
    #[serde(default)]
    pub aweme_id: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub create_time: Option<i64>,
    #[serde(default)]
    pub author: Option<AuthorDto>,
    #[serde(default)]
    pub statistics: Option<StatisticsDto>,
    #[serde(default, alias = "video_data")]
    pub video: Option<MediaDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthorDto {
    #[serde(default)]
    pub sec_uid: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub follower_count: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatisticsDto {
    #[serde(default)]
    pub digg_count: Option<i64>,
    #[serde(default)]
    pub comment_count: Option<i64>,
    #[serde(default)]
    pub share_count: Option<i64>,
    #[serde(default)]
    pub collect_count: Option<i64>,
    #[serde(default)]
    pub play_count: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MediaDto {
    #[serde(default)]
    pub cover: Option<UrlField>,
    #[serde(default)]
    pub play_addr: Option<UrlField>,
}

/// A media URL, either inline or as Douyin's `url_list` object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UrlField {
    Plain(String),
    List {
        #[serde(default)]
        url_list: Vec<String>,
    },
    Other(Value),
}

impl UrlField {
    pub fn first(&self) -> Option<String> {
        match self {
            UrlField::Plain(url) if !url.is_empty() => Some(url.clone()),
            UrlField::List { url_list } => url_list.first().cloned(),
            _ => None,
        }
    }
}

impl VideoDto {
    pub fn has_statistics(&self) -> bool {
        self.statistics.is_some()
    }

    /// `None` when the payload carries no video id
    pub fn into_record(self) -> Option<VideoRecord> {
        let video_id = self.aweme_id.filter(|id| !id.is_empty())?;
        let author = self.author.unwrap_or_default();
        let stats = self.statistics.unwrap_or_default();
        let media = self.video.unwrap_or_default();

        Some(VideoRecord {
            video_id,
            title: self.desc.filter(|d| !d.is_empty()),
            author_id: author.sec_uid.unwrap_or_default(),
            author_name: author.nickname.unwrap_or_default(),
            follower_count: author.follower_count.unwrap_or(0),
            like_count: stats.digg_count.unwrap_or(0),
            comment_count: stats.comment_count.unwrap_or(0),
            share_count: stats.share_count.unwrap_or(0),
            collect_count: stats.collect_count.unwrap_or(0),
            play_count: stats.play_count.unwrap_or(0),
            create_time: self.create_time.and_then(timestamp),
            cover_url: media.cover.as_ref().and_then(UrlField::first),
            play_url: media.play_addr.as_ref().and_then(UrlField::first),
        })
    }
}

/// `data` of the single-video endpoint: the video itself or wrapped in `aweme_detail`
pub fn single_video(data: Value) -> Result<Option<VideoDto>, serde_json::Error> {
    let inner = match data {
        Value::Object(mut map) => match map.remove("aweme_detail") {
            Some(detail) => detail,
            None => Value::Object(map),
        },
        other => other,
    };

    if inner.is_null() {
        return Ok(None);
    }
    serde_json::from_value(inner).map(Some)
}

/// `data` of the feed and post-list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct VideoListDto {
    #[serde(default)]
    pub aweme_list: Option<Vec<VideoDto>>,
    #[serde(default, deserialize_with = "bool_or_int")]
    pub has_more: bool,
}

// ============================================
// Users
// ============================================

/// `data` of the user-detail endpoint
#[derive(Debug, Default, Deserialize)]
pub struct UserDataDto {
    #[serde(default)]
    pub user: Option<UserDto>,
    #[serde(default)]
    pub stats: Option<UserStatsDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserDto {
    #[serde(default)]
    pub sec_uid: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub avatar_larger: Option<UrlField>,
    #[serde(default)]
    pub verification_type: Option<i64>,
    #[serde(default)]
    pub custom_verify: Option<String>,
    // Some payloads inline the counters on the user object
    #[serde(default)]
    pub follower_count: Option<i64>,
    #[serde(default)]
    pub following_count: Option<i64>,
    #[serde(default)]
    pub aweme_count: Option<i64>,
    #[serde(default)]
    pub total_favorited: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserStatsDto {
    #[serde(default)]
    pub follower_count: Option<i64>,
    #[serde(default)]
    pub following_count: Option<i64>,
    #[serde(default)]
    pub aweme_count: Option<i64>,
    #[serde(default)]
    pub total_favorited: Option<i64>,
}

impl UserDataDto {
    /// `None` when there is no user payload
    pub fn into_profile(self, requested_id: &str) -> Option<AccountProfile> {
        let user = self.user?;
        let stats = self.stats.unwrap_or_default();

        Some(AccountProfile {
            account_id: user
                .sec_uid
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| requested_id.to_string()),
            account_name: user.nickname.unwrap_or_default(),
            avatar_url: user.avatar_larger.as_ref().and_then(UrlField::first),
            signature: user.signature.filter(|s| !s.is_empty()),
            follower_count: stats.follower_count.or(user.follower_count).unwrap_or(0),
            following_count: stats.following_count.or(user.following_count).unwrap_or(0),
            video_count: stats.aweme_count.or(user.aweme_count).unwrap_or(0),
            total_like_count: stats.total_favorited.or(user.total_favorited).unwrap_or(0),
            verification_type: user.verification_type.unwrap_or(0),
            custom_verify: user.custom_verify,
        })
    }
}

// ============================================
// Products
// ============================================

/// `data` of the product sales ranking endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ProductListDto {
    #[serde(default, alias = "products", alias = "items")]
    pub list: Option<Vec<ProductDto>>,
    #[serde(default, deserialize_with = "bool_or_int")]
    pub has_more: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductDto {
    #[serde(default, alias = "id", alias = "promotion_id")]
    pub product_id: Option<Value>,
    #[serde(default, alias = "title", alias = "name")]
    pub product_name: Option<String>,
    #[serde(default, alias = "cover", alias = "image")]
    pub product_image: Option<UrlField>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, alias = "aweme_id")]
    pub video_id: Option<String>,
    #[serde(default, alias = "sales")]
    pub sales_count: Option<i64>,
    #[serde(default, alias = "gmv")]
    pub sales_amount: Option<f64>,
    #[serde(default, alias = "cos_ratio")]
    pub commission_rate: Option<f64>,
    #[serde(default, alias = "category_name")]
    pub category: Option<String>,
    #[serde(default, alias = "brand_name")]
    pub brand: Option<String>,
    #[serde(default)]
    pub shop_name: Option<String>,
}

impl ProductDto {
    /// `None` when the payload carries no product id
    pub fn into_record(self, time_window_days: u32) -> Option<ProductRecord> {
        let product_id = match self.product_id? {
            Value::String(id) if !id.is_empty() => id,
            Value::Number(n) => n.to_string(),
            _ => return None,
        };

        Some(ProductRecord {
            product_id,
            product_name: self.product_name.unwrap_or_default(),
            product_image: self.product_image.as_ref().and_then(UrlField::first),
            price: self.price.unwrap_or(0.0),
            video_id: self.video_id.filter(|v| !v.is_empty()),
            sales_count: self.sales_count.unwrap_or(0),
            sales_amount: self.sales_amount.unwrap_or(0.0),
            commission_rate: self.commission_rate.unwrap_or(0.0),
            category: self.category.filter(|c| !c.is_empty()),
            brand: self.brand.filter(|b| !b.is_empty()),
            shop_name: self.shop_name.filter(|s| !s.is_empty()),
            time_window_days,
        })
    }
}

// ============================================
// Helpers
// ============================================

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_success_codes() {
        let ok: Envelope = serde_json::from_value(json!({"code": 200, "data": {}})).unwrap();
        assert!(ok.is_success());

        let legacy: Envelope =
            serde_json::from_value(json!({"status_code": 0, "data": null})).unwrap();
        assert!(legacy.is_success());

        let bare: Envelope = serde_json::from_value(json!({"data": []})).unwrap();
        assert!(bare.is_success());

        let failed: Envelope =
            serde_json::from_value(json!({"code": 400, "message": "bad id"})).unwrap();
        assert!(!failed.is_success());
        assert_eq!(failed.code(), Some(400));
    }

    #[test]
    fn test_video_decoding_defaults_missing_numbers() {
        let dto: VideoDto = serde_json::from_value(json!({
            "aweme_id": "7301",
            "desc": "cat video",
            "create_time": 1_700_000_000,
            "author": {"sec_uid": "MS4w", "nickname": "cat", "follower_count": null},
            "statistics": {"digg_count": 120, "comment_count": null},
            "video": {
                "cover": {"url_list": ["https://p3/cover.jpg"]},
                "play_addr": "https://v3/play.mp4"
            }
        }))
        .unwrap();

        assert!(dto.has_statistics());
        let record = dto.into_record().unwrap();
        assert_eq!(record.video_id, "7301");
        assert_eq!(record.author_id, "MS4w");
        assert_eq!(record.follower_count, 0);
        assert_eq!(record.like_count, 120);
        assert_eq!(record.comment_count, 0);
        assert_eq!(record.cover_url.as_deref(), Some("https://p3/cover.jpg"));
        assert_eq!(record.play_url.as_deref(), Some("https://v3/play.mp4"));
        assert!(record.create_time.is_some());
    }

    #[test]
    fn test_video_data_alias() {
        let dto: VideoDto = serde_json::from_value(json!({
            "aweme_id": "1",
            "video_data": {"cover": "https://cover"}
        }))
        .unwrap();

        assert!(!dto.has_statistics());
        assert_eq!(
            dto.into_record().unwrap().cover_url.as_deref(),
            Some("https://cover")
        );
    }

    #[test]
    fn test_video_without_id_is_dropped() {
        let dto: VideoDto = serde_json::from_value(json!({"desc": "ad"})).unwrap();
        assert!(dto.into_record().is_none());
    }

    #[test]
    fn test_single_video_unwraps_aweme_detail() {
        let wrapped = single_video(json!({"aweme_detail": {"aweme_id": "9"}}))
            .unwrap()
            .unwrap();
        assert_eq!(wrapped.aweme_id.as_deref(), Some("9"));

        let direct = single_video(json!({"aweme_id": "10"})).unwrap().unwrap();
        assert_eq!(direct.aweme_id.as_deref(), Some("10"));

        assert!(single_video(Value::Null).unwrap().is_none());
    }

    #[test]
    fn test_has_more_accepts_ints() {
        let list: VideoListDto =
            serde_json::from_value(json!({"aweme_list": [], "has_more": 1})).unwrap();
        assert!(list.has_more);

        let list: VideoListDto = serde_json::from_value(json!({"has_more": false})).unwrap();
        assert!(!list.has_more);
        assert!(list.aweme_list.is_none());
    }

    #[test]
    fn test_user_profile_prefers_stats() {
        let data: UserDataDto = serde_json::from_value(json!({
            "user": {
                "sec_uid": "MS4w",
                "nickname": "brand",
                "custom_verify": "Official",
                "follower_count": 1
            },
            "stats": {"follower_count": 52_000, "aweme_count": 31}
        }))
        .unwrap();

        let profile = data.into_profile("MS4w").unwrap();
        assert_eq!(profile.follower_count, 52_000);
        assert_eq!(profile.video_count, 31);
        assert_eq!(profile.custom_verify.as_deref(), Some("Official"));
    }

    #[test]
    fn test_user_without_payload() {
        let data: UserDataDto = serde_json::from_value(json!({"stats": {}})).unwrap();
        assert!(data.into_profile("x").is_none());
    }

    #[test]
    fn test_product_decoding_aliases() {
        let list: ProductListDto = serde_json::from_value(json!({
            "products": [
                {"id": 3301, "title": "lipstick", "gmv": 9800.5, "sales": 120, "category_name": "beauty"},
                {"title": "no id"}
            ],
            "has_more": 0
        }))
        .unwrap();

        let records: Vec<_> = list
            .list
            .unwrap()
            .into_iter()
            .filter_map(|p| p.into_record(7))
            .collect();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product_id, "3301");
        assert_eq!(records[0].sales_amount, 9800.5);
        assert_eq!(records[0].category.as_deref(), Some("beauty"));
        assert_eq!(records[0].time_window_days, 7);
    }
}
