//! Per-entity scoring functions
//!
//! Every score is a weighted sum of non-negative inputs: negative or
//! non-finite fields count as zero, so scores are never negative.

use serde::{Deserialize, Serialize};

use crate::models::{AccountProfile, AccountRecord, AccountType, ProductRecord, VideoRecord};

/// Weights for the video interaction score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionWeights {
    pub like: f64,
    pub comment: f64,
    pub share: f64,
    pub collect: f64,
}

impl Default for InteractionWeights {
    fn default() -> Self {
        Self {
            like: 1.0,
            comment: 1.5,
            share: 1.0,
            collect: 1.5,
        }
    }
}

/// Weights for the account heat score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatWeights {
    pub follower: f64,
    pub avg_play: f64,
    pub avg_like: f64,
    pub avg_comment: f64,
}

impl Default for HeatWeights {
    fn default() -> Self {
        Self {
            follower: 0.3,
            avg_play: 0.4,
            avg_like: 0.2,
            avg_comment: 0.1,
        }
    }
}

/// Stateless scorer carrying the configured weights
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scorer {
    interaction: InteractionWeights,
    heat: HeatWeights,
}

impl Scorer {
    pub fn new(interaction: InteractionWeights, heat: HeatWeights) -> Self {
        Self { interaction, heat }
    }

    /// likes*1.0 + comments*1.5 + shares*1.0 + favorites*1.5 with default weights
    pub fn video_interaction(&self, video: &VideoRecord) -> f64 {
        let w = &self.interaction;
        count(video.like_count) * w.like
            + count(video.comment_count) * w.comment
            + count(video.share_count) * w.share
            + count(video.collect_count) * w.collect
    }

    /// followers*0.3 + avg_plays*0.4 + avg_likes*0.2 + avg_comments*0.1 with default weights
    pub fn account_heat(&self, account: &AccountRecord) -> f64 {
        let w = &self.heat;
        count(account.follower_count) * w.follower
            + clamp(account.avg_play_count) * w.avg_play
            + clamp(account.avg_like_count) * w.avg_like
            + clamp(account.avg_comment_count) * w.avg_comment
    }

    pub fn product_sales(&self, product: &ProductRecord) -> f64 {
        clamp(product.sales_amount)
    }
}

fn count(value: i64) -> f64 {
    clamp(value as f64)
}

fn clamp(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Per-video averages over an account's recent posts
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AverageMetrics {
    pub play: f64,
    pub like: f64,
    pub comment: f64,
    pub share: f64,
}

/// Averages over `videos`; all zero when there are none
pub fn average_metrics(videos: &[VideoRecord]) -> AverageMetrics {
    if videos.is_empty() {
        return AverageMetrics::default();
    }

    let n = videos.len() as f64;
    let sum = |f: fn(&VideoRecord) -> i64| videos.iter().map(|v| count(f(v))).sum::<f64>() / n;

    AverageMetrics {
        play: sum(|v| v.play_count),
        like: sum(|v| v.like_count),
        comment: sum(|v| v.comment_count),
        share: sum(|v| v.share_count),
    }
}

/// Verified wins over enterprise; a blank custom verification counts as none
pub fn derive_account_type(verification_type: i64, custom_verify: Option<&str>) -> AccountType {
    if verification_type > 0 {
        AccountType::Verified
    } else if custom_verify.is_some_and(|v| !v.trim().is_empty()) {
        AccountType::Enterprise
    } else {
        AccountType::Normal
    }
}

/// Combine a profile with its recent videos into a heat-rankable record
pub fn build_account_record(profile: AccountProfile, videos: &[VideoRecord]) -> AccountRecord {
    let averages = average_metrics(videos);
    let account_type =
        derive_account_type(profile.verification_type, profile.custom_verify.as_deref());

    AccountRecord {
        account_id: profile.account_id,
        account_name: profile.account_name,
        avatar_url: profile.avatar_url,
        description: profile.signature,
        follower_count: profile.follower_count,
        following_count: profile.following_count,
        video_count: profile.video_count,
        total_like_count: profile.total_like_count,
        avg_play_count: averages.play,
        avg_like_count: averages.like,
        avg_comment_count: averages.comment,
        avg_share_count: averages.share,
        account_type,
        verified: account_type == AccountType::Verified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(likes: i64, comments: i64, shares: i64, collects: i64) -> VideoRecord {
        VideoRecord {
            video_id: "v".to_string(),
            like_count: likes,
            comment_count: comments,
            share_count: shares,
            collect_count: collects,
            ..Default::default()
        }
    }

    #[test]
    fn test_video_interaction_weighted_sum() {
        let scorer = Scorer::default();
        assert_eq!(scorer.video_interaction(&video(100, 20, 10, 5)), 147.5);
    }

    #[test]
    fn test_negative_fields_score_as_zero() {
        let scorer = Scorer::default();
        assert_eq!(scorer.video_interaction(&video(-100, 20, -3, 0)), 30.0);
        assert_eq!(
            scorer.video_interaction(&video(-100, 20, -3, 0)),
            scorer.video_interaction(&video(0, 20, 0, 0))
        );
    }

    #[test]
    fn test_account_heat_weighted_sum() {
        let scorer = Scorer::default();
        let account = AccountRecord {
            follower_count: 50_000,
            avg_play_count: 10_000.0,
            avg_like_count: 2_000.0,
            avg_comment_count: 300.0,
            ..Default::default()
        };

        let score = scorer.account_heat(&account);
        assert!((score - 19_430.0).abs() < 1e-9, "got {}", score);
    }

    #[test]
    fn test_account_heat_ignores_non_finite_averages() {
        let scorer = Scorer::default();
        let account = AccountRecord {
            follower_count: 10,
            avg_play_count: f64::NAN,
            avg_like_count: f64::NEG_INFINITY,
            ..Default::default()
        };
        assert!((scorer.account_heat(&account) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_product_score_is_revenue() {
        let scorer = Scorer::default();
        let product = ProductRecord {
            sales_amount: 1234.5,
            sales_count: 99,
            ..Default::default()
        };
        assert_eq!(scorer.product_sales(&product), 1234.5);

        let refunded = ProductRecord {
            sales_amount: -10.0,
            ..Default::default()
        };
        assert_eq!(scorer.product_sales(&refunded), 0.0);
    }

    #[test]
    fn test_custom_weights() {
        let scorer = Scorer::new(
            InteractionWeights {
                like: 2.0,
                comment: 0.0,
                share: 0.0,
                collect: 0.0,
            },
            HeatWeights::default(),
        );
        assert_eq!(scorer.video_interaction(&video(10, 50, 50, 50)), 20.0);
    }

    #[test]
    fn test_average_metrics() {
        let mut a = video(100, 10, 4, 0);
        a.play_count = 1000;
        let mut b = video(300, 30, 0, 0);
        b.play_count = 3000;

        let avg = average_metrics(&[a, b]);
        assert_eq!(avg.play, 2000.0);
        assert_eq!(avg.like, 200.0);
        assert_eq!(avg.comment, 20.0);
        assert_eq!(avg.share, 2.0);

        assert_eq!(average_metrics(&[]), AverageMetrics::default());
    }

    #[test]
    fn test_derive_account_type() {
        assert_eq!(derive_account_type(1, Some("Brand")), AccountType::Verified);
        assert_eq!(derive_account_type(0, Some("Brand")), AccountType::Enterprise);
        assert_eq!(derive_account_type(0, Some("   ")), AccountType::Normal);
        assert_eq!(derive_account_type(-1, None), AccountType::Normal);
    }

    #[test]
    fn test_build_account_record() {
        let profile = AccountProfile {
            account_id: "sec_1".to_string(),
            account_name: "shop".to_string(),
            follower_count: 5000,
            custom_verify: Some("Official store".to_string()),
            ..Default::default()
        };
        let mut v = video(10, 0, 0, 0);
        v.play_count = 100;

        let record = build_account_record(profile, &[v]);
        assert_eq!(record.account_type, AccountType::Enterprise);
        assert!(!record.verified);
        assert_eq!(record.avg_play_count, 100.0);
        assert_eq!(record.avg_like_count, 10.0);
    }
}
