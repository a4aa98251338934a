use tracing::info;

use super::cohort::{CohortFilter, FollowerRange};
use super::{RankingError, RankingPipeline, Result};
use crate::models::{FollowerLevel, PopularVideoReport, ScoredRecord, VideoKind, VideoRecord};

/// Default ceiling for low-follower creators
pub const LOW_FAN_MAX_FOLLOWERS: i64 = 10_000;

/// Popular-video ("爆款") reports on top of the ranking pipeline
#[derive(Clone)]
pub struct PopularVideoService {
    pipeline: RankingPipeline,
}

impl PopularVideoService {
    pub fn new(pipeline: RankingPipeline) -> Self {
        Self { pipeline }
    }

    /// Interaction record and score for a single video
    pub async fn video_interaction(&self, video_id: &str) -> Result<ScoredRecord<VideoRecord>> {
        let video_id = video_id.trim();
        if video_id.is_empty() {
            return Err(RankingError::InvalidArgument(
                "video_id must not be empty".to_string(),
            ));
        }

        let video = self
            .pipeline
            .upstream()
            .fetch_video(video_id)
            .await?
            .ok_or_else(|| RankingError::NotFound(format!("video {}", video_id)))?;

        let score = self.pipeline.scorer().video_interaction(&video);
        info!(video_id, score, "Scored video interaction");

        Ok(ScoredRecord::new(video, score).placed_at(1))
    }

    /// Top videos across the whole feed
    pub async fn full_popular(&self, limit: i64) -> Result<PopularVideoReport> {
        self.ranked(VideoKind::FullPopular, CohortFilter::new(), limit)
            .await
    }

    /// Top videos from creators inside a follower range.
    /// With neither bound given the medium follower level is used.
    pub async fn same_level(
        &self,
        min_followers: Option<i64>,
        max_followers: Option<i64>,
        limit: i64,
    ) -> Result<PopularVideoReport> {
        let range = match (min_followers, max_followers) {
            (None, None) => FollowerRange::from(FollowerLevel::Medium),
            (min, max) => FollowerRange::new(min, max)?,
        };

        let filter = CohortFilter::new().with_follower_range(range);
        self.ranked(VideoKind::SameLevel, filter, limit).await
    }

    /// Top videos from creators with at most `max_followers` followers
    pub async fn low_fan(
        &self,
        max_followers: Option<i64>,
        limit: i64,
    ) -> Result<PopularVideoReport> {
        let range = FollowerRange::at_most(max_followers.unwrap_or(LOW_FAN_MAX_FOLLOWERS))?;

        let filter = CohortFilter::new().with_follower_range(range);
        self.ranked(VideoKind::LowFan, filter, limit).await
    }

    /// Any list by kind, using each list's default cohort
    pub async fn ranking(&self, kind: VideoKind, limit: i64) -> Result<PopularVideoReport> {
        match kind {
            VideoKind::FullPopular => self.full_popular(limit).await,
            VideoKind::SameLevel => self.same_level(None, None, limit).await,
            VideoKind::LowFan => self.low_fan(None, limit).await,
        }
    }

    async fn ranked(
        &self,
        video_kind: VideoKind,
        filter: CohortFilter,
        limit: i64,
    ) -> Result<PopularVideoReport> {
        info!(video_kind = video_kind.as_str(), limit, "Ranking popular videos");

        let report = self.pipeline.rank_videos(&filter, limit).await?;
        Ok(PopularVideoReport { video_kind, report })
    }
}
