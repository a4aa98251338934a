use tracing::info;

use super::cohort::{CohortFilter, FollowerRange};
use super::{RankingError, RankingPipeline, Result};
use crate::models::{AccountRecord, AccountType, RankedReport, ScoredRecord};

/// Competitor-account heat reports
#[derive(Clone)]
pub struct CompetitorAccountService {
    pipeline: RankingPipeline,
}

impl CompetitorAccountService {
    pub fn new(pipeline: RankingPipeline) -> Self {
        Self { pipeline }
    }

    /// Heat record for one account, averaged over its recent posts
    pub async fn account_heat(&self, account_id: &str) -> Result<ScoredRecord<AccountRecord>> {
        let account_id = account_id.trim();
        if account_id.is_empty() {
            return Err(RankingError::InvalidArgument(
                "account_id must not be empty".to_string(),
            ));
        }

        let account = self
            .pipeline
            .load_account(account_id)
            .await?
            .ok_or_else(|| RankingError::NotFound(format!("account {}", account_id)))?;

        let score = self.pipeline.scorer().account_heat(&account);
        info!(
            account_id,
            score,
            account_type = account.account_type.as_str(),
            "Scored account heat"
        );

        Ok(ScoredRecord::new(account, score).placed_at(1))
    }

    pub async fn heat_ranking(&self, limit: i64) -> Result<RankedReport<AccountRecord>> {
        self.pipeline.rank_accounts(&CohortFilter::new(), limit).await
    }

    /// Heat ranking restricted to one account type.
    /// An unknown type yields an empty report.
    pub async fn heat_ranking_by_type(
        &self,
        account_type: &str,
        limit: i64,
    ) -> Result<RankedReport<AccountRecord>> {
        let filter = CohortFilter::new().with_account_type(account_type);
        self.pipeline.rank_accounts(&filter, limit).await
    }

    pub async fn by_follower_range(
        &self,
        min_followers: Option<i64>,
        max_followers: Option<i64>,
        limit: i64,
    ) -> Result<RankedReport<AccountRecord>> {
        let range = FollowerRange::new(min_followers, max_followers)?;
        let filter = CohortFilter::new().with_follower_range(range);
        self.pipeline.rank_accounts(&filter, limit).await
    }

    pub async fn verified_ranking(&self, limit: i64) -> Result<RankedReport<AccountRecord>> {
        self.heat_ranking_by_type(AccountType::Verified.as_str(), limit)
            .await
    }
}
