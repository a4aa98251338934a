// ============================================
// Ranking Pipeline
// ============================================
//
// fetch -> score -> band -> filter -> truncate
//
// Pages after the first and account lookups run concurrently; results
// are reassembled in fetch order so ties always resolve the same way.

use futures::future::try_join_all;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cohort::{CohortAttributes, CohortFilter, ResolvedCohort};
use super::scoring::{build_account_record, Scorer};
use super::{
    Page, PageRequest, ProductQuery, RankingError, Result, UpstreamResult, UpstreamSource,
};
use crate::config::RankingConfig;
use crate::models::{
    AccountRecord, AccountType, EntityKind, EntityReport, ProductRecord, RankedReport,
    ScoredRecord, VideoRecord,
};

/// Product window used when the caller does not pick one
pub const DEFAULT_TIME_WINDOW_DAYS: u32 = 7;
pub const MAX_TIME_WINDOW_DAYS: u32 = 30;

/// A record the pipeline can score and deduplicate
pub trait RankableRecord: CohortAttributes + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Identity used to drop repeats across pages
    fn dedup_key(&self) -> &str;

    fn score(&self, scorer: &Scorer) -> f64;
}

impl CohortAttributes for VideoRecord {
    fn follower_count(&self) -> Option<i64> {
        Some(self.follower_count)
    }
}

impl RankableRecord for VideoRecord {
    const KIND: EntityKind = EntityKind::Video;

    fn dedup_key(&self) -> &str {
        &self.video_id
    }

    fn score(&self, scorer: &Scorer) -> f64 {
        scorer.video_interaction(self)
    }
}

impl CohortAttributes for AccountRecord {
    fn follower_count(&self) -> Option<i64> {
        Some(self.follower_count)
    }

    fn account_type(&self) -> Option<AccountType> {
        Some(self.account_type)
    }
}

impl RankableRecord for AccountRecord {
    const KIND: EntityKind = EntityKind::Account;

    fn dedup_key(&self) -> &str {
        &self.account_id
    }

    fn score(&self, scorer: &Scorer) -> f64 {
        scorer.account_heat(self)
    }
}

impl CohortAttributes for ProductRecord {
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

impl RankableRecord for ProductRecord {
    const KIND: EntityKind = EntityKind::Product;

    fn dedup_key(&self) -> &str {
        &self.product_id
    }

    fn score(&self, scorer: &Scorer) -> f64 {
        scorer.product_sales(self)
    }
}

/// `limit <= 0` is rejected
pub fn validate_limit(limit: i64) -> Result<usize> {
    if limit <= 0 {
        return Err(RankingError::InvalidArgument(format!(
            "limit must be positive, got {}",
            limit
        )));
    }
    usize::try_from(limit)
        .map_err(|_| RankingError::InvalidArgument(format!("limit out of range: {}", limit)))
}

pub fn validate_time_window(days: u32) -> Result<u32> {
    if !(1..=MAX_TIME_WINDOW_DAYS).contains(&days) {
        return Err(RankingError::InvalidArgument(format!(
            "time range must be between 1 and {} days, got {}",
            MAX_TIME_WINDOW_DAYS, days
        )));
    }
    Ok(days)
}

/// Score, band, filter and truncate an in-memory candidate set.
///
/// Candidates keep their position as the tie-breaker, so identical inputs
/// always produce identical reports.
pub fn rank_candidates<T: RankableRecord>(
    candidates: Vec<T>,
    cohort: &ResolvedCohort,
    scorer: &Scorer,
    limit: usize,
) -> RankedReport<T> {
    let candidate_count = candidates.len();

    let mut scored: Vec<ScoredRecord<T>> = candidates
        .into_iter()
        .map(|record| {
            let score = record.score(scorer);
            ScoredRecord::new(record, score)
        })
        .collect();

    // sort_by is stable: equal scores stay in fetch order
    scored.sort_by(|a, b| b.score().total_cmp(&a.score()));

    if let Some(band) = cohort.percentile_band() {
        scored = band.slice(scored);
    }

    let items: Vec<_> = scored
        .into_iter()
        .filter(|item| cohort.matches(item.record()))
        .take(limit)
        .collect();

    debug!(
        entity = T::KIND.as_str(),
        candidate_count,
        output_count = items.len(),
        "Ranked candidates"
    );

    RankedReport::from_sorted(items, limit, candidate_count)
}

/// Keep the first occurrence of every key
fn dedup_first<T: RankableRecord>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.dedup_key().to_string()))
        .collect()
}

/// Group videos by author id in first-seen order; authorless videos are dropped
fn group_by_author(videos: Vec<VideoRecord>) -> Vec<(String, Vec<VideoRecord>)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<VideoRecord>)> = Vec::new();

    for video in videos {
        if video.author_id.is_empty() {
            continue;
        }
        match positions.get(&video.author_id) {
            Some(&i) => groups[i].1.push(video),
            None => {
                positions.insert(video.author_id.clone(), groups.len());
                groups.push((video.author_id.clone(), vec![video]));
            }
        }
    }

    groups
}

/// Ranking pipeline over an upstream source
#[derive(Clone)]
pub struct RankingPipeline {
    upstream: Arc<dyn UpstreamSource>,
    scorer: Scorer,
    config: RankingConfig,
}

impl RankingPipeline {
    pub fn new(upstream: Arc<dyn UpstreamSource>, scorer: Scorer, config: RankingConfig) -> Self {
        Self {
            upstream,
            scorer,
            config,
        }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub fn upstream(&self) -> &Arc<dyn UpstreamSource> {
        &self.upstream
    }

    /// Rank any entity type. Products use the default time window.
    pub async fn rank(
        &self,
        kind: EntityKind,
        filter: &CohortFilter,
        limit: i64,
    ) -> Result<EntityReport> {
        match kind {
            EntityKind::Video => self.rank_videos(filter, limit).await.map(EntityReport::Video),
            EntityKind::Account => self
                .rank_accounts(filter, limit)
                .await
                .map(EntityReport::Account),
            EntityKind::Product => self
                .rank_products(filter, limit, DEFAULT_TIME_WINDOW_DAYS)
                .await
                .map(EntityReport::Product),
        }
    }

    pub async fn rank_videos(
        &self,
        filter: &CohortFilter,
        limit: i64,
    ) -> Result<RankedReport<VideoRecord>> {
        let limit = validate_limit(limit)?;
        let Some(cohort) = self.prepare(EntityKind::Video, filter)? else {
            return Ok(RankedReport::empty(limit));
        };

        let candidates = self.fetch_feed_videos(self.pool_pages(limit, &cohort)).await?;
        Ok(self.finish(candidates, &cohort, limit))
    }

    pub async fn rank_accounts(
        &self,
        filter: &CohortFilter,
        limit: i64,
    ) -> Result<RankedReport<AccountRecord>> {
        let limit = validate_limit(limit)?;
        let Some(cohort) = self.prepare(EntityKind::Account, filter)? else {
            return Ok(RankedReport::empty(limit));
        };

        let candidates = self
            .fetch_feed_accounts(self.pool_pages(limit, &cohort))
            .await?;
        Ok(self.finish(candidates, &cohort, limit))
    }

    pub async fn rank_products(
        &self,
        filter: &CohortFilter,
        limit: i64,
        time_window_days: u32,
    ) -> Result<RankedReport<ProductRecord>> {
        let limit = validate_limit(limit)?;
        let time_window_days = validate_time_window(time_window_days)?;
        let Some(cohort) = self.prepare(EntityKind::Product, filter)? else {
            return Ok(RankedReport::empty(limit));
        };

        let query = ProductQuery {
            time_window_days,
            category: cohort.category().map(str::to_string),
        };
        let pages = self.pool_pages(limit, &cohort);
        let candidates = self.fetch_products(query, pages).await?;
        Ok(self.finish(candidates, &cohort, limit))
    }

    /// Check clause applicability and resolve vocabulary values.
    /// `None` means a value is outside its vocabulary and the report is empty.
    fn prepare(&self, kind: EntityKind, filter: &CohortFilter) -> Result<Option<ResolvedCohort>> {
        filter.check_applicable(kind)?;

        match filter.resolve(&self.config) {
            Ok(cohort) => Ok(Some(cohort)),
            Err(RankingError::UnknownCohortValue { field, value }) => {
                warn!(
                    entity = kind.as_str(),
                    field,
                    value = %value,
                    "Unknown cohort value, returning empty report"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn finish<T: RankableRecord>(
        &self,
        candidates: Vec<T>,
        cohort: &ResolvedCohort,
        limit: usize,
    ) -> RankedReport<T> {
        let report = rank_candidates(candidates, cohort, &self.scorer, limit);
        info!(
            entity = T::KIND.as_str(),
            candidate_count = report.candidate_count(),
            output_count = report.len(),
            limit,
            "Ranking complete"
        );
        report
    }

    /// Pages to fetch for one ranking run. A percentile band is defined over
    /// the whole population, so banded runs always use the full pool.
    fn pool_pages(&self, limit: usize, cohort: &ResolvedCohort) -> u32 {
        if cohort.percentile_band().is_some() {
            self.config.max_pages.max(1)
        } else {
            self.config.pages_for(limit)
        }
    }

    /// Fetch up to `pages` offset pages and concatenate them in page order.
    ///
    /// Page 0 goes first; when it reports no more data the rest are never
    /// requested. Remaining pages are fetched concurrently.
    async fn fetch_pages<T, F, Fut>(&self, pages: u32, fetch: F) -> Result<Vec<T>>
    where
        F: Fn(PageRequest) -> Fut,
        Fut: Future<Output = UpstreamResult<Page<T>>>,
    {
        let size = self.config.page_size.max(1);
        let first = fetch(PageRequest::new(0, size)).await?;
        let mut items = first.items;

        if !first.has_more || pages <= 1 {
            debug!(page_count = 1, has_more = first.has_more, "Fetched candidate pages");
            return Ok(items);
        }

        let rest =
            try_join_all((1..pages).map(|index| fetch(PageRequest::new(index, size)))).await?;
        for page in rest {
            items.extend(page.items);
        }

        debug!(page_count = pages, "Fetched candidate pages");
        Ok(items)
    }

    /// Feed pages concatenated in page order, repeats dropped
    pub async fn fetch_feed_videos(&self, pages: u32) -> Result<Vec<VideoRecord>> {
        let fetched = self
            .fetch_pages(pages, |page| self.upstream.fetch_feed_page(page))
            .await?;
        let fetched_count = fetched.len();
        let videos = dedup_first(fetched);

        debug!(
            fetched_count,
            unique_count = videos.len(),
            "Fetched feed candidates"
        );
        Ok(videos)
    }

    /// Authors of feed videos, each looked up once with bounded concurrency.
    ///
    /// Averages come from the author's videos in the feed. Authors whose
    /// profile comes back empty are skipped; any failed lookup fails the batch.
    pub async fn fetch_feed_accounts(&self, pages: u32) -> Result<Vec<AccountRecord>> {
        let videos = self.fetch_feed_videos(pages).await?;
        let groups = group_by_author(videos);
        let author_count = groups.len();

        let upstream = &self.upstream;
        let accounts: Vec<Option<AccountRecord>> = stream::iter(groups)
            .map(|(account_id, videos)| async move {
                let profile = upstream.fetch_account_profile(&account_id).await?;
                if profile.is_none() {
                    debug!(account_id = %account_id, "Empty profile, skipping author");
                }
                Ok::<_, RankingError>(profile.map(|p| build_account_record(p, &videos)))
            })
            .buffered(self.config.account_lookup_concurrency.max(1))
            .try_collect()
            .await?;

        let accounts: Vec<AccountRecord> = dedup_first(accounts.into_iter().flatten());
        debug!(
            author_count,
            account_count = accounts.len(),
            "Fetched account candidates"
        );
        Ok(accounts)
    }

    /// Product pages for one window, repeats dropped
    pub async fn fetch_products(
        &self,
        query: ProductQuery,
        pages: u32,
    ) -> Result<Vec<ProductRecord>> {
        let fetched = self
            .fetch_pages(pages, |page| {
                self.upstream.fetch_product_page(query.clone(), page)
            })
            .await?;

        let products = dedup_first(fetched);
        debug!(
            unique_count = products.len(),
            days = query.time_window_days,
            "Fetched product candidates"
        );
        Ok(products)
    }

    /// One account's record, averages taken from its most recent posts
    pub async fn load_account(&self, account_id: &str) -> Result<Option<AccountRecord>> {
        let Some(profile) = self.upstream.fetch_account_profile(account_id).await? else {
            return Ok(None);
        };

        let sample = PageRequest::new(0, self.config.account_video_sample.max(1));
        let videos = self.upstream.fetch_account_videos(account_id, sample).await?;

        Ok(Some(build_account_record(profile, &videos.items)))
    }
}
