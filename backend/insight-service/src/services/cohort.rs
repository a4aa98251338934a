//! Cohort filtering: follower ranges, account types, categories and
//! percentile bands over a sorted population.

use super::{RankingError, Result};
use crate::config::RankingConfig;
use crate::models::{AccountType, EntityKind, FollowerLevel};

/// Inclusive follower-count bounds; a missing bound imposes no constraint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FollowerRange {
    min: Option<i64>,
    max: Option<i64>,
}

impl FollowerRange {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Result<Self> {
        if let Some(min) = min {
            if min < 0 {
                return Err(RankingError::InvalidArgument(format!(
                    "min_followers must be non-negative, got {}",
                    min
                )));
            }
        }
        if let Some(max) = max {
            if max < 0 {
                return Err(RankingError::InvalidArgument(format!(
                    "max_followers must be non-negative, got {}",
                    max
                )));
            }
        }
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(RankingError::InvalidArgument(format!(
                    "min_followers ({}) exceeds max_followers ({})",
                    min, max
                )));
            }
        }

        Ok(Self { min, max })
    }

    pub fn at_most(max: i64) -> Result<Self> {
        Self::new(None, Some(max))
    }

    pub fn min(&self) -> Option<i64> {
        self.min
    }

    pub fn max(&self) -> Option<i64> {
        self.max
    }

    pub fn contains(&self, followers: i64) -> bool {
        self.min.map_or(true, |min| followers >= min)
            && self.max.map_or(true, |max| followers <= max)
    }
}

impl From<FollowerLevel> for FollowerRange {
    fn from(level: FollowerLevel) -> Self {
        let (min, max) = level.bounds();
        Self {
            min: Some(min),
            max,
        }
    }
}

/// Rank-position band `[lo%, hi%]` over a sorted population
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileBand {
    lo: f64,
    hi: f64,
}

impl PercentileBand {
    pub fn new(lo: f64, hi: f64) -> Result<Self> {
        let valid = lo.is_finite() && hi.is_finite() && 0.0 <= lo && lo <= hi && hi <= 100.0;
        if !valid {
            return Err(RankingError::InvalidArgument(format!(
                "percentile band must satisfy 0 <= lo <= hi <= 100, got [{}, {}]",
                lo, hi
            )));
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    /// 1-based inclusive positions `ceil(lo * n / 100) ..= floor(hi * n / 100)`.
    /// A start of 0 becomes 1. `None` when the range is empty.
    pub fn positions(&self, n: usize) -> Option<(usize, usize)> {
        let total = n as f64;
        let start = ((self.lo * total / 100.0).ceil() as usize).max(1);
        let end = ((self.hi * total / 100.0).floor() as usize).min(n);

        (start <= end).then_some((start, end))
    }

    /// Keep the items of an already-sorted population that fall in the band
    pub fn slice<T>(&self, sorted: Vec<T>) -> Vec<T> {
        match self.positions(sorted.len()) {
            Some((start, end)) => sorted
                .into_iter()
                .skip(start - 1)
                .take(end - start + 1)
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Attributes a record exposes to cohort clauses
pub trait CohortAttributes {
    fn follower_count(&self) -> Option<i64> {
        None
    }

    fn account_type(&self) -> Option<AccountType> {
        None
    }

    fn category(&self) -> Option<&str> {
        None
    }
}

/// Caller-supplied cohort clauses, combined with AND
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CohortFilter {
    follower_range: Option<FollowerRange>,
    account_type: Option<String>,
    category: Option<String>,
    percentile_band: Option<PercentileBand>,
}

impl CohortFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_follower_range(mut self, range: FollowerRange) -> Self {
        self.follower_range = Some(range);
        self
    }

    pub fn with_account_type(mut self, account_type: impl Into<String>) -> Self {
        self.account_type = Some(account_type.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_percentile_band(mut self, band: PercentileBand) -> Self {
        self.percentile_band = Some(band);
        self
    }

    pub fn follower_range(&self) -> Option<&FollowerRange> {
        self.follower_range.as_ref()
    }

    pub fn account_type(&self) -> Option<&str> {
        self.account_type.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn percentile_band(&self) -> Option<&PercentileBand> {
        self.percentile_band.as_ref()
    }

    /// Reject clauses the entity type has no attribute for
    pub fn check_applicable(&self, kind: EntityKind) -> Result<()> {
        let unsupported = match kind {
            EntityKind::Video => {
                if self.account_type.is_some() {
                    Some("account_type")
                } else if self.category.is_some() {
                    Some("category")
                } else {
                    None
                }
            }
            EntityKind::Account => self.category.is_some().then_some("category"),
            EntityKind::Product => {
                if self.follower_range.is_some() {
                    Some("follower range")
                } else if self.account_type.is_some() {
                    Some("account_type")
                } else {
                    None
                }
            }
        };

        match unsupported {
            Some(clause) => Err(RankingError::InvalidArgument(format!(
                "{} filter does not apply to {} rankings",
                clause,
                kind.as_str()
            ))),
            None => Ok(()),
        }
    }

    /// Map vocabulary clauses onto known values.
    ///
    /// Fails with [`RankingError::UnknownCohortValue`] when a value is
    /// outside its vocabulary; categories come from `config`.
    pub fn resolve(&self, config: &RankingConfig) -> Result<ResolvedCohort> {
        let account_type = match self.account_type.as_deref() {
            Some(tag) => Some(AccountType::from_tag(tag).ok_or_else(|| {
                RankingError::UnknownCohortValue {
                    field: "account_type",
                    value: tag.to_string(),
                }
            })?),
            None => None,
        };

        let category = match self.category.as_deref() {
            Some(tag) if config.is_known_category(tag) => Some(tag.to_string()),
            Some(tag) => {
                return Err(RankingError::UnknownCohortValue {
                    field: "category",
                    value: tag.to_string(),
                })
            }
            None => None,
        };

        Ok(ResolvedCohort {
            follower_range: self.follower_range,
            account_type,
            category,
            percentile_band: self.percentile_band,
        })
    }
}

/// Cohort clauses with vocabulary values checked
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedCohort {
    follower_range: Option<FollowerRange>,
    account_type: Option<AccountType>,
    category: Option<String>,
    percentile_band: Option<PercentileBand>,
}

impl ResolvedCohort {
    pub fn percentile_band(&self) -> Option<&PercentileBand> {
        self.percentile_band.as_ref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Attribute clauses only; the band is applied to the sorted population
    pub fn matches<T: CohortAttributes>(&self, record: &T) -> bool {
        if let Some(range) = &self.follower_range {
            if !record.follower_count().is_some_and(|f| range.contains(f)) {
                return false;
            }
        }
        if let Some(wanted) = self.account_type {
            if record.account_type() != Some(wanted) {
                return false;
            }
        }
        if let Some(wanted) = self.category.as_deref() {
            if record.category() != Some(wanted) {
                return false;
            }
        }
        true
    }
}
