use chrono::Utc;
use std::collections::HashMap;
use tracing::info;

use super::cohort::{CohortFilter, ResolvedCohort};
use super::pipeline::{rank_candidates, validate_time_window};
use super::{ProductQuery, RankingPipeline, Result};
use crate::models::{CategorySales, ProductRecord, ProductSalesSummary, RankedReport};

/// Products listed in a sales summary
pub const SUMMARY_TOP_PRODUCTS: usize = 10;
/// Categories listed in a sales summary
pub const SUMMARY_TOP_CATEGORIES: usize = 5;

/// Product sales reports
#[derive(Clone)]
pub struct ProductSalesService {
    pipeline: RankingPipeline,
}

impl ProductSalesService {
    pub fn new(pipeline: RankingPipeline) -> Self {
        Self { pipeline }
    }

    /// Best sellers by revenue over the window
    pub async fn top_sales(
        &self,
        limit: i64,
        time_window_days: u32,
    ) -> Result<RankedReport<ProductRecord>> {
        self.pipeline
            .rank_products(&CohortFilter::new(), limit, time_window_days)
            .await
    }

    /// Best sellers in one category; an unknown category yields an empty report
    pub async fn by_category(
        &self,
        category: &str,
        limit: i64,
        time_window_days: u32,
    ) -> Result<RankedReport<ProductRecord>> {
        let filter = CohortFilter::new().with_category(category);
        self.pipeline
            .rank_products(&filter, limit, time_window_days)
            .await
    }

    /// Totals, leading categories and best sellers over the window.
    ///
    /// Aggregates every page the upstream serves for the window, up to
    /// `max_pages`.
    pub async fn summary(&self, time_range_days: u32) -> Result<ProductSalesSummary> {
        let time_range_days = validate_time_window(time_range_days)?;

        let query = ProductQuery {
            time_window_days: time_range_days,
            category: None,
        };
        let pages = self.pipeline.config().max_pages.max(1);
        let products = self.pipeline.fetch_products(query, pages).await?;

        let total_sales = products
            .iter()
            .fold(0i64, |acc, p| acc.saturating_add(p.sales_count.max(0)));
        let total_revenue: f64 = products
            .iter()
            .map(|p| self.pipeline.scorer().product_sales(p))
            .sum();
        let top_categories = self.top_categories(&products);
        let product_count = products.len();

        let top_products = rank_candidates(
            products,
            &ResolvedCohort::default(),
            self.pipeline.scorer(),
            SUMMARY_TOP_PRODUCTS,
        )
        .into_items();

        info!(
            time_range_days,
            total_sales,
            total_revenue,
            product_count,
            category_count = top_categories.len(),
            "Built product sales summary"
        );

        Ok(ProductSalesSummary {
            total_sales,
            total_revenue,
            top_categories,
            top_products,
            time_range_days,
            analysis_time: Utc::now(),
        })
    }

    /// Revenue per category, highest first; uncategorized products are left out
    fn top_categories(&self, products: &[ProductRecord]) -> Vec<CategorySales> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut categories: Vec<CategorySales> = Vec::new();

        for product in products {
            let Some(category) = product.category.as_deref() else {
                continue;
            };
            let revenue = self.pipeline.scorer().product_sales(product);
            let units = product.sales_count.max(0);

            match positions.get(category) {
                Some(&i) => {
                    categories[i].sales_count = categories[i].sales_count.saturating_add(units);
                    categories[i].revenue += revenue;
                }
                None => {
                    positions.insert(category, categories.len());
                    categories.push(CategorySales {
                        category: category.to_string(),
                        sales_count: units,
                        revenue,
                    });
                }
            }
        }

        categories.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
        categories.truncate(SUMMARY_TOP_CATEGORIES);
        categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RankingConfig;
    use crate::services::{MockUpstreamSource, Page, RankingError, Scorer};
    use std::sync::Arc;

    fn product(id: &str, category: Option<&str>, units: i64, revenue: f64) -> ProductRecord {
        ProductRecord {
            product_id: id.to_string(),
            product_name: format!("product {}", id),
            category: category.map(str::to_string),
            sales_count: units,
            sales_amount: revenue,
            time_window_days: 7,
            ..Default::default()
        }
    }

    fn service(mock: MockUpstreamSource) -> ProductSalesService {
        let config = RankingConfig {
            max_pages: 1,
            ..Default::default()
        };
        ProductSalesService::new(RankingPipeline::new(
            Arc::new(mock),
            Scorer::default(),
            config,
        ))
    }

    fn catalog_mock() -> MockUpstreamSource {
        let mut mock = MockUpstreamSource::new();
        mock.expect_fetch_product_page().returning(|query, _| {
            let mut items = vec![
                product("lipstick", Some("beauty"), 100, 5_000.0),
                product("serum", Some("beauty"), 20, 4_000.0),
                product("phone", Some("digital"), 3, 6_000.0),
                product("mystery", None, 1, 10.0),
            ];
            if let Some(category) = query.category {
                items.retain(|p| p.category.as_deref() == Some(category.as_str()));
            }
            Ok(Page {
                items,
                has_more: false,
            })
        });
        mock
    }

    #[tokio::test]
    async fn test_top_sales_by_revenue() {
        let report = service(catalog_mock()).top_sales(2, 7).await.unwrap();
        assert_eq!(report.scores(), vec![6_000.0, 5_000.0]);
    }

    #[tokio::test]
    async fn test_by_category_passes_hint_and_filters() {
        let report = service(catalog_mock())
            .by_category("beauty", 10, 7)
            .await
            .unwrap();

        assert_eq!(report.len(), 2);
        assert!(report
            .items()
            .iter()
            .all(|i| i.record().category.as_deref() == Some("beauty")));
    }

    #[tokio::test]
    async fn test_unknown_category_is_empty() {
        let mut mock = MockUpstreamSource::new();
        mock.expect_fetch_product_page().never();

        let report = service(mock).by_category("weapons", 10, 7).await.unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_summary_totals() {
        let summary = service(catalog_mock()).summary(7).await.unwrap();

        assert_eq!(summary.total_sales, 124);
        assert_eq!(summary.total_revenue, 15_010.0);
        assert_eq!(summary.time_range_days, 7);
        assert_eq!(summary.top_categories.len(), 2);
        assert_eq!(summary.top_categories[0].category, "beauty");
        assert_eq!(summary.top_categories[0].revenue, 9_000.0);
        assert_eq!(summary.top_products.len(), 4);
        assert_eq!(summary.top_products[0].record().product_id, "phone");
    }

    #[tokio::test]
    async fn test_summary_unit_totals_saturate() {
        let mut mock = MockUpstreamSource::new();
        mock.expect_fetch_product_page().returning(|_, _| {
            Ok(Page {
                items: vec![
                    product("a", Some("beauty"), i64::MAX, 1.0),
                    product("b", Some("beauty"), i64::MAX, 1.0),
                    product("c", Some("food"), -3, 1.0),
                ],
                has_more: false,
            })
        });

        let summary = service(mock).summary(7).await.unwrap();

        assert_eq!(summary.total_sales, i64::MAX);
        assert_eq!(summary.top_categories[0].category, "beauty");
        assert_eq!(summary.top_categories[0].sales_count, i64::MAX);
        assert_eq!(summary.top_categories[1].sales_count, 0);
    }

    #[tokio::test]
    async fn test_summary_rejects_out_of_range_window() {
        let mut mock = MockUpstreamSource::new();
        mock.expect_fetch_product_page().never();
        let service = service(mock);

        assert!(matches!(
            service.summary(0).await,
            Err(RankingError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.summary(31).await,
            Err(RankingError::InvalidArgument(_))
        ));
    }
}
