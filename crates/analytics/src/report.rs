use chrono::NaiveDate;
use core_types::{DateRange, Panel, PanelLimits, RatingDimension, RfmMetric};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Orders placed on a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyOrderCount {
    pub date: NaiveDate,
    /// Number of line-item rows purchased that day.
    pub order_count: usize,
}

/// Average purchase count of repeat customers in one (state, city) region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRepeatPurchase {
    pub state: String,
    pub city: String,
    pub average_purchase_count: f64,
    /// Distinct repeat customers seen in the region.
    pub repeat_customers: usize,
}

/// Mean review score for one grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingAggregate {
    pub key: String,
    pub average_score: f64,
    /// Rows with a review score that went into the mean.
    pub review_count: usize,
}

/// A rating view, sorted by descending mean score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingTable {
    pub dimension: RatingDimension,
    pub rows: Vec<RatingAggregate>,
}

impl RatingTable {
    pub fn empty(dimension: RatingDimension) -> Self {
        Self {
            dimension,
            rows: Vec::new(),
        }
    }

    pub fn head(&self, n: usize) -> &[RatingAggregate] {
        &self.rows[..n.min(self.rows.len())]
    }
}

/// Recency, frequency and monetary value of one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfmRow {
    pub customer_id: String,
    pub last_purchase_date: NaiveDate,
    /// Distinct orders placed.
    pub frequency: usize,
    /// Sum of line-item prices.
    pub monetary: Decimal,
    /// Whole days between the table's reference date and `last_purchase_date`.
    pub recency: i64,
}

/// The per-customer RFM table, ordered by customer id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RfmTable {
    /// Most recent purchase date across the whole filtered set. `None` when it is empty.
    pub reference_date: Option<NaiveDate>,
    pub rows: Vec<RfmRow>,
}

impl RfmTable {
    /// The first `n` customers ranked by `metric`.
    ///
    /// Recency ranks ascending (most recent first); frequency and monetary rank descending.
    /// The sort is stable, so ties keep customer-id order.
    pub fn top_by(&self, metric: RfmMetric, n: usize) -> Vec<&RfmRow> {
        let mut ranked: Vec<&RfmRow> = self.rows.iter().collect();
        match metric {
            RfmMetric::Recency => ranked.sort_by_key(|row| row.recency),
            RfmMetric::Frequency => ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency)),
            RfmMetric::Monetary => ranked.sort_by(|a, b| b.monetary.cmp(&a.monetary)),
        }
        ranked.truncate(n);
        ranked
    }

    pub fn head(&self, n: usize) -> &[RfmRow] {
        &self.rows[..n.min(self.rows.len())]
    }
}

/// Every view computed for one date range.
///
/// This struct is the final output of the `AnalyticsEngine` and is what the terminal
/// panels and the HTTP API render from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub range: DateRange,
    /// Distinct order ids in the filtered set.
    pub total_orders: usize,
    pub daily_orders: Vec<DailyOrderCount>,
    pub repeat_purchases_by_region: Vec<RegionRepeatPurchase>,
    pub product_ratings: RatingTable,
    pub category_ratings: RatingTable,
    pub payment_method_ratings: RatingTable,
    pub rfm: RfmTable,
}

impl DashboardReport {
    /// Creates a report with every view empty.
    /// This is what an empty filtered set produces.
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            total_orders: 0,
            daily_orders: Vec::new(),
            repeat_purchases_by_region: Vec::new(),
            product_ratings: RatingTable::empty(RatingDimension::Product),
            category_ratings: RatingTable::empty(RatingDimension::Category),
            payment_method_ratings: RatingTable::empty(RatingDimension::PaymentType),
            rfm: RfmTable::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_orders == 0
    }

    /// Slices out what a single dashboard panel displays.
    pub fn panel(&self, panel: Panel, limits: &PanelLimits) -> PanelView<'_> {
        match panel {
            Panel::Overview => PanelView::Overview {
                total_orders: self.total_orders,
                daily_orders: &self.daily_orders,
            },
            Panel::Regions => PanelView::Regions {
                regions: head(&self.repeat_purchases_by_region, limits.top_regions),
            },
            Panel::ProductRatings => PanelView::ProductRatings {
                products: self.product_ratings.head(limits.top_products),
                categories: self.category_ratings.head(limits.top_categories),
            },
            Panel::Rfm => PanelView::Rfm {
                reference_date: self.rfm.reference_date,
                by_recency: self.rfm.top_by(RfmMetric::Recency, limits.rfm_top),
                by_frequency: self.rfm.top_by(RfmMetric::Frequency, limits.rfm_top),
                by_monetary: self.rfm.top_by(RfmMetric::Monetary, limits.rfm_top),
                customers: self.rfm.head(limits.table_preview),
            },
            Panel::PaymentMethods => PanelView::PaymentMethods {
                payment_methods: &self.payment_method_ratings.rows,
            },
        }
    }
}

/// The slice of a `DashboardReport` shown by one panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum PanelView<'a> {
    Overview {
        total_orders: usize,
        daily_orders: &'a [DailyOrderCount],
    },
    Regions {
        regions: &'a [RegionRepeatPurchase],
    },
    ProductRatings {
        products: &'a [RatingAggregate],
        categories: &'a [RatingAggregate],
    },
    Rfm {
        reference_date: Option<NaiveDate>,
        by_recency: Vec<&'a RfmRow>,
        by_frequency: Vec<&'a RfmRow>,
        by_monetary: Vec<&'a RfmRow>,
        customers: &'a [RfmRow],
    },
    PaymentMethods {
        payment_methods: &'a [RatingAggregate],
    },
}

fn head<T>(rows: &[T], n: usize) -> &[T] {
    &rows[..n.min(rows.len())]
}

/// Descending order on `f64` scores. NaN never reaches here, so it compares as equal.
pub(crate) fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    fn row(customer_id: &str, recency: i64, frequency: usize, monetary: Decimal) -> RfmRow {
        RfmRow {
            customer_id: customer_id.to_string(),
            last_purchase_date: day(10 - recency as u32),
            frequency,
            monetary,
            recency,
        }
    }

    fn table() -> RfmTable {
        RfmTable {
            reference_date: Some(day(10)),
            rows: vec![
                row("a", 3, 1, dec!(50)),
                row("b", 0, 2, dec!(10)),
                row("c", 0, 4, dec!(75.5)),
                row("d", 7, 2, dec!(75.5)),
            ],
        }
    }

    fn ids(rows: Vec<&RfmRow>) -> Vec<&str> {
        rows.into_iter().map(|r| r.customer_id.as_str()).collect()
    }

    #[test]
    fn test_rfm_rankings_are_stable_resorts() {
        let rfm = table();
        assert_eq!(ids(rfm.top_by(RfmMetric::Recency, 3)), vec!["b", "c", "a"]);
        assert_eq!(ids(rfm.top_by(RfmMetric::Frequency, 3)), vec!["c", "b", "d"]);
        assert_eq!(ids(rfm.top_by(RfmMetric::Monetary, 2)), vec!["c", "d"]);
        // The table itself keeps customer-id order.
        assert_eq!(rfm.rows[0].customer_id, "a");
    }

    #[test]
    fn test_panel_views_respect_limits() {
        let mut report = DashboardReport::new(DateRange::new(day(1), day(10)));
        report.rfm = table();
        report.repeat_purchases_by_region = (0..15)
            .map(|i| RegionRepeatPurchase {
                state: "SP".to_string(),
                city: format!("city-{i}"),
                average_purchase_count: 2.0,
                repeat_customers: 1,
            })
            .collect();

        let limits = PanelLimits::default();
        match report.panel(Panel::Regions, &limits) {
            PanelView::Regions { regions } => assert_eq!(regions.len(), 10),
            other => panic!("unexpected view: {other:?}"),
        }
        match report.panel(Panel::Rfm, &PanelLimits { rfm_top: 2, ..limits }) {
            PanelView::Rfm { by_recency, customers, .. } => {
                assert_eq!(by_recency.len(), 2);
                assert_eq!(customers.len(), 4);
            }
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[test]
    fn test_panel_view_is_tagged_json() {
        let report = DashboardReport::new(DateRange::new(day(1), day(2)));
        let view = report.panel(Panel::PaymentMethods, &PanelLimits::default());
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["panel"], "payment_methods");
        assert!(json["payment_methods"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_descending_orders_scores() {
        let mut scores = vec![3.0, 5.0, 4.5];
        scores.sort_by(|a, b| descending(*a, *b));
        assert_eq!(scores, vec![5.0, 4.5, 3.0]);
    }
}
