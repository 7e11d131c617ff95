use crate::error::CoreError;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single line item of the order dataset.
///
/// One order can span several rows (one per product), so `order_id` is not unique
/// across the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_id: String,
    pub customer_city: String,
    pub customer_state: String,
    pub product_id: String,
    pub product_category_name: Option<String>,
    pub payment_type: Option<String>,
    pub review_score: Option<f64>,
    pub price: Option<Decimal>,
    pub order_purchase_timestamp: NaiveDateTime,
    pub order_delivered_customer_date: Option<NaiveDateTime>,
}

impl OrderRecord {
    /// The calendar day the order was placed. All date filtering happens at this granularity.
    pub fn purchase_date(&self) -> NaiveDate {
        self.order_purchase_timestamp.date()
    }
}

/// An inclusive calendar date range `[start, end]`.
///
/// The bounds are not required to be ordered: an inverted range is valid and simply
/// contains no dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parses one `YYYY-MM-DD` bound. `field` names the bound in the error.
    pub fn parse_bound(field: &str, value: &str) -> Result<NaiveDate, CoreError> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|e| CoreError::InvalidInput(field.to_string(), format!("'{value}': {e}")))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Number of calendar days covered, zero for an inverted range.
    pub fn num_days(&self) -> i64 {
        if self.is_inverted() {
            0
        } else {
            (self.end - self.start).num_days() + 1
        }
    }
}

/// How many rows each dashboard panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelLimits {
    pub top_regions: usize,
    pub top_products: usize,
    pub top_categories: usize,
    pub rfm_top: usize,
    /// Rows shown by the plain table previews (ratings heads, RFM head).
    pub table_preview: usize,
}

impl Default for PanelLimits {
    fn default() -> Self {
        Self {
            top_regions: 10,
            top_products: 10,
            top_categories: 10,
            rfm_top: 5,
            table_preview: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_is_inclusive_on_both_bounds() {
        let range = DateRange::new(day(2023, 1, 1), day(2023, 1, 5));
        assert!(range.contains(day(2023, 1, 1)));
        assert!(range.contains(day(2023, 1, 5)));
        assert!(!range.contains(day(2022, 12, 31)));
        assert!(!range.contains(day(2023, 1, 6)));
        assert_eq!(range.num_days(), 5);
    }

    #[test]
    fn test_inverted_range_contains_nothing() {
        let range = DateRange::new(day(2023, 1, 5), day(2023, 1, 1));
        assert!(range.is_inverted());
        assert!(!range.contains(day(2023, 1, 3)));
        assert_eq!(range.num_days(), 0);
    }

    #[test]
    fn test_parse_bound_reports_offending_field() {
        assert_eq!(
            DateRange::parse_bound("start", " 2023-01-01 ").unwrap(),
            day(2023, 1, 1)
        );
        let err = DateRange::parse_bound("end", "02/01/2023").unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(ref field, _) if field == "end"));
        assert!(err.to_string().contains("02/01/2023"));
    }

    #[test]
    fn test_purchase_date_truncates_time() {
        let record = OrderRecord {
            order_id: "o1".into(),
            customer_id: "c1".into(),
            customer_city: "sao paulo".into(),
            customer_state: "SP".into(),
            product_id: "p1".into(),
            product_category_name: None,
            payment_type: Some("credit_card".into()),
            review_score: Some(5.0),
            price: Some(rust_decimal_macros::dec!(10.50)),
            order_purchase_timestamp: day(2023, 1, 1).and_hms_opt(23, 59, 59).unwrap(),
            order_delivered_customer_date: None,
        };
        assert_eq!(record.purchase_date(), day(2023, 1, 1));
    }
}
