use core_types::{DateRange, OrderRecord};
use std::sync::Arc;

/// The immutable in-memory order table.
///
/// Cloning is cheap: all clones share the same row storage. Nothing can mutate the rows
/// once the table is built.
#[derive(Debug, Clone, Default)]
pub struct OrderTable {
    records: Arc<[OrderRecord]>,
}

impl OrderTable {
    pub fn from_records(records: Vec<OrderRecord>) -> Self {
        Self {
            records: Arc::from(records),
        }
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The earliest and latest purchase dates in the table, or `None` when it is empty.
    ///
    /// These are the default filter bounds when the caller does not pick a range.
    pub fn purchase_date_bounds(&self) -> Option<DateRange> {
        let mut dates = self.records.iter().map(OrderRecord::purchase_date);
        let first = dates.next()?;
        let (start, end) = dates.fold((first, first), |(lo, hi), date| {
            (lo.min(date), hi.max(date))
        });
        Some(DateRange::new(start, end))
    }

    /// Fills in whichever bound the caller left open from the table's own bounds.
    pub fn resolve_range(
        &self,
        start: Option<chrono::NaiveDate>,
        end: Option<chrono::NaiveDate>,
    ) -> Option<DateRange> {
        match (start, end) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => {
                let bounds = self.purchase_date_bounds()?;
                Some(DateRange::new(
                    start.unwrap_or(bounds.start),
                    end.unwrap_or(bounds.end),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(order_id: &str, date: NaiveDate) -> OrderRecord {
        OrderRecord {
            order_id: order_id.to_string(),
            customer_id: "c1".to_string(),
            customer_city: "curitiba".to_string(),
            customer_state: "PR".to_string(),
            product_id: "p1".to_string(),
            product_category_name: None,
            payment_type: None,
            review_score: None,
            price: None,
            order_purchase_timestamp: date.and_hms_opt(12, 0, 0).unwrap(),
            order_delivered_customer_date: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 3, d).unwrap()
    }

    #[test]
    fn test_bounds_of_empty_table() {
        let table = OrderTable::default();
        assert!(table.is_empty());
        assert_eq!(table.purchase_date_bounds(), None);
        assert_eq!(table.resolve_range(None, Some(day(1))), None);
    }

    #[test]
    fn test_bounds_ignore_row_order() {
        let table = OrderTable::from_records(vec![
            record("b", day(14)),
            record("a", day(2)),
            record("c", day(9)),
        ]);
        assert_eq!(table.purchase_date_bounds(), Some(DateRange::new(day(2), day(14))));
    }

    #[test]
    fn test_resolve_range_keeps_explicit_bounds() {
        let table = OrderTable::from_records(vec![record("a", day(2)), record("b", day(14))]);
        assert_eq!(
            table.resolve_range(Some(day(5)), None),
            Some(DateRange::new(day(5), day(14)))
        );
        assert_eq!(
            table.resolve_range(Some(day(20)), Some(day(1))),
            Some(DateRange::new(day(20), day(1)))
        );
    }

    #[test]
    fn test_clones_share_rows() {
        let table = OrderTable::from_records(vec![record("a", day(2))]);
        let clone = table.clone();
        assert!(std::ptr::eq(table.records().as_ptr(), clone.records().as_ptr()));
    }
}
