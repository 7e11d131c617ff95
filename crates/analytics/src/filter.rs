use core_types::{DateRange, OrderRecord};

/// Selects the rows whose purchase date falls inside `range`, keeping source order.
///
/// The source slice is only borrowed. An inverted range yields an empty selection.
pub fn filter_by_date<'a>(orders: &'a [OrderRecord], range: &DateRange) -> Vec<&'a OrderRecord> {
    if range.is_inverted() {
        return Vec::new();
    }
    orders
        .iter()
        .filter(|order| range.contains(order.purchase_date()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn order(order_id: &str, timestamp: &str) -> OrderRecord {
        OrderRecord {
            order_id: order_id.to_string(),
            customer_id: format!("cust-{order_id}"),
            customer_city: "belo horizonte".to_string(),
            customer_state: "MG".to_string(),
            product_id: "p1".to_string(),
            product_category_name: None,
            payment_type: None,
            review_score: None,
            price: None,
            order_purchase_timestamp: chrono::NaiveDateTime::parse_from_str(
                timestamp,
                "%Y-%m-%d %H:%M:%S",
            )
            .unwrap(),
            order_delivered_customer_date: None,
        }
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(
            DateRange::parse_bound("start", start).unwrap(),
            DateRange::parse_bound("end", end).unwrap(),
        )
    }

    #[test]
    fn test_bounds_are_inclusive_at_day_granularity() {
        let orders = vec![
            order("early", "2023-01-01 00:00:00"),
            order("late", "2023-01-05 23:59:59"),
            order("outside", "2023-01-06 00:00:00"),
        ];
        let selected = filter_by_date(&orders, &range("2023-01-01", "2023-01-05"));
        let ids: Vec<_> = selected.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[test]
    fn test_every_selected_row_is_within_range() {
        let orders: Vec<_> = (1..=28)
            .map(|d| order(&d.to_string(), &format!("2023-02-{d:02} 12:00:00")))
            .collect();
        let window = range("2023-02-10", "2023-02-20");
        let selected = filter_by_date(&orders, &window);
        assert_eq!(selected.len(), 11);
        assert!(selected.iter().all(|o| {
            let date = o.purchase_date();
            date >= NaiveDate::from_ymd_opt(2023, 2, 10).unwrap()
                && date <= NaiveDate::from_ymd_opt(2023, 2, 20).unwrap()
        }));
    }

    #[test]
    fn test_inverted_range_selects_nothing() {
        let orders = vec![order("a", "2023-01-03 10:00:00")];
        assert!(filter_by_date(&orders, &range("2023-01-05", "2023-01-01")).is_empty());
        // Source rows are untouched.
        assert_eq!(orders.len(), 1);
    }
}
