//! The individual aggregation queries behind the dashboard.
//!
//! Every function takes the already filtered rows and is pure. Group order, where it is
//! observable, follows the first occurrence of each key in the input rows.

use crate::error::AnalyticsError;
use crate::report::{
    DailyOrderCount, RatingAggregate, RatingTable, RegionRepeatPurchase, RfmRow, RfmTable,
    descending,
};
use chrono::{NaiveDate, NaiveDateTime};
use core_types::{OrderRecord, RatingDimension};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

/// Groups values under their key while remembering the order keys were first seen.
struct FirstSeenGroups<K, A> {
    index: HashMap<K, usize>,
    groups: Vec<(K, A)>,
}

impl<K: Hash + Eq + Clone, A: Default> FirstSeenGroups<K, A> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    fn entry(&mut self, key: K) -> &mut A {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.index.insert(key.clone(), slot);
                self.groups.push((key, A::default()));
                slot
            }
        };
        &mut self.groups[slot].1
    }

    fn into_groups(self) -> Vec<(K, A)> {
        self.groups
    }
}

/// Number of distinct `order_id`s.
pub fn total_orders(orders: &[&OrderRecord]) -> usize {
    orders
        .iter()
        .map(|order| order.order_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Row count per purchase date, ascending by date.
pub fn daily_order_counts(orders: &[&OrderRecord]) -> Vec<DailyOrderCount> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for order in orders {
        *per_day.entry(order.purchase_date()).or_default() += 1;
    }
    per_day
        .into_iter()
        .map(|(date, order_count)| DailyOrderCount { date, order_count })
        .collect()
}

/// Rows per customer, in first-seen customer order.
pub fn customer_purchase_counts<'a>(orders: &[&'a OrderRecord]) -> Vec<(&'a str, usize)> {
    let mut groups: FirstSeenGroups<&str, usize> = FirstSeenGroups::new();
    for order in orders {
        *groups.entry(order.customer_id.as_str()) += 1;
    }
    groups.into_groups()
}

/// Customers with more than one row, mapped to their purchase count.
pub fn repeat_customers<'a>(orders: &[&'a OrderRecord]) -> HashMap<&'a str, usize> {
    customer_purchase_counts(orders)
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .collect()
}

#[derive(Default)]
struct RegionAccumulator<'a> {
    purchase_count_sum: usize,
    rows: usize,
    customers: HashSet<&'a str>,
}

/// Mean purchase count of repeat customers per (state, city), descending.
///
/// Repeat customers are joined back onto their rows, so each row of a repeat customer
/// contributes that customer's purchase count once to its region's mean.
pub fn repeat_purchases_by_region(orders: &[&OrderRecord]) -> Vec<RegionRepeatPurchase> {
    let repeaters = repeat_customers(orders);

    let mut groups: FirstSeenGroups<(&str, &str), RegionAccumulator<'_>> = FirstSeenGroups::new();
    for order in orders {
        let Some(&count) = repeaters.get(order.customer_id.as_str()) else {
            continue;
        };
        let region = groups.entry((order.customer_state.as_str(), order.customer_city.as_str()));
        region.purchase_count_sum += count;
        region.rows += 1;
        region.customers.insert(order.customer_id.as_str());
    }

    let mut regions: Vec<RegionRepeatPurchase> = groups
        .into_groups()
        .into_iter()
        .map(|((state, city), acc)| RegionRepeatPurchase {
            state: state.to_string(),
            city: city.to_string(),
            average_purchase_count: acc.purchase_count_sum as f64 / acc.rows as f64,
            repeat_customers: acc.customers.len(),
        })
        .collect();

    regions.sort_by(|a, b| descending(a.average_purchase_count, b.average_purchase_count));
    regions
}

#[derive(Default)]
struct ScoreAccumulator {
    sum: f64,
    count: usize,
}

fn rating_key(order: &OrderRecord, dimension: RatingDimension) -> Option<&str> {
    match dimension {
        RatingDimension::Product => Some(order.product_id.as_str()),
        RatingDimension::Category => order.product_category_name.as_deref(),
        RatingDimension::PaymentType => order.payment_type.as_deref(),
    }
}

/// Mean review score per key of `dimension`, descending.
///
/// Rows without a key or without a score are skipped. A key that ends up with no scored
/// rows is left out entirely.
pub fn ratings_by(orders: &[&OrderRecord], dimension: RatingDimension) -> RatingTable {
    let mut groups: FirstSeenGroups<&str, ScoreAccumulator> = FirstSeenGroups::new();
    for order in orders {
        let (Some(key), Some(score)) = (rating_key(order, dimension), order.review_score) else {
            continue;
        };
        let acc = groups.entry(key);
        acc.sum += score;
        acc.count += 1;
    }

    let mut rows: Vec<RatingAggregate> = groups
        .into_groups()
        .into_iter()
        .map(|(key, acc)| RatingAggregate {
            key: key.to_string(),
            average_score: acc.sum / acc.count as f64,
            review_count: acc.count,
        })
        .collect();

    rows.sort_by(|a, b| descending(a.average_score, b.average_score));
    RatingTable { dimension, rows }
}

struct CustomerActivity<'a> {
    last_purchase: NaiveDateTime,
    orders: HashSet<&'a str>,
    monetary: Decimal,
}

/// Builds the RFM table, one row per customer ordered by customer id.
///
/// The reference date is the latest purchase date across all of `orders`, so recency is
/// never negative. Fails only if a customer's monetary total overflows `Decimal`.
pub fn rfm_table(orders: &[&OrderRecord]) -> Result<RfmTable, AnalyticsError> {
    let Some(reference_date) = orders.iter().map(|order| order.purchase_date()).max() else {
        return Ok(RfmTable::default());
    };

    let mut customers: BTreeMap<&str, CustomerActivity<'_>> = BTreeMap::new();
    for order in orders {
        let activity = customers
            .entry(order.customer_id.as_str())
            .or_insert_with(|| CustomerActivity {
                last_purchase: order.order_purchase_timestamp,
                orders: HashSet::new(),
                monetary: Decimal::ZERO,
            });
        activity.last_purchase = activity.last_purchase.max(order.order_purchase_timestamp);
        activity.orders.insert(order.order_id.as_str());
        if let Some(price) = order.price {
            activity.monetary = activity.monetary.checked_add(price).ok_or_else(|| {
                AnalyticsError::Calculation {
                    view: "rfm",
                    message: format!(
                        "monetary total overflows for customer {}",
                        order.customer_id
                    ),
                }
            })?;
        }
    }

    let rows = customers
        .into_iter()
        .map(|(customer_id, activity)| {
            let last_purchase_date = activity.last_purchase.date();
            debug_assert!(last_purchase_date <= reference_date);
            RfmRow {
                customer_id: customer_id.to_string(),
                last_purchase_date,
                frequency: activity.orders.len(),
                monetary: activity.monetary,
                recency: (reference_date - last_purchase_date).num_days(),
            }
        })
        .collect();

    Ok(RfmTable {
        reference_date: Some(reference_date),
        rows,
    })
}
