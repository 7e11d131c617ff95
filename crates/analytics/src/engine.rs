use crate::error::AnalyticsError;
use crate::filter::filter_by_date;
use crate::report::DashboardReport;
use crate::views;
use core_types::{DateRange, OrderRecord, RatingDimension};

/// A stateless calculator for deriving the dashboard views from order rows.
#[derive(Debug, Default, Clone)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for computing the dashboard.
    ///
    /// # Arguments
    ///
    /// * `orders` - The full, unfiltered order table. It is only borrowed.
    /// * `range` - The inclusive purchase-date window to report on.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `DashboardReport` or an `AnalyticsError`.
    pub fn calculate(
        &self,
        orders: &[OrderRecord],
        range: DateRange,
    ) -> Result<DashboardReport, AnalyticsError> {
        let mut report = DashboardReport::new(range);

        if range.is_inverted() {
            tracing::warn!(
                start = %range.start,
                end = %range.end,
                "Start date is after end date; the report will be empty."
            );
        }

        let filtered = filter_by_date(orders, &range);
        tracing::info!(
            start = %range.start,
            end = %range.end,
            rows = filtered.len(),
            "Computing dashboard views."
        );

        if filtered.is_empty() {
            // Nothing in the window: every view stays empty and the order count is zero.
            return Ok(report);
        }

        self.calculate_overview(&filtered, &mut report);
        self.calculate_repeat_purchases(&filtered, &mut report);
        self.calculate_ratings(&filtered, &mut report);
        self.calculate_rfm(&filtered, &mut report)?;

        Ok(report)
    }

    /// Total order count and the per-day series.
    fn calculate_overview(&self, orders: &[&OrderRecord], report: &mut DashboardReport) {
        report.total_orders = views::total_orders(orders);
        report.daily_orders = views::daily_order_counts(orders);
        tracing::debug!(
            total_orders = report.total_orders,
            days = report.daily_orders.len(),
            "Overview computed."
        );
    }

    fn calculate_repeat_purchases(&self, orders: &[&OrderRecord], report: &mut DashboardReport) {
        report.repeat_purchases_by_region = views::repeat_purchases_by_region(orders);
        tracing::debug!(
            regions = report.repeat_purchases_by_region.len(),
            "Repeat purchases by region computed."
        );
    }

    fn calculate_ratings(&self, orders: &[&OrderRecord], report: &mut DashboardReport) {
        report.product_ratings = views::ratings_by(orders, RatingDimension::Product);
        report.category_ratings = views::ratings_by(orders, RatingDimension::Category);
        report.payment_method_ratings = views::ratings_by(orders, RatingDimension::PaymentType);
        tracing::debug!(
            products = report.product_ratings.rows.len(),
            categories = report.category_ratings.rows.len(),
            payment_methods = report.payment_method_ratings.rows.len(),
            "Ratings computed."
        );
    }

    fn calculate_rfm(
        &self,
        orders: &[&OrderRecord],
        report: &mut DashboardReport,
    ) -> Result<(), AnalyticsError> {
        let rfm = views::rfm_table(orders)?;

        tracing::debug!(customers = rfm.rows.len(), "RFM table computed.");
        report.rfm = rfm;
        Ok(())
    }
}
