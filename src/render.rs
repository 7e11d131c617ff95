//! Terminal rendering of the dashboard panels: comfy-table tables plus text charts.

use analytics::{DailyOrderCount, DashboardReport, PanelView, RatingAggregate, RfmRow};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use configuration::DisplaySettings;
use core_types::Panel;
use std::fmt::{self, Write};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Writes one panel of `report` as a block of text.
pub fn render_panel(
    out: &mut impl Write,
    report: &DashboardReport,
    panel: Panel,
    display: &DisplaySettings,
) -> fmt::Result {
    writeln!(out, "== {} ==", panel.title())?;
    let width = display.chart_width;

    match report.panel(panel, &display.limits()) {
        PanelView::Overview {
            total_orders,
            daily_orders,
        } => {
            writeln!(out, "Total Orders: {total_orders} orders\n")?;
            daily_chart(out, daily_orders, width)
        }
        PanelView::Regions { regions } => {
            let mut table =
                new_table(&["State", "City", "Avg Repeat Purchases", "Repeat Customers"]);
            for region in regions {
                table.add_row(vec![
                    Cell::new(&region.state),
                    Cell::new(&region.city),
                    Cell::new(format!("{:.2}", region.average_purchase_count))
                        .set_alignment(CellAlignment::Right),
                    Cell::new(region.repeat_customers).set_alignment(CellAlignment::Right),
                ]);
            }
            writeln!(out, "Top Regions with Highest Average Repeat Purchases\n{table}")?;

            let bars: Vec<(String, f64)> = regions
                .iter()
                .map(|r| (format!("{}, {}", r.state, r.city), r.average_purchase_count))
                .collect();
            bar_chart(out, "Top Regions by Average Repeat Purchases", &bars, width)
        }
        PanelView::ProductRatings {
            products,
            categories,
        } => {
            let preview = display.table_preview;
            let top_products = &products[..preview.min(products.len())];
            let top_categories = &categories[..preview.min(categories.len())];

            writeln!(
                out,
                "Top Rated Products\n{}",
                ratings_table("Product ID", top_products)
            )?;
            bar_chart(
                out,
                "Top Products by Average Rating",
                &rating_bars(products),
                width,
            )?;
            writeln!(
                out,
                "\nTop Rated Categories\n{}",
                ratings_table("Category Name", top_categories)
            )?;
            bar_chart(
                out,
                "Top Categories by Average Rating",
                &rating_bars(categories),
                width,
            )
        }
        PanelView::Rfm {
            reference_date,
            by_recency,
            by_frequency,
            by_monetary,
            customers,
        } => {
            match reference_date {
                Some(date) => writeln!(out, "Reference date: {date}\n")?,
                None => writeln!(out, "Reference date: n/a\n")?,
            }
            let recency: Vec<(String, f64)> = by_recency
                .iter()
                .map(|r| (r.customer_id.clone(), r.recency as f64))
                .collect();
            let frequency: Vec<(String, f64)> = by_frequency
                .iter()
                .map(|r| (r.customer_id.clone(), r.frequency as f64))
                .collect();
            let monetary: Vec<(String, f64)> = by_monetary
                .iter()
                .map(|r| (r.customer_id.clone(), decimal_to_f64(r)))
                .collect();
            bar_chart(out, "Top Customers by Recency (days)", &recency, width)?;
            bar_chart(out, "Top Customers by Frequency", &frequency, width)?;
            bar_chart(out, "Top Customers by Monetary Value", &monetary, width)?;
            writeln!(out, "\n{}", rfm_table(customers))
        }
        PanelView::PaymentMethods { payment_methods } => {
            writeln!(
                out,
                "Ratings by Payment Method\n{}",
                ratings_table("Payment Method", payment_methods)
            )?;
            bar_chart(
                out,
                "Average Review Score by Payment Method",
                &rating_bars(payment_methods),
                width,
            )
        }
    }
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(Cell::new));
    table
}

fn ratings_table(key_label: &str, rows: &[RatingAggregate]) -> Table {
    let mut table = new_table(&[key_label, "Avg Review Score", "Reviews"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.key),
            Cell::new(format!("{:.2}", row.average_score)).set_alignment(CellAlignment::Right),
            Cell::new(row.review_count).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn rfm_table(rows: &[RfmRow]) -> Table {
    let mut table = new_table(&["Customer", "Last Purchase", "Frequency", "Monetary", "Recency"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.customer_id),
            Cell::new(row.last_purchase_date),
            Cell::new(row.frequency).set_alignment(CellAlignment::Right),
            Cell::new(row.monetary.round_dp(2)).set_alignment(CellAlignment::Right),
            Cell::new(row.recency).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

fn rating_bars(rows: &[RatingAggregate]) -> Vec<(String, f64)> {
    rows.iter().map(|r| (r.key.clone(), r.average_score)).collect()
}

fn decimal_to_f64(row: &RfmRow) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    row.monetary.to_f64().unwrap_or_default()
}

/// Horizontal bar chart, bars scaled so the largest value spans `width` cells.
pub fn bar_chart(
    out: &mut impl Write,
    title: &str,
    bars: &[(String, f64)],
    width: usize,
) -> fmt::Result {
    writeln!(out, "\n{title}")?;
    if bars.is_empty() {
        return writeln!(out, "  (no data)");
    }

    let label_width = bars
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    let max = bars.iter().map(|(_, value)| *value).fold(0.0_f64, f64::max);

    for (label, value) in bars {
        let cells = if max > 0.0 {
            ((value / max) * width as f64).round() as usize
        } else {
            0
        };
        writeln!(
            out,
            "  {label:<label_width$} │{} {value:.2}",
            "█".repeat(cells)
        )?;
    }
    Ok(())
}

/// Daily order counts as a wrapped sparkline, one row per `width` days.
pub fn daily_chart(
    out: &mut impl Write,
    days: &[DailyOrderCount],
    width: usize,
) -> fmt::Result {
    writeln!(out, "Number of Orders per Day")?;
    let (Some(first), Some(last)) = (days.first(), days.last()) else {
        return writeln!(out, "  (no data)");
    };

    let peak = days.iter().map(|d| d.order_count).max().unwrap_or(0);
    let line: Vec<char> = days
        .iter()
        .map(|d| {
            let level = if peak == 0 {
                0
            } else {
                (d.order_count * (SPARK_LEVELS.len() - 1)) / peak
            };
            SPARK_LEVELS[level]
        })
        .collect();

    for chunk in line.chunks(width.max(1)) {
        writeln!(out, "  {}", chunk.iter().collect::<String>())?;
    }
    if let Some(busiest) = days.iter().find(|d| d.order_count == peak) {
        writeln!(
            out,
            "  {} .. {} ({} days), peak {} on {}",
            first.date,
            last.date,
            days.len(),
            peak,
            busiest.date
        )?;
    }
    Ok(())
}
