use crate::{error::AppError, AppState};
use analytics::{DashboardReport, PanelView, RfmRow};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use core_types::{DateRange, Panel, RfmMetric};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Optional `start`/`end` query parameters. Missing bounds default to the dataset's own.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RfmQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(default = "default_metric")]
    pub by: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_metric() -> String {
    "recency".to_string()
}

fn default_limit() -> usize {
    5
}

#[derive(Debug, Serialize)]
pub struct DatasetBounds {
    pub range: Option<DateRange>,
    pub rows: usize,
}

impl RangeQuery {
    fn resolve(&self, state: &AppState) -> Result<DateRange, AppError> {
        let start = self
            .start
            .as_deref()
            .map(|raw| DateRange::parse_bound("start", raw))
            .transpose()?;
        let end = self
            .end
            .as_deref()
            .map(|raw| DateRange::parse_bound("end", raw))
            .transpose()?;
        state
            .table
            .resolve_range(start, end)
            .ok_or_else(|| AppError::NotFound("No orders are loaded".to_string()))
    }
}

/// # GET /api/date-range
/// The purchase date bounds of the loaded dataset (the default filter).
pub async fn get_date_range(State(state): State<Arc<AppState>>) -> Json<DatasetBounds> {
    Json(DatasetBounds {
        range: state.table.purchase_date_bounds(),
        rows: state.table.len(),
    })
}

/// # GET /api/dashboard?start=&end=
/// Recomputes every view for the requested window.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<DashboardReport>, AppError> {
    let range = query.resolve(&state)?;
    let report = state.engine.calculate(state.table.records(), range)?;
    Ok(Json(report))
}

/// # GET /api/panels/:panel?start=&end=
/// The slice of the dashboard shown by a single panel.
pub async fn get_panel(
    Path(panel): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let panel: Panel = panel.parse()?;
    let range = query.resolve(&state)?;
    let report = state.engine.calculate(state.table.records(), range)?;
    let view: PanelView<'_> = report.panel(panel, &state.limits);
    Ok(Json(serde_json::to_value(&view)?))
}

/// # GET /api/rfm/top?by=recency|frequency|monetary&limit=N
pub async fn get_rfm_top(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RfmQuery>,
) -> Result<Json<Vec<RfmRow>>, AppError> {
    let metric: RfmMetric = query.by.parse()?;
    let range = RangeQuery {
        start: query.start,
        end: query.end,
    }
    .resolve(&state)?;
    let report = state.engine.calculate(state.table.records(), range)?;
    let top = report
        .rfm
        .top_by(metric, query.limit)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(top))
}
