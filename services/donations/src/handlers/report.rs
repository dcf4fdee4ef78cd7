use axum::{
    Json,
    extract::{Query, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DonationsServiceError;
use crate::handlers::staff::Staff;
use crate::state::AppState;
use crate::usecase::report::{GetReportUseCase, ReportQuery};

// ── GET /admin/reports/ ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ReportParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub institution: Option<String>,
    pub user: Option<String>,
}

#[derive(Serialize)]
pub struct ReportFilterResponse {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<i32>,
    pub institution: Option<i32>,
    pub user: Option<Uuid>,
}

#[derive(Serialize)]
pub struct ChartResponse {
    pub kind: &'static str,
    pub title: &'static str,
    pub data_uri: String,
    pub cached: bool,
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub filters: ReportFilterResponse,
    pub charts: Vec<ChartResponse>,
}

pub async fn get_reports(
    _staff: Staff,
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<ReportResponse>, DonationsServiceError> {
    let usecase = GetReportUseCase {
        reports: state.report_repo(),
        cache: state.chart_cache(),
        renderer: state.chart_renderer(),
    };
    let view = usecase
        .execute(ReportQuery {
            start_date: params.start_date,
            end_date: params.end_date,
            category: params.category,
            institution: params.institution,
            user: params.user,
        })
        .await?;
    Ok(Json(ReportResponse {
        filters: ReportFilterResponse {
            start_date: view.filter.start_date,
            end_date: view.filter.end_date,
            category: view.filter.category_id,
            institution: view.filter.institution_id,
            user: view.filter.user_id,
        },
        charts: view
            .charts
            .into_iter()
            .map(|c| ChartResponse {
                kind: c.kind.as_str(),
                title: c.title,
                data_uri: c.data_uri,
                cached: c.cached,
            })
            .collect(),
    }))
}
