use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::repository::{ChartCache, ChartRenderer, ReportRepository};
use crate::domain::types::{ChartKind, ReportFilter};
use crate::error::{DonationsServiceError, FieldErrors};

/// Raw report query parameters; empty strings count as absent.
#[derive(Debug, Default, Clone)]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub institution: Option<String>,
    pub user: Option<String>,
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ReportQuery {
    pub fn parse(&self) -> Result<ReportFilter, DonationsServiceError> {
        let mut errors = FieldErrors::new();
        let mut filter = ReportFilter::default();

        let mut date = |field: &'static str, raw: &Option<String>| {
            present(raw).and_then(|s| match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.add(field, "Enter a valid date.");
                    None
                }
            })
        };
        filter.start_date = date("start_date", &self.start_date);
        filter.end_date = date("end_date", &self.end_date);

        if let Some(raw) = present(&self.category) {
            match raw.parse() {
                Ok(id) => filter.category_id = Some(id),
                Err(_) => errors.add("category", "Select a valid category."),
            }
        }
        if let Some(raw) = present(&self.institution) {
            match raw.parse() {
                Ok(id) => filter.institution_id = Some(id),
                Err(_) => errors.add("institution", "Select a valid institution."),
            }
        }
        if let Some(raw) = present(&self.user) {
            match Uuid::parse_str(raw) {
                Ok(id) => filter.user_id = Some(id),
                Err(_) => errors.add("user", "Select a valid user."),
            }
        }
        if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
            if start > end {
                errors.add("end_date", "End date must not be before start date.");
            }
        }

        errors.into_result()?;
        Ok(filter)
    }
}

pub fn chart_cache_key(kind: ChartKind, filter: &ReportFilter) -> String {
    format!("charity:chart:{}:{}", kind.as_str(), filter.signature())
}

pub fn svg_data_uri(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg.as_bytes()))
}

#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub kind: ChartKind,
    pub title: &'static str,
    pub data_uri: String,
    pub cached: bool,
}

#[derive(Debug, Clone)]
pub struct ReportView {
    pub filter: ReportFilter,
    pub charts: Vec<RenderedChart>,
}

pub struct GetReportUseCase<R, C, G>
where
    R: ReportRepository,
    C: ChartCache,
    G: ChartRenderer,
{
    pub reports: R,
    pub cache: C,
    pub renderer: G,
}

impl<R, C, G> GetReportUseCase<R, C, G>
where
    R: ReportRepository,
    C: ChartCache,
    G: ChartRenderer,
{
    pub async fn execute(&self, query: ReportQuery) -> Result<ReportView, DonationsServiceError> {
        let filter = query.parse()?;
        let mut charts = Vec::with_capacity(ChartKind::ALL.len());
        for kind in ChartKind::ALL {
            charts.push(self.chart(kind, &filter).await?);
        }
        Ok(ReportView { filter, charts })
    }

    async fn chart(
        &self,
        kind: ChartKind,
        filter: &ReportFilter,
    ) -> Result<RenderedChart, DonationsServiceError> {
        let key = chart_cache_key(kind, filter);
        // The cache is an optimisation only; outages fall through to rendering.
        match self.cache.get(&key).await {
            Ok(Some(data_uri)) => {
                return Ok(RenderedChart {
                    kind,
                    title: kind.title(),
                    data_uri,
                    cached: true,
                });
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, key = %key, "chart cache read failed"),
        }

        let svg = match kind {
            ChartKind::ByInstitution => {
                let data = self.reports.count_by_institution(filter).await?;
                self.renderer.bar_chart(kind.title(), &data)?
            }
            ChartKind::ByCategory => {
                let data = self.reports.count_by_category(filter).await?;
                self.renderer.bar_chart(kind.title(), &data)?
            }
            ChartKind::ByUser => {
                let data = self.reports.count_by_user(filter).await?;
                self.renderer.bar_chart(kind.title(), &data)?
            }
            ChartKind::PerDay => {
                let data = self.reports.count_per_day(filter).await?;
                self.renderer.line_chart(kind.title(), &data)?
            }
        };
        let data_uri = svg_data_uri(&svg);

        if let Err(e) = self.cache.set(&key, &data_uri).await {
            tracing::warn!(error = %e, key = %key, "chart cache write failed");
        }
        Ok(RenderedChart {
            kind,
            title: kind.title(),
            data_uri,
            cached: false,
        })
    }
}
