//! SVG chart rendering with plotters.

use std::fmt::Display;

use plotters::prelude::*;

use crate::domain::repository::ChartRenderer;
use crate::domain::types::{DailyCount, LabeledCount};
use crate::error::DonationsServiceError;

const CHART_SIZE: (u32, u32) = (800, 400);

fn chart_err<E: Display>(e: E) -> DonationsServiceError {
    DonationsServiceError::Internal(anyhow::anyhow!("render chart: {e}"))
}

#[derive(Clone, Copy, Default)]
pub struct PlottersChartRenderer;

impl ChartRenderer for PlottersChartRenderer {
    fn bar_chart(&self, title: &str, data: &[LabeledCount]) -> Result<String, DonationsServiceError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE).map_err(chart_err)?;

            let max = data.iter().map(|d| d.count).max().unwrap_or(0);
            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 20))
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(40)
                .build_cartesian_2d((0usize..data.len().max(1)).into_segmented(), 0u64..max + 1)
                .map_err(chart_err)?;

            let label = |v: &SegmentValue<usize>| match v {
                SegmentValue::CenterOf(i) => data.get(*i).map(|d| d.label.clone()).unwrap_or_default(),
                _ => String::new(),
            };
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(data.len().max(1))
                .x_label_formatter(&label)
                .y_desc("donations")
                .draw()
                .map_err(chart_err)?;

            chart
                .draw_series(
                    Histogram::vertical(&chart)
                        .style(BLUE.filled())
                        .margin(5)
                        .data(data.iter().enumerate().map(|(i, d)| (i, d.count))),
                )
                .map_err(chart_err)?;

            root.present().map_err(chart_err)?;
        }
        Ok(svg)
    }

    fn line_chart(&self, title: &str, data: &[DailyCount]) -> Result<String, DonationsServiceError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
            root.fill(&WHITE).map_err(chart_err)?;

            let max = data.iter().map(|d| d.count).max().unwrap_or(0);
            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 20))
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(40)
                .build_cartesian_2d(0usize..data.len().max(1), 0u64..max + 1)
                .map_err(chart_err)?;

            let label = |i: &usize| {
                data.get(*i)
                    .map(|d| d.day.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            };
            chart
                .configure_mesh()
                .x_labels(data.len().clamp(1, 10))
                .x_label_formatter(&label)
                .y_desc("donations")
                .draw()
                .map_err(chart_err)?;

            chart
                .draw_series(LineSeries::new(
                    data.iter().enumerate().map(|(i, d)| (i, d.count)),
                    &RED,
                ))
                .map_err(chart_err)?;

            root.present().map_err(chart_err)?;
        }
        Ok(svg)
    }
}
