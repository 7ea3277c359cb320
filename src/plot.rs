//! # plot.rs
//!
//! Comparative violin plots of the unified metrics table.
//!
//! [`make_plots`] decides which metrics are drawn and [`Renderer`] draws one
//! of them. [`ViolinRenderer`] is the `plotters` implementation: one violin
//! per dataset label, estimated with a Gaussian kernel, with the quartile box
//! and median drawn on top.

use std::error::Error;
use std::path::PathBuf;

use itertools::Itertools;
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::config::{FigureFormat, OutputPrefix};
use crate::error::{NanoCompError, Result};
use crate::metrics::{DatasetLabel, Metric, UnifiedTable};

/// Draws one distribution plot of `metric` and returns the written file.
pub trait Renderer {
    fn violin_plot(
        &self,
        table: &UnifiedTable,
        metric: Metric,
        output: &OutputPrefix,
        format: FigureFormat,
        log_scale: bool,
    ) -> Result<PathBuf>;
}

/// Draw every comparison plot of a run.
///
/// `lengths`, `log length` and `quals` are always drawn; `percentIdentity`
/// only when the table has that column. `log length` must already be derived.
pub fn make_plots<R>(
    table: &UnifiedTable,
    renderer: &R,
    output: &OutputPrefix,
    format: FigureFormat,
) -> Result<Vec<PathBuf>>
where
    R: Renderer + ?Sized,
{
    let mut plots = vec![
        (Metric::Lengths, false),
        (Metric::LogLength, true),
        (Metric::Quals, false),
    ];
    if table.has_column(Metric::PercentIdentity) {
        plots.push((Metric::PercentIdentity, false));
    }

    plots
        .into_iter()
        .map(|(metric, log_scale)| renderer.violin_plot(table, metric, output, format, log_scale))
        .collect()
}

/// Output file of the plot of `metric`.
pub fn plot_file(output: &OutputPrefix, metric: Metric, format: FigureFormat) -> PathBuf {
    output.file(&format!(
        "NanoComp_{}.{}",
        metric.column_name().replace(' ', "_"),
        format.extension()
    ))
}

const FIGURE_SIZE: (u32, u32) = (1200, 800);
const KDE_POINTS: usize = 100;
const VIOLIN_HALF_WIDTH: f64 = 0.4;

#[derive(Debug, Default, Clone, Copy)]
pub struct ViolinRenderer;

impl Renderer for ViolinRenderer {
    fn violin_plot(
        &self,
        table: &UnifiedTable,
        metric: Metric,
        output: &OutputPrefix,
        format: FigureFormat,
        log_scale: bool,
    ) -> Result<PathBuf> {
        let groups = group_by_dataset(table, metric)?;
        let path = plot_file(output, metric, format);
        info!("Drawing {} violin plot to {}", metric, path.display());

        let drawn = if format.is_vector() {
            let root = SVGBackend::new(&path, FIGURE_SIZE).into_drawing_area();
            draw_violins(&root, &groups, metric, log_scale).and_then(|_| {
                root.present()?;
                Ok(())
            })
        } else {
            let root = BitMapBackend::new(&path, FIGURE_SIZE).into_drawing_area();
            draw_violins(&root, &groups, metric, log_scale).and_then(|_| {
                root.present()?;
                Ok(())
            })
        };

        drawn.map_err(|e| NanoCompError::Render {
            metric: metric.to_string(),
            message: e.to_string(),
        })?;
        Ok(path)
    }
}

/// Values of `metric` split by dataset label, labels in order of first
/// appearance.
pub fn group_by_dataset(table: &UnifiedTable, metric: Metric) -> Result<Vec<(String, Vec<f64>)>> {
    let column = table.column(metric)?;
    let labels: Vec<&DatasetLabel> = column.iter().map(|(label, _)| *label).unique().collect();

    Ok(labels
        .into_iter()
        .map(|label| {
            let values = column
                .iter()
                .filter(|(l, _)| *l == label)
                .map(|(_, v)| *v)
                .collect();
            (label.to_string(), values)
        })
        .collect())
}

/// Summary of one violin: kernel density outline and quartiles.
#[derive(Debug, Clone, PartialEq)]
pub struct ViolinShape {
    /// `(value, density)` with density scaled so the widest point is 1.
    pub outline: Vec<(f64, f64)>,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

impl ViolinShape {
    /// `None` for an empty group. A group without spread has an empty outline.
    pub fn estimate(values: &[f64]) -> Option<ViolinShape> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);

        let bandwidth = scott_bandwidth(&sorted);
        let (min, max) = (sorted[0], sorted[sorted.len() - 1]);
        if bandwidth <= 0.0 || max <= min {
            return Some(ViolinShape {
                outline: Vec::new(),
                q1,
                median,
                q3,
            });
        }

        let step = (max - min) / (KDE_POINTS - 1) as f64;
        let mut outline: Vec<(f64, f64)> = (0..KDE_POINTS)
            .map(|i| {
                let y = min + step * i as f64;
                (y, gaussian_kde(&sorted, bandwidth, y))
            })
            .collect();
        let peak = outline.iter().map(|(_, d)| *d).fold(0.0, f64::max);
        if peak > 0.0 {
            outline.iter_mut().for_each(|(_, d)| *d /= peak);
        }

        Some(ViolinShape {
            outline,
            q1,
            median,
            q3,
        })
    }
}

/// Linear interpolation between closest ranks of sorted data.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

/// Scott's rule, `1.06 * sd * n^(-1/5)`.
pub fn scott_bandwidth(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    1.06 * variance.sqrt() * n.powf(-0.2)
}

fn gaussian_kde(values: &[f64], bandwidth: f64, at: f64) -> f64 {
    let norm = 1.0 / ((2.0 * std::f64::consts::PI).sqrt() * bandwidth * values.len() as f64);
    values
        .iter()
        .map(|v| (-0.5 * ((at - v) / bandwidth).powi(2)).exp())
        .sum::<f64>()
        * norm
}

fn draw_violins<DB>(
    root: &DrawingArea<DB, Shift>,
    groups: &[(String, Vec<f64>)],
    metric: Metric,
    log_scale: bool,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let all_values = groups.iter().flat_map(|(_, values)| values.iter().copied());
    let (y_min, y_max) = all_values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let (y_min, y_max) = if y_min.is_finite() && y_max.is_finite() {
        let pad = ((y_max - y_min) * 0.05).max(0.5);
        (y_min - pad, y_max + pad)
    } else {
        (0.0, 1.0)
    };

    let n = groups.len().max(1);
    let names: Vec<String> = groups.iter().map(|(name, _)| name.clone()).collect();
    let x_formatter = |x: &f64| {
        let i = x.round();
        if (x - i).abs() < 1e-6 && i >= 0.0 && (i as usize) < names.len() {
            names[i as usize].clone()
        } else {
            String::new()
        }
    };
    let y_formatter = |y: &f64| {
        if log_scale {
            format!("{:.0}", 10f64.powf(*y))
        } else {
            format!("{:.1}", y)
        }
    };

    let mut chart = ChartBuilder::on(root)
        .caption(
            format!("Comparing {}", metric.axis_label().to_lowercase()),
            ("sans-serif", 28),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .x_desc("dataset")
        .y_desc(metric.axis_label())
        .draw()?;

    for (i, (name, values)) in groups.iter().enumerate() {
        let Some(shape) = ViolinShape::estimate(values) else {
            continue;
        };
        let color = Palette99::pick(i).to_rgba();
        let center = i as f64;

        let mut polygon: Vec<(f64, f64)> = shape
            .outline
            .iter()
            .map(|(y, d)| (center - d * VIOLIN_HALF_WIDTH, *y))
            .collect();
        polygon.extend(
            shape
                .outline
                .iter()
                .rev()
                .map(|(y, d)| (center + d * VIOLIN_HALF_WIDTH, *y)),
        );
        if polygon.is_empty() {
            // no spread, a flat bar at the only value
            polygon = vec![
                (center - VIOLIN_HALF_WIDTH, shape.median),
                (center + VIOLIN_HALF_WIDTH, shape.median),
            ];
            chart
                .draw_series(std::iter::once(PathElement::new(polygon, color.stroke_width(3))))?
                .label(name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
            continue;
        }

        chart
            .draw_series(std::iter::once(Polygon::new(polygon, color.mix(0.6).filled())))?
            .label(name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

        chart.draw_series(std::iter::once(Rectangle::new(
            [(center - 0.03, shape.q1), (center + 0.03, shape.q3)],
            BLACK.filled(),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(center - 0.06, shape.median), (center + 0.06, shape.median)],
            WHITE.stroke_width(2),
        )))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    Ok(())
}
