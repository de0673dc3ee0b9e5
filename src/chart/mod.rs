// src/chart/mod.rs
//! Static chart rendering with plotters
//!
//! Peripheral presentation glue: each function draws one figure shape to a
//! PNG at a fixed size. Failure to write (missing output directory and the
//! like) surfaces as an error the caller treats as fatal.

use chrono::NaiveDate;
use plotters::prelude::*;
use std::path::Path;

pub const LIGHT_BLUE: RGBColor = RGBColor(0xad, 0xd8, 0xe6);
pub const LIGHT_CORAL: RGBColor = RGBColor(0xf0, 0x80, 0x80);
pub const LIGHT_GREEN: RGBColor = RGBColor(0x90, 0xee, 0x90);
pub const VIOLET: RGBColor = RGBColor(0xee, 0x82, 0xee);

/// Fill colors for bar series, in legend order.
pub const BAR_PALETTE: &[RGBColor] = &[LIGHT_BLUE, LIGHT_CORAL, LIGHT_GREEN, VIOLET];

const FONT: &str = "sans-serif";

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("chart has no data to draw")]
    Empty,

    #[error("drawing error: {0}")]
    Draw(String),
}

fn draw_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Draw(e.to_string())
}

/// One named line of a normalized-trend figure.
#[derive(Debug, Clone)]
pub struct TrendSeries {
    pub name: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// One named series of a grouped bar figure; `values` has one entry per group.
#[derive(Debug, Clone)]
pub struct BarSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Cosmetic options for [`grouped_bar_chart`].
pub struct BarOptions<'a> {
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub y_max: Option<f64>,
    /// Dashed-style horizontal reference (drawn as a thin gray line).
    pub reference_line: Option<f64>,
    pub value_labels: Option<&'a dyn Fn(f64) -> String>,
}

/// Date-ordered trend lines on a log-10 value axis.
///
/// When `version_ticks` is non-empty the built-in date labels are replaced
/// by the given version labels at their dates, matching the benchmark-round
/// x axis of the published figures.
pub fn trend_chart(
    path: &Path,
    x_desc: &str,
    y_desc: &str,
    series: &[TrendSeries],
    y_range: Option<(f64, f64)>,
    version_ticks: &[(NaiveDate, String)],
) -> Result<(), ChartError> {
    let points: Vec<(NaiveDate, f64)> = series.iter().flat_map(|s| s.points.clone()).collect();
    if points.is_empty() {
        return Err(ChartError::Empty);
    }

    let min_date = points.iter().map(|p| p.0).min().unwrap_or_default();
    let max_date = points.iter().map(|p| p.0).max().unwrap_or_default();
    let pad = chrono::Duration::days(30);

    let (y_lo, y_hi) = match y_range {
        Some(range) => range,
        None => {
            let lo = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
            let hi = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
            ((lo / 1.5).max(1e-9), hi * 1.5)
        }
    };

    let root = BitMapBackend::new(path, (1400, 800)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(24)
        .x_label_area_size(70)
        .y_label_area_size(100)
        .build_cartesian_2d((min_date - pad)..(max_date + pad), (y_lo..y_hi).log_scale())
        .map_err(draw_err)?;

    let date_formatter = |d: &NaiveDate| d.format("%m/%y").to_string();
    let value_formatter = |v: &f64| format!("{v:.1}");
    {
        let mut mesh = chart.configure_mesh();
        mesh.light_line_style(WHITE)
            .bold_line_style(BLACK.mix(0.15))
            .y_desc(y_desc)
            .x_label_formatter(&date_formatter)
            .y_label_formatter(&value_formatter)
            .label_style((FONT, 22))
            .axis_desc_style((FONT, 28));
        if version_ticks.is_empty() {
            mesh.x_desc(x_desc);
        } else {
            mesh.disable_x_axis();
        }
        mesh.draw().map_err(draw_err)?;
    }

    for (idx, line) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(LineSeries::new(
                line.points.iter().cloned(),
                color.stroke_width(3),
            ))
            .map_err(draw_err)?
            .label(line.name.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(3)));
        chart
            .draw_series(
                line.points
                    .iter()
                    .map(|&(d, v)| Circle::new((d, v), 5, color.filled())),
            )
            .map_err(draw_err)?;
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.9))
        .label_font((FONT, 22))
        .draw()
        .map_err(draw_err)?;

    if !version_ticks.is_empty() {
        for (date, label) in version_ticks {
            let (px, py) = chart.backend_coord(&(*date, y_lo));
            root.draw(&Text::new(
                label.clone(),
                (px - 4 * label.len() as i32, py + 10),
                (FONT, 22).into_font(),
            ))
            .map_err(draw_err)?;
        }
        let mid = min_date + (max_date - min_date) / 2;
        let (px, py) = chart.backend_coord(&(mid, y_lo));
        root.draw(&Text::new(
            x_desc.to_string(),
            (px - 4 * x_desc.len() as i32, py + 42),
            (FONT, 28).into_font(),
        ))
        .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Grouped bars on a linear value axis, with optional per-bar value labels
/// and a horizontal reference line.
pub fn grouped_bar_chart(
    path: &Path,
    group_labels: &[&str],
    series: &[BarSeries],
    opts: &BarOptions<'_>,
) -> Result<(), ChartError> {
    let n_groups = group_labels.len();
    let n_series = series.len();
    if n_groups == 0 || n_series == 0 {
        return Err(ChartError::Empty);
    }

    let observed_max = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(f64::NEG_INFINITY, f64::max);
    let y_max = opts.y_max.unwrap_or(observed_max * 1.25);
    let slot = n_series as f64 + 1.0;
    let x_max = n_groups as f64 * slot;

    let root = BitMapBackend::new(path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(24)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(-0.5f64..x_max, 0f64..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_x_axis()
        .light_line_style(WHITE)
        .y_desc(opts.y_desc)
        .y_label_formatter(&|v: &f64| format!("{v:.2}"))
        .label_style((FONT, 22))
        .axis_desc_style((FONT, 26))
        .draw()
        .map_err(draw_err)?;

    for (series_idx, bar_series) in series.iter().enumerate() {
        let color = BAR_PALETTE[series_idx % BAR_PALETTE.len()];
        chart
            .draw_series(bar_series.values.iter().enumerate().map(|(group, &v)| {
                let x0 = group as f64 * slot + series_idx as f64;
                let mut bar = Rectangle::new([(x0, 0.0), (x0 + 1.0, v)], color.filled());
                bar.set_margin(0, 0, 2, 2);
                bar
            }))
            .map_err(draw_err)?
            .label(bar_series.name.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));

        if let Some(label_fn) = opts.value_labels {
            chart
                .draw_series(bar_series.values.iter().enumerate().map(|(group, &v)| {
                    let x0 = group as f64 * slot + series_idx as f64;
                    Text::new(
                        label_fn(v),
                        (x0 + 0.1, v + y_max * 0.015),
                        (FONT, 18).into_font(),
                    )
                }))
                .map_err(draw_err)?;
        }
    }

    if let Some(y_ref) = opts.reference_line {
        chart
            .draw_series(LineSeries::new(
                vec![(-0.5, y_ref), (x_max, y_ref)],
                BLACK.mix(0.4).stroke_width(1),
            ))
            .map_err(draw_err)?;
    }

    // Group labels under the (disabled) x axis.
    for (group, label) in group_labels.iter().enumerate() {
        let center = group as f64 * slot + n_series as f64 / 2.0;
        let (px, py) = chart.backend_coord(&(center, 0.0));
        root.draw(&Text::new(
            label.to_string(),
            (px - 4 * label.len() as i32, py + 12),
            (FONT, 22).into_font(),
        ))
        .map_err(draw_err)?;
    }
    let (px, py) = chart.backend_coord(&(x_max / 2.0, 0.0));
    root.draw(&Text::new(
        opts.x_desc.to_string(),
        (px - 4 * opts.x_desc.len() as i32, py + 42),
        (FONT, 26).into_font(),
    ))
    .map_err(draw_err)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.9))
        .label_font((FONT, 22))
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Min/max power bars per system class on a log-10 watt axis, annotated
/// with auto-scaled unit labels.
pub fn power_range_chart(
    path: &Path,
    group_labels: &[&str],
    minima: &[f64],
    maxima: &[f64],
    x_desc: &str,
    y_desc: &str,
    label_fn: &dyn Fn(f64) -> String,
) -> Result<(), ChartError> {
    let n_groups = group_labels.len();
    if n_groups == 0 || minima.len() != n_groups || maxima.len() != n_groups {
        return Err(ChartError::Empty);
    }

    let y_lo = minima.iter().copied().fold(f64::INFINITY, f64::min) / 2.0;
    let y_hi = maxima.iter().copied().fold(f64::NEG_INFINITY, f64::max) * 5.0;
    let slot = 3.0;
    let x_max = n_groups as f64 * slot;

    let root = BitMapBackend::new(path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(24)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d(-0.5f64..x_max, (y_lo..y_hi).log_scale())
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_x_axis()
        .light_line_style(WHITE)
        .y_desc(y_desc)
        .y_label_formatter(&|v: &f64| label_fn(*v))
        .label_style((FONT, 22))
        .axis_desc_style((FONT, 26))
        .draw()
        .map_err(draw_err)?;

    for (series_idx, (values, name)) in [(minima, "Minimum Power"), (maxima, "Maximum Power")]
        .into_iter()
        .enumerate()
    {
        let color = if series_idx == 0 {
            RGBColor(0x69, 0x69, 0x69)
        } else {
            RGBColor(0xd3, 0xd3, 0xd3)
        };
        chart
            .draw_series(values.iter().enumerate().map(|(group, &v)| {
                let x0 = group as f64 * slot + series_idx as f64;
                let mut bar = Rectangle::new([(x0, y_lo), (x0 + 1.0, v)], color.filled());
                bar.set_margin(0, 0, 2, 2);
                bar
            }))
            .map_err(draw_err)?
            .label(name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));

        chart
            .draw_series(values.iter().enumerate().map(|(group, &v)| {
                let x0 = group as f64 * slot + series_idx as f64;
                Text::new(label_fn(v), (x0, v * 1.15), (FONT, 18).into_font())
            }))
            .map_err(draw_err)?;
    }

    for (group, label) in group_labels.iter().enumerate() {
        let center = group as f64 * slot + 1.0;
        let (px, py) = chart.backend_coord(&(center, y_lo));
        root.draw(&Text::new(
            label.to_string(),
            (px - 4 * label.len() as i32, py + 12),
            (FONT, 22).into_font(),
        ))
        .map_err(draw_err)?;
    }
    let (px, py) = chart.backend_coord(&(x_max / 2.0, y_lo));
    root.draw(&Text::new(
        x_desc.to_string(),
        (px - 4 * x_desc.len() as i32, py + 42),
        (FONT, 26).into_font(),
    ))
    .map_err(draw_err)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.9))
        .label_font((FONT, 22))
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Frequency histogram over equal-width bins.
pub fn histogram_chart(
    path: &Path,
    values: &[f64],
    bins: usize,
    x_desc: &str,
    y_desc: &str,
) -> Result<(), ChartError> {
    if values.is_empty() || bins == 0 {
        return Err(ChartError::Empty);
    }

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = ((hi - lo) / bins as f64).max(f64::MIN_POSITIVE);

    let mut counts = vec![0usize; bins];
    for &v in values {
        let bin = (((v - lo) / width) as usize).min(bins - 1);
        counts[bin] += 1;
    }
    let max_count = counts.iter().copied().max().unwrap_or(1) as f64;

    let root = BitMapBackend::new(path, (1000, 450)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(24)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(lo..hi, 0f64..(max_count * 1.1))
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .x_label_formatter(&|v: &f64| format!("{v:.0}"))
        .y_label_formatter(&|v: &f64| format!("{v:.0}"))
        .label_style((FONT, 20))
        .axis_desc_style((FONT, 24))
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(bin, &count)| {
            let x0 = lo + bin as f64 * width;
            Rectangle::new([(x0, 0.0), (x0 + width, count as f64)], LIGHT_CORAL.filled())
        }))
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Stacked energy bars with a secondary-axis line (time-to-train).
#[allow(clippy::too_many_arguments)]
pub fn stacked_bar_line_chart(
    path: &Path,
    group_labels: &[&str],
    segments: &[BarSeries],
    line_name: &str,
    line_values: &[f64],
    x_desc: &str,
    y_desc: &str,
    secondary_y_desc: &str,
) -> Result<(), ChartError> {
    let n_groups = group_labels.len();
    if n_groups == 0 || segments.is_empty() {
        return Err(ChartError::Empty);
    }

    let stack_max = (0..n_groups)
        .map(|g| segments.iter().map(|s| s.values[g]).sum::<f64>())
        .fold(f64::NEG_INFINITY, f64::max);
    let line_max = line_values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let x_range = -0.5f64..(n_groups as f64);

    let root = BitMapBackend::new(path, (1100, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(24)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .right_y_label_area_size(80)
        .build_cartesian_2d(x_range.clone(), 0f64..(stack_max * 1.3))
        .map_err(draw_err)?
        .set_secondary_coord(x_range, 0f64..(line_max * 1.3));

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_x_axis()
        .light_line_style(WHITE)
        .y_desc(y_desc)
        .y_label_formatter(&|v: &f64| format!("{v:.0}"))
        .label_style((FONT, 20))
        .axis_desc_style((FONT, 24))
        .draw()
        .map_err(draw_err)?;

    chart
        .configure_secondary_axes()
        .y_desc(secondary_y_desc)
        .y_label_formatter(&|v: &f64| format!("{v:.0}"))
        .label_style((FONT, 20))
        .axis_desc_style((FONT, 24))
        .draw()
        .map_err(draw_err)?;

    for (segment_idx, segment) in segments.iter().enumerate() {
        let color = BAR_PALETTE[segment_idx % BAR_PALETTE.len()];
        chart
            .draw_series((0..n_groups).map(|g| {
                let base: f64 = segments[..segment_idx].iter().map(|s| s.values[g]).sum();
                let x = g as f64;
                let mut bar = Rectangle::new(
                    [(x - 0.2, base), (x + 0.2, base + segment.values[g])],
                    color.filled(),
                );
                bar.set_margin(0, 0, 1, 1);
                bar
            }))
            .map_err(draw_err)?
            .label(segment.name.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
    }

    chart
        .draw_secondary_series(LineSeries::new(
            line_values.iter().enumerate().map(|(g, &v)| (g as f64, v)),
            RED.stroke_width(3),
        ))
        .map_err(draw_err)?
        .label(line_name)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], RED.stroke_width(3)));
    chart
        .draw_secondary_series(
            line_values
                .iter()
                .enumerate()
                .map(|(g, &v)| Circle::new((g as f64, v), 5, RED.filled())),
        )
        .map_err(draw_err)?;

    for (group, label) in group_labels.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(group as f64, 0.0));
        root.draw(&Text::new(
            label.to_string(),
            (px - 4 * label.len() as i32, py + 12),
            (FONT, 20).into_font(),
        ))
        .map_err(draw_err)?;
    }
    let (px, py) = chart.backend_coord(&((n_groups as f64 - 1.0) / 2.0, 0.0));
    root.draw(&Text::new(
        x_desc.to_string(),
        (px - 4 * x_desc.len() as i32, py + 40),
        (FONT, 24).into_font(),
    ))
    .map_err(draw_err)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.9))
        .label_font((FONT, 20))
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Per-workload energy bars (log-10) with a secondary log-10 line for the
/// operation counts. `bar_colors` picks a palette entry per bar.
#[allow(clippy::too_many_arguments)]
pub fn workload_energy_chart(
    path: &Path,
    labels: &[String],
    bar_values: &[f64],
    bar_colors: &[usize],
    legend: &[(String, usize)],
    line_name: &str,
    line_values: &[f64],
    y_desc: &str,
    secondary_y_desc: &str,
) -> Result<(), ChartError> {
    let n = labels.len();
    if n == 0 || bar_values.len() != n || line_values.len() != n {
        return Err(ChartError::Empty);
    }

    let bar_lo = bar_values.iter().copied().fold(f64::INFINITY, f64::min) / 10.0;
    let bar_hi = bar_values.iter().copied().fold(f64::NEG_INFINITY, f64::max) * 10.0;
    let line_lo = line_values.iter().copied().fold(f64::INFINITY, f64::min) / 10.0;
    let line_hi = line_values.iter().copied().fold(f64::NEG_INFINITY, f64::max) * 10.0;
    let x_range = -0.5f64..(n as f64 - 0.5);

    let root = BitMapBackend::new(path, (1400, 700)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(24)
        .x_label_area_size(110)
        .y_label_area_size(100)
        .right_y_label_area_size(100)
        .build_cartesian_2d(x_range.clone(), (bar_lo..bar_hi).log_scale())
        .map_err(draw_err)?
        .set_secondary_coord(x_range, (line_lo..line_hi).log_scale());

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_x_axis()
        .light_line_style(WHITE)
        .y_desc(y_desc)
        .y_label_formatter(&|v: &f64| format!("{v:.0e}"))
        .label_style((FONT, 20))
        .axis_desc_style((FONT, 24))
        .draw()
        .map_err(draw_err)?;

    chart
        .configure_secondary_axes()
        .y_desc(secondary_y_desc)
        .y_label_formatter(&|v: &f64| format!("{v:.0e}"))
        .label_style((FONT, 20))
        .axis_desc_style((FONT, 24))
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series((0..n).map(|i| {
            let color = BAR_PALETTE[bar_colors[i] % BAR_PALETTE.len()];
            let x = i as f64;
            let mut bar =
                Rectangle::new([(x - 0.35, bar_lo), (x + 0.35, bar_values[i])], color.filled());
            bar.set_margin(0, 0, 1, 1);
            bar
        }))
        .map_err(draw_err)?;

    for (name, color_idx) in legend {
        let color = BAR_PALETTE[*color_idx % BAR_PALETTE.len()];
        chart
            .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())
            .map_err(draw_err)?
            .label(name.clone())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
    }

    chart
        .draw_secondary_series(LineSeries::new(
            line_values.iter().enumerate().map(|(i, &v)| (i as f64, v)),
            GREEN.stroke_width(3),
        ))
        .map_err(draw_err)?
        .label(line_name)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], GREEN.stroke_width(3)));
    chart
        .draw_secondary_series(
            line_values
                .iter()
                .enumerate()
                .map(|(i, &v)| Circle::new((i as f64, v), 4, GREEN.filled())),
        )
        .map_err(draw_err)?;

    for (i, label) in labels.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(i as f64, bar_lo));
        root.draw(&Text::new(
            label.to_string(),
            (px - 4 * label.len() as i32, py + 12),
            (FONT, 16).into_font(),
        ))
        .map_err(draw_err)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.9))
        .label_font((FONT, 20))
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_series_rejected() {
        let path = std::env::temp_dir().join("mlperf_efficiency_empty_chart.png");
        let err = trend_chart(&path, "x", "y", &[], None, &[]);
        assert!(matches!(err, Err(ChartError::Empty)));
    }

    #[test]
    fn test_histogram_requires_values_and_bins() {
        let path = std::env::temp_dir().join("mlperf_efficiency_empty_hist.png");
        assert!(matches!(
            histogram_chart(&path, &[], 20, "x", "y"),
            Err(ChartError::Empty)
        ));
        assert!(matches!(
            histogram_chart(&path, &[1.0], 0, "x", "y"),
            Err(ChartError::Empty)
        ));
    }
}
