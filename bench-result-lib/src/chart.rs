use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle};
use std::sync::OnceLock;
use tracing::debug;

use crate::{Result, ResultError, Series};

/// Width and height of rendered charts, in pixels.
pub const CHART_SIZE: (u32, u32) = (800, 600);

/// Process-wide text rendering options.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// CSS-style family list. The first entry must cover CJK glyphs for the titles.
    pub font_family: String,
    /// Draw negative tick labels with U+2212 instead of an ASCII hyphen.
    pub unicode_minus: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            font_family: String::from("SimHei, sans-serif"),
            unicode_minus: false,
        }
    }
}

static RENDER_CONFIG: OnceLock<RenderConfig> = OnceLock::new();

/// Installs the rendering configuration. Must run before the first chart is built
/// and can only succeed once per process.
pub fn configure_rendering(config: RenderConfig) -> Result<()> {
    RENDER_CONFIG
        .set(config)
        .map_err(|_| ResultError::RenderingConfigured)
}

/// The installed configuration, or the default one if none was installed.
pub fn rendering_config() -> &'static RenderConfig {
    RENDER_CONFIG.get_or_init(RenderConfig::default)
}

/// Renders `series` as an SVG line chart using the process-wide configuration.
pub fn render_svg(series: &Series) -> Result<String> {
    render_svg_with(series, rendering_config())
}

pub fn render_svg_with(series: &Series, config: &RenderConfig) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let family = config.font_family.as_str();
        let (x_range, y_range) = axis_ranges(series.points());
        let mut chart = ChartBuilder::on(&root)
            .caption(series.title(), font(family, 28.0))
            .margin(20)
            .x_label_area_size(48)
            .y_label_area_size(72)
            .build_cartesian_2d(x_range, y_range)
            .map_err(chart_error)?;

        let unicode_minus = config.unicode_minus;
        let y_formatter = |value: &f64| format_tick(*value, unicode_minus);
        chart
            .configure_mesh()
            .x_labels(series.points().len().max(2))
            .x_desc(series.x_label())
            .y_desc(series.y_label())
            .axis_desc_style(font(family, 16.0))
            .label_style(font(family, 14.0))
            .y_label_formatter(&y_formatter)
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(LineSeries::new(series.points().iter().copied(), &BLUE))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    debug!(
        window = %series.window(),
        points = series.points().len(),
        bytes = svg.len(),
        "rendered chart"
    );
    Ok(svg)
}

fn font(family: &str, size: f64) -> FontDesc<'_> {
    FontDesc::new(FontFamily::Name(family), size, FontStyle::Normal)
}

fn chart_error<E: std::error::Error>(err: E) -> ResultError {
    ResultError::Chart(err.to_string())
}

/// x spans the window positions; y starts at zero unless a value is negative.
fn axis_ranges(points: &[(u32, f64)]) -> (std::ops::Range<u32>, std::ops::Range<f64>) {
    let x_end = points.iter().map(|p| p.0).max().unwrap_or(1).max(2);

    let y_max = points.iter().map(|p| p.1).fold(f64::MIN, f64::max);
    let y_min = points.iter().map(|p| p.1).fold(0.0, f64::min);
    let upper = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    (1..x_end, y_min * 1.1..upper)
}

fn format_tick(value: f64, unicode_minus: bool) -> String {
    let label = format!("{:.3}", value);
    let label = label.trim_end_matches('0').trim_end_matches('.');
    let label = if label == "-0" { "0" } else { label };

    if unicode_minus {
        label.replace('-', "\u{2212}")
    } else {
        label.to_string()
    }
}
