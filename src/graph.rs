#![cfg(feature = "web")]
use crate::error::{DashboardError, Result};
use crate::format::ChartPoint;
use plotters::prelude::*;

/// Stops of the "Blues" continuous scale, light to dark.
const BLUES: [(u8, u8, u8); 9] = [
    (247, 251, 255),
    (222, 235, 247),
    (198, 219, 239),
    (158, 202, 225),
    (107, 174, 214),
    (66, 146, 198),
    (33, 113, 181),
    (8, 81, 156),
    (8, 48, 107),
];

/// Configuration options for the achievement chart
///
/// This structure contains the customizable properties of the bar chart
/// shown under the seller table.
#[derive(Clone, Debug)]
pub struct ChartOptions {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Label for the X-axis (categories)
    pub x_label: String,

    /// Label for the Y-axis (achievement percent)
    pub y_label: String,

    /// Width of the chart in pixels
    pub width: u32,

    /// Height of the chart in pixels
    pub height: u32,
}

impl Default for ChartOptions {
    /// Creates the chart configuration used by the dashboard
    ///
    /// # Returns
    /// * `ChartOptions` - 900x420 pixels with the dashboard labels
    fn default() -> Self {
        Self {
            title: "Target achievement per category".to_string(),
            x_label: "Category".to_string(),
            y_label: "Target achievement (%)".to_string(),
            width: 900,
            height: 420,
        }
    }
}

/// Draws the achievement bar chart as an SVG document
///
/// One bar per category, height equal to the achievement percent. Bars are
/// coloured along the Blues scale between the smallest and largest value
/// shown, so the best category is the darkest.
///
/// # Arguments
/// * `points` - Category / percent pairs, in table order
/// * `options` - Chart labels and size
///
/// # Returns
/// * A Result containing the SVG markup or a chart error
///
/// # Examples
/// ```
/// use sales_dashboard::format::ChartPoint;
/// use sales_dashboard::graph::{ChartOptions, achievement_chart};
///
/// let points = vec![ChartPoint { category: "Phones".into(), percent: 82.5 }];
/// let svg = achievement_chart(&points, &ChartOptions::default()).unwrap();
/// assert!(svg.contains("<svg"));
/// ```
pub fn achievement_chart(points: &[ChartPoint], options: &ChartOptions) -> Result<String> {
    let min = points.iter().map(|p| p.percent).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|p| p.percent).fold(f64::NEG_INFINITY, f64::max);

    let y_top = if max.is_finite() && max > 0.0 { max * 1.15 } else { 100.0 };
    let y_bottom = if min.is_finite() && min < 0.0 { min * 1.15 } else { 0.0 };
    let segments = points.len().max(1) as u32;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..segments).into_segmented(), y_bottom..y_top)
            .map_err(chart_error)?;

        let label_for = |value: &SegmentValue<u32>| match value {
            SegmentValue::CenterOf(i) => points
                .get(*i as usize)
                .map(|p| p.category.clone())
                .unwrap_or_default(),
            _ => String::new(),
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(segments as usize + 1)
            .x_label_formatter(&label_for)
            .y_label_formatter(&|v: &f64| format!("{:.0}", v))
            .x_desc(&options.x_label)
            .y_desc(&options.y_label)
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(points.iter().enumerate().map(|(i, point)| {
                let x = i as u32;
                let color = blues(scale_position(point.percent, min, max));
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(x), 0.0),
                        (SegmentValue::Exact(x + 1), point.percent),
                    ],
                    color.filled(),
                );
                bar.set_margin(0, 0, 6, 6);
                bar
            }))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    Ok(svg)
}

/// Relative position of `value` between `min` and `max`.
///
/// A single distinct value sits at the dark end of the scale.
fn scale_position(value: f64, min: f64, max: f64) -> f64 {
    if max - min <= f64::EPSILON {
        return 1.0;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Colour at position `t` (0..=1) of the Blues scale.
fn blues(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0) * (BLUES.len() - 1) as f64;
    let lower = t.floor() as usize;
    let upper = (lower + 1).min(BLUES.len() - 1);
    let frac = t - lower as f64;

    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    let (r1, g1, b1) = BLUES[lower];
    let (r2, g2, b2) = BLUES[upper];
    RGBColor(mix(r1, r2), mix(g1, g2), mix(b1, b2))
}

fn chart_error<E: std::fmt::Display>(e: E) -> DashboardError {
    DashboardError::Chart(e.to_string())
}
