use std::{fmt::Display, fs, path::Path};

use plotters::prelude::*;
use tracing::debug;

use crate::{
    config::ChartSettings,
    error::{ReportError, Result},
    series::SeriesSet,
};

pub const X_LABEL: &str = "Memory pool enlarge step";
pub const Y_LABEL: &str = "Average CPU time per allocation";

const TITLE_FONT_SIZE: u32 = 24;
const AXIS_LABEL_FONT_SIZE: u32 = 18;
const LEGEND_FONT_SIZE: u32 = 16;
const MARKER_SIZE: u32 = 5;
/// Log-space padding around the enlarge-step range.
const X_PADDING: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Triangle,
    Cross,
}

const MARKERS: &[Marker] = &[Marker::Circle, Marker::Triangle, Marker::Cross];

const COLOURS: &[RGBColor] = &[
    RED,
    GREEN,
    BLUE,
    BLACK,
    YELLOW,
    RGBColor(128, 0, 128), // purple
];

/// Marker and colour for the `index`th series, wrapping once a palette runs out.
pub fn series_style(index: usize) -> (Marker, RGBColor) {
    (MARKERS[index % MARKERS.len()], COLOURS[index % COLOURS.len()])
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub marker: Marker,
    pub colour: RGBColor,
    /// `(enlarge_step, cpu_time)`
    pub points: Vec<(f64, f64)>,
}

/// Everything needed to draw one pattern's chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x_range: (f64, f64),
    pub y_max: f64,
    pub series: Vec<ChartSeries>,
}

impl ChartSpec {
    pub fn new(series: &SeriesSet, title: &str, settings: &ChartSettings) -> Result<Self> {
        let series: Vec<_> = series
            .iter()
            .enumerate()
            .map(|(index, (implementation, points))| {
                let (marker, colour) = series_style(index);
                ChartSeries {
                    label: implementation.name().to_owned(),
                    marker,
                    colour,
                    points: points.iter().map(|p| (p.enlarge_step, p.cpu_time)).collect(),
                }
            })
            .collect();

        let x_range = log_x_range(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)))?;
        let y_max = series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.1))
            .reduce(f64::max)
            .filter(|max| *max > 0.0)
            .map_or(1.0, |max| max * settings.y_headroom);

        Ok(ChartSpec {
            title: title.to_owned(),
            width: settings.width,
            height: settings.height,
            x_range,
            y_max,
            series,
        })
    }
}

fn log_x_range(steps: impl Iterator<Item = f64>) -> Result<(f64, f64)> {
    let mut range: Option<(f64, f64)> = None;
    for step in steps {
        if !(step.is_finite() && step > 0.0) {
            return Err(ReportError::Chart(format!(
                "enlarge step {step} cannot be drawn on a log axis"
            )));
        }
        range = Some(match range {
            Some((lo, hi)) => (lo.min(step), hi.max(step)),
            None => (step, step),
        });
    }
    Ok(match range {
        None => (1.0, 10.0),
        Some((lo, hi)) if lo == hi => (lo / 2.0, hi * 2.0),
        Some((lo, hi)) => (lo / X_PADDING, hi * X_PADDING),
    })
}

fn chart_error(err: impl Display) -> ReportError {
    ReportError::Chart(err.to_string())
}

/// Draws `spec` as a PNG at `path`, replacing any existing file.
pub fn render_chart(path: &Path, spec: &ChartSpec) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|source| ReportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let root = BitMapBackend::new(path, (spec.width, spec.height)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let (x_lo, x_hi) = spec.x_range;
    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", TITLE_FONT_SIZE))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((x_lo..x_hi).log_scale(), 0.0..spec.y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .x_label_formatter(&|x| format!("{x:.0}"))
        .draw()
        .map_err(chart_error)?;

    for series in &spec.series {
        let colour = series.colour;
        chart
            .draw_series(LineSeries::new(
                series.points.iter().copied(),
                colour.stroke_width(2),
            ))
            .map_err(chart_error)?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], colour.stroke_width(2)));

        let points = series.points.iter().copied();
        let markers = match series.marker {
            Marker::Circle => chart
                .draw_series(points.map(|p| Circle::new(p, MARKER_SIZE, colour.filled())))
                .map(|_| ()),
            Marker::Triangle => chart
                .draw_series(points.map(|p| TriangleMarker::new(p, MARKER_SIZE + 1, colour.filled())))
                .map(|_| ()),
            Marker::Cross => chart
                .draw_series(points.map(|p| Cross::new(p, MARKER_SIZE, colour.stroke_width(2))))
                .map(|_| ()),
        };
        markers.map_err(chart_error)?;
        debug!("Drew {} with {} points", series.label, series.points.len());
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", LEGEND_FONT_SIZE))
        .draw()
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        results::{Measurement, Pattern, Run},
        series::load_pattern,
    };

    fn series(runs: &[(f64, f64, f64)]) -> SeriesSet {
        let pattern = Pattern {
            name: "pattern_1".to_owned(),
            desc: "test".to_owned(),
            runs: runs
                .iter()
                .map(|&(enlarge_step, pool, malloc)| Run {
                    num_items: 4,
                    enlarge_step,
                    boost_intrusive_pool: Measurement {
                        duration_nsec_per_item: pool,
                        ..Default::default()
                    },
                    plain_malloc: Measurement {
                        duration_nsec_per_item: malloc,
                        ..Default::default()
                    },
                    ..Default::default()
                })
                .collect(),
        };
        load_pattern(&pattern)
    }

    #[test]
    fn y_axis_has_headroom_over_largest_series() {
        let set = series(&[(64.0, 10.0, 40.0), (128.0, 12.0, 20.0)]);
        let spec = ChartSpec::new(&set, "t", &ChartSettings::default()).unwrap();
        assert!((spec.y_max - 40.0 * 1.3).abs() < 1e-9);
    }

    #[test]
    fn series_are_labelled_in_order_with_distinct_styles() {
        let set = series(&[(64.0, 1.0, 2.0)]);
        let spec = ChartSpec::new(&set, "title", &ChartSettings::default()).unwrap();
        let labels: Vec<_> = spec.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["boost_intrusive_pool", "plain_malloc"]);
        assert_ne!(spec.series[0].colour, spec.series[1].colour);
        assert_ne!(spec.series[0].marker, spec.series[1].marker);
        assert_eq!(spec.series[1].points, [(64.0, 2.0)]);
        assert_eq!(spec.title, "title");
    }

    #[test]
    fn palette_wraps_for_many_series() {
        assert_eq!(series_style(0), series_style(MARKERS.len() * COLOURS.len()));
        assert_eq!(series_style(7).1, COLOURS[1]);
        assert_eq!(series_style(7).0, MARKERS[1]);
    }

    #[test]
    fn x_range_spans_steps_on_log_axis() {
        let set = series(&[(16.0, 1.0, 1.0), (1024.0, 1.0, 1.0)]);
        let spec = ChartSpec::new(&set, "t", &ChartSettings::default()).unwrap();
        let (lo, hi) = spec.x_range;
        assert!(lo < 16.0 && lo > 0.0);
        assert!(hi > 1024.0);
    }

    #[test]
    fn single_step_gets_non_empty_range() {
        let set = series(&[(128.0, 1.0, 1.0)]);
        let spec = ChartSpec::new(&set, "t", &ChartSettings::default()).unwrap();
        assert_eq!(spec.x_range, (64.0, 256.0));
    }

    #[test]
    fn zero_step_is_rejected() {
        let set = series(&[(0.0, 1.0, 1.0)]);
        let err = ChartSpec::new(&set, "t", &ChartSettings::default()).unwrap_err();
        assert!(matches!(err, ReportError::Chart(_)));
    }

    #[test]
    fn all_zero_times_fall_back_to_unit_axis() {
        let set = series(&[(8.0, 0.0, 0.0)]);
        let spec = ChartSpec::new(&set, "t", &ChartSettings::default()).unwrap();
        assert_eq!(spec.y_max, 1.0);
    }
}
