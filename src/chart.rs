//! Static SVG chart of a [`Report`].
//!
//! Draws the daily means as markers joined by a thin line, the EWMA as a
//! thicker line, and the mean control limits as dashed red reference lines
//! spanning the first to the last date.

use crate::analysis::Report;
use crate::config::ChartConfig;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::{
    fmt::{self, Write as _},
    fs,
    path::Path,
};

const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;

const N_Y_TICKS: usize = 6;
const MAX_X_TICKS: usize = 8;

const RAW_COLOR: &str = "#636efa";
const EWMA_COLOR: &str = "#ef553b";
const LIMIT_COLOR: &str = "red";

/// Render `report` and write it to `file`.
pub fn save_svg<P: AsRef<Path>>(report: &Report, cfg: &ChartConfig, file: P) -> Result<()> {
    let file = file.as_ref();
    let svg = render_svg(report, cfg).context("failed to render chart")?;
    fs::write(file, svg).with_context(|| format!("failed to write {file:?}"))?;
    Ok(())
}

/// Render `report` as an SVG document.
///
/// The drawing uses `cfg.width` x `cfg.height` user units; the document size
/// is multiplied by `cfg.scale` so rasterizers export at that resolution.
pub fn render_svg(report: &Report, cfg: &ChartConfig) -> Result<String, fmt::Error> {
    let frame = Frame::new(report, cfg);
    let mut svg = String::new();

    let width = f64::from(cfg.width);
    let height = f64::from(cfg.height);
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {width} {height}" font-family="sans-serif" font-size="12">"#,
        width * cfg.scale,
        height * cfg.scale,
    )?;
    writeln!(svg, r#"<rect width="{width}" height="{height}" fill="white"/>"#)?;

    if !cfg.title.is_empty() {
        writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="18">{}</text>"#,
            width / 2.0,
            MARGIN_TOP / 2.0,
            escape(&cfg.title)
        )?;
    }

    frame.write_axes(&mut svg, cfg)?;

    let dates = report.series.dates();
    let raw_points: Vec<_> = dates
        .iter()
        .zip(report.series.values())
        .map(|(&date, &val)| frame.point(date, val))
        .collect();
    let ewma_points: Vec<_> = dates
        .iter()
        .zip(report.smoothed.values())
        .map(|(&date, &val)| frame.point(date, val))
        .collect();

    write_polyline(&mut svg, &raw_points, RAW_COLOR, 1.0)?;
    for (x, y) in &raw_points {
        writeln!(
            svg,
            r#"<circle cx="{x:.2}" cy="{y:.2}" r="3" fill="{RAW_COLOR}"/>"#
        )?;
    }
    write_polyline(&mut svg, &ewma_points, EWMA_COLOR, 2.0)?;

    for limit in [report.mean_upper, report.mean_lower] {
        let y = frame.y(limit);
        let (x0, x1) = match (report.series.first_date(), report.series.last_date()) {
            (Some(first), Some(last)) if first != last => (frame.x(first), frame.x(last)),
            _ => (frame.left, frame.right),
        };
        writeln!(
            svg,
            r#"<line x1="{x0:.2}" y1="{y:.2}" x2="{x1:.2}" y2="{y:.2}" stroke="{LIMIT_COLOR}" stroke-width="1" stroke-dasharray="6 4"/>"#
        )?;
    }

    frame.write_legend(&mut svg)?;

    writeln!(svg, "</svg>")?;
    Ok(svg)
}

/// Mapping from data space to drawing coordinates.
struct Frame {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    first: Option<NaiveDate>,
    span_days: i64,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    fn new(report: &Report, cfg: &ChartConfig) -> Self {
        let left = MARGIN_LEFT;
        let right = f64::from(cfg.width) - MARGIN_RIGHT;
        let top = MARGIN_TOP;
        let bottom = f64::from(cfg.height) - MARGIN_BOTTOM;

        let first = report.series.first_date();
        let span_days = match (first, report.series.last_date()) {
            (Some(first), Some(last)) => (last - first).num_days(),
            _ => 0,
        };

        let (y_min, y_max) = report
            .series
            .values()
            .iter()
            .chain(report.smoothed.values())
            .chain(report.limits.upper())
            .chain(report.limits.lower())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &val| {
                (lo.min(val), hi.max(val))
            });
        let (y_min, y_max) = pad_range(y_min, y_max);

        Self {
            left,
            right,
            top,
            bottom,
            first,
            span_days,
            y_min,
            y_max,
        }
    }

    fn x(&self, date: NaiveDate) -> f64 {
        let Some(first) = self.first else {
            return (self.left + self.right) / 2.0;
        };
        if self.span_days == 0 {
            return (self.left + self.right) / 2.0;
        }
        let frac = (date - first).num_days() as f64 / self.span_days as f64;
        self.left + frac * (self.right - self.left)
    }

    fn y(&self, val: f64) -> f64 {
        let frac = (val - self.y_min) / (self.y_max - self.y_min);
        self.bottom - frac * (self.bottom - self.top)
    }

    fn point(&self, date: NaiveDate, val: f64) -> (f64, f64) {
        (self.x(date), self.y(val))
    }

    fn write_axes(&self, svg: &mut String, cfg: &ChartConfig) -> fmt::Result {
        let (left, right, top, bottom) = (self.left, self.right, self.top, self.bottom);
        writeln!(
            svg,
            r#"<line x1="{left}" y1="{bottom}" x2="{right}" y2="{bottom}" stroke="black" stroke-width="1"/>"#
        )?;
        writeln!(
            svg,
            r#"<line x1="{left}" y1="{top}" x2="{left}" y2="{bottom}" stroke="black" stroke-width="1"/>"#
        )?;

        for i_tick in 0..N_Y_TICKS {
            let frac = i_tick as f64 / (N_Y_TICKS - 1) as f64;
            let val = self.y_min + frac * (self.y_max - self.y_min);
            let y = self.y(val);
            writeln!(
                svg,
                r#"<line x1="{:.2}" y1="{y:.2}" x2="{left}" y2="{y:.2}" stroke="black"/>"#,
                left - 5.0
            )?;
            writeln!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" text-anchor="end">{}</text>"#,
                left - 8.0,
                y + 4.0,
                format_value(val)
            )?;
        }

        if let Some(first) = self.first {
            let n_ticks = (self.span_days as usize + 1).min(MAX_X_TICKS);
            for i_tick in 0..n_ticks {
                let offset = if n_ticks > 1 {
                    self.span_days * i_tick as i64 / (n_ticks - 1) as i64
                } else {
                    0
                };
                let date = first + chrono::Days::new(offset as u64);
                let x = self.x(date);
                writeln!(
                    svg,
                    r#"<line x1="{x:.2}" y1="{bottom}" x2="{x:.2}" y2="{:.2}" stroke="black"/>"#,
                    bottom + 5.0
                )?;
                writeln!(
                    svg,
                    r#"<text x="{x:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
                    bottom + 20.0,
                    date.format("%Y-%m-%d")
                )?;
            }
        }

        writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" font-size="14">{}</text>"#,
            (left + right) / 2.0,
            bottom + 50.0,
            escape(&cfg.x_label)
        )?;
        let y_mid = (top + bottom) / 2.0;
        writeln!(
            svg,
            r#"<text x="20" y="{y_mid:.2}" text-anchor="middle" font-size="14" transform="rotate(-90 20 {y_mid:.2})">{}</text>"#,
            escape(&cfg.y_label)
        )?;
        Ok(())
    }

    fn write_legend(&self, svg: &mut String) -> fmt::Result {
        let entries = [
            ("Avg Wastewater Viral Load", RAW_COLOR, ""),
            ("EWMA Wastewater", EWMA_COLOR, ""),
            ("Control limits", LIMIT_COLOR, r#" stroke-dasharray="6 4""#),
        ];
        let x = self.right - 200.0;
        for (i_entry, (label, color, dash)) in entries.iter().enumerate() {
            let y = self.top + 10.0 + 18.0 * i_entry as f64;
            writeln!(
                svg,
                r#"<line x1="{x:.2}" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" stroke="{color}" stroke-width="2"{dash}/>"#,
                x + 24.0
            )?;
            writeln!(
                svg,
                r#"<text x="{:.2}" y="{:.2}">{label}</text>"#,
                x + 30.0,
                y + 4.0
            )?;
        }
        Ok(())
    }
}

fn write_polyline(
    svg: &mut String,
    points: &[(f64, f64)],
    color: &str,
    width: f64,
) -> fmt::Result {
    write!(svg, r#"<polyline fill="none" stroke="{color}" stroke-width="{width}" points=""#)?;
    for (i_point, (x, y)) in points.iter().enumerate() {
        if i_point > 0 {
            svg.push(' ');
        }
        write!(svg, "{x:.2},{y:.2}")?;
    }
    writeln!(svg, r#""/>"#)
}

/// Widen `[lo, hi]` by 5% on each side, or by a unit around a flat range.
fn pad_range(lo: f64, hi: f64) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span <= f64::EPSILON * hi.abs().max(1.0) {
        let pad = (hi.abs() * 0.1).max(1.0);
        return (lo - pad, hi + pad);
    }
    (lo - 0.05 * span, hi + 0.05 * span)
}

fn format_value(val: f64) -> String {
    if val.abs() >= 1e5 {
        format!("{val:.3e}")
    } else if val.abs() >= 100.0 {
        format!("{val:.0}")
    } else {
        format!("{val:.2}")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
