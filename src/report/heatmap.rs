use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

use super::Report;

const CELL: usize = 56;
const CHAR_WIDTH: usize = 7;
const PAD: usize = 12;

/// Yellow-green-blue ramp, light for low similarity, dark for high.
const RAMP: [(u8, u8, u8); 9] = [
    (0xff, 0xff, 0xd9),
    (0xed, 0xf8, 0xb1),
    (0xc7, 0xe9, 0xb4),
    (0x7f, 0xcd, 0xbb),
    (0x41, 0xb6, 0xc4),
    (0x1d, 0x91, 0xc0),
    (0x22, 0x5e, 0xa8),
    (0x25, 0x34, 0x94),
    (0x08, 0x1d, 0x58),
];

/// Render the matrix as a standalone SVG heatmap labelled with document ids.
pub fn to_svg(report: &Report) -> String {
    let n = report.documents.len();
    let longest = report
        .documents
        .iter()
        .map(|d| d.chars().count())
        .max()
        .unwrap_or(0);
    let margin = longest * CHAR_WIDTH + PAD;
    let size = margin + n * CELL + PAD;

    // Colour scale spans the observed minimum up to 1.0.
    let low = report
        .matrix
        .iter()
        .flatten()
        .copied()
        .fold(1.0f64, f64::min);

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" font-family="sans-serif" font-size="12">"#
    );
    let _ = writeln!(svg, r#"<rect width="{size}" height="{size}" fill="white"/>"#);

    for (i, label) in report.documents.iter().enumerate() {
        let label = escape(label);
        let center = margin + i * CELL + CELL / 2;
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{center}" text-anchor="end" dominant-baseline="middle">{label}</text>"#,
            margin - 6
        );
        let _ = writeln!(
            svg,
            r#"<text x="{center}" y="{y}" text-anchor="start" transform="rotate(-90 {center} {y})" dominant-baseline="middle">{label}</text>"#,
            y = margin - 6
        );
    }

    for (i, row) in report.matrix.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            let t = if low < 1.0 { (value - low) / (1.0 - low) } else { 1.0 };
            let (r, g, b) = ramp(t);
            let x = margin + j * CELL;
            let y = margin + i * CELL;
            let _ = writeln!(
                svg,
                r##"<rect x="{x}" y="{y}" width="{CELL}" height="{CELL}" fill="#{r:02x}{g:02x}{b:02x}"/>"##
            );
            let ink = if t > 0.5 { "white" } else { "black" };
            let _ = writeln!(
                svg,
                r#"<text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" fill="{ink}">{value:.2}</text>"#,
                x + CELL / 2,
                y + CELL / 2
            );
        }
    }

    svg.push_str("</svg>\n");
    svg
}

pub fn write_svg(path: &Path, report: &Report) -> Result<()> {
    std::fs::write(path, to_svg(report))
        .with_context(|| format!("writing heatmap to {}", path.display()))
}

fn ramp(t: f64) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0) * (RAMP.len() - 1) as f64;
    let lo = t.floor() as usize;
    let hi = (lo + 1).min(RAMP.len() - 1);
    let frac = t - lo as f64;
    let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * frac).round() as u8;
    let (a, b) = (RAMP[lo], RAMP[hi]);
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
