pub mod csv;
pub mod heatmap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

use crate::corpus::Corpus;
use crate::engine::{FlaggedPair, RunOutput};

/// Everything a presentation layer needs from one run.
#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub model: String,
    pub threshold: f64,
    pub documents: Vec<String>,
    pub matrix: Vec<Vec<f64>>,
    pub flagged: Vec<FlaggedPair>,
}

impl Report {
    pub fn new(corpus: &Corpus, output: RunOutput, model: &str, threshold: f64) -> Self {
        Self {
            generated_at: Utc::now(),
            model: model.to_string(),
            threshold,
            documents: corpus.ids().into_iter().map(String::from).collect(),
            matrix: output.matrix.rows(),
            flagged: output.flags,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing report")
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("writing JSON report to {}", path.display()))
    }
}

/// Plain-text rendering for the terminal: numbered matrix, then the
/// flagged pairs (or an all-clear line).
pub fn render_console(report: &Report) -> String {
    let mut out = String::new();
    let n = report.documents.len();

    out.push_str("Similarity matrix\n");
    for (i, id) in report.documents.iter().enumerate() {
        let _ = writeln!(out, "  [{i}] {id}");
    }
    out.push('\n');

    let _ = write!(out, "{:>6}", "");
    for j in 0..n {
        let _ = write!(out, "{:>7}", format!("[{j}]"));
    }
    out.push('\n');
    for (i, row) in report.matrix.iter().enumerate() {
        let _ = write!(out, "{:>6}", format!("[{i}]"));
        for value in row {
            let _ = write!(out, "{value:>7.2}");
        }
        out.push('\n');
    }

    let _ = writeln!(out, "\nPotential plagiarism (similarity > {}):", report.threshold);
    if report.flagged.is_empty() {
        out.push_str("No suspicious similarities found.\n");
    } else {
        for pair in &report.flagged {
            let _ = writeln!(
                out,
                "  {} and {} are very similar! Similarity: {:.2}",
                pair.first_id, pair.second_id, pair.score
            );
        }
    }
    out
}
