use anyhow::{Context, Result};
use std::path::Path;

use crate::engine::FlaggedPair;

const HEADER: &str = "First,Second,Similarity";

/// Flagged pairs as CSV rows, in flag order.
pub fn to_csv(pairs: &[FlaggedPair]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for pair in pairs {
        out.push_str(&quote(&pair.first_id));
        out.push(',');
        out.push_str(&quote(&pair.second_id));
        out.push(',');
        out.push_str(&pair.score.to_string());
        out.push('\n');
    }
    out
}

pub fn write_csv(path: &Path, pairs: &[FlaggedPair]) -> Result<()> {
    std::fs::write(path, to_csv(pairs))
        .with_context(|| format!("writing CSV report to {}", path.display()))
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
