//! Read-merge feasibility.
//!
//! The merger is run over the trimmed R1/R2 pairs. A pair *matches* when the
//! merged file keeps more than [`MIN_MERGED_FRACTION`] of the forward file's
//! lines; the data set is stitchable when at least three quarters of the pairs
//! match.
//!
//! [`fragment_length_cv`] is an optional diagnostic over the merger's
//! fragment-length histograms and plays no part in the decision.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;

use crate::metrics::line_count;
use crate::pairing::split_fwd_rev;
use crate::tools::{MergeOptions, ReadMerger};

pub const MIN_MERGED_FRACTION: f64 = 0.3;

/// Line counts of one forward file and its merged counterpart.
#[derive(Debug, Clone, Serialize)]
pub struct StitchPair {
    pub forward: PathBuf,
    pub merged: PathBuf,
    pub forward_lines: u64,
    pub merged_lines: u64,
    pub matched: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StitchReport {
    pub pairs: Vec<StitchPair>,
    pub matched: usize,
    pub stitchable: bool,
}

/// More than 30% of the forward reads survived merging.
pub fn merged_enough(forward_lines: u64, merged_lines: u64) -> bool {
    merged_lines as f64 > forward_lines as f64 * MIN_MERGED_FRACTION
}

/// At least `ceil(0.75 * total)` pairs matched.
pub fn enough_pairs(matched: usize, total: usize) -> bool {
    total > 0 && matched * 4 >= total * 3
}

/// Merge `adapter_output_paths` into `flash_output_path` and judge the result.
pub fn is_stitchable<M: ReadMerger + ?Sized>(
    merger: &M,
    adapter_output_paths: &[PathBuf],
    flash_output_path: &Path,
) -> Result<StitchReport> {
    if adapter_output_paths.is_empty() {
        anyhow::bail!("no trimmed files to merge");
    }
    let threads = crate::max_threads();
    let merged = merger
        .merge(adapter_output_paths, flash_output_path, &MergeOptions::default(), threads)
        .context("merging read pairs")?;
    let (fwd, _) = split_fwd_rev(adapter_output_paths);
    if merged.len() != fwd.len() {
        anyhow::bail!("merger produced {} files for {} read pairs", merged.len(), fwd.len());
    }

    let mut pairs = Vec::with_capacity(fwd.len());
    for (forward, merged) in fwd.into_iter().zip(merged) {
        let forward_lines = line_count(&forward)?;
        let merged_lines = line_count(&merged)?;
        let matched = merged_enough(forward_lines, merged_lines);
        debug!("{}: {} of {} lines merged", forward.display(), merged_lines, forward_lines);
        pairs.push(StitchPair { forward, merged, forward_lines, merged_lines, matched });
    }

    let matched = pairs.iter().filter(|p| p.matched).count();
    let stitchable = enough_pairs(matched, pairs.len());
    info!("{matched}/{} pairs merged well, stitchable: {stitchable}", pairs.len());
    Ok(StitchReport { pairs, matched, stitchable })
}

/// Histogram files (`*.hist`) written by the merger into `dir`, sorted by name.
pub fn histogram_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "hist") {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Coefficient of variation (population std / mean) of the fragment lengths in
/// a two-column `length count` histogram. `None` for an empty histogram.
pub fn fragment_length_cv<P: AsRef<Path>>(hist_path: P) -> Result<Option<f64>> {
    let p = hist_path.as_ref();
    let text = fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;

    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let mut cols = line.split_whitespace();
        let (Some(len), Some(count)) = (cols.next(), cols.next()) else {
            if line.trim().is_empty() { continue; }
            anyhow::bail!("{}:{}: expected `length count`", p.display(), i + 1);
        };
        let len: f64 = len.parse().with_context(|| format!("{}:{}: bad length", p.display(), i + 1))?;
        let count: f64 = count.parse().with_context(|| format!("{}:{}: bad count", p.display(), i + 1))?;
        rows.push((len, count.trunc()));
    }

    let n: f64 = rows.iter().map(|(_, c)| c).sum();
    if n <= 0.0 {
        return Ok(None);
    }
    let mean = rows.iter().map(|(l, c)| l * c).sum::<f64>() / n;
    let var = rows.iter().map(|(l, c)| c * (l - mean).powi(2)).sum::<f64>() / n;
    Ok(Some(var.sqrt() / mean))
}
