//! End-to-end parameter learning over a set of raw FASTQ files.
//!
//! Working layout under `work_dir`:
//! - `subsampled/`: the first records of each input (measured as the baseline),
//! - `trimmed/`: adapter trial outputs, then the winning profile's output,
//! - `merged/`: merger output for paired-end data.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::adapter_select::{choose_adapter, AdapterTrial};
use crate::metrics::clear_directory;
use crate::profile::ReadLayout;
use crate::stitch::{fragment_length_cv, histogram_files, is_stitchable};
use crate::subsample::{subsample_to_dir, DEFAULT_NUM_FILES, DEFAULT_NUM_SEQUENCES};
use crate::tools::{AdapterTrimmer, ReadMerger};

#[derive(Debug, Clone)]
pub struct LearnOpts {
    pub inputs: Vec<PathBuf>,
    pub work_dir: PathBuf,
    pub num_files: usize,
    pub num_sequences: usize,
}

impl LearnOpts {
    pub fn new(inputs: Vec<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self { inputs, work_dir: work_dir.into(), num_files: DEFAULT_NUM_FILES, num_sequences: DEFAULT_NUM_SEQUENCES }
    }

    pub fn subsampled_dir(&self) -> PathBuf { self.work_dir.join("subsampled") }
    pub fn trimmed_dir(&self) -> PathBuf { self.work_dir.join("trimmed") }
    pub fn merged_dir(&self) -> PathBuf { self.work_dir.join("merged") }
}

/// Recommended preprocessing parameters.
#[derive(Debug, Clone, Serialize)]
pub struct LearnedParams {
    pub layout: ReadLayout,
    /// Winning adapter profile, `None` when trimming is not worthwhile.
    pub adapter: Option<&'static str>,
    pub adapter_size: u64,
    pub original_size: u64,
    /// Only evaluated for paired-end data.
    pub stitchable: Option<bool>,
    pub num_sequences: u64,
    pub average_length: Option<f64>,
    pub average_quality: Option<f64>,
    pub trials: Vec<AdapterTrial>,
}

impl LearnedParams {
    pub fn paired(&self) -> bool { self.layout == ReadLayout::PairedEnd }
}

fn prepare_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    clear_directory(dir)?;
    Ok(())
}

/// Working directories are cleared, so no input may live directly inside one.
fn reject_inputs_in_work_dirs(inputs: &[PathBuf], work_dirs: &[&PathBuf]) -> Result<()> {
    let work_dirs: Vec<PathBuf> = work_dirs.iter().filter_map(|d| d.canonicalize().ok()).collect();
    for input in inputs {
        let canonical = input.canonicalize().with_context(|| format!("resolving input {}", input.display()))?;
        if let Some(parent) = canonical.parent() {
            if work_dirs.iter().any(|d| d == parent) {
                anyhow::bail!("input {} lives in working directory {}, which is cleared before each run", input.display(), parent.display());
            }
        }
    }
    Ok(())
}

/// Subsample, pick an adapter profile and, for paired-end data, test read merging.
pub fn run(opts: &LearnOpts, trimmer: &dyn AdapterTrimmer, merger: &dyn ReadMerger) -> Result<LearnedParams> {
    if opts.inputs.is_empty() {
        anyhow::bail!("no input files");
    }
    let mut inputs = opts.inputs.clone();
    inputs.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));

    let (subsampled, trimmed, merged) = (opts.subsampled_dir(), opts.trimmed_dir(), opts.merged_dir());
    reject_inputs_in_work_dirs(&inputs, &[&subsampled, &trimmed, &merged])?;
    for dir in [&subsampled, &trimmed, &merged] {
        prepare_dir(dir)?;
    }
    info!(
        "learn: inputs={} | files={} | sequences={} | work_dir={}",
        inputs.len(),
        opts.num_files,
        opts.num_sequences,
        opts.work_dir.display()
    );

    let summary = subsample_to_dir(&inputs, &subsampled, opts.num_files, opts.num_sequences)?;
    if let (Some(len), Some(qual)) = (summary.average_length(), summary.average_quality()) {
        info!("average read length {len:.1}, average quality code {qual:.1}");
    }

    let choice = choose_adapter(trimmer, &summary.files, &trimmed)?;

    let stitchable = if choice.layout == ReadLayout::PairedEnd {
        let trimmed_files = match choice.adapter {
            Some(profile) => trimmer
                .trim_paired_end(&summary.files, &trimmed, profile, crate::max_threads())
                .with_context(|| format!("trimming with adapter profile {}", profile.name))?,
            None => summary.files.clone(),
        };
        let report = is_stitchable(merger, &trimmed_files, &merged)?;
        for hist in histogram_files(&merged)? {
            if let Some(cv) = fragment_length_cv(&hist)? {
                info!("{}: fragment length CV = {cv:.3}", hist.display());
            }
        }
        Some(report.stitchable)
    } else {
        None
    };

    Ok(LearnedParams {
        layout: choice.layout,
        adapter: choice.adapter.map(|p| p.name),
        adapter_size: choice.size,
        original_size: choice.original_size,
        stitchable,
        num_sequences: summary.num_sequences,
        average_length: summary.average_length(),
        average_quality: summary.average_quality(),
        trials: choice.trials,
    })
}
