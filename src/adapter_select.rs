//! Adapter profile selection by trial trimming.
//!
//! Every candidate profile is run over the subsample, one at a time, into the
//! same output directory. The directory's size after each trial is recorded
//! and the directory is cleared before the next trial, so at most one trial's
//! output exists at any moment. The smallest result wins, but only if it is
//! below [`MIN_SHRINK_RATIO`] of the untrimmed subsample; otherwise no adapter
//! trimming is recommended.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::metrics::{clear_directory, directory_size};
use crate::pairing::detect_paired_end;
use crate::profile::{AdapterProfile, ReadLayout};
use crate::tools::AdapterTrimmer;

/// A trimmed subsample must be smaller than this fraction of the original to count.
pub const MIN_SHRINK_RATIO: f64 = 0.995;

/// Output size of one candidate profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterTrial {
    pub adapter: &'static str,
    pub size: u64,
}

/// Outcome of [`choose_adapter`].
#[derive(Debug, Clone)]
pub struct AdapterChoice {
    /// Winning profile, `None` when no profile shrank the subsample enough.
    pub adapter: Option<&'static AdapterProfile>,
    /// Size of the winning trial, or `original_size` when there is no winner.
    pub size: u64,
    pub original_size: u64,
    pub layout: ReadLayout,
    pub trials: Vec<AdapterTrial>,
}

/// Index of the trial to keep, if any.
///
/// Ties keep the earliest trial; the winner must be strictly below
/// `MIN_SHRINK_RATIO * original_size`.
pub fn pick_best(trials: &[AdapterTrial], original_size: u64) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (i, t) in trials.iter().enumerate() {
        let bound = best.map_or(original_size, |(_, s)| s);
        if t.size < bound {
            best = Some((i, t.size));
        }
    }
    best.filter(|&(_, size)| (size as f64) < MIN_SHRINK_RATIO * original_size as f64)
        .map(|(i, _)| i)
}

/// Trial every registry profile over `subsampled_paths`, writing into `output_path`.
pub fn choose_adapter<T: AdapterTrimmer + ?Sized>(
    trimmer: &T,
    subsampled_paths: &[PathBuf],
    output_path: &Path,
) -> Result<AdapterChoice> {
    choose_adapter_from(trimmer, crate::list_adapter_profiles(), subsampled_paths, output_path)
}

/// [`choose_adapter`] over an explicit candidate list.
pub fn choose_adapter_from<T: AdapterTrimmer + ?Sized>(
    trimmer: &T,
    candidates: &'static [AdapterProfile],
    subsampled_paths: &[PathBuf],
    output_path: &Path,
) -> Result<AdapterChoice> {
    let first = subsampled_paths.first().context("no subsampled files to choose an adapter for")?;
    let subsample_dir = match first.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(output_path).with_context(|| format!("creating {}", output_path.display()))?;
    if subsample_dir.canonicalize()? == output_path.canonicalize()? {
        anyhow::bail!("trial output directory {} must differ from the subsample directory", output_path.display());
    }

    let threads = crate::max_threads();
    let original_size = directory_size(&subsample_dir)?;
    info!("original size of the subsampled fastqs = {original_size}");

    let layout = ReadLayout::from_paired(detect_paired_end(subsampled_paths)?);
    info!("trialling {} adapter profiles as {layout} with {threads} threads", candidates.len());

    clear_directory(output_path)?;
    let mut trials = Vec::with_capacity(candidates.len());
    for profile in candidates {
        trimmer
            .trim(layout, subsampled_paths, output_path, profile, threads)
            .with_context(|| format!("trimming with adapter profile {}", profile.name))?;
        let size = directory_size(output_path)?;
        info!("{}\t{}", profile.name, size);
        trials.push(AdapterTrial { adapter: profile.name, size });
        clear_directory(output_path)?;
    }

    let choice = match pick_best(&trials, original_size) {
        Some(i) => AdapterChoice { adapter: Some(&candidates[i]), size: trials[i].size, original_size, layout, trials },
        None => AdapterChoice { adapter: None, size: original_size, original_size, layout, trials },
    };
    match choice.adapter {
        Some(p) => info!("chose adapter profile {} ({} -> {} bytes)", p.name, original_size, choice.size),
        None => info!("no adapter profile shrank the subsample by at least {:.1}%", (1.0 - MIN_SHRINK_RATIO) * 100.0),
    }
    Ok(choice)
}
