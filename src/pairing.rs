//! Paired-end detection.
//!
//! A file set is paired-end when, after sorting, every interleaved R1/R2 pair
//! agrees on three independent signals:
//! - identical line counts,
//! - identical byte sizes,
//! - mate headers that differ in exactly one position, where the R2 digit is
//!   the R1 digit plus one (`read/1` vs `read/2`).
//!
//! Anything else, including an odd or too-small file count, is single-end.
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, info};
use rayon::prelude::*;

use crate::fastq::FastqReader;
use crate::metrics::{file_size, line_count};

/// True when `r2` is the mate header of `r1`.
///
/// Headers must be the same length and differ at exactly one position holding
/// ASCII digits with `r2 == r1 + 1`.
pub fn headers_are_mates(r1: &str, r2: &str) -> bool {
    let (a, b) = (r1.as_bytes(), r2.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut diff = a.iter().zip(b).enumerate().filter(|(_, (x, y))| x != y).map(|(i, _)| i);
    let (Some(i), None) = (diff.next(), diff.next()) else {
        return false;
    };
    match (char::from(a[i]).to_digit(10), char::from(b[i]).to_digit(10)) {
        (Some(x), Some(y)) => y == x + 1,
        _ => false,
    }
}

/// Walk both files' headers pairwise and check every pair with [`headers_are_mates`].
///
/// Files holding a different number of records are not mates. Malformed
/// records on either side are errors.
pub fn check_sequence_name<P: AsRef<Path>, Q: AsRef<Path>>(path_r1: P, path_r2: Q) -> Result<bool> {
    let mut r1 = FastqReader::from_path(path_r1.as_ref())?;
    let mut r2 = FastqReader::from_path(path_r2.as_ref())?;
    loop {
        match (r1.next(), r2.next()) {
            (None, None) => return Ok(true),
            (Some(Err(e)), _) | (_, Some(Err(e))) => return Err(e.into()),
            (Some(a), Some(b)) => {
                let (a, b) = (a?, b?);
                if !headers_are_mates(&a.header, &b.header) {
                    debug!("headers are not mates: {:?} / {:?}", a.header, b.header);
                    return Ok(false);
                }
            }
            _ => {
                debug!("record counts differ between {} and {}", r1.origin(), r2.origin());
                return Ok(false);
            }
        }
    }
}

/// Sort lexicographically and split into forward (even index) and reverse (odd index) files.
pub fn split_fwd_rev<P: AsRef<Path>>(paths: &[P]) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut sorted: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
    sorted.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    let mut fwd = Vec::with_capacity(sorted.len() / 2 + 1);
    let mut rev = Vec::with_capacity(sorted.len() / 2);
    for (i, p) in sorted.into_iter().enumerate() {
        if i % 2 == 0 { fwd.push(p) } else { rev.push(p) }
    }
    (fwd, rev)
}

fn pair_matches(r1: &Path, r2: &Path) -> Result<bool> {
    let (l1, l2) = (line_count(r1)?, line_count(r2)?);
    let (s1, s2) = (file_size(r1)?, file_size(r2)?);
    debug!("{}: lines={l1} bytes={s1} | {}: lines={l2} bytes={s2}", r1.display(), r2.display());
    if l1 != l2 || s1 != s2 {
        return Ok(false);
    }
    check_sequence_name(r1, r2)
}

/// Decide whether `paths` form paired-end data.
pub fn detect_paired_end<P: AsRef<Path>>(paths: &[P]) -> Result<bool> {
    if paths.len() < 2 || paths.len() % 2 == 1 {
        debug!("{} files cannot be paired", paths.len());
        return Ok(false);
    }
    let (fwd, rev) = split_fwd_rev(paths);
    if fwd.len() != rev.len() || fwd.is_empty() {
        return Ok(false);
    }

    let checks = fwd
        .par_iter()
        .zip(rev.par_iter())
        .map(|(r1, r2)| pair_matches(r1, r2))
        .collect::<Result<Vec<bool>>>()?;
    let paired = checks.into_iter().all(|ok| ok);
    info!("paired-end detection over {} files: {}", paths.len(), paired);
    Ok(paired)
}
