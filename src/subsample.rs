//! Subsampling: copy the first `num_sequences` records of the first
//! `num_files` inputs into a working directory.
//!
//! Reading past the end of an input is an error ([`FastqError::Exhausted`]);
//! a short file is never silently truncated or padded.
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;

use crate::errors::FastqError;
use crate::fastq::{write_record, FastqReader, FastqRecord};

/// Files and records taken when no explicit limits are given.
pub const DEFAULT_NUM_FILES: usize = 10;
pub const DEFAULT_NUM_SEQUENCES: usize = 1000;

/// A reader bounded to exactly `wanted` records.
pub struct Limited {
    reader: FastqReader,
    wanted: usize,
    found: usize,
}

impl Limited {
    pub fn origin(&self) -> &str { self.reader.origin() }
}

impl Iterator for Limited {
    type Item = Result<FastqRecord, FastqError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.found >= self.wanted {
            return None;
        }
        let item = match self.reader.next() {
            Some(Ok(rec)) => {
                self.found += 1;
                return Some(Ok(rec));
            }
            Some(Err(e)) => e,
            None => FastqError::Exhausted {
                origin: self.reader.origin().to_string(),
                wanted: self.wanted,
                found: self.found,
            },
        };
        self.found = self.wanted;
        Some(Err(item))
    }
}

/// Bound `reader` to its first `num_sequences` records.
pub fn limit_fastq(reader: FastqReader, num_sequences: usize) -> Limited {
    Limited { reader, wanted: num_sequences, found: 0 }
}

/// One bounded record stream per input, for the first `num_files` paths in input order.
pub fn subsample_fastqs<'a, P: AsRef<Path>>(
    paths: &'a [P],
    num_files: usize,
    num_sequences: usize,
) -> impl Iterator<Item = Result<Limited, FastqError>> + 'a {
    paths
        .iter()
        .take(num_files)
        .map(move |p| FastqReader::from_path(p).map(|r| limit_fastq(r, num_sequences)))
}

/// Totals accumulated while writing a subsample.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubsampleSummary {
    /// Mirror files written, in input order.
    pub files: Vec<PathBuf>,
    pub num_sequences: u64,
    pub sequence_len_sum: u64,
    /// Sum of raw quality character codes (not decoded Phred values).
    pub quality_sum: u64,
}

impl SubsampleSummary {
    /// Mean read length.
    pub fn average_length(&self) -> Option<f64> {
        (self.num_sequences > 0).then(|| self.sequence_len_sum as f64 / self.num_sequences as f64)
    }

    /// Mean raw quality character code per base.
    pub fn average_quality(&self) -> Option<f64> {
        (self.sequence_len_sum > 0).then(|| self.quality_sum as f64 / self.sequence_len_sum as f64)
    }

    fn add(&mut self, rec: &FastqRecord) {
        self.num_sequences += 1;
        self.sequence_len_sum += rec.sequence.len() as u64;
        self.quality_sum += rec.quality.bytes().map(u64::from).sum::<u64>();
    }
}

/// Write the subsample of `paths` to `output_path/<basename>` and return the totals.
pub fn subsample_to_dir<P: AsRef<Path>>(
    paths: &[P],
    output_path: &Path,
    num_files: usize,
    num_sequences: usize,
) -> Result<SubsampleSummary> {
    fs::create_dir_all(output_path).with_context(|| format!("creating {}", output_path.display()))?;
    let mut summary = SubsampleSummary::default();

    for (path, limited) in paths.iter().zip(subsample_fastqs(paths, num_files, num_sequences)) {
        let path = path.as_ref();
        let limited = limited?;
        let name = path
            .file_name()
            .with_context(|| format!("input {} has no file name", path.display()))?;
        let out = output_path.join(name);
        if same_file(path, &out) {
            anyhow::bail!("refusing to overwrite input {} with its own subsample", path.display());
        }

        let fh = File::create(&out).with_context(|| format!("creating {}", out.display()))?;
        let mut w = BufWriter::new(fh);
        for rec in limited {
            let rec = rec?;
            write_record(&mut w, &rec)?;
            summary.add(&rec);
        }
        w.flush()?;
        debug!("subsampled {} -> {}", path.display(), out.display());
        summary.files.push(out);
    }

    info!(
        "subsampled {} files, {} reads into {}",
        summary.files.len(),
        summary.num_sequences,
        output_path.display()
    );
    Ok(summary)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fastq(path: &Path, prefix: &str, n: usize) {
        let mut s = String::new();
        for i in 0..n {
            s.push_str(&format!("@{prefix}{i}/1\nACGTA\n+\nIIIII\n"));
        }
        fs::write(path, s).unwrap();
    }

    #[test]
    fn limited_yields_exactly_the_requested_records() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.fastq");
        write_fastq(&p, "r", 5);
        let recs: Vec<_> = limit_fastq(FastqReader::from_path(&p).unwrap(), 3).collect();
        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn reading_past_the_end_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.fastq");
        write_fastq(&p, "r", 2);
        let recs: Vec<_> = limit_fastq(FastqReader::from_path(&p).unwrap(), 3).collect();
        assert_eq!(recs.len(), 3);
        assert!(matches!(recs[2], Err(FastqError::Exhausted { wanted: 3, found: 2, .. })));
    }

    #[test]
    fn only_first_files_are_taken() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..3).map(|i| dir.path().join(format!("s{i}.fastq"))).collect();
        for p in &paths { write_fastq(p, "r", 2); }
        assert_eq!(subsample_fastqs(&paths, 2, 1).count(), 2);
    }

    #[test]
    fn writes_mirrors_and_accumulates_totals() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let paths = vec![input.path().join("x_1.fastq"), input.path().join("x_2.fastq")];
        for p in &paths { write_fastq(p, "r", 4); }

        let summary = subsample_to_dir(&paths, output.path(), 10, 2).unwrap();
        assert_eq!(summary.files.len(), 2);
        assert_eq!(summary.num_sequences, 4);
        assert_eq!(summary.sequence_len_sum, 20);
        assert_eq!(summary.quality_sum, 20 * u64::from(b'I'));
        assert_eq!(summary.average_length(), Some(5.0));
        assert_eq!(summary.average_quality(), Some(f64::from(b'I')));

        let mirrored = fs::read_to_string(output.path().join("x_1.fastq")).unwrap();
        assert_eq!(mirrored, "@r0/1\nACGTA\n+\nIIIII\n@r1/1\nACGTA\n+\nIIIII\n");
    }

    #[test]
    fn short_input_fails_the_subsample() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let p = input.path().join("short.fastq");
        write_fastq(&p, "r", 1);
        assert!(subsample_to_dir(&[p], output.path(), 10, 5).is_err());
    }

    #[test]
    fn empty_summary_has_no_averages() {
        let s = SubsampleSummary::default();
        assert_eq!(s.average_length(), None);
        assert_eq!(s.average_quality(), None);
    }
}
