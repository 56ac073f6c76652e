//! File metrics: line counts, byte sizes and working-directory housekeeping.
//!
//! Directory helpers are **non-recursive** and only look at regular files.
//! Subdirectories are skipped by both [`directory_size`] and
//! [`clear_directory`]; trimmer side outputs (e.g. `unpaired/`) live there.
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

/// Number of newline-terminated lines in `path`.
pub fn line_count<P: AsRef<Path>>(path: P) -> Result<u64> {
    let p = path.as_ref();
    let file = File::open(p).with_context(|| format!("opening {}", p.display()))?;
    let mut reader = BufReader::with_capacity(1 << 16, file);
    let mut buf = vec![0u8; 1 << 16];
    let mut n = 0u64;
    loop {
        let read = reader.read(&mut buf).with_context(|| format!("reading {}", p.display()))?;
        if read == 0 { break; }
        n += memchr::memchr_iter(b'\n', &buf[..read]).count() as u64;
    }
    Ok(n)
}

/// Size of `path` in bytes.
pub fn file_size<P: AsRef<Path>>(path: P) -> Result<u64> {
    let p = path.as_ref();
    let meta = fs::metadata(p).with_context(|| format!("stat {}", p.display()))?;
    Ok(meta.len())
}

/// Sum of the sizes of the regular files directly inside `dir`.
pub fn directory_size<P: AsRef<Path>>(dir: P) -> Result<u64> {
    let dir = dir.as_ref();
    let mut total = 0u64;
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        let meta = fs::metadata(&path).with_context(|| format!("stat {}", path.display()))?;
        if meta.is_file() {
            total += meta.len();
        } else {
            debug!("directory_size: skipping non-file entry {}", path.display());
        }
    }
    Ok(total)
}

/// Remove every regular file directly inside `dir`. Returns how many were removed.
pub fn clear_directory<P: AsRef<Path>>(dir: P) -> Result<usize> {
    let dir = dir.as_ref();
    let mut removed = 0usize;
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        if fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false) {
            fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
            removed += 1;
        } else {
            debug!("clear_directory: leaving non-file entry {}", path.display());
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn counts_terminated_lines_only() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.txt");
        fs::write(&p, "one\ntwo\nthree").unwrap();
        assert_eq!(line_count(&p).unwrap(), 2);
        fs::write(&p, "").unwrap();
        assert_eq!(line_count(&p).unwrap(), 0);
    }

    #[test]
    fn directory_size_ignores_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), vec![0u8; 10]).unwrap();
        fs::write(dir.path().join("b"), vec![0u8; 5]).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("c"), vec![0u8; 100]).unwrap();
        assert_eq!(directory_size(dir.path()).unwrap(), 15);
        assert_eq!(file_size(dir.path().join("a")).unwrap(), 10);
    }

    #[test]
    fn clear_directory_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), "x").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        assert_eq!(clear_directory(dir.path()).unwrap(), 1);
        assert!(!dir.path().join("a").exists());
        assert!(dir.path().join("sub").is_dir());
        assert_eq!(directory_size(dir.path()).unwrap(), 0);
    }

    #[test]
    fn missing_paths_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(line_count(&missing).is_err());
        assert!(file_size(&missing).is_err());
        assert!(directory_size(&missing).is_err());
    }
}
