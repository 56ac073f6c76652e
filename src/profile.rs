//! Core types for **adapter profiles**, **read layouts** and **provenance**.
//!
//! An adapter profile is a named clipping preset understood by the external
//! trimmer. Every preset lives in the binary as a `&'static` constant (see
//! [`crate::data::adapters`]) so the candidate list is fixed and ordered.
use core::fmt;

use serde::Serialize;

/// Whether a file set is treated as paired-end (R1/R2 interleaved after sorting)
/// or as independent single-end files.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadLayout {
    SingleEnd,
    PairedEnd,
}

impl fmt::Display for ReadLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadLayout::SingleEnd => write!(f, "single-end"),
            ReadLayout::PairedEnd => write!(f, "paired-end"),
        }
    }
}

impl ReadLayout {
    pub fn from_paired(paired: bool) -> Self {
        if paired { ReadLayout::PairedEnd } else { ReadLayout::SingleEnd }
    }
}

/// Where an adapter clip file came from.
#[derive(Clone, Debug)]
pub struct Provenance {
    /// Human-readable source.
    pub source: &'static str,
    /// Public URL for the source.
    pub url: &'static str,
    /// Any helpful notes (e.g. a shared file used for both layouts).
    pub notes: &'static str,
}

/// A named adapter-clipping preset.
#[derive(Clone, Debug)]
pub struct AdapterProfile {
    /// Stable preset name (e.g. `"TruSeq3"`).
    pub name: &'static str,
    /// One-line description of the library preparation the preset targets.
    pub description: &'static str,
    /// Clip file used when trimming single-end data.
    pub single_end_fasta: &'static str,
    /// Clip file used when trimming paired-end data.
    pub paired_end_fasta: &'static str,
    /// Source information for auditability.
    pub provenance: Provenance,
}

impl AdapterProfile {
    /// Clip file name for the requested layout.
    pub fn fasta_for(&self, layout: ReadLayout) -> &'static str {
        match layout {
            ReadLayout::SingleEnd => self.single_end_fasta,
            ReadLayout::PairedEnd => self.paired_end_fasta,
        }
    }
}

impl fmt::Display for AdapterProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.name) }
}
