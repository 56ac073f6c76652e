//! Adapter clipping presets shipped with **Trimmomatic**.
//!
//! Source: the `adapters/` directory of the Trimmomatic distribution.
//!
//! - Nextera (transposase-based libraries)
//! - TruSeq2 (GAII-era TruSeq)
//! - TruSeq3 (HiSeq/MiSeq TruSeq)
//! - TruSeq3-2 (TruSeq3 with additional palindrome sequences)
//!
//! Notes:
//! - Nextera and TruSeq3-2 only ship a paired-end file; it is used for both layouts.
//! - The order of [`ADAPTER_PROFILES`] is the order candidates are trialled in.

use crate::profile::{AdapterProfile, Provenance};

const TRIMMOMATIC_ADAPTERS: Provenance = Provenance {
    source: "Trimmomatic adapter clip files",
    url: "https://github.com/usadellab/Trimmomatic/tree/main/adapters",
    notes: "",
};

const TRIMMOMATIC_PE_ONLY: Provenance = Provenance {
    source: "Trimmomatic adapter clip files",
    url: "https://github.com/usadellab/Trimmomatic/tree/main/adapters",
    notes: "Only a PE clip file is distributed; it also serves single-end trimming.",
};

/// Nextera transposase adapters.
pub const NEXTERA: AdapterProfile = AdapterProfile {
    name: "Nextera",
    description: "Nextera / Nextera XT transposase adapters.",
    single_end_fasta: "NexteraPE-PE.fa",
    paired_end_fasta: "NexteraPE-PE.fa",
    provenance: TRIMMOMATIC_PE_ONLY,
};

/// TruSeq2 adapters (GAII machines).
pub const TRUSEQ2: AdapterProfile = AdapterProfile {
    name: "TruSeq2",
    description: "TruSeq2 adapters as used on GAII instruments.",
    single_end_fasta: "TruSeq2-SE.fa",
    paired_end_fasta: "TruSeq2-PE.fa",
    provenance: TRIMMOMATIC_ADAPTERS,
};

/// TruSeq3 adapters (HiSeq and MiSeq).
pub const TRUSEQ3: AdapterProfile = AdapterProfile {
    name: "TruSeq3",
    description: "TruSeq3 adapters as used on HiSeq and MiSeq instruments.",
    single_end_fasta: "TruSeq3-SE.fa",
    paired_end_fasta: "TruSeq3-PE.fa",
    provenance: TRIMMOMATIC_ADAPTERS,
};

/// TruSeq3 with the extra palindrome sequences.
pub const TRUSEQ3_2: AdapterProfile = AdapterProfile {
    name: "TruSeq3-2",
    description: "TruSeq3 adapters including additional palindrome sequences.",
    single_end_fasta: "TruSeq3-PE-2.fa",
    paired_end_fasta: "TruSeq3-PE-2.fa",
    provenance: TRIMMOMATIC_PE_ONLY,
};

pub const ADAPTER_PROFILES: &[AdapterProfile] = &[NEXTERA, TRUSEQ2, TRUSEQ3, TRUSEQ3_2];
