#![forbid(unsafe_code)]
//! # trimsense
//!
//! Empirical selection of FASTQ preprocessing parameters. A small subsample of
//! the raw files is taken, candidate external tools are run over it, and the
//! resulting byte sizes and line counts decide:
//! - whether the files are **paired-end** (R1/R2) or single-end,
//! - which **adapter-clipping profile** (if any) is worth applying,
//! - whether paired reads **overlap enough to merge**.
//!
//! ## Examples
//! ```rust
//! // Discover the candidate adapter profiles:
//! for p in trimsense::list_adapter_profiles() { println!("{}: {}", p.name, p.description); }
//! // Look one up by name (case-insensitive):
//! let p = trimsense::get_adapter_profile("truseq3").unwrap();
//! assert_eq!(p.name, "TruSeq3");
//! // Mate headers differ by exactly one incremented digit:
//! assert!(trimsense::pairing::headers_are_mates("read/1", "read/2"));
//! ```

pub mod adapter_select;
pub mod errors;
pub mod fastq;
pub mod learn;
pub mod metrics;
pub mod pairing;
pub mod profile;
pub mod stitch;
pub mod subsample;
pub mod tools;
pub mod data { pub mod adapters; }

use profile::AdapterProfile;

/// Upper bound on the thread count handed to external tools.
pub const MAX_TOOL_THREADS: usize = 16;

/// Threads handed to external tools: `min(logical CPUs, 16)`.
pub fn max_threads() -> usize {
    num_cpus::get().clamp(1, MAX_TOOL_THREADS)
}

/// Return the static registry of candidate adapter profiles, in trial order.
pub fn list_adapter_profiles() -> &'static [AdapterProfile] { data::adapters::ADAPTER_PROFILES }

/// Retrieve an adapter profile by name (case-insensitive).
///
/// # Examples
/// ```rust
/// assert!(trimsense::get_adapter_profile("Nextera").is_some());
/// assert!(trimsense::get_adapter_profile("TruSeq4").is_none());
/// ```
pub fn get_adapter_profile(name: &str) -> Option<&'static AdapterProfile> {
    data::adapters::ADAPTER_PROFILES.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Convenience: one row per profile for CLI listing.
/// Each row is `(name, description, single_end_fasta, paired_end_fasta)`.
pub fn adapter_profile_rows() -> Vec<(String, String, String, String)> {
    list_adapter_profiles()
        .iter()
        .map(|p| (p.name.to_string(), p.description.to_string(), p.single_end_fasta.to_string(), p.paired_end_fasta.to_string()))
        .collect()
}

/// Crate version string (from `CARGO_PKG_VERSION`).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod registry_tests {
    use super::*;

    #[test]
    fn four_profiles_in_trial_order() {
        let names: Vec<_> = list_adapter_profiles().iter().map(|p| p.name).collect();
        assert_eq!(names, ["Nextera", "TruSeq2", "TruSeq3", "TruSeq3-2"]);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(get_adapter_profile("truseq3-2").map(|p| p.name), Some("TruSeq3-2"));
    }

    #[test]
    fn provenance_present_for_every_profile() {
        for p in list_adapter_profiles() {
            assert!(p.provenance.url.contains("Trimmomatic"));
            assert!(p.single_end_fasta.ends_with(".fa") && p.paired_end_fasta.ends_with(".fa"));
        }
    }

    #[test]
    fn thread_cap() {
        let t = max_threads();
        assert!((1..=MAX_TOOL_THREADS).contains(&t));
    }

    #[test]
    fn rows_match_registry() {
        assert_eq!(adapter_profile_rows().len(), list_adapter_profiles().len());
    }
}
