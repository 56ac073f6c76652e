//! External collaborators: the adapter trimmer and the overlap read merger.
//!
//! Both are black-box commands that write their results into a given output
//! directory. The traits are the seam the selection logic runs against;
//! [`Trimmomatic`] and [`Flash`] are the command-line implementations.
//!
//! A tool that cannot be started, or exits with a non-zero status, is an error
//! carrying the program name, the exit status and the captured stderr.
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;

use crate::pairing::split_fwd_rev;
use crate::profile::{AdapterProfile, ReadLayout};

/// Runs one adapter-clipping pass over a file set.
pub trait AdapterTrimmer {
    /// Trim every file independently. Returns the output files.
    fn trim_single_end(&self, inputs: &[PathBuf], output_dir: &Path, profile: &AdapterProfile, threads: usize) -> Result<Vec<PathBuf>>;

    /// Trim sorted R1/R2 pairs together. Returns the paired output files, R1 and R2 interleaved.
    fn trim_paired_end(&self, inputs: &[PathBuf], output_dir: &Path, profile: &AdapterProfile, threads: usize) -> Result<Vec<PathBuf>>;

    fn trim(&self, layout: ReadLayout, inputs: &[PathBuf], output_dir: &Path, profile: &AdapterProfile, threads: usize) -> Result<Vec<PathBuf>> {
        match layout {
            ReadLayout::SingleEnd => self.trim_single_end(inputs, output_dir, profile, threads),
            ReadLayout::PairedEnd => self.trim_paired_end(inputs, output_dir, profile, threads),
        }
    }
}

/// Overlap bounds handed to the merger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeOptions {
    pub max_overlap: usize,
    pub min_overlap: usize,
    /// Also merge "outie" pairs (R1 3' end overlapping R2 5' end).
    pub allow_outies: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self { max_overlap: 700, min_overlap: 20, allow_outies: true }
    }
}

/// Merges overlapping mates into single reads.
pub trait ReadMerger {
    /// Merge each sorted R1/R2 pair of `inputs`. Returns one merged file per pair, in pair order.
    fn merge(&self, inputs: &[PathBuf], output_dir: &Path, opts: &MergeOptions, threads: usize) -> Result<Vec<PathBuf>>;
}

fn run_tool(cmd: &mut Command) -> Result<()> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    debug!("running {:?}", cmd);
    let output = cmd.output().with_context(|| format!("failed to start {program}"))?;
    if !output.status.success() {
        anyhow::bail!(
            "{} failed (exit code: {:?}): {}",
            program,
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

fn basename(p: &Path) -> Result<&std::ffi::OsStr> {
    p.file_name().with_context(|| format!("{} has no file name", p.display()))
}

/// Trimmomatic in `SE`/`PE` mode with an `ILLUMINACLIP` step.
#[derive(Debug, Clone)]
pub struct Trimmomatic {
    /// Executable (or wrapper script) to run.
    pub program: String,
    /// Directory holding the adapter clip FASTA files.
    pub adapter_dir: PathBuf,
}

impl Default for Trimmomatic {
    fn default() -> Self {
        Self { program: "trimmomatic".to_string(), adapter_dir: PathBuf::from("adapters") }
    }
}

impl Trimmomatic {
    fn illuminaclip(&self, profile: &AdapterProfile, layout: ReadLayout) -> String {
        let fasta = self.adapter_dir.join(profile.fasta_for(layout));
        format!("ILLUMINACLIP:{}:2:30:10:2:true", fasta.display())
    }

    fn trim_pairs(&self, inputs: &[PathBuf], output_dir: &Path, unpaired_dir: &Path, profile: &AdapterProfile, threads: usize) -> Result<Vec<PathBuf>> {
        let clip = self.illuminaclip(profile, ReadLayout::PairedEnd);
        let (fwd, rev) = split_fwd_rev(inputs);
        let mut outputs = Vec::with_capacity(inputs.len());
        for (r1, r2) in fwd.iter().zip(&rev) {
            let (n1, n2) = (basename(r1)?, basename(r2)?);
            let (out1, out2) = (output_dir.join(n1), output_dir.join(n2));
            run_tool(
                Command::new(&self.program)
                    .args(["PE", "-threads", &threads.to_string(), "-phred33"])
                    .arg(r1)
                    .arg(r2)
                    .arg(&out1)
                    .arg(unpaired_dir.join(n1))
                    .arg(&out2)
                    .arg(unpaired_dir.join(n2))
                    .arg(&clip),
            )?;
            outputs.push(out1);
            outputs.push(out2);
        }
        Ok(outputs)
    }
}

impl AdapterTrimmer for Trimmomatic {
    fn trim_single_end(&self, inputs: &[PathBuf], output_dir: &Path, profile: &AdapterProfile, threads: usize) -> Result<Vec<PathBuf>> {
        let clip = self.illuminaclip(profile, ReadLayout::SingleEnd);
        let mut outputs = Vec::with_capacity(inputs.len());
        for input in inputs {
            let out = output_dir.join(basename(input)?);
            run_tool(
                Command::new(&self.program)
                    .args(["SE", "-threads", &threads.to_string(), "-phred33"])
                    .arg(input)
                    .arg(&out)
                    .arg(&clip),
            )?;
            outputs.push(out);
        }
        Ok(outputs)
    }

    fn trim_paired_end(&self, inputs: &[PathBuf], output_dir: &Path, profile: &AdapterProfile, threads: usize) -> Result<Vec<PathBuf>> {
        let unpaired_dir = output_dir.join("unpaired");
        fs::create_dir_all(&unpaired_dir).with_context(|| format!("creating {}", unpaired_dir.display()))?;
        let trimmed = self.trim_pairs(inputs, output_dir, &unpaired_dir, profile, threads);
        // Orphaned mates are discarded; only the paired outputs stay in `output_dir`.
        let removed = fs::remove_dir_all(&unpaired_dir).with_context(|| format!("removing {}", unpaired_dir.display()));
        let outputs = trimmed?;
        removed?;
        Ok(outputs)
    }
}

/// FLASH (Fast Length Adjustment of SHort reads).
#[derive(Debug, Clone)]
pub struct Flash {
    pub program: String,
}

impl Default for Flash {
    fn default() -> Self { Self { program: "flash".to_string() } }
}

impl ReadMerger for Flash {
    fn merge(&self, inputs: &[PathBuf], output_dir: &Path, opts: &MergeOptions, threads: usize) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(output_dir).with_context(|| format!("creating {}", output_dir.display()))?;
        let (fwd, rev) = split_fwd_rev(inputs);
        let mut merged = Vec::with_capacity(fwd.len());
        for (r1, r2) in fwd.iter().zip(&rev) {
            let prefix = basename(r1)?.to_string_lossy().into_owned();
            let mut cmd = Command::new(&self.program);
            cmd.arg(r1)
                .arg(r2)
                .arg("-o").arg(&prefix)
                .arg("-d").arg(output_dir)
                .arg("-M").arg(opts.max_overlap.to_string())
                .arg("-m").arg(opts.min_overlap.to_string())
                .arg("-t").arg(threads.to_string());
            if opts.allow_outies {
                cmd.arg("-O");
            }
            run_tool(&mut cmd)?;
            merged.push(output_dir.join(format!("{prefix}.extendedFrags.fastq")));
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_defaults() {
        let o = MergeOptions::default();
        assert_eq!((o.max_overlap, o.min_overlap, o.allow_outies), (700, 20, true));
    }

    #[test]
    fn illuminaclip_uses_layout_specific_file() {
        let t = Trimmomatic { program: "trimmomatic".into(), adapter_dir: PathBuf::from("/opt/adapters") };
        let p = crate::get_adapter_profile("TruSeq3").unwrap();
        assert_eq!(t.illuminaclip(p, ReadLayout::SingleEnd), "ILLUMINACLIP:/opt/adapters/TruSeq3-SE.fa:2:30:10:2:true");
        assert_eq!(t.illuminaclip(p, ReadLayout::PairedEnd), "ILLUMINACLIP:/opt/adapters/TruSeq3-PE.fa:2:30:10:2:true");
    }

    #[test]
    fn missing_program_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.fastq");
        fs::write(&input, "@a\nA\n+\nI\n").unwrap();
        let t = Trimmomatic { program: "trimsense-no-such-tool".into(), adapter_dir: dir.path().to_path_buf() };
        let p = crate::get_adapter_profile("Nextera").unwrap();
        let err = t.trim_single_end(&[input], dir.path(), p, 1).unwrap_err();
        assert!(err.to_string().contains("trimsense-no-such-tool"));
    }

    /// Executable that appends its arguments, one per line, to `log`, then a `---` separator.
    #[cfg(unix)]
    fn argv_recorder(dir: &Path, log: &Path) -> String {
        use std::os::unix::fs::PermissionsExt;
        let script = dir.join("record-argv.sh");
        fs::write(&script, format!("#!/bin/sh\nprintf '%s\\n' \"$@\" --- >> '{}'\n", log.display())).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        script.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    fn recorded_calls(log: &Path) -> Vec<Vec<String>> {
        let text = fs::read_to_string(log).unwrap();
        text.split_terminator("---\n")
            .map(|call| call.lines().map(str::to_string).collect())
            .collect()
    }

    #[cfg(unix)]
    fn s(p: &Path) -> String { p.display().to_string() }

    #[cfg(unix)]
    #[test]
    fn trimmomatic_paired_end_command_line() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("trimmed");
        fs::create_dir_all(&out).unwrap();
        let log = dir.path().join("argv.log");
        let t = Trimmomatic { program: argv_recorder(dir.path(), &log), adapter_dir: PathBuf::from("/ad") };
        let inputs = vec![dir.path().join("s_2.fq"), dir.path().join("s_1.fq")];
        let p = crate::get_adapter_profile("TruSeq3").unwrap();

        let outputs = t.trim_paired_end(&inputs, &out, p, 4).unwrap();
        assert_eq!(outputs, vec![out.join("s_1.fq"), out.join("s_2.fq")]);
        assert!(!out.join("unpaired").exists());

        let calls = recorded_calls(&log);
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            vec![
                "PE".to_string(), "-threads".into(), "4".into(), "-phred33".into(),
                s(&dir.path().join("s_1.fq")), s(&dir.path().join("s_2.fq")),
                s(&out.join("s_1.fq")), s(&out.join("unpaired").join("s_1.fq")),
                s(&out.join("s_2.fq")), s(&out.join("unpaired").join("s_2.fq")),
                "ILLUMINACLIP:/ad/TruSeq3-PE.fa:2:30:10:2:true".into(),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn trimmomatic_single_end_command_line() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("trimmed");
        fs::create_dir_all(&out).unwrap();
        let log = dir.path().join("argv.log");
        let t = Trimmomatic { program: argv_recorder(dir.path(), &log), adapter_dir: PathBuf::from("/ad") };
        let inputs = vec![dir.path().join("a.fq"), dir.path().join("b.fq")];
        let p = crate::get_adapter_profile("Nextera").unwrap();

        let outputs = t.trim_single_end(&inputs, &out, p, 2).unwrap();
        assert_eq!(outputs, vec![out.join("a.fq"), out.join("b.fq")]);
        let calls = recorded_calls(&log);
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[1],
            vec![
                "SE".to_string(), "-threads".into(), "2".into(), "-phred33".into(),
                s(&dir.path().join("b.fq")), s(&out.join("b.fq")),
                "ILLUMINACLIP:/ad/NexteraPE-PE.fa:2:30:10:2:true".into(),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn flash_command_line() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("merged");
        let log = dir.path().join("argv.log");
        let f = Flash { program: argv_recorder(dir.path(), &log) };
        let inputs = vec![
            dir.path().join("x_1.fq"), dir.path().join("x_2.fq"),
            dir.path().join("y_1.fq"), dir.path().join("y_2.fq"),
        ];

        let merged = f.merge(&inputs, &out, &MergeOptions::default(), 3).unwrap();
        assert_eq!(merged, vec![out.join("x_1.fq.extendedFrags.fastq"), out.join("y_1.fq.extendedFrags.fastq")]);

        let calls = recorded_calls(&log);
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            vec![
                s(&dir.path().join("x_1.fq")), s(&dir.path().join("x_2.fq")),
                "-o".to_string(), "x_1.fq".into(), "-d".into(), s(&out),
                "-M".into(), "700".into(), "-m".into(), "20".into(), "-t".into(), "3".into(), "-O".into(),
            ]
        );

        let no_outies = MergeOptions { allow_outies: false, ..MergeOptions::default() };
        fs::remove_file(&log).unwrap();
        f.merge(&inputs[..2], &out, &no_outies, 1).unwrap();
        assert!(!recorded_calls(&log)[0].contains(&"-O".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_reports_exit_code() {
        let err = run_tool(Command::new("sh").args(["-c", "echo boom >&2; exit 3"])).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Some(3)") && msg.contains("boom"));
    }
}
