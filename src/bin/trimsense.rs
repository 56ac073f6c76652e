use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use polars::prelude::*;

use trimsense::learn::{self, LearnOpts, LearnedParams};
use trimsense::subsample::{DEFAULT_NUM_FILES, DEFAULT_NUM_SEQUENCES};
use trimsense::tools::{Flash, Trimmomatic};

/// trimsense CLI
#[derive(Parser)]
#[command(name = "trimsense")]
#[command(version)]
#[command(about = "Learn FASTQ preprocessing parameters from a subsample", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the candidate adapter profiles
    ListAdapters,

    /// Report whether a set of FASTQ files is paired-end
    DetectPaired {
        /// Input FASTQ files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Subsample inputs, choose an adapter profile and test read merging
    Learn {
        /// Input FASTQ files (FASTQ/FASTQ.GZ)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Working directory (subsampled/, trimmed/ and merged/ are created inside)
        #[arg(long)]
        work_dir: PathBuf,
        /// Number of input files to subsample
        #[arg(long, default_value_t = DEFAULT_NUM_FILES)]
        num_files: usize,
        /// Records taken from each subsampled file
        #[arg(long, default_value_t = DEFAULT_NUM_SEQUENCES)]
        num_sequences: usize,
        /// Trimmomatic executable
        #[arg(long, default_value = "trimmomatic")]
        trimmomatic: String,
        /// Directory holding Trimmomatic's adapter clip files
        #[arg(long, default_value = "adapters")]
        adapter_dir: PathBuf,
        /// FLASH executable
        #[arg(long, default_value = "flash")]
        flash: String,
        /// Write the learned parameters to a JSON file
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::ListAdapters => cmd_list_adapters()?,

        Commands::DetectPaired { files } => {
            let paired = trimsense::pairing::detect_paired_end(&files)?;
            println!("paired={paired}");
        }

        Commands::Learn { files, work_dir, num_files, num_sequences, trimmomatic, adapter_dir, flash, json } => {
            let opts = LearnOpts { inputs: files, work_dir, num_files, num_sequences };
            let trimmer = Trimmomatic { program: trimmomatic, adapter_dir };
            let merger = Flash { program: flash };
            let params = learn::run(&opts, &trimmer, &merger)?;
            print_params(&params)?;
            if let Some(path) = json {
                let fh = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
                let mut w = BufWriter::new(fh);
                serde_json::to_writer_pretty(&mut w, &params)?;
                w.flush().with_context(|| format!("writing {}", path.display()))?;
            }
        }
    }

    Ok(())
}

fn cmd_list_adapters() -> PolarsResult<()> {
    let rows = trimsense::adapter_profile_rows();
    let df = df!(
        "adapter"        => rows.iter().map(|r| r.0.clone()).collect::<Vec<_>>(),
        "description"    => rows.iter().map(|r| r.1.clone()).collect::<Vec<_>>(),
        "single_end"     => rows.iter().map(|r| r.2.clone()).collect::<Vec<_>>(),
        "paired_end"     => rows.iter().map(|r| r.3.clone()).collect::<Vec<_>>(),
    )?;

    // Polars' pretty-printer reads these at display time.
    std::env::set_var("POLARS_FMT_TABLE_FORMATTING", "UTF8_FULL");
    std::env::set_var("POLARS_FMT_STR_LEN", "1000");
    println!("{}", df);
    Ok(())
}

fn print_params(p: &LearnedParams) -> PolarsResult<()> {
    let fmt_opt = |v: Option<f64>| v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "NA".to_string());
    println!("layout={}", p.layout);
    println!("adapter={}", p.adapter.unwrap_or("none"));
    println!("adapter_size={}", p.adapter_size);
    println!("original_size={}", p.original_size);
    println!(
        "stitchable={}",
        p.stitchable.map(|s| s.to_string()).unwrap_or_else(|| "NA".to_string())
    );
    println!("num_sequences={}", p.num_sequences);
    println!("average_length={}", fmt_opt(p.average_length));
    println!("average_quality={}", fmt_opt(p.average_quality));

    let df = df!(
        "adapter" => p.trials.iter().map(|t| t.adapter.to_string()).collect::<Vec<_>>(),
        "size"    => p.trials.iter().map(|t| t.size).collect::<Vec<u64>>(),
    )?;
    println!("{}", df);
    Ok(())
}
