use needletail::errors::ParseError;

/// Failures raised while reading FASTQ input.
///
/// `origin` is the file path (or `<stream>` for in-memory readers).
#[derive(thiserror::Error, Debug)]
pub enum FastqError {
    #[error("Error reading \"{origin}\": {source}")]
    Io {
        origin: String,
        source: std::io::Error,
    },

    #[error("Malformed FASTQ in \"{origin}\": {source}")]
    Parse {
        origin: String,
        source: ParseError,
    },

    #[error("Record \"{header}\" in \"{origin}\" has no quality line (FASTA input is not supported)")]
    MissingQuality {
        origin: String,
        header: String,
    },

    #[error("Record \"{header}\" in \"{origin}\" has {seq_len} bases but {qual_len} quality scores")]
    LengthMismatch {
        origin: String,
        header: String,
        seq_len: usize,
        qual_len: usize,
    },

    #[error("\"{origin}\" ended after {found} records, {wanted} were requested")]
    Exhausted {
        origin: String,
        wanted: usize,
        found: usize,
    },
}
