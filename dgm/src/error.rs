use thiserror::Error;

#[derive(Debug, Error)]
/// Errors raised by the analysis engine. Only [`Error::Config`] aborts a run before reads are
/// consumed, the remaining variants come from the read source or the statistics backend.
pub enum Error {
    #[error("Invalid configuration: {0}")]
    /// A configuration invariant was violated
    Config(#[from] ConfigError),
    #[error("Could not read sequence file")]
    /// I/O failure while reading reads or references
    Io(#[from] std::io::Error),
    #[error("Could not parse FASTQ record")]
    /// Malformed FASTQ record
    Fastq(#[from] bio::io::fastq::Error),
    #[error("Could not open compressed sequence file")]
    /// Compression detection or decoder set-up failed
    Niffler(#[from] niffler::Error),
    #[error("Annotation entry {0} is neither a readable file nor a nucleotide sequence")]
    /// An annotation entry names a missing file or holds non-nucleotide symbols
    InvalidReference(String),
    #[error("Could not compute p-value: {0}")]
    /// Statistical parameters were rejected by the distribution backend
    Scoring(String),
}

#[derive(Debug, Error, PartialEq)]
/// Configuration invariants checked before any reads are consumed
pub enum ConfigError {
    #[error("k-mer size must be greater than 0")]
    /// `kmer_size` was zero
    ZeroKmerSize,
    #[error("l-mer size must be greater than 0")]
    /// `lmer_size` was zero
    ZeroLmerSize,
    #[error("l-mer size {lmer} must be smaller than k-mer size {kmer}")]
    /// `lmer_size >= kmer_size`
    LmerNotSmaller {
        /// l-mer size supplied
        lmer: usize,
        /// k-mer size supplied
        kmer: usize,
    },
    #[error("Jaccard threshold {0} is outside [0, 1]")]
    /// `jsthrsh` outside the unit interval
    ThresholdOutOfRange(f64),
    #[error("Minimum sample size {min} exceeds maximum sample size {max}")]
    /// `min_smp_sz > max_smp_sz`
    SampleBounds {
        /// minimum sample size supplied
        min: usize,
        /// maximum sample size supplied
        max: usize,
    },
    #[error("Maximum number of reads to process must be greater than 0")]
    /// `max_fastq_reads` was zero
    ZeroReads,
    #[error("Significance level {0} is outside (0, 1]")]
    /// `alpha` outside `(0, 1]`
    AlphaOutOfRange(f64),
    #[error("Per-window error rate {0} is outside (0, 1)")]
    /// `error_rate` outside `(0, 1)`
    ErrorRateOutOfRange(f64),
    #[error("Annotation timeout must be greater than 0")]
    /// `annotation_timeout` was zero
    ZeroAnnotationTimeout,
}

#[derive(Debug, Error, Clone, PartialEq)]
/// Failures of the reference annotation service. These never abort a run, the affected motif is
/// reported with an unknown annotation instead.
pub enum AnnotationError {
    #[error("Annotation query timed out after {0:?}")]
    /// The service did not answer within the configured timeout
    Timeout(std::time::Duration),
    #[error("Annotation service failed: {0}")]
    /// The service reported an error
    Service(String),
    #[error("Annotation worker stopped before answering")]
    /// The worker thread running the query died
    Disconnected,
}
