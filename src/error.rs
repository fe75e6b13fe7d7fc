use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors of which majority are related to I/O issues or incorrect input
pub enum Error {
    #[error("Could not read annotation file")]
    /// Could not read a line of the annotation file
    AnnotationFileError(#[from] std::io::Error),
    #[error(transparent)]
    /// Analysis failed, including invalid configuration
    AnalysisError(#[from] dgm::Error),
    #[error("Could not spawn threads")]
    /// Create thread pools erorr
    ThreadError,
    #[error("No reads found in {0}")]
    /// FASTQ file holds no records
    EmptyInput(PathBuf),
    #[error("Reads of length {read_len} are too short for k-mer size {kmer_size}, lookahead distance would be negative")]
    /// `read_len - 10 - 2 * kmer_size < 0`
    NegativeDistance {
        /// length of the first read
        read_len: usize,
        /// requested k-mer size
        kmer_size: usize,
    },
}
