#![warn(missing_debug_implementations, rust_2018_idioms, missing_docs)]

//! Discovery of diversified genomic motifs (DGMs) within a single sequencing sample.
//!
//! Every k-mer of every read is paired with the bases that follow it. For each distinct k-mer a
//! bounded sample of these context windows is kept, collapsed into clusters of near-identical
//! variants by l-mer Jaccard similarity, and tested against a single-variant read-noise null.
//! K-mers whose diversity is significant are annotated against a reference collection.
//!
//! ```no_run
//! use dgm::{run_analysis, Config, FastqSource};
//!
//! let config = Config::new(86, 27, vec!["phages.fa".to_string()]);
//! let source = FastqSource::from_path("sample.fq.gz").unwrap();
//! for motif in run_analysis(source, "sample", &config).unwrap() {
//!     println!("{}", motif.to_tsv_row());
//! }
//! ```

mod annotate;
mod collapse;
mod config;
mod error;
mod kmer;
mod pipeline;
mod reference;
mod sampler;
mod score;
mod source;

pub use crate::annotate::{annotate_or_degrade, Annotation, Annotator, FmIndexAnnotator, GuardedAnnotator};
pub use crate::collapse::{collapse, Cluster, Shingles};
pub use crate::config::*;
pub use crate::error::{AnnotationError, ConfigError, Error};
pub use crate::kmer::{is_valid_kmer, KmerExtractor, Occurrence};
pub use crate::pipeline::{
    run_analysis, run_analysis_with, ClusterSummary, MotifResult, Pipeline, Scored, Stage,
    TSV_HEADER,
};
pub use crate::reference::{Reference, ReferenceSet};
pub use crate::sampler::{FrozenSamples, SampleSet, ScanState, VariantSampler};
pub use crate::score::{benjamini_hochberg, diversity_pvalue};
pub use crate::source::{first_read_length, FastqSource, SequenceRead};

/// Result type of the analysis engine
pub type Result<T> = std::result::Result<T, crate::error::Error>;
