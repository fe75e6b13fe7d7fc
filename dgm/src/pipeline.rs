use crate::annotate::{annotate_or_degrade, Annotation, Annotator, FmIndexAnnotator, GuardedAnnotator};
use crate::collapse::{collapse, Cluster};
use crate::config::Config;
use crate::kmer::KmerExtractor;
use crate::reference::ReferenceSet;
use crate::sampler::{FrozenSamples, SampleSet, ScanState, VariantSampler};
use crate::score::{benjamini_hochberg, diversity_pvalue};
use crate::source::SequenceRead;
use crate::Result;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::sync::Arc;

/// Column names matching [`MotifResult::to_tsv_row`]
pub const TSV_HEADER: &str =
    "sample_id\tkmer\toccurrences\tsampled\tclusters\tcluster_sizes\tpvalue\tqvalue\tannotation\trepresentative";

const PROGRESS_INTERVAL: usize = 1_000_000;

/// Stages of a single-sample analysis, entered in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Configuration validation
    Init,
    /// Reads are extracted and sampled
    Scanning,
    /// Sample sets are frozen
    FinalizingSamples,
    /// Per k-mer collapse and scoring
    Scoring,
    /// Significant motifs are annotated
    Annotating,
    /// Results assembled
    Done,
}

/// Cluster of a reported motif
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSummary {
    /// Representative context window
    pub representative: String,
    /// Number of sampled windows in the cluster
    pub size: usize,
}

/// A k-mer whose context diversity passed the significance cutoff
#[derive(Debug, Clone, PartialEq)]
pub struct MotifResult {
    /// Sample the motif was found in
    pub sample_id: String,
    /// The k-mer
    pub kmer: String,
    /// Occurrences counted over the scanned reads
    pub occurrences: u64,
    /// Context windows sampled
    pub sampled: usize,
    /// Clusters, largest first
    pub clusters: Vec<ClusterSummary>,
    /// Diversity p-value
    pub pvalue: f64,
    /// Adjusted p-value, equal to `pvalue` without correction
    pub qvalue: f64,
    /// Reference annotation of the k-mer
    pub annotation: Annotation,
}

impl MotifResult {
    /// Cluster sizes, largest first
    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.clusters.iter().map(|cluster| cluster.size).collect()
    }

    /// Tab separated summary, see [`TSV_HEADER`]
    pub fn to_tsv_row(&self) -> String {
        let sizes = self
            .cluster_sizes()
            .iter()
            .map(|size| size.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let representative = self
            .clusters
            .first()
            .map_or("*", |cluster| cluster.representative.as_str());

        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{:e}\t{:e}\t{}\t{}",
            self.sample_id,
            self.kmer,
            self.occurrences,
            self.sampled,
            self.clusters.len(),
            sizes,
            self.pvalue,
            self.qvalue,
            self.annotation,
            representative,
        )
    }
}

/// K-mer that went through collapse and scoring
#[derive(Debug)]
pub struct Scored<'a> {
    order: usize,
    kmer: &'a [u8],
    sample: &'a SampleSet,
    clusters: Vec<Cluster>,
    pvalue: f64,
    qvalue: f64,
}

/// Drives one sample through the analysis stages
#[derive(Debug)]
pub struct Pipeline<'c> {
    config: &'c Config,
    sample_id: String,
    stage: Stage,
}

impl<'c> Pipeline<'c> {
    /// Validates the configuration. Nothing is read when this fails.
    pub fn new<S: Into<String>>(sample_id: S, config: &'c Config) -> Result<Self> {
        let sample_id = sample_id.into();
        debug!("Validating configuration for sample {}", sample_id);
        config.validate()?;
        Ok(Self {
            config,
            sample_id,
            stage: Stage::Init,
        })
    }

    /// Current stage
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn transition(&mut self, next: Stage) {
        debug_assert!(next > self.stage);
        info!(
            "Sample {}: {:?} -> {:?}",
            self.sample_id, self.stage, next
        );
        self.stage = next;
    }

    /// Pulls reads until the source is exhausted or `max_fastq_reads` is reached, then freezes
    /// the sample sets. A source error ends the scan early.
    pub fn scan<S>(&mut self, source: S, mut state: ScanState) -> (FrozenSamples, ScanState)
    where
        S: IntoIterator<Item = Result<SequenceRead>>,
    {
        self.transition(Stage::Scanning);
        let extractor = KmerExtractor::from_config(self.config);
        let mut sampler = VariantSampler::new(self.config.max_smp_sz);
        let mut source = source.into_iter();

        while state.reads_consumed < self.config.max_fastq_reads {
            let read = match source.next() {
                Some(Ok(read)) => read,
                Some(Err(e)) => {
                    warn!(
                        "Stopping scan after {} reads, could not read next record: {}",
                        state.reads_consumed, e
                    );
                    break;
                }
                None => break,
            };
            state.reads_consumed += 1;

            let mut emitted = 0;
            for occ in extractor.occurrences(&read.seq) {
                sampler.add(&occ);
                emitted += 1;
            }
            state.occurrences += emitted;
            state.degenerate += extractor.positions(read.len()) as u64 - emitted;

            if state.reads_consumed % PROGRESS_INTERVAL == 0 {
                debug!(
                    "Scanned {} reads, {} distinct k-mers",
                    state.reads_consumed,
                    sampler.len()
                );
            }
        }

        info!(
            "Scanned {} reads: {} occurrences of {} distinct k-mers, {} ambiguous positions skipped",
            state.reads_consumed,
            state.occurrences,
            sampler.len(),
            state.degenerate
        );

        self.transition(Stage::FinalizingSamples);
        (sampler.finalize(), state)
    }

    /// Collapses and scores every k-mer with enough samples, then keeps those below the
    /// significance cutoff ordered by p-value.
    pub fn score<'s>(&mut self, samples: &'s FrozenSamples) -> Vec<Scored<'s>> {
        self.transition(Stage::Scoring);
        let config = self.config;
        let min_samples = config.min_smp_sz.max(2);

        let candidates = samples
            .iter()
            .enumerate()
            .filter(|(_, (_, sample))| sample.len() >= min_samples)
            .collect::<Vec<_>>();

        let mut scored = candidates
            .into_par_iter()
            .filter_map(|(order, (kmer, sample))| {
                let clusters = collapse(sample.contexts(), config.lmer_size, config.jsthrsh);
                let sizes = clusters.iter().map(Cluster::size).collect::<Vec<_>>();
                match diversity_pvalue(&sizes, config.error_rate) {
                    Ok(pvalue) => Some(Scored {
                        order,
                        kmer,
                        sample,
                        clusters,
                        pvalue,
                        qvalue: pvalue,
                    }),
                    Err(e) => {
                        warn!("Skipping {}: {}", String::from_utf8_lossy(kmer), e);
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        if config.fdr_correction {
            let pvalues = scored.iter().map(|s| s.pvalue).collect::<Vec<_>>();
            for (s, q) in scored.iter_mut().zip(benjamini_hochberg(&pvalues)) {
                s.qvalue = q;
            }
        }

        let total = scored.len();
        scored.retain(|s| s.qvalue < config.alpha);
        scored.sort_by(|a, b| {
            a.pvalue
                .partial_cmp(&b.pvalue)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.order.cmp(&b.order))
        });
        info!(
            "Scored {} of {} k-mers, {} significant at alpha {}",
            total,
            samples.len(),
            scored.len(),
            config.alpha
        );
        scored
    }

    /// Annotates the significant k-mers. Without an annotator every motif is `Unknown`.
    pub fn annotate(
        &mut self,
        scored: Vec<Scored<'_>>,
        annotator: Option<&dyn Annotator>,
    ) -> Vec<MotifResult> {
        self.transition(Stage::Annotating);
        let sample_id = self.sample_id.as_str();

        let results = scored
            .into_par_iter()
            .map(|s| {
                let annotation = match annotator {
                    Some(annotator) => annotate_or_degrade(annotator, s.kmer),
                    None => Annotation::Unknown,
                };
                build_result(sample_id, s, annotation)
            })
            .collect::<Vec<_>>();

        self.transition(Stage::Done);
        results
    }
}

fn build_result(sample_id: &str, scored: Scored<'_>, annotation: Annotation) -> MotifResult {
    let contexts = scored.sample.contexts();
    let mut clusters = scored
        .clusters
        .iter()
        .map(|cluster| ClusterSummary {
            representative: String::from_utf8_lossy(&contexts[cluster.representative])
                .into_owned(),
            size: cluster.size(),
        })
        .collect::<Vec<_>>();
    clusters.sort_by(|a, b| b.size.cmp(&a.size));

    MotifResult {
        sample_id: sample_id.to_string(),
        kmer: String::from_utf8_lossy(scored.kmer).into_owned(),
        occurrences: scored.sample.occurrences(),
        sampled: scored.sample.len(),
        clusters,
        pvalue: scored.pvalue,
        qvalue: scored.qvalue,
        annotation,
    }
}

fn default_annotator(config: &Config) -> Option<Arc<dyn Annotator>> {
    match ReferenceSet::from_entries(&config.annot_fasta) {
        Ok(references) => {
            let inner: Arc<dyn Annotator> = Arc::new(FmIndexAnnotator::new(references));
            Some(Arc::new(GuardedAnnotator::new(
                inner,
                config.annotation_timeout,
                config.annotation_retries,
            )))
        }
        Err(e) => {
            warn!(
                "Could not load annotation references, motifs will not be annotated: {}",
                e
            );
            None
        }
    }
}

/// Analyses one sample, annotating significant motifs against `config.annot_fasta`.
pub fn run_analysis<S>(source: S, sample_id: &str, config: &Config) -> Result<Vec<MotifResult>>
where
    S: IntoIterator<Item = Result<SequenceRead>>,
{
    let mut pipeline = Pipeline::new(sample_id, config)?;
    let (samples, _) = pipeline.scan(source, ScanState::default());
    let scored = pipeline.score(&samples);
    let annotator = if scored.is_empty() {
        None
    } else {
        default_annotator(config)
    };
    Ok(pipeline.annotate(scored, annotator.as_deref()))
}

/// Analyses one sample with a caller supplied annotation service
pub fn run_analysis_with<S>(
    source: S,
    sample_id: &str,
    config: &Config,
    annotator: Arc<dyn Annotator>,
) -> Result<Vec<MotifResult>>
where
    S: IntoIterator<Item = Result<SequenceRead>>,
{
    let mut pipeline = Pipeline::new(sample_id, config)?;
    let (samples, _) = pipeline.scan(source, ScanState::default());
    let scored = pipeline.score(&samples);
    Ok(pipeline.annotate(scored, Some(annotator.as_ref())))
}
