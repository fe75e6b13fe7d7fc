use dgm::Config;
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "dgmfinder",
    about = "Finds k-mers whose downstream sequence diversifies within a single sample"
)]
pub(crate) struct DgmFinder {
    #[structopt(long = "fastq_id", help = "Sample identifier reported with every motif")]
    pub fastq_id: String,
    #[structopt(
        long = "fastq_file",
        help = "FASTQ file with the sample reads (plain or compressed)",
        parse(from_os_str)
    )]
    pub fastq_file: PathBuf,
    #[structopt(
        long = "annfile",
        help = "Annotation references, one FASTA path or sequence per line",
        parse(from_os_str)
    )]
    pub annfile: PathBuf,
    #[structopt(long = "kmer_size", help = "K-mer size used in the analysis")]
    pub kmer_size: usize,
    #[structopt(
        long = "min_smp_sz",
        default_value = "5",
        help = "Minimum number of sampled sequences needed to compute a p-value"
    )]
    pub min_smp_sz: usize,
    #[structopt(
        long = "max_smp_sz",
        default_value = "50",
        help = "Maximum number of sequences sampled per k-mer"
    )]
    pub max_smp_sz: usize,
    #[structopt(
        long = "lmer_size",
        default_value = "7",
        help = "l-mer size used for the Jaccard similarity between sampled sequences"
    )]
    pub lmer_size: usize,
    #[structopt(
        long = "jsthrsh",
        default_value = "0.25",
        help = "Jaccard similarity at which sampled sequences are collapsed"
    )]
    pub jsthrsh: f64,
    #[structopt(
        long = "max_fastq_reads",
        default_value = "5000000",
        help = "Maximum number of reads to process"
    )]
    pub max_fastq_reads: usize,
    #[structopt(
        short,
        long,
        default_value = "0.05",
        help = "Significance level for reporting a motif"
    )]
    pub alpha: f64,
    #[structopt(
        long = "error_rate",
        default_value = "0.01",
        help = "Probability that read noise moves a sampled sequence off the dominant variant"
    )]
    pub error_rate: f64,
    #[structopt(
        long = "no_correction",
        help = "Compare raw p-values with alpha instead of Benjamini-Hochberg adjusted ones"
    )]
    pub no_correction: bool,
    #[structopt(
        long = "keep_truncated",
        help = "Count k-mers whose lookahead runs past the read end"
    )]
    pub keep_truncated: bool,
    #[structopt(
        long = "annotation_timeout",
        default_value = "30",
        help = "Seconds allowed for a single annotation query"
    )]
    pub annotation_timeout: u64,
    #[structopt(
        long = "annotation_retries",
        default_value = "2",
        help = "Retries for a failed annotation query"
    )]
    pub annotation_retries: u32,
    #[structopt(short, long, default_value = "1", help = "Number of threads")]
    pub threads: usize,
    #[structopt(
        short,
        long,
        parse(from_occurrences),
        help = "Increase logging (-v info, -vv debug, -vvv trace)"
    )]
    pub verbosity: u8,
    #[structopt(short, long, help = "Only log errors")]
    pub quiet: bool,
}

impl DgmFinder {
    /// Initialises logging to stderr at the requested verbosity
    pub fn set_logging(&self) {
        let level = if self.quiet {
            LevelFilter::Error
        } else {
            match self.verbosity {
                0 => LevelFilter::Warn,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        };
        env_logger::Builder::new().filter_level(level).init();
    }

    /// Run configuration from the parsed options
    pub fn config(&self, dist: usize, annot_fasta: Vec<String>) -> Config {
        Config {
            min_smp_sz: self.min_smp_sz,
            max_smp_sz: self.max_smp_sz,
            lmer_size: self.lmer_size,
            jsthrsh: self.jsthrsh,
            max_fastq_reads: self.max_fastq_reads,
            alpha: self.alpha,
            fdr_correction: !self.no_correction,
            error_rate: self.error_rate,
            keep_truncated: self.keep_truncated,
            annotation_timeout: Duration::from_secs(self.annotation_timeout),
            annotation_retries: self.annotation_retries,
            ..Config::new(dist, self.kmer_size, annot_fasta)
        }
    }
}
