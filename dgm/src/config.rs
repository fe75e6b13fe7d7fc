use crate::error::ConfigError;
use std::time::Duration;

/// Bases reserved at the read end when deriving the lookahead distance
pub const LOOKAHEAD_MARGIN: usize = 10;
/// Minimum number of sampled windows before a k-mer is scored
pub const DEFAULT_MIN_SAMPLE_SIZE: usize = 5;
/// Maximum number of windows retained per k-mer
pub const DEFAULT_MAX_SAMPLE_SIZE: usize = 50;
/// Shingle length used for the Jaccard similarity
pub const DEFAULT_LMER_SIZE: usize = 7;
/// Jaccard similarity at or above which windows are collapsed
pub const DEFAULT_JACCARD_THRESHOLD: f64 = 0.25;
/// Reads processed before scanning stops
pub const DEFAULT_MAX_READS: usize = 5_000_000;
/// Significance level applied to the (adjusted) p-values
pub const DEFAULT_ALPHA: f64 = 0.05;
/// Probability that read noise moves a window off the dominant variant
pub const DEFAULT_ERROR_RATE: f64 = 0.01;
/// Time allowed for a single annotation query
pub const DEFAULT_ANNOTATION_TIMEOUT: Duration = Duration::from_secs(30);
/// Additional attempts after a failed annotation query
pub const DEFAULT_ANNOTATION_RETRIES: u32 = 2;

/// Run parameters, created once per sample and shared read-only by every stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Lookahead distance past the k-mer end that forms the context window
    pub dist: usize,
    /// K-mer size
    pub kmer_size: usize,
    /// K-mers with fewer sampled windows are not scored
    pub min_smp_sz: usize,
    /// Windows retained per k-mer, later occurrences are only counted
    pub max_smp_sz: usize,
    /// Shingle length for Jaccard similarity
    pub lmer_size: usize,
    /// Jaccard threshold for collapsing windows into one cluster
    pub jsthrsh: f64,
    /// Reads consumed before scanning stops
    pub max_fastq_reads: usize,
    /// Reference entries: FASTA paths or literal sequences
    pub annot_fasta: Vec<String>,
    /// Significance level
    pub alpha: f64,
    /// Apply Benjamini-Hochberg adjustment before comparing with `alpha`
    pub fdr_correction: bool,
    /// Null-model probability of a window leaving the dominant variant
    pub error_rate: f64,
    /// Emit occurrences whose context is cut short by the read end
    pub keep_truncated: bool,
    /// Per-query annotation timeout
    pub annotation_timeout: Duration,
    /// Retries for a failed annotation query
    pub annotation_retries: u32,
}

impl Config {
    /// Creates a configuration with the default sampling, clustering and testing parameters.
    pub fn new(dist: usize, kmer_size: usize, annot_fasta: Vec<String>) -> Self {
        Self {
            dist,
            kmer_size,
            min_smp_sz: DEFAULT_MIN_SAMPLE_SIZE,
            max_smp_sz: DEFAULT_MAX_SAMPLE_SIZE,
            lmer_size: DEFAULT_LMER_SIZE,
            jsthrsh: DEFAULT_JACCARD_THRESHOLD,
            max_fastq_reads: DEFAULT_MAX_READS,
            annot_fasta,
            alpha: DEFAULT_ALPHA,
            fdr_correction: true,
            error_rate: DEFAULT_ERROR_RATE,
            keep_truncated: false,
            annotation_timeout: DEFAULT_ANNOTATION_TIMEOUT,
            annotation_retries: DEFAULT_ANNOTATION_RETRIES,
        }
    }

    /// Checks every invariant and reports the first one violated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kmer_size == 0 {
            return Err(ConfigError::ZeroKmerSize);
        }
        if self.lmer_size == 0 {
            return Err(ConfigError::ZeroLmerSize);
        }
        if self.lmer_size >= self.kmer_size {
            return Err(ConfigError::LmerNotSmaller {
                lmer: self.lmer_size,
                kmer: self.kmer_size,
            });
        }
        if !(0.0..=1.0).contains(&self.jsthrsh) {
            return Err(ConfigError::ThresholdOutOfRange(self.jsthrsh));
        }
        if self.min_smp_sz > self.max_smp_sz {
            return Err(ConfigError::SampleBounds {
                min: self.min_smp_sz,
                max: self.max_smp_sz,
            });
        }
        if self.max_fastq_reads == 0 {
            return Err(ConfigError::ZeroReads);
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(ConfigError::AlphaOutOfRange(self.alpha));
        }
        if !(self.error_rate > 0.0 && self.error_rate < 1.0) {
            return Err(ConfigError::ErrorRateOutOfRange(self.error_rate));
        }
        if self.annotation_timeout == Duration::from_secs(0) {
            return Err(ConfigError::ZeroAnnotationTimeout);
        }
        Ok(())
    }

    /// Length of a full context window
    pub fn window_len(&self) -> usize {
        self.kmer_size + self.dist
    }
}

/// Lookahead distance for reads of `read_len` bases, `None` when the reads are too short
/// to hold two k-mers plus the margin.
pub fn lookahead_distance(read_len: usize, kmer_size: usize) -> Option<usize> {
    read_len.checked_sub(LOOKAHEAD_MARGIN + 2 * kmer_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::new(50, 27, vec![]);
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.window_len(), 77);
    }

    #[test]
    fn test_invalid_configs() {
        let base = Config::new(10, 10, vec![]);

        let config = Config {
            kmer_size: 0,
            ..base.clone()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroKmerSize));

        let config = Config {
            lmer_size: 0,
            ..base.clone()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroLmerSize));

        let config = Config {
            lmer_size: 10,
            ..base.clone()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::LmerNotSmaller { lmer: 10, kmer: 10 })
        );

        let config = Config {
            jsthrsh: 1.5,
            ..base.clone()
        };
        assert_eq!(config.validate(), Err(ConfigError::ThresholdOutOfRange(1.5)));

        let config = Config {
            min_smp_sz: 60,
            ..base.clone()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SampleBounds { min: 60, max: 50 })
        );

        let config = Config {
            max_fastq_reads: 0,
            ..base.clone()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroReads));

        let config = Config {
            alpha: 0.0,
            ..base.clone()
        };
        assert_eq!(config.validate(), Err(ConfigError::AlphaOutOfRange(0.0)));

        let config = Config {
            alpha: 1.5,
            ..base.clone()
        };
        assert_eq!(config.validate(), Err(ConfigError::AlphaOutOfRange(1.5)));

        let config = Config {
            error_rate: 0.0,
            ..base.clone()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ErrorRateOutOfRange(0.0))
        );

        let config = Config {
            annotation_timeout: Duration::from_secs(0),
            ..base
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroAnnotationTimeout));
    }

    #[test]
    fn test_lookahead_distance() {
        assert_eq!(lookahead_distance(150, 27), Some(86));
        assert_eq!(lookahead_distance(30, 8), Some(4));
        assert_eq!(lookahead_distance(30, 10), Some(0));
        assert_eq!(lookahead_distance(30, 11), None);
    }
}
