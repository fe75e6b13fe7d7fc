use crate::config::Config;

/// A k-mer seen in a read together with its lookahead context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'a> {
    /// Start of the k-mer in the read
    pub pos: usize,
    /// The k-mer bases
    pub kmer: &'a [u8],
    /// The k-mer followed by up to `dist` bases
    pub context: &'a [u8],
    /// Set when the read ended before the full context
    pub truncated: bool,
}

/// Slides a `kmer_size` window over reads, pairing every k-mer with the `dist` bases after it.
#[derive(Debug, Clone, Copy)]
pub struct KmerExtractor {
    kmer_size: usize,
    dist: usize,
    keep_truncated: bool,
}

impl KmerExtractor {
    /// Extractor that only emits full context windows
    pub fn new(kmer_size: usize, dist: usize) -> Self {
        Self {
            kmer_size,
            dist,
            keep_truncated: false,
        }
    }

    /// Extractor set up from the run configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.kmer_size, config.dist).keep_truncated(config.keep_truncated)
    }

    /// Also emit trailing k-mers whose context is cut by the read end
    pub fn keep_truncated(mut self, keep: bool) -> Self {
        self.keep_truncated = keep;
        self
    }

    /// Number of start positions examined for a read of `read_len` bases
    pub fn positions(&self, read_len: usize) -> usize {
        let needed = if self.keep_truncated {
            self.kmer_size
        } else {
            self.kmer_size + self.dist
        };
        match read_len.checked_sub(needed) {
            Some(last) if self.kmer_size > 0 => last + 1,
            _ => 0,
        }
    }

    /// Occurrences in `seq` in read order. K-mers with symbols other than `ACGT` are skipped.
    pub fn occurrences<'a>(&self, seq: &'a [u8]) -> impl Iterator<Item = Occurrence<'a>> + 'a {
        let kmer_size = self.kmer_size;
        let window = self.kmer_size + self.dist;
        (0..self.positions(seq.len())).filter_map(move |pos| {
            let kmer = &seq[pos..pos + kmer_size];
            if !is_valid_kmer(kmer) {
                return None;
            }
            let end = (pos + window).min(seq.len());
            Some(Occurrence {
                pos,
                kmer,
                context: &seq[pos..end],
                truncated: end - pos < window,
            })
        })
    }
}

/// Checks that every base is one of `A`, `C`, `G` or `T`
pub fn is_valid_kmer(kmer: &[u8]) -> bool {
    kmer.iter()
        .all(|nuc| matches!(nuc, b'A' | b'C' | b'G' | b'T'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kmers() {
        let seq = b"GCATGGTGTA";
        let extractor = KmerExtractor::new(3, 2);
        let occurrences = extractor.occurrences(seq).collect::<Vec<_>>();

        assert_eq!(occurrences.len(), 6);
        assert_eq!(occurrences[0].kmer, b"GCA");
        assert_eq!(occurrences[0].context, b"GCATG");
        assert_eq!(occurrences[5].pos, 5);
        assert_eq!(occurrences[5].context, b"GTGTA");
        assert!(occurrences.iter().all(|occ| !occ.truncated));
    }

    #[test]
    fn test_short_read_has_no_occurrences() {
        let extractor = KmerExtractor::new(5, 4);
        assert_eq!(extractor.occurrences(b"ACGTACGT").count(), 0);
        assert_eq!(extractor.occurrences(b"").count(), 0);
        assert_eq!(extractor.occurrences(b"ACGTACGTA").count(), 1);
    }

    #[test]
    fn test_truncated_contexts_are_flagged() {
        let seq = b"GCATGGTGTA";
        let extractor = KmerExtractor::new(3, 2).keep_truncated(true);
        let occurrences = extractor.occurrences(seq).collect::<Vec<_>>();

        assert_eq!(occurrences.len(), 8);
        let last = occurrences[7];
        assert_eq!(last.pos, 7);
        assert_eq!(last.kmer, b"GTA");
        assert_eq!(last.context, b"GTA");
        assert!(last.truncated);
        assert!(occurrences[6].truncated);
        assert!(!occurrences[5].truncated);
    }

    #[test]
    fn test_degenerate_kmers_skipped() {
        let seq = b"ACGNACGT";
        let extractor = KmerExtractor::new(3, 0);
        let kmers = extractor
            .occurrences(seq)
            .map(|occ| occ.kmer.to_vec())
            .collect::<Vec<_>>();

        assert_eq!(extractor.positions(seq.len()), 6);
        assert_eq!(kmers, vec![b"ACG".to_vec(), b"ACG".to_vec(), b"CGT".to_vec()]);
    }
}
