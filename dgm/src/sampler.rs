use crate::kmer::Occurrence;
use indexmap::IndexMap;

/// Context windows retained for one k-mer, first-N up to the sample cap
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleSet {
    contexts: Vec<Vec<u8>>,
    occurrences: u64,
    truncated: u64,
}

impl SampleSet {
    /// Retained windows in the order they were seen
    pub fn contexts(&self) -> &[Vec<u8>] {
        &self.contexts
    }

    /// Number of retained windows
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// True when no window was retained
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Every occurrence counted during the scan, retained or not
    pub fn occurrences(&self) -> u64 {
        self.occurrences
    }

    /// Occurrences whose context was cut by the read end
    pub fn truncated(&self) -> u64 {
        self.truncated
    }
}

/// Counters carried through the scan of a single sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    /// Reads pulled from the source
    pub reads_consumed: usize,
    /// Occurrences handed to the sampler
    pub occurrences: u64,
    /// K-mer positions skipped for ambiguous bases
    pub degenerate: u64,
}

/// Accumulates a bounded [`SampleSet`] for every distinct k-mer, keyed in first-seen order.
#[derive(Debug)]
pub struct VariantSampler {
    max_smp_sz: usize,
    samples: IndexMap<Vec<u8>, SampleSet>,
}

impl VariantSampler {
    /// Sampler retaining at most `max_smp_sz` windows per k-mer
    pub fn new(max_smp_sz: usize) -> Self {
        Self {
            max_smp_sz,
            samples: IndexMap::new(),
        }
    }

    /// Counts the occurrence and keeps its window while the k-mer is below the cap.
    /// Truncated windows are counted but never retained.
    pub fn add(&mut self, occ: &Occurrence<'_>) {
        let max_smp_sz = self.max_smp_sz;
        let idx = match self.samples.get_index_of(occ.kmer) {
            Some(idx) => idx,
            None => {
                self.samples
                    .insert_full(occ.kmer.to_vec(), SampleSet::default())
                    .0
            }
        };
        let sample = &mut self.samples[idx];
        sample.occurrences += 1;
        if occ.truncated {
            sample.truncated += 1;
        } else if sample.contexts.len() < max_smp_sz {
            sample.contexts.push(occ.context.to_vec());
        }
    }

    /// Number of distinct k-mers seen so far
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True before any occurrence was added
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Ends sampling. The returned sets can no longer grow.
    pub fn finalize(self) -> FrozenSamples {
        FrozenSamples {
            samples: self.samples,
        }
    }
}

/// Read-only sample sets handed to the scoring stages
#[derive(Debug)]
pub struct FrozenSamples {
    samples: IndexMap<Vec<u8>, SampleSet>,
}

impl FrozenSamples {
    /// K-mers with their sample sets in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &SampleSet)> {
        self.samples.iter().map(|(kmer, sample)| (kmer.as_slice(), sample))
    }

    /// Sample set for `kmer` if it was seen
    pub fn get(&self, kmer: &[u8]) -> Option<&SampleSet> {
        self.samples.get(kmer)
    }

    /// Number of distinct k-mers
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the scan produced no occurrences
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
