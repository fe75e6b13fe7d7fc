//! Groups the context windows sampled for a k-mer into clusters of near-identical variants.
//!
//! Windows are compared through their l-mer shingle sets. Each window joins the first cluster,
//! in creation order, whose representative reaches the Jaccard threshold, or opens a new one.

/// Sorted, de-duplicated l-mers of a window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shingles<'a>(Vec<&'a [u8]>);

impl<'a> Shingles<'a> {
    /// All overlapping substrings of length `lmer_size`
    pub fn new(seq: &'a [u8], lmer_size: usize) -> Self {
        let mut lmers = if lmer_size == 0 {
            Vec::new()
        } else {
            seq.windows(lmer_size).collect::<Vec<_>>()
        };
        lmers.sort_unstable();
        lmers.dedup();
        Shingles(lmers)
    }

    /// Number of distinct l-mers
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a window shorter than the l-mer size
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Intersection over union of the two shingle sets. Two empty sets are identical.
    pub fn jaccard(&self, other: &Shingles<'_>) -> f64 {
        let (mut i, mut j, mut shared) = (0, 0, 0);
        while i < self.0.len() && j < other.0.len() {
            match self.0[i].cmp(other.0[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    shared += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        let union = self.0.len() + other.0.len() - shared;
        if union == 0 {
            1.0
        } else {
            shared as f64 / union as f64
        }
    }
}

/// Windows judged similar to a common representative
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Index of the representative window in the sample set
    pub representative: usize,
    /// Indices of all member windows, representative first
    pub members: Vec<usize>,
}

impl Cluster {
    fn new(representative: usize) -> Self {
        Self {
            representative,
            members: vec![representative],
        }
    }

    /// Number of member windows
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// First-match collapse of `windows` in sample order. Every window lands in exactly one cluster.
pub fn collapse<T: AsRef<[u8]>>(windows: &[T], lmer_size: usize, jsthrsh: f64) -> Vec<Cluster> {
    let shingles = windows
        .iter()
        .map(|window| Shingles::new(window.as_ref(), lmer_size))
        .collect::<Vec<_>>();

    let mut clusters: Vec<Cluster> = Vec::new();
    for (idx, shingle) in shingles.iter().enumerate() {
        match clusters
            .iter_mut()
            .find(|cluster| shingles[cluster.representative].jaccard(shingle) >= jsthrsh)
        {
            Some(cluster) => cluster.members.push(idx),
            None => clusters.push(Cluster::new(idx)),
        }
    }
    clusters
}
