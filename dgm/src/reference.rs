use crate::error::Error;
use crate::Result;
use bio::alphabets::dna;
use bio::data_structures::bwt::{bwt, less, Less, Occ, BWT};
use bio::data_structures::fmindex::{BackwardSearchResult, FMIndex, FMIndexable};
use bio::data_structures::suffix_array::{suffix_array, RawSuffixArray};
use log::{debug, info, warn};
use std::path::Path;

/// An annotation reference indexed on both strands
pub struct Reference {
    pub(crate) id: String,
    pub(crate) fmindex: FMIndex<BWT, Less, Occ>,
    pub(crate) sa: RawSuffixArray,
    pub(crate) ref_len: usize,
}

impl std::fmt::Debug for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reference")
            .field("id", &self.id)
            .field("ref_len", &self.ref_len)
            .finish()
    }
}

impl Reference {
    /// Indexes `seq` together with its reverse complement. Bases other than `ACGT` become `N`.
    pub fn new<I: Into<String>, T: AsRef<[u8]>>(id: I, seq: T) -> Self {
        let text = normalise(seq.as_ref());
        let ref_len = text.len();
        let revcomp = dna::revcomp(&text);
        let text_builder: Vec<&[u8]> = vec![&text, b"$", &revcomp, b"$"];
        let text = text_builder.concat();

        let alphabet = dna::n_alphabet();
        let sa = suffix_array(&text);
        let bwt = bwt(&text, &sa);
        let less = less(&bwt, &alphabet);
        let occ = Occ::new(&bwt, 3, &alphabet);

        let fmindex = FMIndex::new(bwt, less, occ);

        Self {
            id: id.into(),
            fmindex,
            sa,
            ref_len,
        }
    }

    /// Reference identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Length of the forward strand
    pub fn len(&self) -> usize {
        self.ref_len
    }

    /// True for an empty reference
    pub fn is_empty(&self) -> bool {
        self.ref_len == 0
    }

    /// Exact hits of `pattern` split into forward and reverse strand positions
    pub fn search_pattern(&self, pattern: &[u8]) -> (Vec<usize>, Vec<usize>) {
        if pattern.is_empty() {
            return (Vec::new(), Vec::new());
        }
        let pattern = normalise(pattern);
        let positions = match self.fmindex.backward_search(pattern.iter()) {
            BackwardSearchResult::Complete(sai) => sai.occ(&self.sa),
            _ => Vec::new(),
        };
        positions.iter().partition(|pos| **pos < self.ref_len)
    }

    /// Total hits on both strands
    pub fn count_hits(&self, pattern: &[u8]) -> usize {
        let (fwd, rev) = self.search_pattern(pattern);
        fwd.len() + rev.len()
    }
}

/// Ordered collection of indexed annotation references
#[derive(Debug, Default)]
pub struct ReferenceSet {
    references: Vec<Reference>,
}

impl ReferenceSet {
    /// Builds the set from configuration entries. An entry naming an existing file is read as
    /// FASTA, one reference per record. Any other entry must be a literal IUPAC nucleotide
    /// sequence, so a mistyped path is an error rather than a reference of `N`s.
    pub fn from_entries<T: AsRef<str>>(entries: &[T]) -> Result<Self> {
        let mut references = Vec::new();
        for (i, entry) in entries.iter().enumerate() {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            let path = Path::new(entry);
            if path.is_file() {
                let records = read_fasta(path)?;
                debug!("Loaded {} references from {}", records.len(), entry);
                references.extend(
                    records
                        .into_iter()
                        .map(|(id, seq)| Reference::new(id, seq)),
                );
            } else if is_nucleotide_sequence(entry) {
                references.push(Reference::new(format!("ref_{}", i + 1), entry));
            } else {
                warn!("Annotation entry {} is not a file or a sequence", entry);
                return Err(Error::InvalidReference(entry.to_string()));
            }
        }
        info!("Indexed {} annotation references", references.len());
        Ok(Self { references })
    }

    /// Indexes literal `(id, sequence)` pairs
    pub fn from_sequences<I, S, T>(sequences: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: AsRef<[u8]>,
    {
        Self {
            references: sequences
                .into_iter()
                .map(|(id, seq)| Reference::new(id, seq))
                .collect(),
        }
    }

    /// References in their configured order
    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.references.iter()
    }

    /// Number of references
    pub fn len(&self) -> usize {
        self.references.len()
    }

    /// True when no reference was loaded
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

fn read_fasta(path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let (rdr, _) = niffler::from_path(path)?;
    let fasta_rdr = bio::io::fasta::Reader::new(rdr);
    let mut records = Vec::new();
    for record in fasta_rdr.records() {
        let record = record?;
        records.push((record.id().to_string(), record.seq().to_vec()));
    }
    Ok(records)
}

fn is_nucleotide_sequence(entry: &str) -> bool {
    entry.bytes().all(|nuc| {
        matches!(
            nuc.to_ascii_uppercase(),
            b'A' | b'C'
                | b'G'
                | b'T'
                | b'U'
                | b'R'
                | b'Y'
                | b'S'
                | b'W'
                | b'K'
                | b'M'
                | b'B'
                | b'D'
                | b'H'
                | b'V'
                | b'N'
        )
    })
}

fn normalise(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .map(|nuc| match nuc.to_ascii_uppercase() {
            nuc @ b'A' | nuc @ b'C' | nuc @ b'G' | nuc @ b'T' => nuc,
            _ => b'N',
        })
        .collect()
}
