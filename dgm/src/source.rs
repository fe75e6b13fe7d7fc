use crate::Result;
use bio::io::fastq;
use log::debug;
use std::path::Path;

/// A single sequencing read, upper-cased on ingest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRead {
    /// Read identifier
    pub id: String,
    /// Read bases
    pub seq: Vec<u8>,
}

impl SequenceRead {
    /// Creates a read from anything that yields bases
    pub fn new<I: Into<String>, S: AsRef<[u8]>>(id: I, seq: S) -> Self {
        Self {
            id: id.into(),
            seq: seq.as_ref().to_ascii_uppercase(),
        }
    }

    /// Number of bases in the read
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    /// True for a read without bases
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

impl From<fastq::Record> for SequenceRead {
    fn from(record: fastq::Record) -> Self {
        SequenceRead::new(record.id(), record.seq())
    }
}

type FastqRecords = Box<dyn Iterator<Item = std::result::Result<fastq::Record, fastq::Error>>>;

/// Streams reads from a plain or compressed FASTQ file
pub struct FastqSource {
    records: FastqRecords,
}

impl std::fmt::Debug for FastqSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastqSource").finish()
    }
}

impl FastqSource {
    /// Opens the FASTQ file, detecting compression from the file content
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let (rdr, format) = niffler::from_path(path.as_ref())?;
        debug!(
            "Opened {} with compression {:?}",
            path.as_ref().display(),
            format
        );
        Ok(Self::from_reader(rdr))
    }

    /// Wraps an already decompressed reader
    pub fn from_reader<R: std::io::Read + 'static>(rdr: R) -> Self {
        let records = fastq::Reader::new(rdr).records();
        Self {
            records: Box::new(records),
        }
    }
}

impl Iterator for FastqSource {
    type Item = Result<SequenceRead>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records
            .next()
            .map(|record| record.map(SequenceRead::from).map_err(Into::into))
    }
}

/// Length of the first read in the file, `None` for an empty file
pub fn first_read_length<P: AsRef<Path>>(path: P) -> Result<Option<usize>> {
    let mut source = FastqSource::from_path(path)?;
    match source.next() {
        Some(read) => Ok(Some(read?.len())),
        None => Ok(None),
    }
}
