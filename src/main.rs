#![warn(missing_debug_implementations, rust_2018_idioms, missing_docs)]

//! Single-sample discovery of k-mers with significantly diversified downstream sequence.
mod cli;
mod error;

use crate::error::Error;
use dgm::{first_read_length, lookahead_distance, run_analysis, FastqSource, TSV_HEADER};
use log::info;
use std::io::BufRead;
use std::path::Path;
use structopt::StructOpt;

type Result<T> = std::result::Result<T, crate::error::Error>;

fn main() -> Result<()> {
    let opt = cli::DgmFinder::from_args();
    opt.set_logging();

    rayon::ThreadPoolBuilder::new()
        .num_threads(opt.threads)
        .build_global()
        .map_err(|_| Error::ThreadError)?;

    let annot_fasta = read_annotation_entries(&opt.annfile)?;

    let read_len = first_read_length(&opt.fastq_file)?
        .ok_or_else(|| Error::EmptyInput(opt.fastq_file.clone()))?;
    let dist = lookahead_distance(read_len, opt.kmer_size).ok_or(Error::NegativeDistance {
        read_len,
        kmer_size: opt.kmer_size,
    })?;
    info!(
        "Read length {} with k-mer size {} gives lookahead distance {}",
        read_len, opt.kmer_size, dist
    );

    let config = opt.config(dist, annot_fasta);
    let source = FastqSource::from_path(&opt.fastq_file)?;
    let motifs = run_analysis(source, &opt.fastq_id, &config)?;
    info!("Sample {} has {} significant motifs", opt.fastq_id, motifs.len());

    println!("{}", TSV_HEADER);
    for motif in &motifs {
        println!("{}", motif.to_tsv_row());
    }

    Ok(())
}

/// Non-empty, trimmed lines of the annotation file
fn read_annotation_entries<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let rdr = std::io::BufReader::new(std::fs::File::open(path)?);
    let mut entries = Vec::new();
    for line in rdr.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            entries.push(line.to_string());
        }
    }
    Ok(entries)
}
