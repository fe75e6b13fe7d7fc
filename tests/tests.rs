use assert_cmd::prelude::*;
use lazy_static::lazy_static;
use predicates::prelude::*;
use predicates::str::{contains, is_match, PredicateStrExt};
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const TEMPLATE: &[u8] = b"GATTACACTGGCTAGCTTACGCAATCGGTC";

lazy_static! {
    static ref FIRST_MOTIF_REGEX: Regex =
        Regex::new(r"(?m)^sample_1\tGATTACAC\t(\d+)\t(\d+)\t(\d+)\t([\d,]+)\t(.+?)\t(.+?)\t").unwrap();
}

struct Inputs {
    _dir: TempDir,
    fastq: PathBuf,
    annfile: PathBuf,
}

/// Reads carry two alleles at offset 8 (alternating) and two at offset 20 (alternating in pairs)
fn write_inputs(n_reads: usize) -> Inputs {
    let dir = tempfile::tempdir().unwrap();
    let fastq = dir.path().join("sample_1.fq.gz");
    {
        let mut wtr = niffler::to_path(
            &fastq,
            niffler::compression::Format::Gzip,
            niffler::Level::One,
        )
        .unwrap();
        for i in 0..n_reads {
            let mut seq = TEMPLATE.to_vec();
            seq[8] = if i % 2 == 0 { b'A' } else { b'C' };
            seq[20] = if (i / 2) % 2 == 0 { b'G' } else { b'T' };
            let qual = vec![b'I'; seq.len()];
            wtr.write_all(format!("@read_{}\n", i).as_bytes()).unwrap();
            wtr.write_all(&seq).unwrap();
            wtr.write_all(b"\n+\n").unwrap();
            wtr.write_all(&qual).unwrap();
            wtr.write_all(b"\n").unwrap();
        }
    }

    let fasta = dir.path().join("phages.fa");
    std::fs::write(&fasta, ">phage_lambda\nCCCCCCTAGCTTACGGGGGG\n").unwrap();
    let annfile = dir.path().join("annotation.txt");
    std::fs::write(
        &annfile,
        format!("{}\n\nAAAAAAAAAAAAAAAAAAAA\n", fasta.display()),
    )
    .unwrap();

    Inputs {
        _dir: dir,
        fastq,
        annfile,
    }
}

fn dgmfinder(fastq: &Path, annfile: &Path, kmer_size: usize) -> Command {
    let mut cmd = Command::cargo_bin("dgmfinder").unwrap();
    cmd.arg("--fastq_id")
        .arg("sample_1")
        .arg("--fastq_file")
        .arg(fastq)
        .arg("--annfile")
        .arg(annfile)
        .arg("--kmer_size")
        .arg(kmer_size.to_string());
    cmd
}

#[test]
fn cli_no_args() {
    Command::cargo_bin("dgmfinder").unwrap().assert().failure();
}

#[test]
fn cli_no_such_file() {
    let inputs = write_inputs(10);
    dgmfinder(Path::new("tests/no_such_file.fq.gz"), &inputs.annfile, 8)
        .assert()
        .failure()
        .stderr(contains("NotFound").trim());
}

#[test]
fn cli_negative_distance() {
    let inputs = write_inputs(10);
    dgmfinder(&inputs.fastq, &inputs.annfile, 12)
        .assert()
        .failure()
        .stderr(contains("NegativeDistance"));
}

#[test]
fn cli_invalid_config() {
    let inputs = write_inputs(10);
    dgmfinder(&inputs.fastq, &inputs.annfile, 8)
        .args(&["--lmer_size", "9"])
        .assert()
        .failure()
        .stderr(contains("LmerNotSmaller"));
}

#[test]
fn cli_reports_motifs() {
    let inputs = write_inputs(1000);
    dgmfinder(&inputs.fastq, &inputs.annfile, 8)
        .assert()
        .success()
        .stdout(contains("sample_id\tkmer"))
        .stdout(contains("GATTACAC"))
        .stdout(is_match(r"sample_1\tTAGCTTAC\t1000\t50\t2\t26,24\t.+\tphage_lambda\t").unwrap());
}

#[test]
fn cli_significant_pvalue() {
    let inputs = write_inputs(1000);
    let output = dgmfinder(&inputs.fastq, &inputs.annfile, 8)
        .unwrap()
        .stdout;
    let stdout = String::from_utf8(output).unwrap();
    if let Some(captures) = FIRST_MOTIF_REGEX.captures(&stdout) {
        assert_eq!(captures.get(3).unwrap().as_str(), "2");
        assert_eq!(captures.get(4).unwrap().as_str(), "25,25");
        assert!(captures.get(5).unwrap().as_str().parse::<f64>().unwrap() < 0.05);
        assert!(captures.get(6).unwrap().as_str().parse::<f64>().unwrap() < 0.05);
    } else {
        panic!("No GATTACAC motif in output")
    }
}

#[test]
fn cli_max_reads() {
    let inputs = write_inputs(1000);
    dgmfinder(&inputs.fastq, &inputs.annfile, 8)
        .args(&["--max_fastq_reads", "4"])
        .assert()
        .success()
        .stdout(contains("GATTACAC").not());
}
