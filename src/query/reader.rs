//! Query FASTA reader
//!
//! Headers are cut at the first space, the way MUMmer 3 names queries.
//! Lines are trimmed and blank lines skipped. Records without a name are
//! dropped.

use crate::utils::dna::mask_non_nucleotides;
use anyhow::{Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// One query sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    pub name: String,
    pub seq: Vec<u8>,
}

/// Read every query from a FASTA file
pub fn read_queries(path: &Path, nucleotides_only: bool) -> Result<Vec<QueryRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open query file {}", path.display()))?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(Vec::new());
    }
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to map query file {}", path.display()))?;
    Ok(parse_fasta(&mmap, nucleotides_only))
}

/// Parse FASTA text. With `nucleotides_only`, every character other than
/// A, C, G, T is replaced by `~`.
pub fn parse_fasta(data: &[u8], nucleotides_only: bool) -> Vec<QueryRecord> {
    let mut records = Vec::new();
    let mut current: Option<QueryRecord> = None;

    let mut line_start = 0;
    let ends = memchr::memchr_iter(b'\n', data).chain(std::iter::once(data.len()));
    for line_end in ends {
        let line = data[line_start..line_end].trim_ascii();
        line_start = line_end + 1;
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix(b">") {
            if let Some(done) = current.take() {
                push_record(&mut records, done, nucleotides_only);
            }
            let header = header.trim_ascii();
            let name_end = memchr::memchr(b' ', header).unwrap_or(header.len());
            current = Some(QueryRecord {
                name: String::from_utf8_lossy(&header[..name_end]).into_owned(),
                seq: Vec::new(),
            });
        } else if let Some(record) = current.as_mut() {
            record.seq.extend_from_slice(line);
        }
    }
    if let Some(done) = current {
        push_record(&mut records, done, nucleotides_only);
    }
    records
}

fn push_record(records: &mut Vec<QueryRecord>, mut record: QueryRecord, nucleotides_only: bool) {
    if record.name.is_empty() {
        return;
    }
    if nucleotides_only {
        mask_non_nucleotides(&mut record.seq);
    }
    records.push(record);
}
