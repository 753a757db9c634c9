use crate::index::offsets::KMER_LEN;
use crate::index::sparse::SparseSuffixArray;
use crate::index::types::*;
use crate::utils::encode_sparse_pairs;
use anyhow::{Context, Result};
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Reference file inside an index directory
pub const REFERENCE_FILE: &str = "reference.bin";

/// Metadata file inside an index directory
pub const META_FILE: &str = "meta.json";

/// Writes an index as a directory of flat table files
pub struct IndexWriter;

impl IndexWriter {
    /// Write every table of `index` plus meta.json into `dir`.
    ///
    /// Optional tables the index does not carry (ISA, CHILD, offsets) are
    /// not written and are marked absent in the metadata.
    pub fn write<I: IndexInt>(dir: &Path, index: &SparseSuffixArray<I>) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create index directory {}", dir.display()))?;

        let mut reference = create(dir, REFERENCE_FILE)?;
        reference.write_all(index.reference())?;
        reference.flush()?;

        write_int_table(dir, TableKind::Suffix, index.sa())?;
        if index.has_isa() {
            write_int_table(dir, TableKind::Inverse, index.isa())?;
        }
        if index.has_child() {
            write_int_table(dir, TableKind::Child, index.child())?;
        }
        write_lcp(dir, index)?;
        if index.has_offsets() {
            write_offsets(dir, index)?;
        }

        // Metadata last: a directory with meta.json is complete
        let meta = index.meta();
        let mut meta_file = create(dir, META_FILE)?;
        serde_json::to_writer_pretty(&mut meta_file, &meta).context("Failed to write meta.json")?;
        meta_file.flush()?;

        info!(
            "wrote index to {} ({} suffixes, K={}, {}-byte positions)",
            dir.display(),
            meta.suffix_count,
            meta.sparseness,
            meta.index_width
        );
        Ok(())
    }
}

fn create(dir: &Path, name: &str) -> Result<BufWriter<File>> {
    let path = dir.join(name);
    let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::with_capacity(65536, file))
}

/// Header followed by little-endian entries
fn write_int_table<I: IndexInt>(dir: &Path, kind: TableKind, values: &[I]) -> Result<()> {
    let mut file = create(dir, kind.file_name())?;
    let mut buf = Vec::with_capacity(TableHeader::SIZE + values.len() * I::WIDTH);
    TableHeader::new(kind, I::WIDTH, values.len()).encode(&mut buf);
    for &value in values {
        value.write_le(&mut buf);
    }
    file.write_all(&buf)?;
    file.flush()?;
    Ok(())
}

/// Header (count = ranks), one byte per rank, u64 overflow count, then
/// varint (rank delta, value) pairs
fn write_lcp<I: IndexInt>(dir: &Path, index: &SparseSuffixArray<I>) -> Result<()> {
    let lcp = index.lcp();
    let mut file = create(dir, TableKind::Lcp.file_name())?;
    let mut buf = Vec::with_capacity(TableHeader::SIZE + lcp.len() + 8);
    TableHeader::new(TableKind::Lcp, 1, lcp.len()).encode(&mut buf);
    buf.extend_from_slice(lcp.bytes());
    buf.extend_from_slice(&(lcp.overflow().len() as u64).to_le_bytes());
    encode_sparse_pairs(lcp.overflow(), &mut buf);
    file.write_all(&buf)?;
    file.flush()?;
    Ok(())
}

/// Header (count = entries), then key, left, right per entry in key order
fn write_offsets<I: IndexInt>(dir: &Path, index: &SparseSuffixArray<I>) -> Result<()> {
    let entries = index.offsets().sorted_entries();
    let mut file = create(dir, TableKind::Offsets.file_name())?;
    let mut buf = Vec::with_capacity(TableHeader::SIZE + entries.len() * (KMER_LEN + 2 * I::WIDTH));
    TableHeader::new(TableKind::Offsets, I::WIDTH, entries.len()).encode(&mut buf);
    for (kmer, left, right) in entries {
        buf.extend_from_slice(&kmer);
        left.write_le(&mut buf);
        right.write_le(&mut buf);
    }
    file.write_all(&buf)?;
    file.flush()?;
    Ok(())
}
