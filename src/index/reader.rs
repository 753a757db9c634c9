use crate::index::layout::ReferenceLayout;
use crate::index::lcp::CompactLcp;
use crate::index::offsets::{KMER_LEN, Kmer, KmerOffsets};
use crate::index::sparse::{IndexParts, SparseSuffixArray};
use crate::index::types::*;
use crate::index::writer::{META_FILE, REFERENCE_FILE};
use crate::utils::decode_sparse_pairs;
use anyhow::{Context, Result, bail};
use log::{debug, info};
use memmap2::Mmap;
use std::fs::{self, File};
use std::path::Path;
use std::time::Instant;

/// Loads an index directory written by [`IndexWriter`](super::IndexWriter)
pub struct IndexReader;

impl IndexReader {
    /// Read meta.json of an index directory
    pub fn read_meta(dir: &Path) -> Result<IndexMeta> {
        let meta_path = dir.join(META_FILE);
        let meta_file = File::open(&meta_path)
            .with_context(|| format!("Failed to open {}", meta_path.display()))?;
        let meta: IndexMeta = serde_json::from_reader(meta_file)
            .with_context(|| format!("Failed to parse {}", meta_path.display()))?;
        if meta.version != TABLE_VERSION {
            bail!("Unsupported index version: {}", meta.version);
        }
        if meta.index_width != 4 && meta.index_width != 8 {
            bail!("Invalid index width: {} bytes", meta.index_width);
        }
        Ok(meta)
    }

    /// Load and validate every table. `I` must match the stored width.
    pub fn open<I: IndexInt>(dir: &Path) -> Result<SparseSuffixArray<I>> {
        let started = Instant::now();
        let meta = Self::read_meta(dir)?;
        if meta.index_width as usize != I::WIDTH {
            bail!(
                "Index stores {}-byte positions, opened as {}-byte",
                meta.index_width,
                I::WIDTH
            );
        }

        let reference_path = dir.join(REFERENCE_FILE);
        let reference = fs::read(&reference_path)
            .with_context(|| format!("Failed to read {}", reference_path.display()))?;
        if reference.len() != meta.reference_len {
            bail!(
                "Invalid {}: {} bytes, meta.json records {}",
                REFERENCE_FILE,
                reference.len(),
                meta.reference_len
            );
        }

        let n = meta.suffix_count;
        let sa = read_int_table::<I>(dir, TableKind::Suffix, n)?;
        let isa = if meta.has_isa {
            read_int_table::<I>(dir, TableKind::Inverse, n)?
        } else {
            Vec::new()
        };
        let child = if meta.has_child {
            read_int_table::<I>(dir, TableKind::Child, n)?
        } else {
            Vec::new()
        };
        let lcp = read_lcp(dir, n)?;
        let offsets = if meta.has_offsets {
            read_offsets::<I>(dir)?
        } else {
            KmerOffsets::new()
        };
        debug!(
            "loaded tables: isa={} child={} offsets={} lcp overflow={}",
            meta.has_isa,
            meta.has_child,
            offsets.len(),
            lcp.overflow().len()
        );

        let layout = ReferenceLayout::new(meta.sequences)?;
        let index = SparseSuffixArray::new(IndexParts {
            reference,
            sa,
            isa,
            lcp,
            child,
            offsets,
            sparseness: meta.sparseness,
            layout,
        })
        .with_context(|| format!("Invalid index in {}", dir.display()))?;

        info!(
            "loaded index {} ({} suffixes, K={}, {:.1} MiB) in {:.2?}",
            dir.display(),
            index.suffix_count(),
            index.sparseness(),
            index.heap_bytes() as f64 / (1024.0 * 1024.0),
            started.elapsed()
        );
        Ok(index)
    }
}

/// Memory-map a table file and validate its header
fn map_table(dir: &Path, kind: TableKind, width: usize) -> Result<(Mmap, TableHeader)> {
    let path = dir.join(kind.file_name());
    let file =
        File::open(&path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mmap = unsafe { Mmap::map(&file)? };

    let name = kind.file_name();
    let Some(header) = TableHeader::decode(&mmap) else {
        bail!("Invalid {name}: file too small");
    };
    if header.magic != TABLE_MAGIC {
        bail!("Invalid {name}: bad magic number");
    }
    if header.version != TABLE_VERSION {
        bail!("Unsupported {name} version: {}", header.version);
    }
    if TableKind::from_u32(header.kind) != Some(kind) {
        bail!("Invalid {name}: holds table kind {}", header.kind);
    }
    if header.width as usize != width {
        bail!(
            "Invalid {name}: {}-byte entries, expected {width}",
            header.width
        );
    }
    Ok((mmap, header))
}

/// Entry count from a header, checked against the expected count and the
/// bytes actually present
fn checked_count(name: &str, header: &TableHeader, body: usize, entry_size: usize) -> Result<usize> {
    let count = usize::try_from(header.count).context("Table too large for this platform")?;
    let needed = count
        .checked_mul(entry_size)
        .context("Table size overflows")?;
    if body < needed {
        bail!("Invalid {name}: truncated ({body} bytes, {needed} needed)");
    }
    Ok(count)
}

fn read_int_table<I: IndexInt>(dir: &Path, kind: TableKind, expected: usize) -> Result<Vec<I>> {
    let name = kind.file_name();
    let (mmap, header) = map_table(dir, kind, I::WIDTH)?;
    let body = &mmap[TableHeader::SIZE..];
    let count = checked_count(name, &header, body.len(), I::WIDTH)?;
    if count != expected {
        bail!("Invalid {name}: {count} entries, expected {expected}");
    }
    Ok(body[..count * I::WIDTH]
        .chunks_exact(I::WIDTH)
        .map(I::read_le)
        .collect())
}

fn read_lcp(dir: &Path, expected: usize) -> Result<CompactLcp> {
    let name = TableKind::Lcp.file_name();
    let (mmap, header) = map_table(dir, TableKind::Lcp, 1)?;
    let body = &mmap[TableHeader::SIZE..];
    let count = checked_count(name, &header, body.len(), 1)?;
    if count != expected {
        bail!("Invalid {name}: {count} ranks, expected {expected}");
    }

    let bytes = body[..count].to_vec();
    let rest = &body[count..];
    if rest.len() < 8 {
        bail!("Invalid {name}: missing overflow table");
    }
    let overflow_count = usize::try_from(u64::read_le(&rest[..8]))
        .context("Overflow table too large for this platform")?;
    if overflow_count > count {
        bail!("Invalid {name}: {overflow_count} overflow entries for {count} ranks");
    }
    let Some(overflow) = decode_sparse_pairs(&rest[8..], overflow_count) else {
        bail!("Invalid {name}: truncated overflow table");
    };
    CompactLcp::from_parts(bytes, overflow).with_context(|| format!("Invalid {name}"))
}

fn read_offsets<I: IndexInt>(dir: &Path) -> Result<KmerOffsets<I>> {
    let name = TableKind::Offsets.file_name();
    let (mmap, header) = map_table(dir, TableKind::Offsets, I::WIDTH)?;
    let body = &mmap[TableHeader::SIZE..];
    let entry_size = KMER_LEN + 2 * I::WIDTH;
    let count = checked_count(name, &header, body.len(), entry_size)?;

    let mut offsets = KmerOffsets::new();
    for entry in body[..count * entry_size].chunks_exact(entry_size) {
        let mut kmer: Kmer = [0; KMER_LEN];
        kmer.copy_from_slice(&entry[..KMER_LEN]);
        let left = I::read_le(&entry[KMER_LEN..KMER_LEN + I::WIDTH]);
        let right = I::read_le(&entry[KMER_LEN + I::WIDTH..]);
        if !offsets.insert(kmer, left, right) {
            bail!("Invalid {name}: duplicate key {}", String::from_utf8_lossy(&kmer));
        }
    }
    Ok(offsets)
}
