//! Core index types
//!
//! Integer width abstraction shared by every table, on-disk table headers,
//! and the metadata stored in `meta.json`.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Magic number for table files ("SMEM" as little-endian bytes)
pub const TABLE_MAGIC: u32 = 0x4D45_4D53;

/// Current version of the table format
pub const TABLE_VERSION: u32 = 1;

/// Integer type used to store suffix array ranks and text positions.
///
/// A 32-bit index halves memory for references under 4 GiB; the traversal
/// code is written once against this trait and works in `usize`.
pub trait IndexInt: Copy + Ord + Default + Debug + Send + Sync + 'static {
    /// Stored width in bytes
    const WIDTH: usize;

    /// Converts a position, returning `None` when it does not fit
    fn from_usize(value: usize) -> Option<Self>;

    fn to_usize(self) -> usize;

    fn write_le(self, buf: &mut Vec<u8>);

    /// Decodes from exactly `WIDTH` little-endian bytes
    fn read_le(bytes: &[u8]) -> Self;
}

impl IndexInt for u32 {
    const WIDTH: usize = 4;

    #[inline]
    fn from_usize(value: usize) -> Option<Self> {
        u32::try_from(value).ok()
    }

    #[inline(always)]
    fn to_usize(self) -> usize {
        self as usize
    }

    fn write_le(self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes[..4]);
        u32::from_le_bytes(raw)
    }
}

impl IndexInt for u64 {
    const WIDTH: usize = 8;

    #[inline]
    fn from_usize(value: usize) -> Option<Self> {
        u64::try_from(value).ok()
    }

    #[inline(always)]
    fn to_usize(self) -> usize {
        self as usize
    }

    fn write_le(self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[..8]);
        u64::from_le_bytes(raw)
    }
}

/// Kind of table stored in a table file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TableKind {
    Suffix = 1,
    Inverse = 2,
    Child = 3,
    Lcp = 4,
    Offsets = 5,
}

impl TableKind {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(TableKind::Suffix),
            2 => Some(TableKind::Inverse),
            3 => Some(TableKind::Child),
            4 => Some(TableKind::Lcp),
            5 => Some(TableKind::Offsets),
            _ => None,
        }
    }

    /// File name inside an index directory
    pub fn file_name(self) -> &'static str {
        match self {
            TableKind::Suffix => "sa.bin",
            TableKind::Inverse => "isa.bin",
            TableKind::Child => "child.bin",
            TableKind::Lcp => "lcp.bin",
            TableKind::Offsets => "offsets.bin",
        }
    }
}

/// Header shared by every table file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHeader {
    /// Magic number (TABLE_MAGIC)
    pub magic: u32,
    /// Version number
    pub version: u32,
    /// Table kind
    pub kind: u32,
    /// Integer width in bytes
    pub width: u32,
    /// Number of entries
    pub count: u64,
}

impl TableHeader {
    /// Size of header in bytes
    pub const SIZE: usize = 4 + 4 + 4 + 4 + 8; // 24 bytes

    pub fn new(kind: TableKind, width: usize, count: usize) -> Self {
        Self {
            magic: TABLE_MAGIC,
            version: TABLE_VERSION,
            kind: kind as u32,
            width: width as u32,
            count: count as u64,
        }
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.magic.to_le_bytes());
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.kind.to_le_bytes());
        buf.extend_from_slice(&self.width.to_le_bytes());
        buf.extend_from_slice(&self.count.to_le_bytes());
    }

    /// Decodes a header; `None` when fewer than `SIZE` bytes are available
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            magic: u32::read_le(&data[0..4]),
            version: u32::read_le(&data[4..8]),
            kind: u32::read_le(&data[8..12]),
            width: u32::read_le(&data[12..16]),
            count: u64::read_le(&data[16..24]),
        })
    }
}

/// One sequence of a multi-sequence reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceEntry {
    /// Sequence description (FASTA header up to the first space)
    pub descr: String,
    /// Start offset in the concatenated reference
    pub start: usize,
}

/// Index metadata stored in meta.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    /// Table format version
    pub version: u32,
    /// Width of stored integers in bytes (4 or 8)
    pub index_width: u32,
    /// Suffix sampling K
    pub sparseness: usize,
    /// Length of reference.bin
    pub reference_len: usize,
    /// Number of sampled suffixes
    pub suffix_count: usize,
    /// Whether isa.bin is present
    pub has_isa: bool,
    /// Whether child.bin is present
    pub has_child: bool,
    /// Whether offsets.bin is present
    pub has_offsets: bool,
    /// Overflow entries in the LCP store
    #[serde(default)]
    pub lcp_overflow: usize,
    /// Concatenated reference sequences
    pub sequences: Vec<SequenceEntry>,
}
