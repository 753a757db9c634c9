//! The loaded sparse suffix array index
//!
//! [`SparseSuffixArray`] owns the reference and every table built over it.
//! It is assembled once from [`IndexParts`], validated, and read-only from
//! then on, so one instance can be shared by any number of query workers.
//!
//! Accessors on the hot path index the tables directly. Table alignment is
//! checked at construction; full structural checks are opt-in through
//! [`SparseSuffixArray::verify`].

use super::layout::ReferenceLayout;
use super::lcp::CompactLcp;
use super::offsets::{KMER_LEN, KmerOffsets};
use super::types::{IndexInt, IndexMeta, TABLE_VERSION};
use crate::error::IndexError;

/// Already-built tables handed to [`SparseSuffixArray::new`]
#[derive(Debug, Clone)]
pub struct IndexParts<I: IndexInt> {
    /// Reference text, padded by the construction tool
    pub reference: Vec<u8>,
    /// Sampled suffix array (absolute positions, multiples of `sparseness`)
    pub sa: Vec<I>,
    /// Inverse suffix array indexed by `position / sparseness`; may be empty
    pub isa: Vec<I>,
    /// Finalized LCP store aligned with `sa`
    pub lcp: CompactLcp,
    /// Child table aligned with `sa`; may be empty
    pub child: Vec<I>,
    /// 8-mer seeds; may be empty
    pub offsets: KmerOffsets<I>,
    /// Suffix sampling K
    pub sparseness: usize,
    /// Sequence boundaries for 4-column output
    pub layout: ReferenceLayout,
}

/// Read-only sparse suffix array over a reference
#[derive(Debug)]
pub struct SparseSuffixArray<I: IndexInt> {
    reference: Vec<u8>,
    sa: Vec<I>,
    isa: Vec<I>,
    lcp: CompactLcp,
    child: Vec<I>,
    offsets: KmerOffsets<I>,
    sparseness: usize,
    /// ceil(log2(suffix count)), scales the suffix link expansion bound
    log_n: usize,
    layout: ReferenceLayout,
}

impl<I: IndexInt> SparseSuffixArray<I> {
    /// Assemble an index, checking that every table is aligned with the
    /// suffix array and that stored positions are in range
    pub fn new(parts: IndexParts<I>) -> Result<Self, IndexError> {
        let IndexParts {
            reference,
            sa,
            isa,
            lcp,
            child,
            offsets,
            sparseness,
            layout,
        } = parts;

        if sparseness == 0 {
            return Err(IndexError::InvalidSparseness(sparseness));
        }
        if sa.is_empty() {
            return Err(IndexError::EmptySuffixArray);
        }
        let n = sa.len();
        check_len("LCP", n, lcp.len())?;
        if !isa.is_empty() {
            check_len("ISA", n, isa.len())?;
        }
        if !child.is_empty() {
            check_len("CHILD", n, child.len())?;
        }
        if !lcp.is_finalized() {
            return Err(IndexError::UnfinalizedLcp);
        }
        if lcp.try_get(0)? != 0 {
            return Err(IndexError::InvariantViolation(
                "LCP[0] must be 0".to_string(),
            ));
        }

        check_range("SA", &sa, reference.len())?;
        check_range("ISA", &isa, n)?;
        // Undefined child entries are stored as 0
        check_range("CHILD", &child, n)?;
        for (kmer, left, right) in offsets.sorted_entries() {
            let (left, right) = (left.to_usize(), right.to_usize());
            if left > right || right >= n {
                return Err(IndexError::InvalidLayout(format!(
                    "offset interval [{left}, {right}] for {} exceeds {n} suffixes",
                    String::from_utf8_lossy(&kmer)
                )));
            }
        }
        if let Some(last) = layout.sequences().last()
            && last.start >= reference.len()
        {
            return Err(IndexError::InvalidLayout(format!(
                "sequence {} starts at {} beyond the reference ({})",
                last.descr,
                last.start,
                reference.len()
            )));
        }

        let log_n = (usize::BITS - (n - 1).leading_zeros()).max(1) as usize;

        Ok(Self {
            reference,
            sa,
            isa,
            lcp,
            child,
            offsets,
            sparseness,
            log_n,
            layout,
        })
    }

    /// Reference character at `pos`; positions past the end read as 0, which
    /// sorts before every real character
    #[inline(always)]
    pub fn char_at(&self, pos: usize) -> u8 {
        self.reference.get(pos).copied().unwrap_or(0)
    }

    /// Text position of the suffix at `rank`
    #[inline(always)]
    pub fn sa_at(&self, rank: usize) -> usize {
        self.sa[rank].to_usize()
    }

    #[inline(always)]
    pub fn lcp_at(&self, rank: usize) -> usize {
        self.lcp.get(rank)
    }

    #[inline(always)]
    pub fn child_at(&self, rank: usize) -> usize {
        self.child[rank].to_usize()
    }

    /// Rank of the sampled suffix starting `K` characters after `pos`, if
    /// the ISA is loaded and that suffix exists
    #[inline(always)]
    pub fn successor_rank(&self, pos: usize) -> Option<usize> {
        self.isa
            .get(pos / self.sparseness + 1)
            .map(|rank| rank.to_usize())
    }

    /// Number of sampled suffixes
    pub fn suffix_count(&self) -> usize {
        self.sa.len()
    }

    /// Highest rank (`suffix_count() - 1`)
    #[inline(always)]
    pub fn last_rank(&self) -> usize {
        self.sa.len() - 1
    }

    pub fn sparseness(&self) -> usize {
        self.sparseness
    }

    pub fn log_n(&self) -> usize {
        self.log_n
    }

    pub fn reference(&self) -> &[u8] {
        &self.reference
    }

    pub fn sa(&self) -> &[I] {
        &self.sa
    }

    pub fn isa(&self) -> &[I] {
        &self.isa
    }

    pub fn child(&self) -> &[I] {
        &self.child
    }

    pub fn lcp(&self) -> &CompactLcp {
        &self.lcp
    }

    pub fn offsets(&self) -> &KmerOffsets<I> {
        &self.offsets
    }

    pub fn layout(&self) -> &ReferenceLayout {
        &self.layout
    }

    pub fn has_isa(&self) -> bool {
        !self.isa.is_empty()
    }

    pub fn has_child(&self) -> bool {
        !self.child.is_empty()
    }

    pub fn has_offsets(&self) -> bool {
        !self.offsets.is_empty()
    }

    /// Approximate heap footprint of all tables
    pub fn heap_bytes(&self) -> usize {
        self.reference.capacity()
            + (self.sa.capacity() + self.isa.capacity() + self.child.capacity()) * I::WIDTH
            + self.lcp.heap_bytes()
            + self.offsets.len() * (KMER_LEN + 2 * I::WIDTH)
    }

    /// Metadata describing this index, as stored in meta.json
    pub fn meta(&self) -> IndexMeta {
        IndexMeta {
            version: TABLE_VERSION,
            index_width: I::WIDTH as u32,
            sparseness: self.sparseness,
            reference_len: self.reference.len(),
            suffix_count: self.sa.len(),
            has_isa: self.has_isa(),
            has_child: self.has_child(),
            has_offsets: self.has_offsets(),
            lcp_overflow: self.lcp.overflow().len(),
            sequences: self.layout.sequences().to_vec(),
        }
    }

    /// Check the structural invariants of every table.
    ///
    /// Runs in time proportional to the total LCP, so it is meant for tests
    /// and the `verify` command rather than every load.
    pub fn verify(&self) -> Result<(), IndexError> {
        let k = self.sparseness;
        let n = self.sa.len();

        for rank in 0..n {
            let pos = self.sa_at(rank);
            if pos % k != 0 {
                return Err(violation(format!(
                    "SA[{rank}] = {pos} is not a multiple of K={k}"
                )));
            }
            if rank > 0 {
                let prev = self.sa_at(rank - 1);
                if self.reference[prev..] >= self.reference[pos..] {
                    return Err(violation(format!(
                        "suffixes at ranks {} and {rank} are out of order",
                        rank - 1
                    )));
                }
            }
        }

        if self.has_isa() {
            for rank in 0..n {
                let slot = self.sa_at(rank) / k;
                match self.isa.get(slot) {
                    Some(stored) if stored.to_usize() == rank => {}
                    _ => {
                        return Err(violation(format!(
                            "ISA[SA[{rank}]/K] does not point back to rank {rank}"
                        )));
                    }
                }
            }
        }

        for rank in 1..n {
            let expected = common_prefix(
                &self.reference[self.sa_at(rank - 1)..],
                &self.reference[self.sa_at(rank)..],
            );
            let stored = self.lcp.try_get(rank)?;
            if stored != expected {
                return Err(violation(format!(
                    "LCP[{rank}] = {stored}, adjacent suffixes share {expected}"
                )));
            }
        }

        for (kmer, left, right) in self.offsets.sorted_entries() {
            let (left, right) = (left.to_usize(), right.to_usize());
            let starts_with = |rank: usize| self.reference[self.sa_at(rank)..].starts_with(&kmer);
            let tight = (left..=right).all(|rank| starts_with(rank))
                && (left == 0 || !starts_with(left - 1))
                && (right + 1 >= n || !starts_with(right + 1));
            if !tight {
                return Err(violation(format!(
                    "offset interval [{left}, {right}] does not bound {}",
                    String::from_utf8_lossy(&kmer)
                )));
            }
        }

        Ok(())
    }
}

fn check_len(table: &'static str, expected: usize, actual: usize) -> Result<(), IndexError> {
    if expected != actual {
        return Err(IndexError::LengthMismatch {
            table,
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_range<I: IndexInt>(table: &'static str, values: &[I], limit: usize) -> Result<(), IndexError> {
    match values.iter().position(|v| v.to_usize() >= limit) {
        Some(index) => Err(IndexError::PositionOutOfRange {
            table,
            index,
            value: values[index].to_usize(),
            limit,
        }),
        None => Ok(()),
    }
}

fn violation(message: String) -> IndexError {
    IndexError::InvariantViolation(message)
}

/// Length of the longest common prefix of two byte strings
pub fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Full suffix array of "ACA$" built by hand
    fn small_parts() -> IndexParts<u32> {
        // suffixes: 0 ACA$, 1 CA$, 2 A$, 3 $
        // sorted:   $ (3), A$ (2), ACA$ (0), CA$ (1)
        IndexParts {
            reference: b"ACA$".to_vec(),
            sa: vec![3, 2, 0, 1],
            isa: vec![2, 3, 1, 0],
            lcp: CompactLcp::from_values(&[0, 0, 1, 0]),
            child: Vec::new(),
            offsets: KmerOffsets::new(),
            sparseness: 1,
            layout: ReferenceLayout::default(),
        }
    }

    #[test]
    fn test_new_and_accessors() {
        let index = SparseSuffixArray::new(small_parts()).unwrap();
        assert_eq!(index.suffix_count(), 4);
        assert_eq!(index.last_rank(), 3);
        assert_eq!(index.sa_at(2), 0);
        assert_eq!(index.lcp_at(2), 1);
        assert_eq!(index.char_at(1), b'C');
        assert_eq!(index.char_at(99), 0);
        assert_eq!(index.successor_rank(0), Some(3));
        assert_eq!(index.successor_rank(3), None);
        assert_eq!(index.log_n(), 2);
        assert!(index.has_isa());
        assert!(!index.has_child());
        index.verify().unwrap();
    }

    #[test]
    fn test_rejects_misaligned_tables() {
        let mut parts = small_parts();
        parts.isa.pop();
        assert!(matches!(
            SparseSuffixArray::new(parts),
            Err(IndexError::LengthMismatch { table: "ISA", .. })
        ));

        let mut parts = small_parts();
        parts.sa[1] = 10;
        assert!(matches!(
            SparseSuffixArray::new(parts),
            Err(IndexError::PositionOutOfRange { table: "SA", .. })
        ));

        let mut parts = small_parts();
        parts.sparseness = 0;
        assert!(matches!(
            SparseSuffixArray::new(parts),
            Err(IndexError::InvalidSparseness(0))
        ));
    }

    #[test]
    fn test_rejects_unfinalized_lcp() {
        let mut parts = small_parts();
        parts.lcp = CompactLcp::with_len(4);
        assert!(matches!(
            SparseSuffixArray::new(parts),
            Err(IndexError::UnfinalizedLcp)
        ));
    }

    #[test]
    fn test_verify_catches_bad_lcp() {
        let mut parts = small_parts();
        parts.lcp = CompactLcp::from_values(&[0, 0, 2, 0]);
        let index = SparseSuffixArray::new(parts).unwrap();
        assert!(matches!(
            index.verify(),
            Err(IndexError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_verify_catches_unsorted_sa() {
        let mut parts = small_parts();
        parts.sa.swap(1, 2);
        parts.isa = Vec::new();
        let index = SparseSuffixArray::new(parts).unwrap();
        assert!(index.verify().is_err());
    }

    #[test]
    fn test_common_prefix() {
        assert_eq!(common_prefix(b"ACGT", b"ACGA"), 3);
        assert_eq!(common_prefix(b"AC", b"ACGA"), 2);
        assert_eq!(common_prefix(b"", b"A"), 0);
    }
}
