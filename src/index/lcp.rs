//! Byte-compressed LCP array
//!
//! Adjacent suffixes of a genome usually share short prefixes, so each LCP
//! value is kept in one byte. Values at or above [`LCP_OVERFLOW`] store the
//! sentinel byte inline and their true value in a side table that is sorted
//! by rank once, in [`CompactLcp::finalize`], and binary searched afterwards.

use crate::error::LcpError;

/// Inline byte marking a value kept in the overflow table
pub const LCP_OVERFLOW: u8 = 254;

/// LCP array with one byte per rank and a sorted overflow table
#[derive(Debug, Clone, Default)]
pub struct CompactLcp {
    bytes: Vec<u8>,
    /// (rank, value) pairs for values >= LCP_OVERFLOW
    overflow: Vec<(usize, usize)>,
    finalized: bool,
}

impl CompactLcp {
    /// Allocate a store for `len` ranks, all zero
    pub fn with_len(len: usize) -> Self {
        Self {
            bytes: vec![0; len],
            overflow: Vec::new(),
            finalized: false,
        }
    }

    /// Build a finalized store from a plain LCP array
    pub fn from_values(values: &[usize]) -> Self {
        let mut lcp = Self::with_len(values.len());
        for (index, &value) in values.iter().enumerate() {
            lcp.store(index, value);
        }
        lcp.finalize();
        lcp
    }

    /// Rebuild a finalized store from its serialized parts.
    ///
    /// Every sentinel byte must have exactly one overflow entry and the
    /// entries must be strictly increasing by rank.
    pub fn from_parts(bytes: Vec<u8>, overflow: Vec<(usize, usize)>) -> Result<Self, LcpError> {
        if overflow.windows(2).any(|w| w[0].0 >= w[1].0) {
            return Err(LcpError::CorruptOverflow(
                "entries are not sorted by rank".to_string(),
            ));
        }
        for &(index, value) in &overflow {
            match bytes.get(index) {
                Some(&LCP_OVERFLOW) if value >= LCP_OVERFLOW as usize => {}
                Some(_) => {
                    return Err(LcpError::CorruptOverflow(format!(
                        "rank {index} overflow entry does not match its inline byte"
                    )));
                }
                None => {
                    return Err(LcpError::IndexOutOfRange {
                        index,
                        len: bytes.len(),
                    });
                }
            }
        }
        let sentinels = bytes.iter().filter(|&&b| b == LCP_OVERFLOW).count();
        if sentinels != overflow.len() {
            return Err(LcpError::CorruptOverflow(format!(
                "{sentinels} sentinels but {} overflow entries",
                overflow.len()
            )));
        }
        Ok(Self {
            bytes,
            overflow,
            finalized: true,
        })
    }

    /// Store the LCP value for a rank
    pub fn set(&mut self, index: usize, value: usize) -> Result<(), LcpError> {
        if self.finalized {
            return Err(LcpError::AlreadyFinalized { index });
        }
        if index >= self.bytes.len() {
            return Err(LcpError::IndexOutOfRange {
                index,
                len: self.bytes.len(),
            });
        }
        self.store(index, value);
        Ok(())
    }

    fn store(&mut self, index: usize, value: usize) {
        if value >= LCP_OVERFLOW as usize {
            self.bytes[index] = LCP_OVERFLOW;
            self.overflow.push((index, value));
        } else {
            self.bytes[index] = value as u8;
        }
    }

    /// Sort the overflow table by rank. Must run once after the last `set`.
    ///
    /// A rank written more than once keeps its last value; entries for ranks
    /// later overwritten with a small value are dropped.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        // Reverse first so the stable sort puts the latest write of a rank first
        self.overflow.reverse();
        self.overflow.sort_by_key(|&(index, _)| index);
        self.overflow.dedup_by_key(|&mut (index, _)| index);
        let bytes = &self.bytes;
        self.overflow
            .retain(|&(index, _)| bytes[index] == LCP_OVERFLOW);
        self.finalized = true;
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Checked lookup
    pub fn try_get(&self, index: usize) -> Result<usize, LcpError> {
        let byte = *self.bytes.get(index).ok_or(LcpError::IndexOutOfRange {
            index,
            len: self.bytes.len(),
        })?;
        if byte != LCP_OVERFLOW {
            return Ok(byte as usize);
        }
        if !self.finalized {
            return Err(LcpError::NotFinalized { index });
        }
        self.overflow_value(index)
            .ok_or_else(|| LcpError::CorruptOverflow(format!("missing entry for rank {index}")))
    }

    /// LCP value at `index`.
    ///
    /// Panics if an overflow value is read before `finalize()`; an index
    /// only ever holds a finalized store.
    #[inline]
    pub fn get(&self, index: usize) -> usize {
        let byte = self.bytes[index];
        if byte != LCP_OVERFLOW {
            return byte as usize;
        }
        assert!(
            self.finalized,
            "LCP overflow at rank {index} read before finalize()"
        );
        match self.overflow_value(index) {
            Some(value) => value,
            None => unreachable!("sentinel at rank {index} without overflow entry"),
        }
    }

    #[inline]
    fn overflow_value(&self, index: usize) -> Option<usize> {
        self.overflow
            .binary_search_by_key(&index, |&(i, _)| i)
            .ok()
            .map(|i| self.overflow[i].1)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Inline bytes, one per rank
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Overflow (rank, value) pairs
    pub fn overflow(&self) -> &[(usize, usize)] {
        &self.overflow
    }

    /// Approximate heap footprint
    pub fn heap_bytes(&self) -> usize {
        self.bytes.capacity() + self.overflow.capacity() * std::mem::size_of::<(usize, usize)>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_and_large_values() {
        let values = [0usize, 1, 253, 254, 255, 10_000, 7, 5_000_000];
        let mut lcp = CompactLcp::with_len(values.len());
        for (i, &v) in values.iter().enumerate() {
            lcp.set(i, v).unwrap();
        }
        lcp.finalize();

        for (i, &v) in values.iter().enumerate() {
            assert_eq!(lcp.get(i), v, "rank {i}");
            assert_eq!(lcp.try_get(i), Ok(v));
        }
        assert_eq!(lcp.overflow().len(), 4);
        assert_eq!(lcp.bytes()[2], 253);
        assert_eq!(lcp.bytes()[3], LCP_OVERFLOW);
    }

    #[test]
    fn test_set_out_of_order() {
        let mut lcp = CompactLcp::with_len(5);
        lcp.set(4, 300).unwrap();
        lcp.set(1, 20_000).unwrap();
        lcp.set(2, 254).unwrap();
        lcp.finalize();

        assert_eq!(lcp.get(1), 20_000);
        assert_eq!(lcp.get(2), 254);
        assert_eq!(lcp.get(4), 300);
        assert_eq!(lcp.get(0), 0);
    }

    #[test]
    fn test_read_before_finalize_fails() {
        let mut lcp = CompactLcp::with_len(3);
        lcp.set(0, 0).unwrap();
        lcp.set(1, 12).unwrap();
        lcp.set(2, 1000).unwrap();

        // Inline values are readable, overflow values are not
        assert_eq!(lcp.try_get(1), Ok(12));
        assert_eq!(lcp.try_get(2), Err(LcpError::NotFinalized { index: 2 }));
    }

    #[test]
    #[should_panic(expected = "before finalize")]
    fn test_get_before_finalize_panics() {
        let mut lcp = CompactLcp::with_len(2);
        lcp.set(1, 500).unwrap();
        lcp.get(1);
    }

    #[test]
    fn test_set_after_finalize_rejected() {
        let mut lcp = CompactLcp::with_len(2);
        lcp.finalize();
        assert_eq!(lcp.set(0, 1), Err(LcpError::AlreadyFinalized { index: 0 }));
    }

    #[test]
    fn test_set_out_of_range() {
        let mut lcp = CompactLcp::with_len(2);
        assert_eq!(
            lcp.set(2, 1),
            Err(LcpError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_rewrite_keeps_last_value() {
        let mut lcp = CompactLcp::with_len(3);
        lcp.set(1, 400).unwrap();
        lcp.set(1, 900).unwrap();
        lcp.set(2, 600).unwrap();
        lcp.set(2, 5).unwrap();
        lcp.finalize();

        assert_eq!(lcp.get(1), 900);
        assert_eq!(lcp.get(2), 5);
        assert_eq!(lcp.overflow(), &[(1, 900)]);
    }

    #[test]
    fn test_from_parts_validates() {
        let ok = CompactLcp::from_parts(vec![0, LCP_OVERFLOW, 3], vec![(1, 999)]).unwrap();
        assert_eq!(ok.get(1), 999);
        assert!(ok.is_finalized());

        assert!(CompactLcp::from_parts(vec![0, LCP_OVERFLOW], vec![]).is_err());
        assert!(CompactLcp::from_parts(vec![0, 3], vec![(1, 999)]).is_err());
        assert!(
            CompactLcp::from_parts(
                vec![LCP_OVERFLOW, LCP_OVERFLOW],
                vec![(1, 300), (0, 300)]
            )
            .is_err()
        );
    }
}
