//! Fixed-length k-mer seed index
//!
//! Maps every 8-mer that starts a sampled suffix to the suffix array
//! interval of all suffixes beginning with it, so a search can start at
//! depth 8 instead of binary searching the first characters.

use super::types::IndexInt;
use rustc_hash::FxHashMap;

/// Seed length
pub const KMER_LEN: usize = 8;

/// A seed key
pub type Kmer = [u8; KMER_LEN];

/// 8-mer to `[left, right]` rank interval
#[derive(Debug, Clone)]
pub struct KmerOffsets<I: IndexInt> {
    map: FxHashMap<Kmer, (I, I)>,
}

impl<I: IndexInt> Default for KmerOffsets<I> {
    fn default() -> Self {
        Self {
            map: FxHashMap::default(),
        }
    }
}

impl<I: IndexInt> KmerOffsets<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the rank interval of a k-mer. Returns false if it overwrote one.
    pub fn insert(&mut self, kmer: Kmer, left: I, right: I) -> bool {
        self.map.insert(kmer, (left, right)).is_none()
    }

    /// Interval of the k-mer at the start of `pattern`, if the pattern is
    /// long enough and the k-mer occurs in the reference
    #[inline]
    pub fn lookup(&self, pattern: &[u8]) -> Option<(usize, usize)> {
        let key: &Kmer = pattern.get(..KMER_LEN)?.try_into().ok()?;
        self.map
            .get(key)
            .map(|&(left, right)| (left.to_usize(), right.to_usize()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Entries in key order (deterministic for serialization)
    pub fn sorted_entries(&self) -> Vec<(Kmer, I, I)> {
        let mut entries: Vec<_> = self
            .map
            .iter()
            .map(|(kmer, &(left, right))| (*kmer, left, right))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl<I: IndexInt> FromIterator<(Kmer, I, I)> for KmerOffsets<I> {
    fn from_iter<T: IntoIterator<Item = (Kmer, I, I)>>(iter: T) -> Self {
        let mut offsets = Self::new();
        for (kmer, left, right) in iter {
            offsets.insert(kmer, left, right);
        }
        offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_uses_prefix() {
        let offsets: KmerOffsets<u32> = [(*b"ACGTACGT", 3, 5), (*b"TTTTTTTT", 9, 9)]
            .into_iter()
            .collect();

        assert_eq!(offsets.lookup(b"ACGTACGTGGG"), Some((3, 5)));
        assert_eq!(offsets.lookup(b"TTTTTTTT"), Some((9, 9)));
        assert_eq!(offsets.lookup(b"ACGTACGA"), None);
        // Shorter than a k-mer
        assert_eq!(offsets.lookup(b"ACGT"), None);
    }

    #[test]
    fn test_sorted_entries() {
        let mut offsets = KmerOffsets::<u64>::new();
        assert!(offsets.insert(*b"TTTTTTTT", 1, 2));
        assert!(offsets.insert(*b"AAAAAAAA", 0, 0));
        assert!(!offsets.insert(*b"AAAAAAAA", 0, 1));

        let entries = offsets.sorted_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], (*b"AAAAAAAA", 0, 1));
        assert_eq!(entries[1].0, *b"TTTTTTTT");
    }
}
