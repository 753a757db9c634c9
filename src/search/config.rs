//! Match finder configuration

use crate::index::sparse::SparseSuffixArray;
use crate::index::types::IndexInt;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// How the match finders walk the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Follow simulated suffix links between query positions instead of
    /// restarting every search from the root. Needs the ISA.
    pub suffix_links: bool,
    /// Descend with the child table instead of binary search
    pub child_table: bool,
    /// Query positions skipped per step are `sparse_mult * K`
    pub sparse_mult: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            suffix_links: true,
            child_table: true,
            sparse_mult: 1,
        }
    }
}

impl MatchConfig {
    /// Configuration picked from the index sparseness and minimum match
    /// length: suffix links on dense indexes (K < 4), the child table
    /// whenever the index has one, and a skip sized to the minimum length.
    pub fn automatic<I: IndexInt>(index: &SparseSuffixArray<I>, min_len: usize) -> Self {
        let k = index.sparseness();
        let suffix_links = k < 4 && index.has_isa();
        let config = Self {
            suffix_links,
            child_table: index.has_child(),
            sparse_mult: default_sparse_mult(k, min_len, suffix_links, k >= 4),
        };
        debug!("automatic match configuration for K={k}, min_len={min_len}: {config:?}");
        config
    }

    /// Lower a user supplied skip until `sparse_mult * K <= min_len`
    pub fn clamp_sparse_mult(&mut self, sparseness: usize, min_len: usize) {
        let max = (min_len / sparseness).max(1);
        if self.sparse_mult > max {
            warn!(
                "skip parameter decreased from {} to {max} because skip*K > minimum length",
                self.sparse_mult
            );
            self.sparse_mult = max;
        }
        self.sparse_mult = self.sparse_mult.max(1);
        if self.sparse_mult * sparseness > min_len.saturating_sub(10) {
            warn!(
                "skip parameter {} is very high, {} or {} would be more appropriate",
                self.sparse_mult,
                min_len.saturating_sub(10) / sparseness,
                min_len.saturating_sub(12) / sparseness
            );
        }
    }
}

/// Skip used when none is given
fn default_sparse_mult(k: usize, min_len: usize, suffix_links: bool, sparse_layout: bool) -> usize {
    let mult = if suffix_links && !sparse_layout {
        1
    } else if k >= 4 {
        min_len.saturating_sub(10) / k
    } else {
        min_len.saturating_sub(12) / k
    };
    mult.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sparse_mult() {
        assert_eq!(default_sparse_mult(1, 20, true, false), 1);
        assert_eq!(default_sparse_mult(4, 50, false, true), 10);
        assert_eq!(default_sparse_mult(2, 40, false, false), 14);
        // Never below one
        assert_eq!(default_sparse_mult(8, 12, false, true), 1);
    }

    #[test]
    fn test_clamp_sparse_mult() {
        let mut config = MatchConfig {
            sparse_mult: 9,
            ..MatchConfig::default()
        };
        config.clamp_sparse_mult(4, 20);
        assert_eq!(config.sparse_mult, 5);

        config.sparse_mult = 0;
        config.clamp_sparse_mult(4, 20);
        assert_eq!(config.sparse_mult, 1);
    }

    #[test]
    fn test_config_from_json() {
        let config: MatchConfig = serde_json::from_str(r#"{"sparse_mult": 3}"#).unwrap();
        assert_eq!(config.sparse_mult, 3);
        assert!(config.suffix_links);
        assert!(config.child_table);
    }
}
