//! Sequence boundaries of a concatenated multi-sequence reference

use super::types::SequenceEntry;
use crate::error::IndexError;

/// Maps concatenated reference positions back to (sequence, offset)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceLayout {
    sequences: Vec<SequenceEntry>,
    /// Longest description, used to pad 4-column output
    max_descr_len: usize,
}

impl ReferenceLayout {
    /// Build from sequence entries. The first sequence starts at 0 and start
    /// offsets are strictly increasing, so every position resolves.
    pub fn new(sequences: Vec<SequenceEntry>) -> Result<Self, IndexError> {
        if let Some(first) = sequences.first()
            && first.start != 0
        {
            return Err(IndexError::InvalidLayout(format!(
                "first sequence starts at {}, expected 0",
                first.start
            )));
        }
        if sequences.windows(2).any(|w| w[0].start >= w[1].start) {
            return Err(IndexError::InvalidLayout(
                "sequence start offsets must be strictly increasing".to_string(),
            ));
        }
        let max_descr_len = sequences.iter().map(|s| s.descr.len()).max().unwrap_or(0);
        Ok(Self {
            sequences,
            max_descr_len,
        })
    }

    /// Build from parallel description / start offset arrays
    pub fn from_parts(descr: Vec<String>, startpos: Vec<usize>) -> Result<Self, IndexError> {
        if descr.len() != startpos.len() {
            return Err(IndexError::InvalidLayout(format!(
                "{} descriptions but {} start offsets",
                descr.len(),
                startpos.len()
            )));
        }
        Self::new(
            descr
                .into_iter()
                .zip(startpos)
                .map(|(descr, start)| SequenceEntry { descr, start })
                .collect(),
        )
    }

    /// Resolve a reference position to its sequence description and the
    /// offset within that sequence
    pub fn locate(&self, pos: usize) -> Option<(&str, usize)> {
        // Last sequence starting at or before pos
        let idx = self.sequences.partition_point(|s| s.start <= pos);
        let entry = self.sequences.get(idx.checked_sub(1)?)?;
        Some((entry.descr.as_str(), pos - entry.start))
    }

    pub fn sequences(&self) -> &[SequenceEntry] {
        &self.sequences
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn max_descr_len(&self) -> usize {
        self.max_descr_len
    }
}
