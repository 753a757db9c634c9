//! Error types for sparsemem
//!
//! Traversal itself never fails: descent and suffix-link simulation report
//! "no further narrowing" through boolean returns. The enums here cover
//! the conditions that must reach the caller.

use thiserror::Error;

/// Errors raised by the compact LCP store
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LcpError {
    /// Rank outside the allocated array
    #[error("LCP rank {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested rank
        index: usize,
        /// Number of ranks in the store
        len: usize,
    },

    /// An overflow value was read before `finalize()` sorted the side table
    #[error("LCP overflow at rank {index} read before finalize()")]
    NotFinalized {
        /// Requested rank
        index: usize,
    },

    /// A value was written after the store was finalized
    #[error("LCP store is finalized; rank {index} can no longer be set")]
    AlreadyFinalized {
        /// Rank that was written
        index: usize,
    },

    /// Serialized overflow table does not agree with the inline bytes
    #[error("corrupt LCP overflow table: {0}")]
    CorruptOverflow(String),
}

/// Errors raised while assembling or verifying an index
#[derive(Debug, Error)]
pub enum IndexError {
    /// Sparseness must be at least 1
    #[error("invalid sparseness K={0}")]
    InvalidSparseness(usize),

    /// The suffix array has no entries
    #[error("suffix array is empty")]
    EmptySuffixArray,

    /// An auxiliary table is not aligned with the suffix array
    #[error("{table} has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Table name
        table: &'static str,
        /// Entries expected (suffix array length)
        expected: usize,
        /// Entries found
        actual: usize,
    },

    /// The LCP store was handed over without `finalize()`
    #[error("LCP store must be finalized before it is used by an index")]
    UnfinalizedLcp,

    /// A stored position points past the reference
    #[error("{table}[{index}] = {value} is out of range ({limit})")]
    PositionOutOfRange {
        /// Table name
        table: &'static str,
        /// Offending entry
        index: usize,
        /// Stored value
        value: usize,
        /// Exclusive upper bound
        limit: usize,
    },

    /// Sequence boundary table is malformed
    #[error("invalid sequence layout: {0}")]
    InvalidLayout(String),

    /// A structural invariant does not hold (reported by `verify`)
    #[error("index invariant violated: {0}")]
    InvariantViolation(String),

    /// LCP store error
    #[error(transparent)]
    Lcp(#[from] LcpError),
}

/// Errors raised by the match finders
#[derive(Debug, Error)]
pub enum SearchError {
    /// MAM and MUM need every suffix (K = 1)
    #[error("{operation} requires a full suffix array, index is sampled with K={sparseness}")]
    SparseIndexUnsupported {
        /// Requested operation
        operation: &'static str,
        /// Index sparseness
        sparseness: usize,
    },

    /// The inverse suffix array was not loaded
    #[error("{0} requires the inverse suffix array")]
    MissingInverseSuffixArray(&'static str),

    /// Child table traversal was requested but the index carries none
    #[error("child table traversal requested but the index has no child table")]
    MissingChildTable,

    /// Minimum match length of zero
    #[error("minimum match length must be at least 1")]
    ZeroMinLength,

    /// MEM on a sampled index needs min_len >= K
    #[error("minimum match length {min_len} is below the sparseness K={sparseness}")]
    MinLengthBelowSparseness {
        /// Requested minimum length
        min_len: usize,
        /// Index sparseness
        sparseness: usize,
    },

    /// Chunk or thread count of zero
    #[error("{0} must be at least 1")]
    ZeroWorkers(&'static str),

    /// Worker pool could not be created
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Printing matches failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
