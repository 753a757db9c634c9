//! Utility functions shared across sparsemem.
//!
//! ## Modules
//!
//! - [`dna`] - Reverse complement and nucleotide masking for queries
//! - [`encoding`] - Variable-length integer encoding (varint)
//! - [`progress`] - Progress bars, no-op without the `progress` feature

pub mod dna;
pub mod encoding;
pub mod progress;

pub use dna::*;
pub use encoding::*;
