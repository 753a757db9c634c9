//! # sparsemem - Maximal match search over sparse suffix arrays
//!
//! sparsemem finds maximal exact matches between a query sequence and a
//! reference genome using a sparse suffix array: only every K-th suffix of
//! the reference is indexed, and simulated suffix links recover the matches
//! that start between sampled positions.
//!
//! ## Architecture
//!
//! - [`index`] - The index tables (SA, ISA, compact LCP, child table, 8-mer
//!   seeds) and their on-disk format
//! - [`search`] - Traversal engine and the MEM / MAM / MUM match finders
//! - [`output`] - Match sinks and MUMmer v3 compatible formatting
//! - [`query`] - Query FASTA reading and the batch driver
//! - [`utils`] - Reverse complement, varints, progress bars
//! - [`error`] - Error types
//!
//! ## Quick Start
//!
//! ```ignore
//! use sparsemem::index::IndexReader;
//! use sparsemem::output::MatchOutput;
//! use sparsemem::search::{MatchConfig, Matcher};
//! use std::path::Path;
//!
//! let index = IndexReader::open::<u32>(Path::new("/data/hg38.smem"))?;
//! let matcher = Matcher::new(&index, MatchConfig::automatic(&index, 20))?;
//! let report = matcher.mem(b"ACGTTTGACCA...", 20, MatchOutput::Collect, 1)?;
//! println!("{} MEMs", report.count);
//! ```
//!
//! ## Match kinds
//!
//! 1. **MEM** - every maximal exact match, any number of occurrences
//! 2. **MAM** - maximal matches occurring once in the reference
//! 3. **MUM** - maximal matches occurring once in reference and query
//!
//! MAM and MUM need a full suffix array (K = 1).

pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod search;
pub mod utils;
