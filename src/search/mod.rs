//! Maximal match search over a [`SparseSuffixArray`]
//!
//! ## Modules
//!
//! - [`interval`] - suffix array intervals
//! - [`traverse`] - top-down, child table and suffix link traversal
//! - [`mem`] - maximal exact matches (any multiplicity)
//! - [`mam`] - maximal matches unique in the reference
//! - [`mum`] - maximal matches unique in reference and query
//! - [`config`] - [`MatchConfig`]
//!
//! ```ignore
//! use sparsemem::output::MatchOutput;
//! use sparsemem::search::{MatchConfig, Matcher};
//!
//! let config = MatchConfig::automatic(&index, 20);
//! let matcher = Matcher::new(&index, config)?;
//! let report = matcher.mem(b"ACGTTGCA...", 20, MatchOutput::Collect, 4)?;
//! for m in report.matches {
//!     println!("{} {} {}", m.reference + 1, m.query + 1, m.len);
//! }
//! ```

pub mod config;
pub mod interval;
pub mod mam;
pub mod mem;
pub mod mum;
pub mod traverse;

pub use config::MatchConfig;
pub use interval::Interval;

use crate::error::SearchError;
use crate::index::sparse::SparseSuffixArray;
use crate::index::types::IndexInt;
use crate::output::{BufferedMatchWriter, Match, MatchOutput, MatchReport, MatchSink};
use rayon::ThreadPool;
use std::io;

/// Match finders bound to one index and configuration.
///
/// Holds no mutable state; every call keeps its intervals and buffers
/// local, so one matcher can serve many threads. Parallel finders run on
/// the pool given to [`Matcher::with_pool`], or on a pool built per call.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a, I: IndexInt> {
    index: &'a SparseSuffixArray<I>,
    config: MatchConfig,
    pool: Option<&'a ThreadPool>,
}

impl<'a, I: IndexInt> Matcher<'a, I> {
    /// Bind a configuration to an index, rejecting options the index
    /// cannot serve
    pub fn new(index: &'a SparseSuffixArray<I>, config: MatchConfig) -> Result<Self, SearchError> {
        if config.suffix_links && !index.has_isa() {
            return Err(SearchError::MissingInverseSuffixArray("suffix links"));
        }
        if config.child_table && !index.has_child() {
            return Err(SearchError::MissingChildTable);
        }
        if config.sparse_mult == 0 {
            return Err(SearchError::ZeroWorkers("sparse multiplier"));
        }
        Ok(Self {
            index,
            config,
            pool: None,
        })
    }

    /// Run parallel finders on `pool` instead of building one per call
    pub fn with_pool(mut self, pool: &'a ThreadPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn index(&self) -> &'a SparseSuffixArray<I> {
        self.index
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Descend with the child table when enabled, binary search otherwise
    #[inline]
    fn descend(&self, pattern: &[u8], prefix: usize, cur: &mut Interval, min_len: usize) {
        if self.config.child_table {
            self.index.traverse_faster(pattern, prefix, cur, min_len);
        } else {
            self.index.traverse(pattern, prefix, cur, min_len);
        }
    }

    #[inline]
    fn root(&self) -> Interval {
        Interval::root(self.index.last_rank())
    }

    /// Query position `prefix` and reference position `pos` start a left
    /// maximal match
    #[inline]
    fn is_left_maximal(&self, query: &[u8], prefix: usize, pos: usize) -> bool {
        prefix == 0 || pos == 0 || query[prefix - 1] != self.index.char_at(pos - 1)
    }

    /// Run `op` on the attached pool, or on a fresh pool of `workers` threads
    fn in_pool<R, F>(&self, workers: usize, op: F) -> Result<R, SearchError>
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match self.pool {
            Some(pool) => Ok(pool.install(op)),
            None => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(workers).build()?;
                Ok(pool.install(op))
            }
        }
    }

    /// MAM and MUM need every suffix and its successor rank
    fn require_full_index(&self, operation: &'static str) -> Result<(), SearchError> {
        let sparseness = self.index.sparseness();
        if sparseness != 1 {
            return Err(SearchError::SparseIndexUnsupported {
                operation,
                sparseness,
            });
        }
        if !self.index.has_isa() {
            return Err(SearchError::MissingInverseSuffixArray(operation));
        }
        Ok(())
    }
}

/// Run `find` against the sink selected by `output`, returning collected
/// matches and the number found
fn run_with_output<F>(output: MatchOutput<'_>, find: F) -> io::Result<(Vec<Match>, u64)>
where
    F: FnOnce(&mut dyn MatchSink) -> io::Result<()>,
{
    match output {
        MatchOutput::Collect => {
            let mut found: Vec<Match> = Vec::new();
            find(&mut found)?;
            let count = found.len() as u64;
            Ok((found, count))
        }
        MatchOutput::Print(writer) => {
            let mut sink = BufferedMatchWriter::new(writer);
            find(&mut sink)?;
            sink.flush()?;
            Ok((Vec::new(), sink.emitted()))
        }
    }
}

/// Merge per-worker results in worker order
fn merge_reports(parts: Vec<(Vec<Match>, u64)>) -> MatchReport {
    let mut report = MatchReport::default();
    for (matches, count) in parts {
        report.matches.extend(matches);
        report.count += count;
    }
    report
}
