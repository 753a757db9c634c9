//! Maximal unique matches (MUMs)
//!
//! MUM candidates are the MAMs of the query. A candidate is dropped when
//! another candidate covers its whole reference span; two candidates with
//! the same span (the same reference substring matched from two query
//! positions) drop each other. The sweep follows `cleanMUMcand` from
//! MUMmer 3.

use super::Matcher;
use crate::error::SearchError;
use crate::index::types::IndexInt;
use crate::output::{Match, MatchOutput, MatchReport};
use rayon::prelude::*;
use std::cmp::Reverse;
use std::io;

/// Candidate count above which sorting runs in parallel
const PARALLEL_SORT_THRESHOLD: usize = 100_000;

impl<I: IndexInt> Matcher<'_, I> {
    /// Find all MUMs of at least `min_len` characters
    pub fn mum(
        &self,
        query: &[u8],
        min_len: usize,
        output: MatchOutput<'_>,
    ) -> Result<MatchReport, SearchError> {
        self.require_full_index("MUM")?;
        if min_len == 0 {
            return Err(SearchError::ZeroMinLength);
        }
        let mut candidates = Vec::new();
        self.find_mam(query, 0, 1, min_len, &mut candidates)?;
        finish(clean_mum_candidates(candidates), output)
    }

    /// MUM search with the query split into `chunks` spans searched on
    /// `chunks` workers; candidates are merged before cleaning
    pub fn mum_parallel(
        &self,
        query: &[u8],
        chunks: usize,
        min_len: usize,
        output: MatchOutput<'_>,
    ) -> Result<MatchReport, SearchError> {
        self.require_full_index("MUM")?;
        if min_len == 0 {
            return Err(SearchError::ZeroMinLength);
        }
        if chunks == 0 {
            return Err(SearchError::ZeroWorkers("chunks"));
        }
        if chunks == 1 {
            return self.mum(query, min_len, output);
        }

        let per_chunk = self.in_pool(chunks, || {
            (0..chunks)
                .into_par_iter()
                .map(|chunk| {
                    let mut found = Vec::new();
                    self.find_mam(query, chunk, chunks, min_len, &mut found)
                        .map(|_| found)
                })
                .collect::<io::Result<Vec<Vec<Match>>>>()
        })??;
        let candidates = per_chunk.into_iter().flatten().collect();
        finish(clean_mum_candidates(candidates), output)
    }
}

fn finish(unique: Vec<Match>, output: MatchOutput<'_>) -> Result<MatchReport, SearchError> {
    let count = unique.len() as u64;
    match output {
        MatchOutput::Collect => Ok(MatchReport {
            matches: unique,
            count,
        }),
        MatchOutput::Print(writer) => {
            writer.write_batch(&unique)?;
            Ok(MatchReport {
                matches: Vec::new(),
                count,
            })
        }
    }
}

/// Keep the candidates whose reference span is not covered by another
/// candidate. Output is ordered by reference position.
pub fn clean_mum_candidates(mut candidates: Vec<Match>) -> Vec<Match> {
    let key = |m: &Match| (m.reference, Reverse(m.len));
    if candidates.len() > PARALLEL_SORT_THRESHOLD {
        candidates.par_sort_unstable_by_key(key);
    } else {
        candidates.sort_unstable_by_key(key);
    }

    let mut unique = Vec::with_capacity(candidates.len());
    let mut max_right: Option<usize> = None;
    let mut ignore_previous = false;
    for i in 0..candidates.len() {
        let right = candidates[i].reference_end();
        let mut ignore_current = false;
        match max_right {
            Some(max) if max > right => ignore_current = true,
            Some(max) if max == right => {
                ignore_current = true;
                if !ignore_previous && candidates[i - 1].reference == candidates[i].reference {
                    ignore_previous = true;
                }
            }
            _ => max_right = Some(right),
        }
        if i > 0 && !ignore_previous {
            unique.push(candidates[i - 1]);
        }
        ignore_previous = ignore_current;
    }
    if let Some(&last) = candidates.last()
        && !ignore_previous
    {
        unique.push(last);
    }
    unique
}
