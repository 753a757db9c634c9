//! Maximal almost-unique matches (MAMs)
//!
//! A MAM is a maximal match that occurs once in the reference; it may repeat
//! in the query. Requires a full (K = 1) index with its ISA.

use super::{Matcher, merge_reports, run_with_output};
use crate::error::SearchError;
use crate::index::types::IndexInt;
use crate::output::{Match, MatchOutput, MatchReport, MatchSink};
use std::io;

impl<I: IndexInt> Matcher<'_, I> {
    /// Find all MAMs of at least `min_len` characters
    pub fn mam(
        &self,
        query: &[u8],
        min_len: usize,
        output: MatchOutput<'_>,
    ) -> Result<MatchReport, SearchError> {
        self.require_full_index("MAM")?;
        if min_len == 0 {
            return Err(SearchError::ZeroMinLength);
        }
        let part = run_with_output(output, |sink| self.find_mam(query, 0, 1, min_len, sink))?;
        Ok(merge_reports(vec![part]))
    }

    /// MAMs starting in chunk `chunk` of `chunks` equal query spans; the
    /// last chunk runs to the end of the query
    pub fn find_mam<S: MatchSink + ?Sized>(
        &self,
        query: &[u8],
        chunk: usize,
        chunks: usize,
        min_len: usize,
        sink: &mut S,
    ) -> io::Result<()> {
        let index = self.index;
        let last = index.last_rank();
        let chunk_len = query.len() / chunks.max(1);
        let mut prefix = chunk_len * chunk;
        let end = if chunk + 1 >= chunks {
            query.len()
        } else {
            chunk_len * (chunk + 1)
        };

        let mut cur = self.root();
        while prefix < end {
            if cur.depth == 0
                && let Some((left, right)) = index.offsets().lookup(&query[prefix..])
            {
                cur.start = left;
                cur.end = right;
                cur.depth = crate::index::offsets::KMER_LEN;
            }

            self.descend(query, prefix, &mut cur, query.len());
            if cur.depth == 0 || (cur.depth <= 1 && cur.depth < min_len) {
                cur.reset(last);
                prefix += 1;
                continue;
            }

            if cur.is_singleton() && cur.depth >= min_len {
                let pos = index.sa_at(cur.start);
                if self.is_left_maximal(query, prefix, pos) {
                    sink.push(Match::new(pos, prefix, cur.depth))?;
                }
            }

            // Successors of a unique match are not left maximal; skip them
            loop {
                prefix += 1;
                if !index.suffix_link(&mut cur) {
                    cur.reset(last);
                    break;
                }
                if !cur.is_singleton() {
                    break;
                }
            }
        }
        sink.flush()
    }
}
