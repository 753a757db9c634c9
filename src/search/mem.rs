//! Maximal exact matches (MEMs)
//!
//! A sampled index only holds suffixes starting at multiples of K, so the
//! query is scanned in K phases, one per query offset modulo K. Each phase
//! matches at every `sparse_mult * K`-th query position against sampled
//! suffixes and recovers the true match start by extending left up to that
//! many characters.
//!
//! Two intervals move along the query: the min-length interval (`mli`),
//! descended only until `min_len - sparse_mult * K + 1` characters match,
//! and the max-match interval (`xmi`), descended to the mismatch. Every
//! right maximal match of sufficient length lies between them in the LCP
//! structure.

use super::{Interval, Matcher, merge_reports, run_with_output};
use crate::error::SearchError;
use crate::index::types::IndexInt;
use crate::output::{Match, MatchOutput, MatchReport, MatchSink};
use log::debug;
use rayon::prelude::*;
use std::io;

impl<I: IndexInt> Matcher<'_, I> {
    /// Find all maximal exact matches of at least `min_len` characters.
    ///
    /// The K phases are spread over `threads` workers. Matches are
    /// collected or printed according to `output`.
    pub fn mem(
        &self,
        query: &[u8],
        min_len: usize,
        output: MatchOutput<'_>,
        threads: usize,
    ) -> Result<MatchReport, SearchError> {
        let k = self.index.sparseness();
        if min_len == 0 {
            return Err(SearchError::ZeroMinLength);
        }
        if min_len < k {
            return Err(SearchError::MinLengthBelowSparseness {
                min_len,
                sparseness: k,
            });
        }
        if threads == 0 {
            return Err(SearchError::ZeroWorkers("threads"));
        }
        if query.len() < min_len {
            return Ok(MatchReport::default());
        }

        let sparse_mult = self.config.sparse_mult.min(min_len / k).max(1);
        if sparse_mult != self.config.sparse_mult {
            debug!(
                "sparse multiplier lowered from {} to {sparse_mult} for min_len {min_len}",
                self.config.sparse_mult
            );
        }

        let run_phase = |phase: usize| {
            run_with_output(output, |sink| {
                self.find_mem(phase, query, min_len, sparse_mult, sink)
            })
        };

        let parts = if threads == 1 || k == 1 {
            (0..k).map(run_phase).collect::<io::Result<Vec<_>>>()?
        } else {
            self.in_pool(threads.min(k), || {
                (0..k)
                    .into_par_iter()
                    .map(run_phase)
                    .collect::<io::Result<Vec<_>>>()
            })??
        };
        Ok(merge_reports(parts))
    }

    /// MEMs whose sampled reference suffix is reached from query positions
    /// congruent to `phase` modulo `sparse_mult * K`
    pub fn find_mem<S: MatchSink + ?Sized>(
        &self,
        phase: usize,
        query: &[u8],
        min_len: usize,
        sparse_mult: usize,
        sink: &mut S,
    ) -> io::Result<()> {
        let index = self.index;
        let k = index.sparseness();
        let last = index.last_rank();
        let step = sparse_mult * k;
        // Shortest sampled match that can still extend left to min_len
        let min_len_k = (min_len + 1).saturating_sub(step).max(1);

        let mut prefix = phase;
        let mut mli = self.root();
        let mut xmi = self.root();

        while prefix < query.len() {
            self.descend(query, prefix, &mut mli, min_len_k);
            if mli.depth > xmi.depth {
                xmi = mli;
            }
            if mli.depth == 0 || (mli.depth <= 1 && mli.depth < min_len_k) {
                mli.reset(last);
                xmi.reset(last);
                prefix += step;
                continue;
            }

            let collected = mli.depth >= min_len_k;
            if collected {
                self.descend(query, prefix, &mut xmi, query.len());
                self.collect_mems(query, prefix, mli, xmi, min_len, step, sink)?;
            }
            prefix += step;

            if !self.config.suffix_links {
                mli.reset(last);
                xmi.reset(last);
                continue;
            }
            let mut linked = true;
            for _ in 0..sparse_mult {
                if !index.suffix_link(&mut mli) {
                    linked = false;
                    break;
                }
                if collected && !index.suffix_link(&mut xmi) {
                    xmi = mli;
                }
            }
            if !linked {
                mli.reset(last);
                xmi.reset(last);
                continue;
            }
            if !collected {
                xmi = mli;
            }
        }
        sink.flush()
    }

    /// Report every right maximal match between `xmi` (full match depth)
    /// and `mli` (minimum depth), walking outwards through the LCP array,
    /// and keep those that are also left maximal
    #[allow(clippy::too_many_arguments)]
    fn collect_mems<S: MatchSink + ?Sized>(
        &self,
        query: &[u8],
        prefix: usize,
        mli: Interval,
        mut xmi: Interval,
        min_len: usize,
        step: usize,
        sink: &mut S,
    ) -> io::Result<()> {
        let index = self.index;
        let last = index.last_rank();

        for rank in xmi.ranks() {
            self.find_left_maximal(query, prefix, index.sa_at(rank), xmi.depth, min_len, step, sink)?;
        }
        if mli.start == xmi.start && mli.end == xmi.end {
            return Ok(());
        }

        while xmi.depth >= mli.depth {
            // Step up to the enclosing lcp-interval
            xmi.depth = if xmi.end < last {
                index.lcp_at(xmi.start).max(index.lcp_at(xmi.end + 1))
            } else {
                index.lcp_at(xmi.start)
            };
            if xmi.depth < mli.depth {
                break;
            }
            while xmi.start > 0 && index.lcp_at(xmi.start) >= xmi.depth {
                xmi.start -= 1;
                self.find_left_maximal(
                    query,
                    prefix,
                    index.sa_at(xmi.start),
                    xmi.depth,
                    min_len,
                    step,
                    sink,
                )?;
            }
            while xmi.end < last && index.lcp_at(xmi.end + 1) >= xmi.depth {
                xmi.end += 1;
                self.find_left_maximal(
                    query,
                    prefix,
                    index.sa_at(xmi.end),
                    xmi.depth,
                    min_len,
                    step,
                    sink,
                )?;
            }
        }
        Ok(())
    }

    /// Extend the right maximal match `(pos, prefix, len)` left by at most
    /// `step` characters and report it if it becomes left maximal.
    ///
    /// A match still extendable after `step` characters is reported from
    /// another sampled suffix.
    #[allow(clippy::too_many_arguments)]
    fn find_left_maximal<S: MatchSink + ?Sized>(
        &self,
        query: &[u8],
        mut prefix: usize,
        mut pos: usize,
        mut len: usize,
        min_len: usize,
        step: usize,
        sink: &mut S,
    ) -> io::Result<()> {
        for _ in 0..step {
            if self.is_left_maximal(query, prefix, pos) {
                if len >= min_len {
                    sink.push(Match::new(pos, prefix, len))?;
                }
                return Ok(());
            }
            prefix -= 1;
            pos -= 1;
            len += 1;
        }
        Ok(())
    }
}
