//! Suffix array traversal
//!
//! Descending the virtual suffix tree of the sampled suffixes:
//! - binary search narrowing one character at a time (`top_down`,
//!   `top_down_faster`, `traverse`)
//! - child table descent that only branches at LCP boundaries
//!   (`top_down_child`, `traverse_faster`)
//! - suffix links simulated through the ISA and LCP (`suffix_link`)
//!
//! None of these fail: a `false` return means the interval could not be
//! narrowed or moved, and the caller restarts from the root.

use super::interval::Interval;
use crate::index::sparse::SparseSuffixArray;
use crate::index::types::IndexInt;
use std::cmp::Ordering;

impl<I: IndexInt> SparseSuffixArray<I> {
    /// Character at `offset` into the suffix of rank `rank`
    #[inline(always)]
    fn suffix_char(&self, rank: usize, offset: usize) -> u8 {
        self.char_at(self.sa_at(rank) + offset)
    }

    /// First rank in `[s, e]` whose suffix has `c` at `offset`.
    ///
    /// `c` must lie within the characters at `s` and `e`.
    pub fn bsearch_left(&self, c: u8, offset: usize, s: usize, e: usize) -> usize {
        if c == self.suffix_char(s, offset) {
            return s;
        }
        let (mut l, mut r) = (s, e);
        while r - l > 1 {
            let m = l + (r - l) / 2;
            if c <= self.suffix_char(m, offset) {
                r = m;
            } else {
                l = m;
            }
        }
        r
    }

    /// Last rank in `[s, e]` whose suffix has `c` at `offset`
    pub fn bsearch_right(&self, c: u8, offset: usize, s: usize, e: usize) -> usize {
        if c == self.suffix_char(e, offset) {
            return e;
        }
        let (mut l, mut r) = (s, e);
        while r - l > 1 {
            let m = l + (r - l) / 2;
            if c < self.suffix_char(m, offset) {
                r = m;
            } else {
                l = m;
            }
        }
        l
    }

    /// Narrow `[start, end]` to the ranks with `c` at `offset`.
    ///
    /// Leaves the bounds untouched and returns false when no rank matches.
    pub fn top_down(&self, c: u8, offset: usize, start: &mut usize, end: &mut usize) -> bool {
        if c < self.suffix_char(*start, offset) || c > self.suffix_char(*end, offset) {
            return false;
        }
        let left = self.bsearch_left(c, offset, *start, *end);
        let right = self.bsearch_right(c, offset, *start, *end);
        if left > right {
            return false;
        }
        *start = left;
        *end = right;
        true
    }

    /// Same result as [`top_down`](Self::top_down), but the right border
    /// search reuses the range the left border search already narrowed
    pub fn top_down_faster(
        &self,
        c: u8,
        offset: usize,
        start: &mut usize,
        end: &mut usize,
    ) -> bool {
        let (s, e) = (*start, *end);
        let with_first = c.cmp(&self.suffix_char(s, offset));
        let with_last = c.cmp(&self.suffix_char(e, offset));
        if with_first == Ordering::Less || with_last == Ordering::Greater {
            return false;
        }

        let mut found = false;
        let mut left = s;
        // Search range for the right border
        let (mut l2, mut r2) = (s, e);

        if with_first == Ordering::Equal {
            found = true;
        } else {
            let mut r = e;
            while r - left > 1 {
                let m = left + (r - left) / 2;
                let cmp = c.cmp(&self.suffix_char(m, offset));
                if cmp != Ordering::Greater {
                    if !found && cmp == Ordering::Equal {
                        found = true;
                        l2 = m;
                        r2 = r;
                    }
                    r = m;
                } else {
                    left = m;
                }
            }
            left = r;
        }

        if !found {
            // Right border lies left of `left`; left > s here
            l2 = left - 1;
        }
        if with_last == Ordering::Equal {
            l2 = e;
        } else {
            while r2 - l2 > 1 {
                let m = l2 + (r2 - l2) / 2;
                if c < self.suffix_char(m, offset) {
                    r2 = m;
                } else {
                    l2 = m;
                }
            }
        }

        if left > l2 {
            return false;
        }
        *start = left;
        *end = l2;
        true
    }

    /// LCP value of the lcp-interval `[s, e]`, read from the child table
    #[inline]
    fn interval_lcp(&self, s: usize, e: usize) -> usize {
        let up = self.child_at(e);
        if s < up && up <= e {
            self.lcp_at(up)
        } else {
            self.lcp_at(self.child_at(s))
        }
    }

    /// Move `cur` to its child interval whose edge starts with `c`.
    ///
    /// `cur` must be an lcp-interval with lcp value `cur.depth`. On failure
    /// `cur` is left unchanged.
    pub fn top_down_child(&self, c: u8, cur: &mut Interval) -> bool {
        let (s, e) = (cur.start, cur.end);
        let mut right = self.child_at(e);
        if s >= right || right > e {
            right = self.child_at(s);
        }
        if right <= s || right > e {
            return false;
        }

        // First child [s, right - 1]
        if self.suffix_char(s, cur.depth) == c {
            cur.end = right - 1;
            return true;
        }

        // Middle children, following the next l-index chain
        let mut left = right;
        let mut next = self.child_at(right);
        while next > right && next <= e && self.lcp_at(right) == self.lcp_at(next) {
            right = next;
            if self.suffix_char(left, cur.depth) == c {
                cur.start = left;
                cur.end = right - 1;
                return true;
            }
            left = right;
            next = self.child_at(right);
        }

        // Last child [left, e]
        if self.suffix_char(left, cur.depth) == c {
            cur.start = left;
            return true;
        }
        false
    }

    /// Descend from `cur` along `pattern[prefix..]` one character at a time
    /// until a mismatch, the end of the pattern, or `cur.depth == min_len`
    pub fn traverse(&self, pattern: &[u8], prefix: usize, cur: &mut Interval, min_len: usize) {
        if cur.depth >= min_len {
            return;
        }
        while prefix + cur.depth < pattern.len() {
            let (mut start, mut end) = (cur.start, cur.end);
            if !self.top_down_faster(pattern[prefix + cur.depth], cur.depth, &mut start, &mut end)
            {
                return;
            }
            cur.depth += 1;
            cur.start = start;
            cur.end = end;
            if cur.depth == min_len {
                return;
            }
        }
    }

    /// Child table descent; converges to the same interval and depth as
    /// [`traverse`](Self::traverse).
    ///
    /// Characters between branch points are compared directly against the
    /// first suffix of the interval. Requires a child table and `cur` to be
    /// an lcp-interval.
    pub fn traverse_faster(
        &self,
        pattern: &[u8],
        prefix: usize,
        cur: &mut Interval,
        min_len: usize,
    ) {
        if cur.depth >= min_len {
            return;
        }
        let pattern_len = pattern.len();
        let reference_len = self.reference().len();
        let mut c = prefix + cur.depth;

        let mut found = c < pattern_len;
        if found && !cur.is_singleton() && self.interval_lcp(cur.start, cur.end) == cur.depth {
            found = self.top_down_child(pattern[c], cur);
        } else if found {
            found = pattern[c] == self.suffix_char(cur.start, cur.depth);
        }

        let mut mismatch = false;
        while found && !mismatch && c < pattern_len && cur.depth < min_len {
            c += 1;
            cur.depth += 1;
            let pos = self.sa_at(cur.start);
            if !cur.is_singleton() {
                // Match along the edge up to the child's branch point
                let limit = self.interval_lcp(cur.start, cur.end).min(min_len);
                while !mismatch && c < pattern_len && cur.depth < limit {
                    mismatch = self.char_at(pos + cur.depth) != pattern[c];
                    c += 1;
                    if !mismatch {
                        cur.depth += 1;
                    }
                }
                found = c < pattern_len
                    && !mismatch
                    && cur.depth < min_len
                    && self.top_down_child(pattern[c], cur);
            } else {
                while !mismatch && c < pattern_len && cur.depth < min_len {
                    mismatch = pos + cur.depth >= reference_len
                        || self.char_at(pos + cur.depth) != pattern[c];
                    c += 1;
                    if !mismatch {
                        cur.depth += 1;
                    }
                }
            }
        }
    }

    /// Widen `link` to every rank whose LCP with it is at least
    /// `link.depth`, giving up after `2 * depth * log_n` steps
    pub fn expand_link(&self, link: &mut Interval) -> bool {
        let threshold = 2 * link.depth * self.log_n();
        let last = self.last_rank();
        let mut expansions = 0;
        let (mut start, mut end) = (link.start, link.end);

        while start > 0 && self.lcp_at(start) >= link.depth {
            expansions += 1;
            if expansions >= threshold {
                return false;
            }
            start -= 1;
        }
        while end < last && self.lcp_at(end + 1) >= link.depth {
            expansions += 1;
            if expansions >= threshold {
                return false;
            }
            end += 1;
        }
        link.start = start;
        link.end = end;
        true
    }

    /// Follow the simulated suffix link of `m`: drop the first K characters
    /// and move to the interval of the remaining prefix.
    ///
    /// Returns false, leaving `m` unchanged, when the remaining depth would
    /// be zero, the ISA cannot map a bound, or expansion exceeds its bound.
    pub fn suffix_link(&self, m: &mut Interval) -> bool {
        let k = self.sparseness();
        if m.depth <= k {
            return false;
        }
        let (Some(start), Some(end)) = (
            self.successor_rank(self.sa_at(m.start)),
            self.successor_rank(self.sa_at(m.end)),
        ) else {
            return false;
        };
        let mut link = Interval::new(m.depth - k, start, end);
        if !self.expand_link(&mut link) {
            return false;
        }
        *m = link;
        true
    }

    /// Interval of all sampled suffixes starting with `pattern`
    pub fn search(&self, pattern: &[u8]) -> Option<Interval> {
        let mut start = 0;
        let mut end = self.last_rank();
        for (offset, &c) in pattern.iter().enumerate() {
            if !self.top_down(c, offset, &mut start, &mut end) {
                return None;
            }
        }
        Some(Interval::new(pattern.len(), start, end))
    }

    /// Sorted reference positions of the sampled suffixes starting with
    /// `pattern`
    pub fn occurrences(&self, pattern: &[u8]) -> Vec<usize> {
        let Some(interval) = self.search(pattern) else {
            return Vec::new();
        };
        let mut positions: Vec<usize> = interval.ranks().map(|rank| self.sa_at(rank)).collect();
        positions.sort_unstable();
        positions
    }

    pub fn count(&self, pattern: &[u8]) -> usize {
        self.search(pattern).map_or(0, |interval| interval.size())
    }
}
