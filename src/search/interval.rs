//! Suffix array intervals

/// A range of suffix array ranks `[start, end]` whose suffixes share a
/// prefix of length `depth`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub depth: usize,
    pub start: usize,
    pub end: usize,
}

impl Interval {
    pub fn new(depth: usize, start: usize, end: usize) -> Self {
        Self { depth, start, end }
    }

    /// The whole suffix array at depth 0
    #[inline]
    pub fn root(last_rank: usize) -> Self {
        Self::new(0, 0, last_rank)
    }

    #[inline]
    pub fn reset(&mut self, last_rank: usize) {
        *self = Self::root(last_rank);
    }

    /// Number of ranks covered
    #[inline]
    pub fn size(&self) -> usize {
        self.end + 1 - self.start
    }

    #[inline]
    pub fn is_singleton(&self) -> bool {
        self.start == self.end
    }

    pub fn ranks(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}
