//! Shared fixtures: naive index construction and brute-force match oracles
//! for small synthetic references.

#![allow(dead_code)]

use sparsemem::index::offsets::{KMER_LEN, Kmer};
use sparsemem::index::sparse::common_prefix;
use sparsemem::index::{
    CompactLcp, IndexInt, IndexParts, KmerOffsets, ReferenceLayout, SparseSuffixArray,
};
use sparsemem::output::Match;
use std::collections::{BTreeMap, BTreeSet};

/// Separator placed between concatenated reference sequences
pub const SEPARATOR: u8 = b'`';

/// Optional tables to build
#[derive(Debug, Clone, Copy)]
pub struct Tables {
    pub isa: bool,
    pub child: bool,
    pub offsets: bool,
}

impl Tables {
    pub const ALL: Tables = Tables {
        isa: true,
        child: true,
        offsets: true,
    };
    pub const NO_CHILD: Tables = Tables {
        isa: true,
        child: false,
        offsets: true,
    };
    pub const BARE: Tables = Tables {
        isa: false,
        child: false,
        offsets: false,
    };
}

/// Pad a reference with '$' to a multiple of K, then K more
pub fn pad_reference(text: &[u8], k: usize) -> Vec<u8> {
    let mut reference = text.to_vec();
    while reference.len() % k != 0 {
        reference.push(b'$');
    }
    reference.extend(std::iter::repeat_n(b'$', k));
    reference
}

/// Build every table by sorting suffixes directly
pub fn build_index<I: IndexInt>(text: &[u8], k: usize, tables: Tables) -> SparseSuffixArray<I> {
    build_with_layout(text, k, tables, ReferenceLayout::default())
}

/// Concatenate named sequences with [`SEPARATOR`] and index the result
pub fn build_multi<I: IndexInt>(
    sequences: &[(&str, &[u8])],
    k: usize,
    tables: Tables,
) -> SparseSuffixArray<I> {
    let mut text = Vec::new();
    let mut descr = Vec::new();
    let mut startpos = Vec::new();
    for (i, (name, seq)) in sequences.iter().enumerate() {
        if i > 0 {
            text.push(SEPARATOR);
        }
        descr.push(name.to_string());
        startpos.push(text.len());
        text.extend_from_slice(seq);
    }
    let layout = ReferenceLayout::from_parts(descr, startpos).unwrap();
    build_with_layout(&text, k, tables, layout)
}

fn build_with_layout<I: IndexInt>(
    text: &[u8],
    k: usize,
    tables: Tables,
    layout: ReferenceLayout,
) -> SparseSuffixArray<I> {
    let reference = pad_reference(text, k);
    let n = reference.len() / k;

    let mut sa: Vec<usize> = (0..n).map(|i| i * k).collect();
    sa.sort_by(|&a, &b| reference[a..].cmp(&reference[b..]));

    let mut lcp = vec![0usize; n];
    for rank in 1..n {
        lcp[rank] = common_prefix(&reference[sa[rank - 1]..], &reference[sa[rank]..]);
    }

    let mut isa = vec![0usize; n];
    for (rank, &pos) in sa.iter().enumerate() {
        isa[pos / k] = rank;
    }

    let child = if tables.child {
        compute_child(&lcp)
    } else {
        Vec::new()
    };

    let mut offsets = KmerOffsets::new();
    if tables.offsets {
        let mut ranges: BTreeMap<Kmer, (usize, usize)> = BTreeMap::new();
        for (rank, &pos) in sa.iter().enumerate() {
            let Some(prefix) = reference.get(pos..pos + KMER_LEN) else {
                continue;
            };
            let kmer: Kmer = prefix.try_into().unwrap();
            ranges
                .entry(kmer)
                .and_modify(|range| range.1 = rank)
                .or_insert((rank, rank));
        }
        for (kmer, (left, right)) in ranges {
            offsets.insert(kmer, to_int(left), to_int(right));
        }
    }

    let to_ints = |values: &[usize]| values.iter().map(|&v| to_int::<I>(v)).collect::<Vec<I>>();
    SparseSuffixArray::new(IndexParts {
        reference,
        sa: to_ints(&sa),
        isa: if tables.isa { to_ints(&isa) } else { Vec::new() },
        lcp: CompactLcp::from_values(&lcp),
        child: to_ints(&child),
        offsets,
        sparseness: k,
        layout,
    })
    .unwrap()
}

fn to_int<I: IndexInt>(value: usize) -> I {
    I::from_usize(value).unwrap()
}

/// Up, down and next l-index values packed into one table (Abouelhoda et
/// al.), 0 where undefined
pub fn compute_child(lcp: &[usize]) -> Vec<usize> {
    let n = lcp.len();
    let mut child = vec![0usize; n];

    let mut stack = vec![0usize];
    let mut last_index: Option<usize> = None;
    for i in 1..n {
        while lcp[i] < lcp[*stack.last().unwrap()] {
            let popped = stack.pop().unwrap();
            last_index = Some(popped);
            let top = *stack.last().unwrap();
            if lcp[i] <= lcp[top] && lcp[top] != lcp[popped] {
                child[top] = popped;
            }
        }
        if let Some(last) = last_index.take() {
            child[i - 1] = last;
        }
        stack.push(i);
    }
    while lcp[*stack.last().unwrap()] > 0 {
        let popped = stack.pop().unwrap();
        let top = *stack.last().unwrap();
        if lcp[top] != lcp[popped] {
            child[top] = popped;
        }
    }

    let mut stack = vec![0usize];
    for i in 1..n {
        while lcp[i] < lcp[*stack.last().unwrap()] {
            stack.pop();
        }
        let top = *stack.last().unwrap();
        if lcp[i] == lcp[top] {
            stack.pop();
            child[top] = i;
        }
        stack.push(i);
    }
    child
}

fn extend(reference: &[u8], query: &[u8], r: usize, q: usize) -> usize {
    common_prefix(&reference[r..], &query[q..])
}

fn left_maximal(reference: &[u8], query: &[u8], r: usize, q: usize) -> bool {
    r == 0 || q == 0 || reference[r - 1] != query[q - 1]
}

/// Every maximal exact match of at least `min_len` characters
pub fn brute_mems(reference: &[u8], query: &[u8], min_len: usize) -> BTreeSet<Match> {
    let mut found = BTreeSet::new();
    for r in 0..reference.len() {
        for q in 0..query.len() {
            if !left_maximal(reference, query, r, q) {
                continue;
            }
            let len = extend(reference, query, r, q);
            if len >= min_len {
                found.insert(Match::new(r, q, len));
            }
        }
    }
    found
}

/// Maximal matches whose sequence occurs once in the reference
pub fn brute_mams(reference: &[u8], query: &[u8], min_len: usize) -> BTreeSet<Match> {
    let mut found = BTreeSet::new();
    for q in 0..query.len() {
        // Longest prefix of query[q..] that occurs in the reference
        let mut best = 0;
        let mut hits = Vec::new();
        for r in 0..reference.len() {
            let len = extend(reference, query, r, q);
            if len > best {
                best = len;
                hits.clear();
            }
            if len == best && len > 0 {
                hits.push(r);
            }
        }
        if best >= min_len && hits.len() == 1 && left_maximal(reference, query, hits[0], q) {
            found.insert(Match::new(hits[0], q, best));
        }
    }
    found
}

/// MAMs whose reference span is not covered by another MAM
pub fn brute_mums(reference: &[u8], query: &[u8], min_len: usize) -> BTreeSet<Match> {
    let mams: Vec<Match> = brute_mams(reference, query, min_len).into_iter().collect();
    mams.iter()
        .enumerate()
        .filter(|(i, m)| {
            !mams.iter().enumerate().any(|(j, other)| {
                *i != j
                    && other.reference <= m.reference
                    && other.reference_end() >= m.reference_end()
            })
        })
        .map(|(_, m)| *m)
        .collect()
}

/// Deterministic pseudo-random DNA
pub fn random_dna(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            b"ACGT"[(state >> 33) as usize % 4]
        })
        .collect()
}

/// Matches as a set, for order-independent comparison
pub fn as_set(matches: &[Match]) -> BTreeSet<Match> {
    matches.iter().copied().collect()
}
