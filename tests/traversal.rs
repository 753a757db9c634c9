mod common;

use common::{Tables, as_set, brute_mams, brute_mems, brute_mums, build_index, random_dna};
use proptest::prelude::*;
use sparsemem::index::SparseSuffixArray;
use sparsemem::output::MatchOutput;
use sparsemem::search::{Interval, MatchConfig, Matcher};

/// Ranks whose suffix starts with `pattern`, by linear scan
fn naive_interval(index: &SparseSuffixArray<u32>, pattern: &[u8]) -> Option<(usize, usize)> {
    let ranks: Vec<usize> = (0..index.suffix_count())
        .filter(|&rank| index.reference()[index.sa_at(rank)..].starts_with(pattern))
        .collect();
    Some((*ranks.first()?, *ranks.last()?))
}

#[test]
fn test_search_and_count() {
    let index = build_index::<u32>(b"ACGTACGTAA", 1, Tables::ALL);

    assert_eq!(index.count(b"ACGT"), 2);
    assert_eq!(index.occurrences(b"ACGT"), vec![0, 4]);
    assert_eq!(index.occurrences(b"TAA"), vec![7]);
    assert_eq!(index.count(b"GG"), 0);
    assert!(index.search(b"ACGTT").is_none());

    let interval = index.search(b"A").unwrap();
    assert_eq!(interval.depth, 1);
    assert_eq!(interval.size(), 4);
    // Empty pattern matches everything
    assert_eq!(index.count(b""), index.suffix_count());
}

#[test]
fn test_sparse_occurrences_are_sampled() {
    let index = build_index::<u32>(b"ACGTACGTACGT", 2, Tables::ALL);
    // ACG starts at 0, 4 and 8, all even
    assert_eq!(index.occurrences(b"ACG"), vec![0, 4, 8]);
    // CGT starts at odd positions only
    assert_eq!(index.count(b"CGT"), 0);
}

#[test]
fn test_top_down_failure_keeps_bounds() {
    let index = build_index::<u32>(b"ACGTACGTAA", 1, Tables::ALL);
    let (mut start, mut end) = (0, index.last_rank());
    assert!(!index.top_down(b'N', 0, &mut start, &mut end));
    assert!(!index.top_down_faster(b'N', 0, &mut start, &mut end));
    assert_eq!((start, end), (0, index.last_rank()));
}

#[test]
fn test_top_down_child_failure_is_transactional() {
    let index = build_index::<u32>(&random_dna(200, 17), 1, Tables::ALL);
    let mut cur = Interval::root(index.last_rank());
    assert!(index.top_down_child(b'C', &mut cur));
    assert_eq!(Some((cur.start, cur.end)), naive_interval(&index, b"C"));

    let before = Interval::root(index.last_rank());
    let mut cur = before;
    assert!(!index.top_down_child(b'N', &mut cur));
    assert_eq!(cur, before);
}

#[test]
fn test_suffix_link() {
    let reference = random_dna(300, 23);
    let pattern = &reference[100..130];

    for k in [1, 2, 3] {
        let index = build_index::<u32>(&reference, k, Tables::ALL);
        // Longest pattern prefix whose interval exists at a sampled suffix
        let found = (0..k).find_map(|shift| {
            let interval = index.search(&pattern[shift..])?;
            Some((shift, interval))
        });
        let Some((shift, interval)) = found else {
            continue;
        };

        let mut linked = interval;
        assert!(index.suffix_link(&mut linked), "K={k}");
        assert_eq!(linked.depth, interval.depth - k);
        let expected = naive_interval(&index, &pattern[shift + k..]).unwrap();
        assert_eq!((linked.start, linked.end), expected, "K={k}");
    }
}

#[test]
fn test_suffix_link_gives_up_at_shallow_depth() {
    let index = build_index::<u32>(b"ACGTACGTAA", 2, Tables::ALL);
    let mut cur = Interval::new(2, 0, 1);
    let before = cur;
    assert!(!index.suffix_link(&mut cur));
    assert_eq!(cur, before);

    let bare = build_index::<u32>(b"ACGTACGTAA", 1, Tables::BARE);
    let mut cur = bare.search(b"ACGT").unwrap();
    assert!(!bare.suffix_link(&mut cur));
}

#[test]
fn test_suffix_link_gives_up_on_wide_expansion() {
    // A thousand A's: every A-suffix shares a prefix of length 1
    let mut reference = vec![b'A'; 1000];
    reference.push(b'C');
    let index = build_index::<u32>(&reference, 1, Tables::ALL);

    let deep = index.search(&reference[..1000]).unwrap();
    assert!(deep.is_singleton());

    // Depth 1000 links to the two suffixes holding 999 A's
    let mut linked = deep;
    assert!(index.suffix_link(&mut linked));
    assert_eq!(linked.depth, 999);
    let expected = naive_interval(&index, &reference[..999]).unwrap();
    assert_eq!((linked.start, linked.end), expected);

    // Depth 2 would widen across all thousand A-suffixes
    let mut shallow = Interval::new(2, deep.start, deep.end);
    let before = shallow;
    assert!(!index.suffix_link(&mut shallow));
    assert_eq!(shallow, before);

    let mut link = Interval::new(1, deep.start + 1, deep.start + 1);
    let before = link;
    assert!(!index.expand_link(&mut link));
    assert_eq!(link, before);

    // Finders restart from the root and still find everything
    let mut query = vec![b'A'; 30];
    query.push(b'C');
    query.extend_from_slice(b"AAGAAAAAAAAAAAAACAAT");
    let matcher = Matcher::new(&index, MatchConfig::default()).unwrap();
    for min_len in [2, 5, 20] {
        let mem = matcher.mem(&query, min_len, MatchOutput::Collect, 1).unwrap();
        assert_eq!(as_set(&mem.matches), brute_mems(index.reference(), &query, min_len));
        let mam = matcher.mam(&query, min_len, MatchOutput::Collect).unwrap();
        assert_eq!(as_set(&mam.matches), brute_mams(index.reference(), &query, min_len));
        let mum = matcher.mum(&query, min_len, MatchOutput::Collect).unwrap();
        assert_eq!(as_set(&mum.matches), brute_mums(index.reference(), &query, min_len));
    }

    let sparse = build_index::<u32>(&reference, 2, Tables::ALL);
    let matcher = Matcher::new(&sparse, MatchConfig::default()).unwrap();
    for min_len in [5, 20] {
        let mem = matcher.mem(&query, min_len, MatchOutput::Collect, 1).unwrap();
        assert_eq!(as_set(&mem.matches), brute_mems(sparse.reference(), &query, min_len));
    }
}

#[test]
fn test_verify_naive_index() {
    for k in 1..=4 {
        let index = build_index::<u64>(&random_dna(257, k as u64), k, Tables::ALL);
        index.verify().unwrap();
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_top_down_variants_agree(
        reference in "[ACGT]{1,80}",
        prefix in "[ACGT]{0,3}",
        c in prop::sample::select(b"$ACGTN".to_vec()),
        k in 1usize..4,
    ) {
        let index = build_index::<u32>(reference.as_bytes(), k, Tables::ALL);
        if let Some(interval) = index.search(prefix.as_bytes()) {
            let (mut s1, mut e1) = (interval.start, interval.end);
            let (mut s2, mut e2) = (interval.start, interval.end);
            let plain = index.top_down(c, interval.depth, &mut s1, &mut e1);
            let faster = index.top_down_faster(c, interval.depth, &mut s2, &mut e2);
            prop_assert_eq!(plain, faster);
            prop_assert_eq!((s1, e1), (s2, e2));

            let mut pattern = prefix.into_bytes();
            pattern.push(c);
            prop_assert_eq!(plain.then_some((s1, e1)), naive_interval(&index, &pattern));
        }
    }

    #[test]
    fn prop_traverse_variants_agree(
        reference in "[ACGT]{1,120}",
        pattern in "[ACGT]{1,40}",
        start_at in 0usize..40,
        seed_len in 0usize..4,
        min_len in 1usize..50,
        k in 1usize..4,
    ) {
        let index = build_index::<u32>(reference.as_bytes(), k, Tables::ALL);
        let pattern = pattern.as_bytes();
        let prefix = start_at.min(pattern.len() - 1);
        let seed_end = (prefix + seed_len).min(pattern.len());

        let Some(seed) = index.search(&pattern[prefix..seed_end]) else {
            return Ok(());
        };
        let mut plain = seed;
        let mut faster = seed;
        index.traverse(pattern, prefix, &mut plain, min_len);
        index.traverse_faster(pattern, prefix, &mut faster, min_len);
        prop_assert_eq!(plain, faster);

        // The result is exactly the interval of the matched prefix
        let matched = &pattern[prefix..prefix + plain.depth];
        prop_assert_eq!(Some((plain.start, plain.end)), naive_interval(&index, matched));
    }
}
