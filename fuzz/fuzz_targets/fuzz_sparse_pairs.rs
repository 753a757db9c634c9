#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    count: u64,
    data: Vec<u8>,
}

fuzz_target!(|input: Input| {
    // Truncated or overflowing varints must be rejected, not panic
    let _ = sparsemem::utils::decode_sparse_pairs(&input.data, input.count as usize);
});
