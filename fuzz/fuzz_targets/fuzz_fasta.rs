#![no_main]

use libfuzzer_sys::fuzz_target;
use sparsemem::utils::{MASK_CHAR, is_nucleotide};

fuzz_target!(|data: &[u8]| {
    // Any byte soup must parse without panicking
    for record in sparsemem::query::parse_fasta(data, true) {
        assert!(!record.name.is_empty());
        assert!(record.seq.iter().all(|&c| is_nucleotide(c) || c == MASK_CHAR));
    }
});
