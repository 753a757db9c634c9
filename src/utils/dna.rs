//! Nucleotide helpers for query sequences

/// Placeholder for characters masked out of a query. It never occurs in a
/// reference, so it never matches.
pub const MASK_CHAR: u8 = b'~';

/// True for A, C, G and T in either case
#[inline]
pub fn is_nucleotide(c: u8) -> bool {
    matches!(c, b'A' | b'C' | b'G' | b'T' | b'a' | b'c' | b'g' | b't')
}

/// Replace every non-ACGT character with [`MASK_CHAR`]
pub fn mask_non_nucleotides(seq: &mut [u8]) {
    for c in seq.iter_mut() {
        if !is_nucleotide(*c) {
            *c = MASK_CHAR;
        }
    }
}

/// Complement of one base, preserving case; anything else is unchanged
#[inline]
pub fn complement(c: u8) -> u8 {
    match c {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'a' => b't',
        b't' => b'a',
        b'c' => b'g',
        b'g' => b'c',
        other => other,
    }
}

/// Reverse complement in place
pub fn reverse_complement(seq: &mut [u8]) {
    seq.reverse();
    for c in seq.iter_mut() {
        *c = complement(*c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_complement() {
        let mut seq = b"AACGTn".to_vec();
        reverse_complement(&mut seq);
        assert_eq!(seq, b"nACGTT");

        let mut seq = b"acgT".to_vec();
        reverse_complement(&mut seq);
        assert_eq!(seq, b"Acgt");
    }

    #[test]
    fn test_mask() {
        let mut seq = b"ACNGTRa".to_vec();
        mask_non_nucleotides(&mut seq);
        assert_eq!(seq, b"AC~GT~a");
    }
}
