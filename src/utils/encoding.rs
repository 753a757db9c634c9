/// Encode a u64 as a variable-length integer
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        if value < 0x80 {
            buf.push(value as u8);
            break;
        }
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
}

/// Decode a variable-length integer from a slice
/// Returns (value, bytes_consumed)
pub fn decode_varint(buf: &[u8]) -> Option<(u64, usize)> {
    let mut result: u64 = 0;
    let mut shift = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if shift >= 64 {
            return None; // Overflow
        }

        result |= ((byte & 0x7F) as u64) << shift;

        if byte & 0x80 == 0 {
            return Some((result, i + 1));
        }

        shift += 7;
    }

    None // Incomplete
}

/// Encode (index, value) pairs sorted by index: index deltas and values as
/// varints
pub fn encode_sparse_pairs(pairs: &[(usize, usize)], buf: &mut Vec<u8>) {
    let mut prev = 0usize;
    for &(index, value) in pairs {
        encode_varint((index - prev) as u64, buf);
        encode_varint(value as u64, buf);
        prev = index;
    }
}

/// Decode exactly `count` pairs written by [`encode_sparse_pairs`].
/// Returns `None` on truncated or overflowing input.
pub fn decode_sparse_pairs(buf: &[u8], count: usize) -> Option<Vec<(usize, usize)>> {
    // Every pair takes at least two bytes
    let mut pairs = Vec::with_capacity(count.min(buf.len() / 2));
    let mut pos = 0;
    let mut index = 0usize;

    for _ in 0..count {
        let (delta, consumed) = decode_varint(buf.get(pos..)?)?;
        pos += consumed;
        let (value, consumed) = decode_varint(buf.get(pos..)?)?;
        pos += consumed;

        index = index.checked_add(usize::try_from(delta).ok()?)?;
        pairs.push((index, usize::try_from(value).ok()?));
    }

    Some(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_roundtrip() {
        let values = [0, 1, 127, 128, 16383, 16384, u32::MAX as u64, u64::MAX];
        for value in values {
            let mut buf = Vec::new();
            encode_varint(value, &mut buf);
            let (decoded, consumed) = decode_varint(&buf).unwrap();
            assert_eq!(value, decoded);
            assert_eq!(consumed, buf.len());
        }
    }

    #[test]
    fn test_varint_incomplete() {
        assert_eq!(decode_varint(&[0x80, 0x80]), None);
        assert_eq!(decode_varint(&[]), None);
    }

    #[test]
    fn test_sparse_pairs() {
        let pairs = vec![(3, 254), (4, 70_000), (1000, 300)];
        let mut buf = Vec::new();
        encode_sparse_pairs(&pairs, &mut buf);

        assert_eq!(decode_sparse_pairs(&buf, 3), Some(pairs));
        // Truncated
        assert_eq!(decode_sparse_pairs(&buf[..buf.len() - 1], 3), None);
    }

    #[test]
    fn test_sparse_pairs_huge_count() {
        let mut buf = Vec::new();
        encode_sparse_pairs(&[(7, 300)], &mut buf);
        assert_eq!(decode_sparse_pairs(&buf, usize::MAX / 4), None);
        assert_eq!(decode_sparse_pairs(&buf, usize::MAX), None);
    }
}
