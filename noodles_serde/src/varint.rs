//! QUIC-style variable-length integer encoding: the top two bits of the
//! first byte pick the encoded width (1, 2, 4, or 8 bytes), so small tags
//! and lengths cost a single byte.

/// Returns how many bytes it would take to encode `v` as a varint.
pub const fn varint_len(v: u64) -> usize {
    if v <= 63 {
        1
    } else if v <= 16_383 {
        2
    } else if v <= 1_073_741_823 {
        4
    } else if v <= 4_611_686_018_427_387_903 {
        8
    } else {
        // no value this large is ever produced by this codec (lengths and
        // tags fit comfortably under 2^62)
        unreachable!("varint value out of range: {v}")
    }
}

/// Returns how long the varint is, given its first byte.
pub const fn varint_parse_len(first: u8) -> usize {
    match first >> 6 {
        0 => 1,
        1 => 2,
        2 => 4,
        3 => 8,
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use crate::reader::Reader;
    use crate::writer::Writer;
    use bytes::Bytes;

    #[test]
    fn round_trips_across_all_widths() {
        for val in [0u64, 1, 63, 64, 16_383, 16_384, 1_073_741_823, 1_073_741_824] {
            let mut w = Writer::with_capacity(8);
            w.write_varint(val).unwrap();
            let bytes: Bytes = w.split().into();
            let mut r = Reader::from(bytes);
            assert_eq!(r.read_varint().unwrap(), val);
        }
    }
}
