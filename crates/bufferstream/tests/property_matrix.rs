//! Property checks for positioning, byte order, strings and growth.

use bufferstream::{BufferStream, BufferStreamReadOnly, SeekOrigin};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_scalars_roundtrip(a in any::<u64>(), b in any::<i16>(), c in any::<f64>(), big_endian in any::<bool>()) {
        let mut vec = Vec::<u8>::new();
        let mut stream = BufferStream::growable(&mut vec);
        stream.set_big_endian(big_endian);
        stream.write(&a).unwrap().write(&b).unwrap().write(&c).unwrap();
        prop_assert_eq!(stream.size(), 18);
        stream.seek(0, SeekOrigin::Begin).unwrap();
        prop_assert_eq!(stream.read::<u64>().unwrap(), a);
        prop_assert_eq!(stream.read::<i16>().unwrap(), b);
        prop_assert_eq!(stream.read::<f64>().unwrap().to_bits(), c.to_bits());
    }
}

proptest! {
    #[test]
    fn prop_opposite_order_swaps_bytes(value in any::<u32>()) {
        let mut data = [0u8; 4];
        let mut stream = BufferStream::new(&mut data[..]);
        stream.set_big_endian(true).write(&value).unwrap();
        stream.seek(0, SeekOrigin::Begin).unwrap();
        prop_assert_eq!(stream.set_big_endian(false).read::<u32>().unwrap(), value.swap_bytes());
        drop(stream);
        prop_assert_eq!(data, value.to_be_bytes());
    }
}

proptest! {
    #[test]
    fn prop_seek_within_bounds(len in 0usize..64, start in 0usize..64, offset in -128i64..128) {
        let data = vec![0u8; len];
        let mut stream = BufferStreamReadOnly::new(&data[..]);
        let start = start.min(len);
        stream.seek(start as i64, SeekOrigin::Begin).unwrap();
        let target = start as i64 + offset;
        let result = stream.seek(offset, SeekOrigin::Current).map(|s| s.tell());
        if (0..=len as i64).contains(&target) {
            prop_assert_eq!(result.unwrap(), target as usize);
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(stream.tell(), start);
        }
    }
}

proptest! {
    #[test]
    fn prop_peek_and_at_do_not_move(data in proptest::collection::vec(any::<u8>(), 1..32), pos in 0usize..32) {
        let pos = pos % data.len();
        let mut stream = BufferStreamReadOnly::new(&data[..]);
        stream.seek(pos as i64, SeekOrigin::Begin).unwrap();
        prop_assert_eq!(stream.peek().unwrap(), data[pos]);
        let _ = stream.at::<u32>(0, SeekOrigin::Begin);
        let _ = stream.at_string(0, SeekOrigin::Begin);
        prop_assert_eq!(stream.tell(), pos);
    }
}

proptest! {
    #[test]
    fn prop_growth_is_power_of_two(n in 1usize..300) {
        let mut vec = Vec::<u8>::new();
        let mut stream = BufferStream::growable(&mut vec);
        for i in 0..n {
            stream.write(&(i as u8)).unwrap();
        }
        prop_assert_eq!(stream.size(), n);
        prop_assert_eq!(stream.backing().allocated_len(), n.next_power_of_two());
    }
}

proptest! {
    #[test]
    fn prop_fixed_string_field(text in "[a-z]{0,24}", max_size in 1usize..32) {
        let mut vec = Vec::<u8>::new();
        let mut stream = BufferStream::growable(&mut vec);
        stream.write_string(&text, true, max_size).unwrap();
        prop_assert_eq!(stream.tell(), max_size);
        stream.seek(0, SeekOrigin::Begin).unwrap();
        let expected = &text[..text.len().min(max_size - 1)];
        prop_assert_eq!(stream.read_string_n(max_size, true).unwrap(), expected);
    }
}
