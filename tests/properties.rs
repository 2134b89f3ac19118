//! Property tests for packing and bit-level access.

use proptest::prelude::*;
use structwire::{
    BitBuffer, CodecConfig, Endianness, Size, bits::low_mask, pack_to_vec, record, size_of,
    unpack_from_slice,
};

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Point {
        #[wire]
        x: i16,
        #[wire]
        y: i16,
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Telemetry {
        #[wire(index = 0, limit = 8)]
        station: String,
        #[wire(index = 1, skip = 1)]
        active: bool,
        #[wire(index = 2)]
        level: i8,
        #[wire(index = 3)]
        code: u16,
        #[wire(index = 4)]
        temp: i16,
        #[wire(index = 5)]
        count: i32,
        #[wire(index = 6)]
        stamp: i64,
        #[wire(index = 7)]
        ratio: f32,
        #[wire(index = 8)]
        total: f64,
        #[wire(index = 9, skip = 3)]
        samples: Vec<i32>,
        #[wire(index = 10)]
        origin: Point,
    }
}

record! {
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Message {
        #[wire]
        header: i32,
        #[wire]
        body: String,
        #[wire]
        trailer: Vec<u8>,
    }
}

fn telemetry() -> impl Strategy<Value = Telemetry> {
    (
        "[a-z0-9]{0,8}",
        any::<bool>(),
        any::<i8>(),
        any::<u16>(),
        any::<i16>(),
        any::<i32>(),
        any::<i64>(),
        -1.0e6f32..1.0e6f32,
        -1.0e12f64..1.0e12f64,
        prop::collection::vec(any::<i32>(), 0..16),
        (any::<i16>(), any::<i16>()),
    )
        .prop_map(
            |(station, active, level, code, temp, count, stamp, ratio, total, samples, (x, y))| {
                Telemetry {
                    station,
                    active,
                    level,
                    code,
                    temp,
                    count,
                    stamp,
                    ratio,
                    total,
                    samples,
                    origin: Point { x, y },
                }
            },
        )
}

fn config() -> impl Strategy<Value = CodecConfig> {
    prop_oneof![Just(Endianness::Big), Just(Endianness::Little)].prop_map(CodecConfig::new)
}

proptest! {
    #[test]
    fn telemetry_round_trips(value in telemetry(), config in config()) {
        let bytes = pack_to_vec(&value, &config).unwrap();

        let mut decoded = Telemetry {
            samples: vec![0; value.samples.len()],
            ..Default::default()
        };
        let consumed = unpack_from_slice(&mut decoded, &bytes, &config).unwrap();

        prop_assert_eq!(consumed, bytes.len());
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn size_matches_packed_length(value in telemetry()) {
        let bytes = pack_to_vec(&value, &CodecConfig::default()).unwrap();
        prop_assert_eq!(size_of(&value).unwrap(), Size::Fixed(bytes.len()));
        prop_assert_eq!(bytes.len(), 8 + 1 + 1 + 1 + 2 + 2 + 4 + 8 + 4 + 8 + 3 + 4 * value.samples.len() + 4);
    }

    #[test]
    fn terminated_string_round_trips(
        header in any::<i32>(),
        body in "\\PC{0,24}",
        trailer in prop::collection::vec(any::<u8>(), 0..8),
    ) {
        let value = Message { header, body, trailer };
        prop_assert_eq!(size_of(&value).unwrap(), Size::Dynamic);

        let bytes = pack_to_vec(&value, &CodecConfig::default()).unwrap();
        prop_assert_eq!(bytes.len(), 4 + value.body.len() + 1 + value.trailer.len());

        let mut decoded = Message {
            trailer: vec![0; value.trailer.len()],
            ..Default::default()
        };
        unpack_from_slice(&mut decoded, &bytes, &CodecConfig::default()).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn bit_fields_round_trip(fields in prop::collection::vec((0usize..=64, any::<u64>()), 0..32)) {
        let total: usize = fields.iter().map(|(n, _)| n).sum();
        let mut buffer = BitBuffer::new(vec![0u8; total.div_ceil(8)]);

        for &(n, value) in &fields {
            buffer.put_bits(n, value).unwrap();
        }
        prop_assert_eq!(buffer.position_bits(), total);

        buffer.set_position(0, 0).unwrap();
        for &(n, value) in &fields {
            prop_assert_eq!(buffer.get_bits(n).unwrap(), value & low_mask(n));
        }
    }

    #[test]
    fn seek_matches_sequential_reads(
        bytes in prop::collection::vec(any::<u8>(), 1..32),
        offset in 0usize..32,
    ) {
        let offset = offset % bytes.len();
        let mut buffer = BitBuffer::new(bytes.as_slice());
        buffer.set_position(offset, 0).unwrap();

        let mut rest = vec![0u8; bytes.len() - offset];
        buffer.get_into(&mut rest).unwrap();
        prop_assert_eq!(rest.as_slice(), &bytes[offset..]);
    }
}
