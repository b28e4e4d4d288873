use std::sync::Arc;

use structwire::{
    Strategy, StructCodec, WireProtocol,
    core::{CodecError, DataTypeDef, ProtocolError, StructInstance, StructSchema, Value},
    protocol::{BinaryReader, BinaryWriter, ProtocolLimits, VarintReader},
    shapes::{external_data_unit, service_exception},
};

const STRATEGIES: [Strategy; 2] = [Strategy::Tagged, Strategy::Compact];
const PROTOCOLS: [WireProtocol; 2] = [WireProtocol::Binary, WireProtocol::Varint];

fn sample_schema() -> Arc<StructSchema> {
    StructSchema::builder("Sample")
        .required(1, "flag", DataTypeDef::Bool)
        .optional(2, "small", DataTypeDef::Byte)
        .optional(3, "short", DataTypeDef::I16)
        .required(4, "count", DataTypeDef::I32)
        .default_field(5, "big", DataTypeDef::I64)
        .optional(6, "ratio", DataTypeDef::Double)
        .optional(7, "label", DataTypeDef::String)
        .optional(8, "blob", DataTypeDef::Binary)
        .optional(9, "tags", DataTypeDef::set(DataTypeDef::String))
        .optional(10, "scores", DataTypeDef::list(DataTypeDef::Double))
        .optional(
            11,
            "attrs",
            DataTypeDef::map(DataTypeDef::String, DataTypeDef::list(DataTypeDef::I64)),
        )
        .optional(12, "error", DataTypeDef::Struct(service_exception()))
        .optional(
            13,
            "units",
            DataTypeDef::list(DataTypeDef::Struct(external_data_unit())),
        )
        .build()
        .expect("valid schema")
}

fn boom() -> StructInstance {
    let mut x = StructInstance::new(service_exception());
    x.set(1, "boom").expect("message");
    x.put_to_map(3, "a", "1").expect("put a");
    x.put_to_map(3, "b", "2").expect("put b");
    x
}

fn full_sample() -> StructInstance {
    let mut unit = StructInstance::new(external_data_unit());
    unit.set(1, "ncbi").expect("resource_name");
    unit.set(6, "txid9606").expect("data_id");

    let mut x = StructInstance::new(sample_schema());
    x.set(1, true).expect("flag");
    x.set(2, -3i8).expect("small");
    x.set(3, 300i16).expect("short");
    x.set(4, -70_000).expect("count");
    x.set(5, i64::MAX).expect("big");
    x.set(6, f64::NAN).expect("ratio");
    x.set(7, "héllo").expect("label");
    x.set(8, vec![0u8, 0xff, 0x10]).expect("blob");
    x.add_to_set(9, "b").expect("tag");
    x.add_to_set(9, "a").expect("tag");
    x.add_to_list(10, 0.5).expect("score");
    x.add_to_list(10, -0.0).expect("score");
    x.put_to_map(11, "primes", Value::list_of([2i64, 3, 5]))
        .expect("attrs");
    x.put_to_map(11, "none", Value::list_of(Vec::<i64>::new()))
        .expect("attrs");
    x.set(12, boom()).expect("error");
    x.add_to_list(13, unit).expect("unit");
    x
}

#[test]
fn every_strategy_and_protocol_round_trips_a_full_instance() {
    let schema = sample_schema();
    let x = full_sample();
    for strategy in STRATEGIES {
        let codec = StructCodec::new(strategy);
        for protocol in PROTOCOLS {
            let bytes = codec.encode_to_vec(&x, protocol).expect("encode");
            let y = codec
                .decode_from_slice(&schema, &bytes, protocol)
                .expect("decode");
            assert_eq!(x, y, "{strategy:?} over {protocol:?}");
            assert_eq!(x.to_string(), y.to_string());
        }
    }
}

#[test]
fn unset_optional_fields_stay_unset_after_decode() {
    let schema = sample_schema();
    let mut x = StructInstance::new(Arc::clone(&schema));
    x.set(1, false).expect("flag");
    x.set(4, 0).expect("count");

    for strategy in STRATEGIES {
        let codec = StructCodec::new(strategy);
        for protocol in PROTOCOLS {
            let bytes = codec.encode_to_vec(&x, protocol).expect("encode");
            let y = codec
                .decode_from_slice(&schema, &bytes, protocol)
                .expect("decode");
            assert!(y.is_set(1) && y.is_set(4));
            assert!((2..=13).filter(|id| *id != 4).all(|id| !y.is_set(id)));
        }
    }
}

#[test]
fn tagged_binary_layout_of_service_exception() {
    let codec = StructCodec::new(Strategy::Tagged);
    let bytes = codec
        .encode_to_vec(&boom(), WireProtocol::Binary)
        .expect("encode");

    let mut expected = vec![11, 0, 1, 0, 0, 0, 4];
    expected.extend_from_slice(b"boom");
    expected.extend_from_slice(&[13, 0, 3, 11, 11, 0, 0, 0, 2]);
    expected.extend_from_slice(&[0, 0, 0, 1, b'a', 0, 0, 0, 1, b'1']);
    expected.extend_from_slice(&[0, 0, 0, 1, b'b', 0, 0, 0, 1, b'2']);
    expected.push(0);
    assert_eq!(bytes, expected);

    let y = codec
        .decode_from_slice(&service_exception(), &bytes, WireProtocol::Binary)
        .expect("decode");
    assert_eq!(y.get(1), Some(&Value::from("boom")));
    assert!(!y.is_set(2));
    assert_eq!(
        y.get(3),
        Some(&Value::map_of([("a", "1"), ("b", "2")]))
    );
    assert_eq!(
        y.to_string(),
        "ServiceException(message:boom, inputs:{a=1, b=2})"
    );
}

#[test]
fn compact_layout_is_positional_with_presence_bits() {
    let codec = StructCodec::new(Strategy::Compact);

    let bytes = codec
        .encode_to_vec(&boom(), WireProtocol::Binary)
        .expect("encode");
    let mut expected = vec![0, 0, 0, 4];
    expected.extend_from_slice(b"boom");
    // stacktrace absent (bit 0), inputs present (bit 1)
    expected.push(0b10);
    expected.extend_from_slice(&[0, 0, 0, 2]);
    expected.extend_from_slice(&[0, 0, 0, 1, b'a', 0, 0, 0, 1, b'1']);
    expected.extend_from_slice(&[0, 0, 0, 1, b'b', 0, 0, 0, 1, b'2']);
    assert_eq!(bytes, expected);

    let bytes = codec
        .encode_to_vec(&boom(), WireProtocol::Varint)
        .expect("encode");
    let mut expected = vec![4];
    expected.extend_from_slice(b"boom");
    expected.extend_from_slice(&[0b10, 4, 1, b'a', 1, b'1', 1, b'b', 1, b'2']);
    assert_eq!(bytes, expected);
}

#[test]
fn unknown_fields_are_skipped() {
    let evolved = StructSchema::builder("ServiceException")
        .required(1, "message", DataTypeDef::String)
        .optional(2, "stacktrace", DataTypeDef::String)
        .optional(
            3,
            "inputs",
            DataTypeDef::map(DataTypeDef::String, DataTypeDef::String),
        )
        .optional(4, "codes", DataTypeDef::list(DataTypeDef::set(DataTypeDef::I32)))
        .optional(5, "origin", DataTypeDef::Struct(external_data_unit()))
        .optional(6, "retry", DataTypeDef::Bool)
        .build()
        .expect("evolved schema");

    let mut origin = StructInstance::new(external_data_unit());
    origin.set(2, "https://example.org").expect("url");

    let mut newer = StructInstance::new(evolved);
    newer.set(1, "boom").expect("message");
    newer.put_to_map(3, "a", "1").expect("put");
    newer
        .add_to_list(4, Value::set_of([1, 2, 3]))
        .expect("codes");
    newer.set(5, origin).expect("origin");
    newer.set(6, true).expect("retry");

    let mut older = StructInstance::new(service_exception());
    older.set(1, "boom").expect("message");
    older.put_to_map(3, "a", "1").expect("put");

    let codec = StructCodec::new(Strategy::Tagged);
    for protocol in PROTOCOLS {
        let bytes = codec.encode_to_vec(&newer, protocol).expect("encode");
        let decoded = codec
            .decode_from_slice(&service_exception(), &bytes, protocol)
            .expect("decode");
        assert_eq!(decoded, older, "{protocol:?}");
    }
}

#[test]
fn known_field_with_other_wire_type_is_skipped() {
    let writer = StructSchema::builder("ServiceException")
        .required(1, "message", DataTypeDef::String)
        .optional(2, "stacktrace", DataTypeDef::I32)
        .build()
        .expect("writer schema");
    let mut x = StructInstance::new(writer);
    x.set(1, "boom").expect("message");
    x.set(2, 42).expect("stacktrace");

    let codec = StructCodec::new(Strategy::Tagged);
    for protocol in PROTOCOLS {
        let bytes = codec.encode_to_vec(&x, protocol).expect("encode");
        let y = codec
            .decode_from_slice(&service_exception(), &bytes, protocol)
            .expect("decode");
        assert_eq!(y.get(1), Some(&Value::from("boom")));
        assert!(!y.is_set(2));
    }
}

#[test]
fn container_with_other_element_types_is_dropped() {
    let writer = StructSchema::builder("ServiceException")
        .required(1, "message", DataTypeDef::String)
        .optional(3, "inputs", DataTypeDef::map(DataTypeDef::String, DataTypeDef::I32))
        .optional(2, "stacktrace", DataTypeDef::String)
        .build()
        .expect("writer schema");
    let mut x = StructInstance::new(writer);
    x.set(1, "boom").expect("message");
    x.put_to_map(3, "a", 1).expect("put");
    x.set(2, "trace").expect("stacktrace");

    let codec = StructCodec::new(Strategy::Tagged);
    for protocol in PROTOCOLS {
        let bytes = codec.encode_to_vec(&x, protocol).expect("encode");
        let y = codec
            .decode_from_slice(&service_exception(), &bytes, protocol)
            .expect("decode");
        assert!(!y.is_set(3));
        assert_eq!(y.get(2), Some(&Value::from("trace")));
    }
}

#[test]
fn empty_container_decodes_regardless_of_header_types() {
    let mut x = StructInstance::new(service_exception());
    x.set(1, "boom").expect("message");
    x.set(3, Value::map_of(Vec::<(&str, &str)>::new()))
        .expect("inputs");

    let codec = StructCodec::new(Strategy::Tagged);
    for protocol in PROTOCOLS {
        let bytes = codec.encode_to_vec(&x, protocol).expect("encode");
        let y = codec
            .decode_from_slice(&service_exception(), &bytes, protocol)
            .expect("decode");
        assert_eq!(y, x, "{protocol:?}");
    }
}

#[test]
fn encode_rejects_missing_required_field() {
    let mut x = StructInstance::new(service_exception());
    x.set(2, "trace").expect("stacktrace");

    for strategy in STRATEGIES {
        let codec = StructCodec::new(strategy);
        let mut out = BinaryWriter::new();
        let err = codec.encode(&x, &mut out).expect_err("missing message");
        assert_eq!(
            err.to_string(),
            "Required field 'message' was not present! Struct: ServiceException(message:null, stacktrace:trace)"
        );
        assert!(out.is_empty());
    }
}

#[test]
fn encode_rejects_missing_required_field_in_nested_struct() {
    let mut x = StructInstance::new(sample_schema());
    x.set(1, true).expect("flag");
    x.set(4, 1).expect("count");
    x.set(12, StructInstance::new(service_exception()))
        .expect("error");

    let codec = StructCodec::new(Strategy::Tagged);
    let err = codec
        .encode_to_vec(&x, WireProtocol::Binary)
        .expect_err("nested message missing");
    assert!(matches!(
        err,
        CodecError::Validation { ref struct_name, ref field, .. }
            if struct_name == "ServiceException" && field == "message"
    ));
}

#[test]
fn tagged_decode_rejects_missing_required_field() {
    let codec = StructCodec::new(Strategy::Tagged);
    // stacktrace only, then stop
    let mut bytes = vec![11, 0, 2, 0, 0, 0, 1, b't'];
    bytes.push(0);

    let err = codec
        .decode_from_slice(&service_exception(), &bytes, WireProtocol::Binary)
        .expect_err("missing message");
    assert!(matches!(
        err,
        CodecError::Validation { ref field, ref rendered, .. }
            if field == "message" && rendered == "ServiceException(message:null, stacktrace:t)"
    ));
}

#[test]
fn truncated_input_fails_with_protocol_error() {
    for strategy in STRATEGIES {
        let codec = StructCodec::new(strategy);
        for protocol in PROTOCOLS {
            let bytes = codec.encode_to_vec(&boom(), protocol).expect("encode");
            let err = codec
                .decode_from_slice(&service_exception(), &bytes[..bytes.len() - 1], protocol)
                .expect_err("truncated");
            assert_eq!(err, CodecError::Protocol(ProtocolError::UnexpectedEof));
        }
    }
}

#[test]
fn trailing_bytes_are_left_unread() {
    let codec = StructCodec::new(Strategy::Tagged);
    let first = codec
        .encode_to_vec(&boom(), WireProtocol::Binary)
        .expect("encode");
    let mut stream = first.clone();
    stream.extend_from_slice(&first);

    let mut input = BinaryReader::from_slice(&stream);
    let a = codec.decode(&service_exception(), &mut input).expect("first");
    assert_eq!(input.remaining(), first.len());
    let b = codec.decode(&service_exception(), &mut input).expect("second");
    assert_eq!(a, b);
    assert_eq!(input.remaining(), 0);
}

#[test]
fn nested_struct_beyond_max_depth_is_rejected() {
    let x = full_sample();
    let bytes = StructCodec::new(Strategy::Tagged)
        .encode_to_vec(&x, WireProtocol::Binary)
        .expect("encode");

    let shallow = StructCodec::builder().with_max_depth(1).build();
    let err = shallow
        .decode_from_slice(&sample_schema(), &bytes, WireProtocol::Binary)
        .expect_err("too deep");
    assert_eq!(err, CodecError::Protocol(ProtocolError::DepthLimit(1)));
}

#[test]
fn skipping_deeply_nested_unknown_field_is_bounded() {
    let writer = StructSchema::builder("ServiceException")
        .required(1, "message", DataTypeDef::String)
        .optional(
            9,
            "grid",
            DataTypeDef::list(DataTypeDef::list(DataTypeDef::list(DataTypeDef::I32))),
        )
        .build()
        .expect("writer schema");
    let mut x = StructInstance::new(writer);
    x.set(1, "boom").expect("message");
    x.add_to_list(9, Value::list_of([Value::list_of([1])]))
        .expect("grid");

    let bytes = StructCodec::new(Strategy::Tagged)
        .encode_to_vec(&x, WireProtocol::Varint)
        .expect("encode");

    let codec = StructCodec::builder().with_max_depth(2).build();
    let err = codec
        .decode_from_slice(&service_exception(), &bytes, WireProtocol::Varint)
        .expect_err("too deep");
    assert_eq!(err, CodecError::Protocol(ProtocolError::DepthLimit(2)));

    let codec = StructCodec::builder().with_max_depth(4).build();
    let y = codec
        .decode_from_slice(&service_exception(), &bytes, WireProtocol::Varint)
        .expect("decode");
    assert_eq!(y.get(1), Some(&Value::from("boom")));
}

#[test]
fn compact_counts_respect_container_limit() {
    let codec = StructCodec::builder()
        .with_strategy(Strategy::Compact)
        .with_limits(ProtocolLimits::unlimited().with_container_limit(1))
        .build();
    let bytes = codec
        .encode_to_vec(&boom(), WireProtocol::Binary)
        .expect("encode");

    let err = codec
        .decode_from_slice(&service_exception(), &bytes, WireProtocol::Binary)
        .expect_err("limit");
    assert_eq!(
        err,
        CodecError::Protocol(ProtocolError::SizeLimit { size: 2, limit: 1 })
    );
}

#[test]
fn compact_negative_count_is_rejected() {
    let mut bytes = vec![0, 0, 0, 1, b'm', 0b10];
    bytes.extend_from_slice(&(-1i32).to_be_bytes());

    let err = StructCodec::new(Strategy::Compact)
        .decode_from_slice(&service_exception(), &bytes, WireProtocol::Binary)
        .expect_err("negative");
    assert_eq!(err, CodecError::Protocol(ProtocolError::NegativeSize(-1)));
}

#[test]
fn compact_count_is_bounded_by_remaining_input() {
    let empty = StructSchema::builder("Empty").build().expect("empty");
    let holder = StructSchema::builder("Holder")
        .required(1, "items", DataTypeDef::list(DataTypeDef::Struct(empty)))
        .build()
        .expect("holder");
    let codec = StructCodec::new(Strategy::Compact);

    // zero-width elements: a bare count header cannot stand for millions of them
    let err = codec
        .decode_from_slice(&holder, &20_000_000i32.to_be_bytes(), WireProtocol::Binary)
        .expect_err("oversized count");
    assert_eq!(err, CodecError::Protocol(ProtocolError::UnexpectedEof));

    let mut bytes = 2i32.to_be_bytes().to_vec();
    bytes.extend_from_slice(&[0xaa, 0xbb]);
    let x = codec
        .decode_from_slice(&holder, &bytes, WireProtocol::Binary)
        .expect("bounded count");
    assert_eq!(x.get(1).map(|v| v.try_list().map(|items| items.len())), Some(Ok(2)));

    let longs = StructSchema::builder("Longs")
        .required(1, "values", DataTypeDef::list(DataTypeDef::I64))
        .build()
        .expect("longs");
    let err = codec
        .decode_from_slice(&longs, &1_000_000i32.to_be_bytes(), WireProtocol::Binary)
        .expect_err("oversized count");
    assert_eq!(err, CodecError::Protocol(ProtocolError::UnexpectedEof));
}

#[test]
fn varint_reader_accepts_streamed_decode() {
    let codec = StructCodec::new(Strategy::Tagged);
    let x = full_sample();
    let bytes = codec.encode_to_vec(&x, WireProtocol::Varint).expect("encode");

    let mut input = VarintReader::new(bytes);
    let y = codec.decode(&sample_schema(), &mut input).expect("decode");
    assert_eq!(x, y);
    assert_eq!(input.remaining(), 0);
}

#[test]
fn default_codec_is_tagged_with_depth_64() {
    let codec = StructCodec::default();
    assert_eq!(codec.strategy(), Strategy::Tagged);
    assert_eq!(codec.max_depth(), structwire::DEFAULT_MAX_DEPTH);
    assert_eq!(codec.max_depth(), 64);
}
