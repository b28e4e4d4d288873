use structwire_core::{
    FieldHeader, InputProtocol, ListHeader, MapHeader, OutputProtocol, ProtocolError, WireType,
};
use structwire_protocol::{BinaryReader, BinaryWriter, ProtocolLimits};

#[test]
fn field_header_is_type_byte_then_big_endian_id() {
    let mut w = BinaryWriter::new();
    w.write_field_begin("message", FieldHeader::new(WireType::String, 1))
        .expect("header");
    w.write_string("hi").expect("string");
    w.write_field_end().expect("end");
    w.write_field_stop().expect("stop");

    assert_eq!(
        w.into_vec(),
        vec![11, 0, 1, 0, 0, 0, 2, b'h', b'i', 0]
    );
}

#[test]
fn integers_and_doubles_are_big_endian() {
    let mut w = BinaryWriter::new();
    w.write_i16(-2).expect("i16");
    w.write_i32(1).expect("i32");
    w.write_i64(256).expect("i64");
    w.write_double(1.0).expect("double");

    let mut expected = vec![0xff, 0xfe, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 1, 0];
    expected.extend_from_slice(&1.0f64.to_be_bytes());
    assert_eq!(w.as_slice(), expected.as_slice());
}

#[test]
fn container_headers_carry_types_and_i32_size() {
    let mut w = BinaryWriter::new();
    w.write_map_begin(MapHeader::new(WireType::String, WireType::I32, 2))
        .expect("map");
    w.write_list_begin(ListHeader::new(WireType::Bool, 3))
        .expect("list");

    assert_eq!(w.into_vec(), vec![11, 8, 0, 0, 0, 2, 2, 0, 0, 0, 3]);
}

#[test]
fn reads_back_what_was_written() {
    let mut w = BinaryWriter::new();
    w.write_field_begin("flag", FieldHeader::new(WireType::Bool, 7))
        .expect("header");
    w.write_bool(true).expect("bool");
    w.write_byte(-5).expect("byte");
    w.write_binary(&[0xde, 0xad]).expect("binary");
    w.write_set_begin(ListHeader::new(WireType::I64, 1))
        .expect("set");
    w.write_i64(i64::MIN).expect("i64");
    w.write_field_stop().expect("stop");

    let mut r = BinaryReader::new(w.into_bytes());
    assert_eq!(
        r.read_field_begin().expect("header"),
        FieldHeader::new(WireType::Bool, 7)
    );
    assert!(r.read_bool().expect("bool"));
    assert_eq!(r.read_byte().expect("byte"), -5);
    assert_eq!(r.read_binary().expect("binary"), vec![0xde, 0xad]);
    assert_eq!(
        r.read_set_begin().expect("set"),
        ListHeader::new(WireType::I64, 1)
    );
    assert_eq!(r.read_i64().expect("i64"), i64::MIN);
    assert!(r.read_field_begin().expect("stop").is_stop());
    assert_eq!(r.remaining(), 0);
}

#[test]
fn truncated_input_is_unexpected_eof() {
    let mut r = BinaryReader::from_slice(&[0, 0, 0]);
    assert_eq!(r.read_i32().expect_err("short"), ProtocolError::UnexpectedEof);

    let mut r = BinaryReader::from_slice(&[0, 0, 0, 5, b'a', b'b']);
    assert_eq!(
        r.read_string().expect_err("short string"),
        ProtocolError::UnexpectedEof
    );
}

#[test]
fn negative_sizes_are_rejected() {
    let mut r = BinaryReader::from_slice(&[0xff, 0xff, 0xff, 0xff]);
    assert_eq!(
        r.read_binary().expect_err("negative"),
        ProtocolError::NegativeSize(-1)
    );

    let mut r = BinaryReader::from_slice(&[8, 0xff, 0xff, 0xff, 0xfe]);
    assert_eq!(
        r.read_list_begin().expect_err("negative"),
        ProtocolError::NegativeSize(-2)
    );
}

#[test]
fn declared_size_beyond_input_fails_before_allocation() {
    let mut r = BinaryReader::from_slice(&[10, 0x7f, 0xff, 0xff, 0xff]);
    assert_eq!(
        r.read_list_begin().expect_err("too large"),
        ProtocolError::UnexpectedEof
    );
}

#[test]
fn limits_bound_strings_and_containers() {
    let limits = ProtocolLimits::unlimited()
        .with_string_limit(2)
        .with_container_limit(1);

    let mut r = BinaryReader::from_slice(&[0, 0, 0, 3, b'a', b'b', b'c']).with_limits(limits);
    assert_eq!(
        r.read_string().expect_err("limit"),
        ProtocolError::SizeLimit { size: 3, limit: 2 }
    );

    let mut r = BinaryReader::from_slice(&[3, 0, 0, 0, 2, 1, 2]).with_limits(limits);
    assert_eq!(
        r.read_list_begin().expect_err("limit"),
        ProtocolError::SizeLimit { size: 2, limit: 1 }
    );
}

#[test]
fn invalid_utf8_is_reported() {
    let mut r = BinaryReader::from_slice(&[0, 0, 0, 2, 0xc3, 0x28]);
    assert!(matches!(
        r.read_string().expect_err("utf8"),
        ProtocolError::InvalidUtf8(_)
    ));
}

#[test]
fn unknown_type_tag_is_invalid_type() {
    let mut r = BinaryReader::from_slice(&[5, 0, 1]);
    assert_eq!(
        r.read_field_begin().expect_err("tag"),
        ProtocolError::InvalidType(5)
    );
}

#[test]
fn bitset_packs_low_bits_into_last_byte() {
    let mut bits = vec![false; 10];
    bits[0] = true;
    bits[9] = true;

    let mut w = BinaryWriter::new();
    w.write_bitset(&bits).expect("bitset");
    assert_eq!(w.as_slice(), &[0b0000_0010, 0b0000_0001]);

    let mut r = BinaryReader::new(w.into_bytes());
    assert_eq!(r.read_bitset(10).expect("bitset"), bits);
}
