use proptest::prelude::*;
use structwire::{
    Strategy as CodecStrategy, StructCodec, WireProtocol,
    shapes::{ServiceException, service_exception},
};

fn service_exceptions() -> impl Strategy<Value = ServiceException> {
    (
        ".*",
        proptest::option::of(".*"),
        proptest::collection::btree_map(".{0,8}", ".*", 0..6),
    )
        .prop_map(|(message, stacktrace, inputs)| {
            let mut x = ServiceException::new(message);
            if let Some(trace) = stacktrace {
                x = x.with_stacktrace(trace);
            }
            for (k, v) in inputs {
                x = x.with_input(k, v);
            }
            x
        })
}

proptest! {
    #[test]
    fn decode_inverts_encode(x in service_exceptions()) {
        let instance = x.to_instance().expect("instance");
        for strategy in [CodecStrategy::Tagged, CodecStrategy::Compact] {
            let codec = StructCodec::new(strategy);
            for protocol in [WireProtocol::Binary, WireProtocol::Varint] {
                let bytes = codec.encode_to_vec(&instance, protocol).expect("encode");
                let decoded = codec
                    .decode_from_slice(&service_exception(), &bytes, protocol)
                    .expect("decode");
                prop_assert_eq!(&decoded, &instance);
            }
        }
    }
}
