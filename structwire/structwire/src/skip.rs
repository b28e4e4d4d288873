//! Type-directed skipping of values the schema does not accept.

use structwire_core::{InputProtocol, ProtocolError, WireType};

use crate::codec::Depth;

/// Consume one value of `wire_type` without materializing it.
///
/// Containers and structs recurse; every level counts against `depth`.
pub(crate) fn skip<P>(input: &mut P, wire_type: WireType, depth: Depth) -> Result<(), ProtocolError>
where
    P: InputProtocol + ?Sized,
{
    match wire_type {
        WireType::Bool => {
            input.read_bool()?;
        }
        WireType::Byte => {
            input.read_byte()?;
        }
        WireType::I16 => {
            input.read_i16()?;
        }
        WireType::I32 => {
            input.read_i32()?;
        }
        WireType::I64 => {
            input.read_i64()?;
        }
        WireType::Double => {
            input.read_double()?;
        }
        // binary may not be valid UTF-8
        WireType::String => {
            input.read_binary()?;
        }
        WireType::Struct => {
            let depth = depth.descend()?;
            input.read_struct_begin()?;
            loop {
                let header = input.read_field_begin()?;
                if header.is_stop() {
                    break;
                }
                skip(input, header.wire_type, depth)?;
                input.read_field_end()?;
            }
            input.read_struct_end()?;
        }
        WireType::Map => {
            let depth = depth.descend()?;
            let header = input.read_map_begin()?;
            for _ in 0..header.size {
                skip(input, header.key_type, depth)?;
                skip(input, header.value_type, depth)?;
            }
            input.read_map_end()?;
        }
        WireType::Set => {
            let depth = depth.descend()?;
            let header = input.read_set_begin()?;
            for _ in 0..header.size {
                skip(input, header.element_type, depth)?;
            }
            input.read_set_end()?;
        }
        WireType::List => {
            let depth = depth.descend()?;
            let header = input.read_list_begin()?;
            for _ in 0..header.size {
                skip(input, header.element_type, depth)?;
            }
            input.read_list_end()?;
        }
        WireType::Stop | WireType::Void => {
            return Err(ProtocolError::InvalidType(wire_type.as_u8()));
        }
    }
    Ok(())
}
