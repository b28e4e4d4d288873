//! Primitive values shared by both strategies.

use structwire_core::{
    CodecError, DataTypeDef, InputProtocol, OutputProtocol, ProtocolError, Value,
};

pub(crate) fn value_mismatch(field: &str, data_type: &DataTypeDef, value: &Value) -> CodecError {
    ProtocolError::ValueMismatch {
        field: field.to_string(),
        expected: data_type.type_name(),
        actual: value.variant_name(),
    }
    .into()
}

pub(crate) fn write_scalar<P>(
    out: &mut P,
    field: &str,
    data_type: &DataTypeDef,
    value: &Value,
) -> Result<(), CodecError>
where
    P: OutputProtocol + ?Sized,
{
    match (data_type, value) {
        (DataTypeDef::Bool, Value::Bool(v)) => out.write_bool(*v)?,
        (DataTypeDef::Byte, Value::Byte(v)) => out.write_byte(*v)?,
        (DataTypeDef::I16, Value::I16(v)) => out.write_i16(*v)?,
        (DataTypeDef::I32, Value::I32(v)) => out.write_i32(*v)?,
        (DataTypeDef::I64, Value::I64(v)) => out.write_i64(*v)?,
        (DataTypeDef::Double, Value::Double(v)) => out.write_double(*v)?,
        (DataTypeDef::String, Value::String(v)) => out.write_string(v)?,
        (DataTypeDef::Binary, Value::Binary(v)) => out.write_binary(v)?,
        _ => return Err(value_mismatch(field, data_type, value)),
    }
    Ok(())
}

pub(crate) fn read_scalar<P>(input: &mut P, data_type: &DataTypeDef) -> Result<Value, ProtocolError>
where
    P: InputProtocol + ?Sized,
{
    Ok(match data_type {
        DataTypeDef::Bool => Value::Bool(input.read_bool()?),
        DataTypeDef::Byte => Value::Byte(input.read_byte()?),
        DataTypeDef::I16 => Value::I16(input.read_i16()?),
        DataTypeDef::I32 => Value::I32(input.read_i32()?),
        DataTypeDef::I64 => Value::I64(input.read_i64()?),
        DataTypeDef::Double => Value::Double(input.read_double()?),
        DataTypeDef::String => Value::from(input.read_string()?),
        DataTypeDef::Binary => Value::from(input.read_binary()?),
        compound => return Err(ProtocolError::InvalidType(compound.wire_type().as_u8())),
    })
}
