//! Tagged strategy: each set field is written as a header (wire type, id)
//! followed by its value, and the struct ends with a stop marker.
//!
//! Decoding skips unknown ids and known ids whose wire type differs from the
//! schema. A container whose element types disagree with the schema is
//! skipped as a whole and its field stays unset.

use std::sync::Arc;

use structwire_core::{
    CodecError, DataTypeDef, FieldHeader, InputProtocol, ListHeader, MapHeader, OutputProtocol,
    StructInstance, StructSchema, Value,
};
use tracing::{debug, trace};

use crate::{
    codec::Depth,
    scalar::{read_scalar, write_scalar},
    skip::skip,
};

pub(crate) fn write_struct<P>(out: &mut P, instance: &StructInstance) -> Result<(), CodecError>
where
    P: OutputProtocol + ?Sized,
{
    instance.validate().inspect_err(|e| {
        debug!(struct_name = instance.name(), error = %e, "refusing to encode invalid struct");
    })?;

    out.write_struct_begin(instance.name())?;
    for (field, slot) in instance.fields() {
        let Some(value) = slot else {
            continue;
        };
        out.write_field_begin(&field.name, FieldHeader::new(field.wire_type(), field.id))?;
        write_value(out, &field.name, &field.data_type, value)?;
        out.write_field_end()?;
    }
    out.write_field_stop()?;
    out.write_struct_end()?;
    Ok(())
}

fn write_value<P>(
    out: &mut P,
    field: &str,
    data_type: &DataTypeDef,
    value: &Value,
) -> Result<(), CodecError>
where
    P: OutputProtocol + ?Sized,
{
    match (data_type, value) {
        (DataTypeDef::Struct(_), Value::Struct(nested)) => write_struct(out, nested)?,
        (DataTypeDef::List(elem), Value::List(items)) => {
            out.write_list_begin(ListHeader::new(elem.wire_type(), items.len()))?;
            for item in items {
                write_value(out, field, elem, item)?;
            }
            out.write_list_end()?;
        }
        (DataTypeDef::Set(elem), Value::Set(items)) => {
            out.write_set_begin(ListHeader::new(elem.wire_type(), items.len()))?;
            for item in items {
                write_value(out, field, elem, item)?;
            }
            out.write_set_end()?;
        }
        (DataTypeDef::Map { key, value: val }, Value::Map(entries)) => {
            out.write_map_begin(MapHeader::new(
                key.wire_type(),
                val.wire_type(),
                entries.len(),
            ))?;
            for (k, v) in entries {
                write_value(out, field, key, k)?;
                write_value(out, field, val, v)?;
            }
            out.write_map_end()?;
        }
        _ => write_scalar(out, field, data_type, value)?,
    }
    Ok(())
}

pub(crate) fn read_struct<P>(
    input: &mut P,
    schema: &Arc<StructSchema>,
    depth: Depth,
) -> Result<StructInstance, CodecError>
where
    P: InputProtocol + ?Sized,
{
    let depth = depth.descend()?;
    let mut instance = StructInstance::new(Arc::clone(schema));

    input.read_struct_begin()?;
    loop {
        let header = input.read_field_begin()?;
        if header.is_stop() {
            break;
        }
        match schema.field(header.id) {
            Some(field) if field.wire_type() == header.wire_type => {
                match read_value(input, &field.data_type, depth)? {
                    Some(value) => {
                        instance.set_opt(field.id, Some(value))?;
                    }
                    None => trace!(
                        struct_name = schema.name(),
                        field = %field.name,
                        "skipped container with mismatched element types"
                    ),
                }
            }
            Some(field) => {
                trace!(
                    struct_name = schema.name(),
                    field = %field.name,
                    expected = field.wire_type().type_name(),
                    actual = header.wire_type.type_name(),
                    "skipping field with mismatched wire type"
                );
                skip(input, header.wire_type, depth)?;
            }
            None => {
                trace!(
                    struct_name = schema.name(),
                    id = header.id,
                    wire_type = header.wire_type.type_name(),
                    "skipping unknown field"
                );
                skip(input, header.wire_type, depth)?;
            }
        }
        input.read_field_end()?;
    }
    input.read_struct_end()?;

    instance.validate().inspect_err(|e| {
        debug!(struct_name = schema.name(), error = %e, "decoded struct failed validation");
    })?;
    Ok(instance)
}

/// `Ok(None)` means the value was consumed but discarded.
fn read_value<P>(
    input: &mut P,
    data_type: &DataTypeDef,
    depth: Depth,
) -> Result<Option<Value>, CodecError>
where
    P: InputProtocol + ?Sized,
{
    let value = match data_type {
        DataTypeDef::Struct(schema) => Some(Value::Struct(read_struct(input, schema, depth)?)),
        DataTypeDef::List(elem) => {
            let header = input.read_list_begin()?;
            let items = read_elements(input, header, elem, depth.descend()?)?;
            input.read_list_end()?;
            items.map(Value::List)
        }
        DataTypeDef::Set(elem) => {
            let header = input.read_set_begin()?;
            let items = read_elements(input, header, elem, depth.descend()?)?;
            input.read_set_end()?;
            items.map(|items| Value::Set(items.into_iter().collect()))
        }
        DataTypeDef::Map { key, value } => {
            let header = input.read_map_begin()?;
            let entries = read_entries(input, header, key, value, depth.descend()?)?;
            input.read_map_end()?;
            entries.map(|entries| Value::Map(entries.into_iter().collect()))
        }
        scalar => Some(read_scalar(input, scalar)?),
    };
    Ok(value)
}

fn read_elements<P>(
    input: &mut P,
    header: ListHeader,
    elem: &DataTypeDef,
    depth: Depth,
) -> Result<Option<Vec<Value>>, CodecError>
where
    P: InputProtocol + ?Sized,
{
    if header.size > 0 && header.element_type != elem.wire_type() {
        for _ in 0..header.size {
            skip(input, header.element_type, depth)?;
        }
        return Ok(None);
    }

    let mut items = Vec::with_capacity(header.size);
    let mut intact = true;
    for _ in 0..header.size {
        match read_value(input, elem, depth)? {
            Some(item) => items.push(item),
            None => intact = false,
        }
    }
    Ok(intact.then_some(items))
}

fn read_entries<P>(
    input: &mut P,
    header: MapHeader,
    key: &DataTypeDef,
    value: &DataTypeDef,
    depth: Depth,
) -> Result<Option<Vec<(Value, Value)>>, CodecError>
where
    P: InputProtocol + ?Sized,
{
    if header.size > 0 && !header_matches(header, key, value) {
        for _ in 0..header.size {
            skip(input, header.key_type, depth)?;
            skip(input, header.value_type, depth)?;
        }
        return Ok(None);
    }

    let mut entries = Vec::with_capacity(header.size);
    let mut intact = true;
    for _ in 0..header.size {
        let k = read_value(input, key, depth)?;
        let v = read_value(input, value, depth)?;
        match (k, v) {
            (Some(k), Some(v)) => entries.push((k, v)),
            _ => intact = false,
        }
    }
    Ok(intact.then_some(entries))
}

fn header_matches(header: MapHeader, key: &DataTypeDef, value: &DataTypeDef) -> bool {
    header.key_type == key.wire_type() && header.value_type == value.wire_type()
}
