//! Compact strategy: REQUIRED values in declaration order, then a presence
//! bit-vector over the OPTIONAL/DEFAULT fields, then the present values.
//!
//! No ids or type tags reach the wire. Containers are an i32 count followed by
//! the elements, and nested structs use the same layout.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use structwire_core::{
    CodecError, DataTypeDef, InputProtocol, OutputProtocol, ProtocolError, StructInstance,
    StructSchema, Value, bitset::packed_len,
};
use structwire_protocol::ProtocolLimits;
use tracing::debug;

use crate::{
    codec::Depth,
    scalar::{read_scalar, write_scalar},
};

pub(crate) fn write_struct<P>(out: &mut P, instance: &StructInstance) -> Result<(), CodecError>
where
    P: OutputProtocol + ?Sized,
{
    instance.validate().inspect_err(|e| {
        debug!(struct_name = instance.name(), error = %e, "refusing to encode invalid struct");
    })?;

    let mut presence = Vec::with_capacity(instance.schema().optional_count());
    for (field, slot) in instance.fields() {
        if !field.is_required() {
            presence.push(slot.is_some());
            continue;
        }
        if let Some(value) = slot {
            write_value(out, &field.name, &field.data_type, value)?;
        }
    }

    out.write_bitset(&presence)?;
    for (field, slot) in instance.fields().filter(|(field, _)| !field.is_required()) {
        if let Some(value) = slot {
            write_value(out, &field.name, &field.data_type, value)?;
        }
    }
    Ok(())
}

fn write_count<P>(out: &mut P, len: usize) -> Result<(), CodecError>
where
    P: OutputProtocol + ?Sized,
{
    let count = i32::try_from(len).map_err(|_| ProtocolError::SizeOverflow(len))?;
    out.write_i32(count)?;
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
            write_count(out, items.len())?;
            for item in items {
                write_value(out, field, elem, item)?;
            }
        }
        (DataTypeDef::Set(elem), Value::Set(items)) => {
            write_count(out, items.len())?;
            for item in items {
                write_value(out, field, elem, item)?;
            }
        }
        (DataTypeDef::Map { key, value: val }, Value::Map(entries)) => {
            write_count(out, entries.len())?;
            for (k, v) in entries {
                write_value(out, field, key, k)?;
                write_value(out, field, val, v)?;
            }
        }
        _ => write_scalar(out, field, data_type, value)?,
    }
    Ok(())
}

pub(crate) fn read_struct<P>(
    input: &mut P,
    schema: &Arc<StructSchema>,
    depth: Depth,
    limits: &ProtocolLimits,
) -> Result<StructInstance, CodecError>
where
    P: InputProtocol + ?Sized,
{
    let depth = depth.descend()?;
    let mut instance = StructInstance::new(Arc::clone(schema));

    for field in schema.fields().iter().filter(|field| field.is_required()) {
        let value = read_value(input, &field.data_type, depth, limits)?;
        instance.set_opt(field.id, Some(value))?;
    }

    let presence = input.read_bitset(schema.optional_count())?;
    let optional = schema.fields().iter().filter(|field| !field.is_required());
    for (field, present) in optional.zip(presence) {
        if present {
            let value = read_value(input, &field.data_type, depth, limits)?;
            instance.set_opt(field.id, Some(value))?;
        }
    }
    Ok(instance)
}

/// Fewest bytes one value of `data_type` occupies in the compact layout.
///
/// A struct with no REQUIRED fields and no OPTIONAL/DEFAULT fields takes none.
fn min_encoded_len(data_type: &DataTypeDef) -> usize {
    match data_type {
        DataTypeDef::Struct(schema) => {
            let required: usize = schema
                .fields()
                .iter()
                .filter(|field| field.is_required())
                .map(|field| min_encoded_len(&field.data_type))
                .sum();
            required + packed_len(schema.optional_count())
        }
        _ => 1,
    }
}

/// Read a container count, bounded by the limits and by the input left.
///
/// Elements are charged at least one byte each, so zero-width structs cannot
/// expand a count header into more elements than there are bytes behind it.
fn read_count<P>(
    input: &mut P,
    limits: &ProtocolLimits,
    element_len: usize,
) -> Result<usize, ProtocolError>
where
    P: InputProtocol + ?Sized,
{
    let count = limits.check_container(input.read_i32()?.into())?;
    if let Some(remaining) = input.bytes_remaining() {
        match count.checked_mul(element_len.max(1)) {
            Some(needed) if needed <= remaining => {}
            _ => return Err(ProtocolError::UnexpectedEof),
        }
    }
    Ok(count)
}

fn read_value<P>(
    input: &mut P,
    data_type: &DataTypeDef,
    depth: Depth,
    limits: &ProtocolLimits,
) -> Result<Value, CodecError>
where
    P: InputProtocol + ?Sized,
{
    let value = match data_type {
        DataTypeDef::Struct(schema) => Value::Struct(read_struct(input, schema, depth, limits)?),
        DataTypeDef::List(elem) => {
            let count = read_count(input, limits, min_encoded_len(elem))?;
            let depth = depth.descend()?;
            let mut items = Vec::new();
            for _ in 0..count {
                items.push(read_value(input, elem, depth, limits)?);
            }
            Value::List(items)
        }
        DataTypeDef::Set(elem) => {
            let count = read_count(input, limits, min_encoded_len(elem))?;
            let depth = depth.descend()?;
            let mut items = BTreeSet::new();
            for _ in 0..count {
                items.insert(read_value(input, elem, depth, limits)?);
            }
            Value::Set(items)
        }
        DataTypeDef::Map { key, value } => {
            let count = read_count(input, limits, min_encoded_len(key) + min_encoded_len(value))?;
            let depth = depth.descend()?;
            let mut entries = BTreeMap::new();
            for _ in 0..count {
                let k = read_value(input, key, depth, limits)?;
                let v = read_value(input, value, depth, limits)?;
                entries.insert(k, v);
            }
            Value::Map(entries)
        }
        scalar => read_scalar(input, scalar)?,
    };
    Ok(value)
}
