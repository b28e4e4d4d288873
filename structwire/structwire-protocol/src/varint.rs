//! Varint protocol: zigzag varint integers with field-id deltas.
//!
//! A field header packs `(id delta << 4) | type` into one byte when the id
//! grows by 1..=15 over the previous field of the same struct; otherwise the
//! type byte is followed by the zigzag varint id. Boolean fields carry their
//! value in the header type nibble. Lists and sets with fewer than 15
//! elements pack the size into the header byte. Doubles are little-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use structwire_core::{
    FieldHeader, InputProtocol, ListHeader, MapHeader, OutputProtocol, ProtocolError, WireType,
};

use crate::limits::{ProtocolLimits, ensure_available, wire_size};

const TYPE_STOP: u8 = 0;
const TYPE_BOOLEAN_TRUE: u8 = 1;
const TYPE_BOOLEAN_FALSE: u8 = 2;
const TYPE_BYTE: u8 = 3;
const TYPE_I16: u8 = 4;
const TYPE_I32: u8 = 5;
const TYPE_I64: u8 = 6;
const TYPE_DOUBLE: u8 = 7;
const TYPE_BINARY: u8 = 8;
const TYPE_LIST: u8 = 9;
const TYPE_SET: u8 = 10;
const TYPE_MAP: u8 = 11;
const TYPE_STRUCT: u8 = 12;

fn compact_type(ty: WireType) -> Result<u8, ProtocolError> {
    Ok(match ty {
        WireType::Stop => TYPE_STOP,
        WireType::Bool => TYPE_BOOLEAN_TRUE,
        WireType::Byte => TYPE_BYTE,
        WireType::I16 => TYPE_I16,
        WireType::I32 => TYPE_I32,
        WireType::I64 => TYPE_I64,
        WireType::Double => TYPE_DOUBLE,
        WireType::String => TYPE_BINARY,
        WireType::List => TYPE_LIST,
        WireType::Set => TYPE_SET,
        WireType::Map => TYPE_MAP,
        WireType::Struct => TYPE_STRUCT,
        WireType::Void => return Err(ProtocolError::InvalidType(WireType::Void.as_u8())),
    })
}

fn wire_type(compact: u8) -> Result<WireType, ProtocolError> {
    Ok(match compact {
        TYPE_STOP => WireType::Stop,
        TYPE_BOOLEAN_TRUE | TYPE_BOOLEAN_FALSE => WireType::Bool,
        TYPE_BYTE => WireType::Byte,
        TYPE_I16 => WireType::I16,
        TYPE_I32 => WireType::I32,
        TYPE_I64 => WireType::I64,
        TYPE_DOUBLE => WireType::Double,
        TYPE_BINARY => WireType::String,
        TYPE_LIST => WireType::List,
        TYPE_SET => WireType::Set,
        TYPE_MAP => WireType::Map,
        TYPE_STRUCT => WireType::Struct,
        other => return Err(ProtocolError::InvalidType(other)),
    })
}

fn min_encoded_size(ty: WireType) -> usize {
    match ty {
        WireType::Stop | WireType::Void => 0,
        WireType::Double => 8,
        _ => 1,
    }
}

fn zigzag_32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

fn zigzag_64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

fn unzigzag_32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

fn unzigzag_64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Accumulates varint-protocol output.
#[derive(Debug, Default)]
pub struct VarintWriter {
    buf: BytesMut,
    last_field_id: i16,
    field_id_stack: Vec<i16>,
    pending_bool_field: Option<FieldHeader>,
}

impl VarintWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    fn write_varint_32(&mut self, mut n: u32) {
        while n >= 0x80 {
            self.buf.put_u8((n as u8 & 0x7f) | 0x80);
            n >>= 7;
        }
        self.buf.put_u8(n as u8);
    }

    fn write_varint_64(&mut self, mut n: u64) {
        while n >= 0x80 {
            self.buf.put_u8((n as u8 & 0x7f) | 0x80);
            n >>= 7;
        }
        self.buf.put_u8(n as u8);
    }

    fn write_field_header(&mut self, id: i16, compact: u8) {
        let delta = i32::from(id) - i32::from(self.last_field_id);
        if (1..=15).contains(&delta) {
            self.buf.put_u8(((delta as u8) << 4) | compact);
        } else {
            self.buf.put_u8(compact);
            self.write_varint_32(zigzag_32(id.into()));
        }
        self.last_field_id = id;
    }

    fn write_collection_begin(&mut self, element: WireType, size: usize) -> Result<(), ProtocolError> {
        let elem = compact_type(element)?;
        let size = wire_size(size)?;
        if size <= 14 {
            self.buf.put_u8(((size as u8) << 4) | elem);
        } else {
            self.buf.put_u8(0xf0 | elem);
            self.write_varint_32(size as u32);
        }
        Ok(())
    }
}

impl OutputProtocol for VarintWriter {
    fn write_struct_begin(&mut self, _name: &str) -> Result<(), ProtocolError> {
        self.field_id_stack.push(self.last_field_id);
        self.last_field_id = 0;
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<(), ProtocolError> {
        self.last_field_id = self.field_id_stack.pop().unwrap_or_default();
        Ok(())
    }

    fn write_field_begin(&mut self, _name: &str, header: FieldHeader) -> Result<(), ProtocolError> {
        if header.wire_type == WireType::Bool {
            self.pending_bool_field = Some(header);
            return Ok(());
        }
        let compact = compact_type(header.wire_type)?;
        self.write_field_header(header.id, compact);
        Ok(())
    }

    fn write_field_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_field_stop(&mut self) -> Result<(), ProtocolError> {
        self.buf.put_u8(TYPE_STOP);
        Ok(())
    }

    fn write_map_begin(&mut self, header: MapHeader) -> Result<(), ProtocolError> {
        if header.size == 0 {
            self.buf.put_u8(0);
            return Ok(());
        }
        let size = wire_size(header.size)?;
        let kv = (compact_type(header.key_type)? << 4) | compact_type(header.value_type)?;
        self.write_varint_32(size as u32);
        self.buf.put_u8(kv);
        Ok(())
    }

    fn write_map_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_list_begin(&mut self, header: ListHeader) -> Result<(), ProtocolError> {
        self.write_collection_begin(header.element_type, header.size)
    }

    fn write_list_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_set_begin(&mut self, header: ListHeader) -> Result<(), ProtocolError> {
        self.write_collection_begin(header.element_type, header.size)
    }

    fn write_set_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_bool(&mut self, v: bool) -> Result<(), ProtocolError> {
        let compact = if v {
            TYPE_BOOLEAN_TRUE
        } else {
            TYPE_BOOLEAN_FALSE
        };
        match self.pending_bool_field.take() {
            Some(header) => self.write_field_header(header.id, compact),
            None => self.buf.put_u8(compact),
        }
        Ok(())
    }

    fn write_byte(&mut self, v: i8) -> Result<(), ProtocolError> {
        self.buf.put_i8(v);
        Ok(())
    }

    fn write_i16(&mut self, v: i16) -> Result<(), ProtocolError> {
        self.write_varint_32(zigzag_32(v.into()));
        Ok(())
    }

    fn write_i32(&mut self, v: i32) -> Result<(), ProtocolError> {
        self.write_varint_32(zigzag_32(v));
        Ok(())
    }

    fn write_i64(&mut self, v: i64) -> Result<(), ProtocolError> {
        self.write_varint_64(zigzag_64(v));
        Ok(())
    }

    fn write_double(&mut self, v: f64) -> Result<(), ProtocolError> {
        self.buf.put_f64_le(v);
        Ok(())
    }

    fn write_string(&mut self, v: &str) -> Result<(), ProtocolError> {
        self.write_binary(v.as_bytes())
    }

    fn write_binary(&mut self, v: &[u8]) -> Result<(), ProtocolError> {
        let len = wire_size(v.len())?;
        self.write_varint_32(len as u32);
        self.buf.put_slice(v);
        Ok(())
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        self.buf.put_slice(bytes);
        Ok(())
    }
}

/// Reads varint-protocol input from an in-memory buffer.
#[derive(Debug)]
pub struct VarintReader {
    buf: Bytes,
    limits: ProtocolLimits,
    last_field_id: i16,
    field_id_stack: Vec<i16>,
    pending_bool: Option<bool>,
}

impl VarintReader {
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self {
            buf: buf.into(),
            limits: ProtocolLimits::default(),
            last_field_id: 0,
            field_id_stack: Vec::new(),
            pending_bool: None,
        }
    }

    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    pub fn with_limits(mut self, limits: ProtocolLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        self.buf
            .try_get_u8()
            .map_err(|_| ProtocolError::UnexpectedEof)
    }

    fn read_varint_32(&mut self) -> Result<u32, ProtocolError> {
        let mut result = 0u32;
        for shift in (0..35).step_by(7) {
            let byte = self.read_u8()?;
            result |= u32::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(ProtocolError::VarintOverflow)
    }

    fn read_varint_64(&mut self) -> Result<u64, ProtocolError> {
        let mut result = 0u64;
        for shift in (0..70).step_by(7) {
            let byte = self.read_u8()?;
            result |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(ProtocolError::VarintOverflow)
    }

    fn read_container_size(&mut self, raw: u32, min_element: usize) -> Result<usize, ProtocolError> {
        let size = self.limits.check_container(i64::from(raw as i32))?;
        ensure_available(self.buf.remaining(), size, min_element)?;
        Ok(size)
    }

    fn read_len_prefixed(&mut self) -> Result<Bytes, ProtocolError> {
        let raw = self.read_varint_32()? as i32;
        let len = self.limits.check_string(raw.into())?;
        if self.buf.remaining() < len {
            return Err(ProtocolError::UnexpectedEof);
        }
        Ok(self.buf.copy_to_bytes(len))
    }

    fn read_collection_begin(&mut self) -> Result<ListHeader, ProtocolError> {
        let header = self.read_u8()?;
        let element_type = wire_type(header & 0x0f)?;
        let short_size = u32::from(header >> 4);
        let raw = if short_size == 15 {
            self.read_varint_32()?
        } else {
            short_size
        };
        let size = self.read_container_size(raw, min_encoded_size(element_type))?;
        Ok(ListHeader::new(element_type, size))
    }
}

impl InputProtocol for VarintReader {
    fn read_struct_begin(&mut self) -> Result<(), ProtocolError> {
        self.field_id_stack.push(self.last_field_id);
        self.last_field_id = 0;
        Ok(())
    }

    fn read_struct_end(&mut self) -> Result<(), ProtocolError> {
        self.last_field_id = self.field_id_stack.pop().unwrap_or_default();
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<FieldHeader, ProtocolError> {
        let byte = self.read_u8()?;
        let compact = byte & 0x0f;
        if compact == TYPE_STOP {
            return Ok(FieldHeader::stop());
        }
        let delta = byte >> 4;
        let id = if delta == 0 {
            self.read_i16()?
        } else {
            self.last_field_id.wrapping_add(i16::from(delta))
        };
        let ty = wire_type(compact)?;
        if ty == WireType::Bool {
            self.pending_bool = Some(compact == TYPE_BOOLEAN_TRUE);
        }
        self.last_field_id = id;
        Ok(FieldHeader::new(ty, id))
    }

    fn read_field_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<MapHeader, ProtocolError> {
        let raw = self.read_varint_32()?;
        if raw == 0 {
            return Ok(MapHeader::new(WireType::Stop, WireType::Stop, 0));
        }
        let kv = self.read_u8()?;
        let key_type = wire_type(kv >> 4)?;
        let value_type = wire_type(kv & 0x0f)?;
        let min = min_encoded_size(key_type) + min_encoded_size(value_type);
        let size = self.read_container_size(raw, min)?;
        Ok(MapHeader::new(key_type, value_type, size))
    }

    fn read_map_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_list_begin(&mut self) -> Result<ListHeader, ProtocolError> {
        self.read_collection_begin()
    }

    fn read_list_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_set_begin(&mut self) -> Result<ListHeader, ProtocolError> {
        self.read_collection_begin()
    }

    fn read_set_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        match self.pending_bool.take() {
            Some(v) => Ok(v),
            None => Ok(self.read_u8()? == TYPE_BOOLEAN_TRUE),
        }
    }

    fn read_byte(&mut self) -> Result<i8, ProtocolError> {
        self.buf
            .try_get_i8()
            .map_err(|_| ProtocolError::UnexpectedEof)
    }

    fn read_i16(&mut self) -> Result<i16, ProtocolError> {
        Ok(unzigzag_32(self.read_varint_32()?) as i16)
    }

    fn read_i32(&mut self) -> Result<i32, ProtocolError> {
        Ok(unzigzag_32(self.read_varint_32()?))
    }

    fn read_i64(&mut self) -> Result<i64, ProtocolError> {
        Ok(unzigzag_64(self.read_varint_64()?))
    }

    fn read_double(&mut self) -> Result<f64, ProtocolError> {
        self.buf
            .try_get_f64_le()
            .map_err(|_| ProtocolError::UnexpectedEof)
    }

    fn read_string(&mut self) -> Result<String, ProtocolError> {
        let bytes = self.read_len_prefixed()?;
        String::from_utf8(bytes.to_vec()).map_err(|e| ProtocolError::InvalidUtf8(e.to_string()))
    }

    fn read_binary(&mut self) -> Result<Vec<u8>, ProtocolError> {
        Ok(self.read_len_prefixed()?.to_vec())
    }

    fn bytes_remaining(&self) -> Option<usize> {
        Some(self.buf.remaining())
    }

    fn read_raw(&mut self, len: usize) -> Result<Vec<u8>, ProtocolError> {
        if self.buf.remaining() < len {
            return Err(ProtocolError::UnexpectedEof);
        }
        Ok(self.buf.copy_to_bytes(len).to_vec())
    }
}
