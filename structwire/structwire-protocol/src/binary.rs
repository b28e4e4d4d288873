//! Fixed-width binary protocol.
//!
//! Layout: field header = type byte + big-endian i16 id, stop = `0x00`,
//! map header = key type + value type + i32 size, list/set header = element
//! type + i32 size, strings and binary are i32-length-prefixed, doubles are
//! big-endian IEEE 754 bits, booleans are one byte. Struct begin/end markers
//! produce no bytes.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use structwire_core::{
    FieldHeader, InputProtocol, ListHeader, MapHeader, OutputProtocol, ProtocolError, WireType,
};

use crate::limits::{ProtocolLimits, ensure_available, wire_size};

/// Smallest encoding of one value of `ty`, used to reject oversized count headers early.
fn min_encoded_size(ty: WireType) -> usize {
    match ty {
        WireType::Stop | WireType::Void => 0,
        WireType::Bool | WireType::Byte | WireType::Struct => 1,
        WireType::I16 => 2,
        WireType::I32 | WireType::String => 4,
        WireType::Double | WireType::I64 => 8,
        WireType::List | WireType::Set => 5,
        WireType::Map => 6,
    }
}

/// Accumulates binary-protocol output.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: BytesMut,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
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

    fn write_len(&mut self, len: usize) -> Result<(), ProtocolError> {
        self.buf.put_i32(wire_size(len)?);
        Ok(())
    }
}

impl OutputProtocol for BinaryWriter {
    fn write_struct_begin(&mut self, _name: &str) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_field_begin(&mut self, _name: &str, header: FieldHeader) -> Result<(), ProtocolError> {
        self.buf.put_u8(header.wire_type.as_u8());
        self.buf.put_i16(header.id);
        Ok(())
    }

    fn write_field_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_field_stop(&mut self) -> Result<(), ProtocolError> {
        self.buf.put_u8(WireType::Stop.as_u8());
        Ok(())
    }

    fn write_map_begin(&mut self, header: MapHeader) -> Result<(), ProtocolError> {
        self.buf.put_u8(header.key_type.as_u8());
        self.buf.put_u8(header.value_type.as_u8());
        self.write_len(header.size)
    }

    fn write_map_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_list_begin(&mut self, header: ListHeader) -> Result<(), ProtocolError> {
        self.buf.put_u8(header.element_type.as_u8());
        self.write_len(header.size)
    }

    fn write_list_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_set_begin(&mut self, header: ListHeader) -> Result<(), ProtocolError> {
        self.write_list_begin(header)
    }

    fn write_set_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn write_bool(&mut self, v: bool) -> Result<(), ProtocolError> {
        self.buf.put_u8(v as u8);
        Ok(())
    }

    fn write_byte(&mut self, v: i8) -> Result<(), ProtocolError> {
        self.buf.put_i8(v);
        Ok(())
    }

    fn write_i16(&mut self, v: i16) -> Result<(), ProtocolError> {
        self.buf.put_i16(v);
        Ok(())
    }

    fn write_i32(&mut self, v: i32) -> Result<(), ProtocolError> {
        self.buf.put_i32(v);
        Ok(())
    }

    fn write_i64(&mut self, v: i64) -> Result<(), ProtocolError> {
        self.buf.put_i64(v);
        Ok(())
    }

    fn write_double(&mut self, v: f64) -> Result<(), ProtocolError> {
        self.buf.put_f64(v);
        Ok(())
    }

    fn write_string(&mut self, v: &str) -> Result<(), ProtocolError> {
        self.write_binary(v.as_bytes())
    }

    fn write_binary(&mut self, v: &[u8]) -> Result<(), ProtocolError> {
        self.write_len(v.len())?;
        self.buf.put_slice(v);
        Ok(())
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        self.buf.put_slice(bytes);
        Ok(())
    }
}

/// Reads binary-protocol input from an in-memory buffer.
#[derive(Debug)]
pub struct BinaryReader {
    buf: Bytes,
    limits: ProtocolLimits,
}

impl BinaryReader {
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self {
            buf: buf.into(),
            limits: ProtocolLimits::default(),
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

    fn read_type(&mut self) -> Result<WireType, ProtocolError> {
        let tag = self
            .buf
            .try_get_u8()
            .map_err(|_| ProtocolError::UnexpectedEof)?;
        WireType::from_u8(tag)
    }

    fn read_container_size(&mut self, min_element: usize) -> Result<usize, ProtocolError> {
        let raw = self.read_i32()?;
        let size = self.limits.check_container(raw.into())?;
        ensure_available(self.buf.remaining(), size, min_element)?;
        Ok(size)
    }

    fn read_len_prefixed(&mut self) -> Result<Bytes, ProtocolError> {
        let raw = self.read_i32()?;
        let len = self.limits.check_string(raw.into())?;
        if self.buf.remaining() < len {
            return Err(ProtocolError::UnexpectedEof);
        }
        Ok(self.buf.copy_to_bytes(len))
    }
}

impl InputProtocol for BinaryReader {
    fn read_struct_begin(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_struct_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<FieldHeader, ProtocolError> {
        let wire_type = self.read_type()?;
        if wire_type == WireType::Stop {
            return Ok(FieldHeader::stop());
        }
        let id = self.read_i16()?;
        Ok(FieldHeader::new(wire_type, id))
    }

    fn read_field_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<MapHeader, ProtocolError> {
        let key_type = self.read_type()?;
        let value_type = self.read_type()?;
        let min = min_encoded_size(key_type) + min_encoded_size(value_type);
        let size = self.read_container_size(min)?;
        Ok(MapHeader::new(key_type, value_type, size))
    }

    fn read_map_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_list_begin(&mut self) -> Result<ListHeader, ProtocolError> {
        let element_type = self.read_type()?;
        let size = self.read_container_size(min_encoded_size(element_type))?;
        Ok(ListHeader::new(element_type, size))
    }

    fn read_list_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_set_begin(&mut self) -> Result<ListHeader, ProtocolError> {
        self.read_list_begin()
    }

    fn read_set_end(&mut self) -> Result<(), ProtocolError> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.read_byte()? == 1)
    }

    fn read_byte(&mut self) -> Result<i8, ProtocolError> {
        self.buf
            .try_get_i8()
            .map_err(|_| ProtocolError::UnexpectedEof)
    }

    fn read_i16(&mut self) -> Result<i16, ProtocolError> {
        self.buf
            .try_get_i16()
            .map_err(|_| ProtocolError::UnexpectedEof)
    }

    fn read_i32(&mut self) -> Result<i32, ProtocolError> {
        self.buf
            .try_get_i32()
            .map_err(|_| ProtocolError::UnexpectedEof)
    }

    fn read_i64(&mut self) -> Result<i64, ProtocolError> {
        self.buf
            .try_get_i64()
            .map_err(|_| ProtocolError::UnexpectedEof)
    }

    fn read_double(&mut self) -> Result<f64, ProtocolError> {
        self.buf
            .try_get_f64()
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
