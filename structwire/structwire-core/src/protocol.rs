//! Sink/source contracts implemented by wire protocols.
//!
//! The codec drives these traits; it never opens or closes the underlying
//! transport. Implementations live in `structwire-protocol`.

use crate::{error::ProtocolError, schema::WireType};

/// Header preceding a field value in the tagged strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldHeader {
    pub wire_type: WireType,
    pub id: i16,
}

impl FieldHeader {
    pub fn new(wire_type: WireType, id: i16) -> Self {
        Self { wire_type, id }
    }

    pub fn stop() -> Self {
        Self::new(WireType::Stop, 0)
    }

    pub fn is_stop(&self) -> bool {
        self.wire_type == WireType::Stop
    }
}

/// Header of a list or set: element type and count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListHeader {
    pub element_type: WireType,
    pub size: usize,
}

impl ListHeader {
    pub fn new(element_type: WireType, size: usize) -> Self {
        Self { element_type, size }
    }
}

/// Header of a map: key type, value type, and entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapHeader {
    pub key_type: WireType,
    pub value_type: WireType,
    pub size: usize,
}

impl MapHeader {
    pub fn new(key_type: WireType, value_type: WireType, size: usize) -> Self {
        Self {
            key_type,
            value_type,
            size,
        }
    }
}

/// Primitive writes plus structural markers.
pub trait OutputProtocol {
    fn write_struct_begin(&mut self, name: &str) -> Result<(), ProtocolError>;
    fn write_struct_end(&mut self) -> Result<(), ProtocolError>;
    fn write_field_begin(&mut self, name: &str, header: FieldHeader) -> Result<(), ProtocolError>;
    fn write_field_end(&mut self) -> Result<(), ProtocolError>;
    fn write_field_stop(&mut self) -> Result<(), ProtocolError>;
    fn write_map_begin(&mut self, header: MapHeader) -> Result<(), ProtocolError>;
    fn write_map_end(&mut self) -> Result<(), ProtocolError>;
    fn write_list_begin(&mut self, header: ListHeader) -> Result<(), ProtocolError>;
    fn write_list_end(&mut self) -> Result<(), ProtocolError>;
    fn write_set_begin(&mut self, header: ListHeader) -> Result<(), ProtocolError>;
    fn write_set_end(&mut self) -> Result<(), ProtocolError>;

    fn write_bool(&mut self, v: bool) -> Result<(), ProtocolError>;
    fn write_byte(&mut self, v: i8) -> Result<(), ProtocolError>;
    fn write_i16(&mut self, v: i16) -> Result<(), ProtocolError>;
    fn write_i32(&mut self, v: i32) -> Result<(), ProtocolError>;
    fn write_i64(&mut self, v: i64) -> Result<(), ProtocolError>;
    fn write_double(&mut self, v: f64) -> Result<(), ProtocolError>;
    fn write_string(&mut self, v: &str) -> Result<(), ProtocolError>;
    fn write_binary(&mut self, v: &[u8]) -> Result<(), ProtocolError>;

    /// Write bytes verbatim, with no length prefix.
    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), ProtocolError>;

    /// Write a fixed-width presence bit-vector.
    fn write_bitset(&mut self, bits: &[bool]) -> Result<(), ProtocolError> {
        self.write_raw(&crate::bitset::pack_bits(bits))
    }
}

/// Primitive reads plus structural markers, mirroring [`OutputProtocol`].
pub trait InputProtocol {
    fn read_struct_begin(&mut self) -> Result<(), ProtocolError>;
    fn read_struct_end(&mut self) -> Result<(), ProtocolError>;
    /// Returns a header with [`WireType::Stop`] at the end of a struct.
    fn read_field_begin(&mut self) -> Result<FieldHeader, ProtocolError>;
    fn read_field_end(&mut self) -> Result<(), ProtocolError>;
    fn read_map_begin(&mut self) -> Result<MapHeader, ProtocolError>;
    fn read_map_end(&mut self) -> Result<(), ProtocolError>;
    fn read_list_begin(&mut self) -> Result<ListHeader, ProtocolError>;
    fn read_list_end(&mut self) -> Result<(), ProtocolError>;
    fn read_set_begin(&mut self) -> Result<ListHeader, ProtocolError>;
    fn read_set_end(&mut self) -> Result<(), ProtocolError>;

    fn read_bool(&mut self) -> Result<bool, ProtocolError>;
    fn read_byte(&mut self) -> Result<i8, ProtocolError>;
    fn read_i16(&mut self) -> Result<i16, ProtocolError>;
    fn read_i32(&mut self) -> Result<i32, ProtocolError>;
    fn read_i64(&mut self) -> Result<i64, ProtocolError>;
    fn read_double(&mut self) -> Result<f64, ProtocolError>;
    fn read_string(&mut self) -> Result<String, ProtocolError>;
    fn read_binary(&mut self) -> Result<Vec<u8>, ProtocolError>;

    /// Read exactly `len` bytes.
    fn read_raw(&mut self, len: usize) -> Result<Vec<u8>, ProtocolError>;

    /// Bytes left in the input, or `None` when the source cannot tell.
    fn bytes_remaining(&self) -> Option<usize> {
        None
    }

    /// Read a fixed-width presence bit-vector written by [`OutputProtocol::write_bitset`].
    fn read_bitset(&mut self, width: usize) -> Result<Vec<bool>, ProtocolError> {
        let bytes = self.read_raw(crate::bitset::packed_len(width))?;
        Ok(crate::bitset::unpack_bits(&bytes, width))
    }
}
