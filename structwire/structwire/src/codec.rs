//! Struct codec entry points.

use std::sync::Arc;

use structwire_core::{
    CodecError, InputProtocol, OutputProtocol, ProtocolError, StructInstance, StructSchema,
};
use structwire_protocol::{BinaryReader, BinaryWriter, ProtocolLimits, VarintReader, VarintWriter};

use crate::{compact, tagged};

/// Default bound on struct and container nesting while decoding.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Wire strategy used by a [`StructCodec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Self-describing: every field carries its id and wire type. Tolerates
    /// unknown and type-mismatched fields on decode.
    #[default]
    Tagged,
    /// Positional: required values, a presence bit-vector for the remaining
    /// fields, then the present values. Writer and reader must share the schema.
    Compact,
}

/// Byte-level protocol used by the buffer entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireProtocol {
    #[default]
    Binary,
    Varint,
}

/// Current nesting level while decoding, bounded by the codec's max depth.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Depth {
    level: usize,
    max: usize,
}

impl Depth {
    pub(crate) fn new(max: usize) -> Self {
        Self { level: 0, max }
    }

    /// Enter one more level of nesting.
    pub(crate) fn descend(self) -> Result<Self, ProtocolError> {
        if self.level >= self.max {
            return Err(ProtocolError::DepthLimit(self.max));
        }
        Ok(Self {
            level: self.level + 1,
            max: self.max,
        })
    }
}

/// Encodes and decodes [`StructInstance`]s under one [`Strategy`].
#[derive(Debug, Clone)]
pub struct StructCodec {
    strategy: Strategy,
    max_depth: usize,
    limits: ProtocolLimits,
}

/// Builder for configuring [`StructCodec`].
#[derive(Debug, Clone)]
pub struct StructCodecBuilder {
    strategy: Strategy,
    max_depth: usize,
    limits: ProtocolLimits,
}

impl Default for StructCodec {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

impl StructCodec {
    /// Create a builder for [`StructCodec`].
    ///
    /// Defaults: [`Strategy::Tagged`], max depth [`DEFAULT_MAX_DEPTH`], no length limits.
    pub fn builder() -> StructCodecBuilder {
        StructCodecBuilder {
            strategy: Strategy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            limits: ProtocolLimits::default(),
        }
    }

    pub fn new(strategy: Strategy) -> Self {
        Self::builder().with_strategy(strategy).build()
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn limits(&self) -> ProtocolLimits {
        self.limits
    }

    /// Write `instance` to `out`. Fails with [`CodecError::Validation`] when a
    /// REQUIRED field is unset; nothing is written in that case.
    pub fn encode<P>(&self, instance: &StructInstance, out: &mut P) -> Result<(), CodecError>
    where
        P: OutputProtocol + ?Sized,
    {
        match self.strategy {
            Strategy::Tagged => tagged::write_struct(out, instance),
            Strategy::Compact => compact::write_struct(out, instance),
        }
    }

    /// Read one instance of `schema` from `input`.
    ///
    /// A failed decode leaves `input` at an unspecified position.
    pub fn decode<P>(
        &self,
        schema: &Arc<StructSchema>,
        input: &mut P,
    ) -> Result<StructInstance, CodecError>
    where
        P: InputProtocol + ?Sized,
    {
        let depth = Depth::new(self.max_depth);
        match self.strategy {
            Strategy::Tagged => tagged::read_struct(input, schema, depth),
            Strategy::Compact => compact::read_struct(input, schema, depth, &self.limits),
        }
    }

    /// Encode into a fresh buffer using `protocol`.
    pub fn encode_to_vec(
        &self,
        instance: &StructInstance,
        protocol: WireProtocol,
    ) -> Result<Vec<u8>, CodecError> {
        match protocol {
            WireProtocol::Binary => {
                let mut out = BinaryWriter::new();
                self.encode(instance, &mut out)?;
                Ok(out.into_vec())
            }
            WireProtocol::Varint => {
                let mut out = VarintWriter::new();
                self.encode(instance, &mut out)?;
                Ok(out.into_vec())
            }
        }
    }

    /// Decode one instance from the front of `data`. Trailing bytes are ignored.
    pub fn decode_from_slice(
        &self,
        schema: &Arc<StructSchema>,
        data: &[u8],
        protocol: WireProtocol,
    ) -> Result<StructInstance, CodecError> {
        match protocol {
            WireProtocol::Binary => {
                let mut input = BinaryReader::from_slice(data).with_limits(self.limits);
                self.decode(schema, &mut input)
            }
            WireProtocol::Varint => {
                let mut input = VarintReader::from_slice(data).with_limits(self.limits);
                self.decode(schema, &mut input)
            }
        }
    }
}

impl StructCodecBuilder {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Maximum nesting of structs and containers accepted while decoding or skipping.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Length limits applied by the buffer entry points and by compact container counts.
    pub fn with_limits(mut self, limits: ProtocolLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn build(self) -> StructCodec {
        StructCodec {
            strategy: self.strategy,
            max_depth: self.max_depth,
            limits: self.limits,
        }
    }
}
