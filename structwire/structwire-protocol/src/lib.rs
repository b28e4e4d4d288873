//! Wire protocols implementing the `structwire-core` sink/source traits.
//!
//! Key components:
//! - [`binary`] — fixed-width big-endian encoding
//! - [`varint`] — zigzag varint encoding with field-id deltas and folded booleans
//! - [`ProtocolLimits`] — string and container length bounds applied while reading

pub mod binary;
mod limits;
pub mod varint;

pub use binary::{BinaryReader, BinaryWriter};
pub use limits::ProtocolLimits;
pub use varint::{VarintReader, VarintWriter};
