//! Schema-driven struct encoding and decoding.
//!
//! [`StructCodec`] writes a `StructInstance` with the tagged strategy
//! (field id and type on every field, unknown fields skipped on read) or the
//! compact strategy (positional values behind a presence bit-vector), over
//! either [`WireProtocol`]. [`shapes`] holds the built-in struct schemas.

mod codec;
mod compact;
mod error;
mod scalar;
pub mod shapes;
mod skip;
mod tagged;

pub use codec::{DEFAULT_MAX_DEPTH, Strategy, StructCodec, StructCodecBuilder, WireProtocol};
pub use error::ShapeError;
pub use structwire_core as core;
pub use structwire_protocol as protocol;
