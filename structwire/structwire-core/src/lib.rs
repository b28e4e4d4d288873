//! Schema model, value semantics, and protocol contracts for `structwire`.
//!
//! This crate provides the struct shape description ([`StructSchema`]), the
//! typed instance representation ([`StructInstance`] / [`Value`]) with its
//! equality, ordering, hashing, and string form, and the
//! [`OutputProtocol`] / [`InputProtocol`] traits that wire protocols implement.

pub mod bitset;
mod error;
mod instance;
mod protocol;
mod schema;
mod value;

pub use error::{CodecError, FieldError, ProtocolError, SchemaError, ValueTypeError};
pub use instance::StructInstance;
pub use protocol::{FieldHeader, InputProtocol, ListHeader, MapHeader, OutputProtocol};
pub use schema::{
    DataTypeDef, FieldDescriptor, Requirement, StructSchema, StructSchemaBuilder, WireType,
    format_struct_schema,
};
pub use value::Value;
