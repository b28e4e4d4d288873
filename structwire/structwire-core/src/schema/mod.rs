//! Struct shapes: field descriptors, declared types, and wire type tags.

mod format;
mod struct_schema;
mod types;

pub use format::format_struct_schema;
pub use struct_schema::{StructSchema, StructSchemaBuilder};
pub use types::{DataTypeDef, FieldDescriptor, Requirement, WireType};
