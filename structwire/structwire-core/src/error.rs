//! Error types for schema construction, field access, and the codec layer.

/// Error returned by encode/decode and by [`StructInstance::validate`](crate::StructInstance::validate).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    /// A REQUIRED field was unset at encode time or absent after a tagged decode.
    #[error("Required field '{field}' was not present! Struct: {rendered}")]
    Validation {
        struct_name: String,
        field: String,
        rendered: String,
    },

    /// Malformed or truncated wire data, or a write the protocol cannot express.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A decoded value was rejected by the instance it was assigned to.
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Transport-level failure raised by [`InputProtocol`](crate::InputProtocol) and
/// [`OutputProtocol`](crate::OutputProtocol) implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("invalid wire type tag: {0}")]
    InvalidType(u8),

    #[error("negative size: {0}")]
    NegativeSize(i64),

    #[error("size {size} exceeds limit {limit}")]
    SizeLimit { size: usize, limit: usize },

    #[error("maximum nesting depth {0} exceeded")]
    DepthLimit(usize),

    #[error("invalid UTF-8 in string: {0}")]
    InvalidUtf8(String),

    #[error("varint is too long")]
    VarintOverflow,

    /// Size does not fit the wire representation (e.g. a container above `i32::MAX`).
    #[error("size {0} cannot be represented on the wire")]
    SizeOverflow(usize),

    /// The value stored in a slot does not match the type the schema declares.
    #[error("field '{field}' holds {actual}, schema declares {expected}")]
    ValueMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Error returned while building a [`StructSchema`](crate::StructSchema).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("struct '{struct_name}': duplicate field id {id}")]
    DuplicateFieldId { struct_name: String, id: i16 },

    #[error("struct '{struct_name}': duplicate field name '{name}'")]
    DuplicateFieldName { struct_name: String, name: String },

    #[error("struct '{struct_name}': field '{name}' has non-positive id {id}")]
    InvalidFieldId {
        struct_name: String,
        name: String,
        id: i16,
    },
}

/// Error returned by [`StructInstance`](crate::StructInstance) field accessors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Field {id} doesn't exist in struct '{struct_name}'")]
    UnknownId { struct_name: String, id: i16 },

    #[error("Field '{name}' doesn't exist in struct '{struct_name}'")]
    UnknownName { struct_name: String, name: String },

    #[error("field '{field}' expects {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: &'static str,
    },
}

/// Error returned by typed [`Value`](crate::Value) accessors on variant mismatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, found {actual}")]
pub struct ValueTypeError {
    pub expected: String,
    pub actual: &'static str,
}

impl ValueTypeError {
    pub fn new(expected: impl Into<String>, actual: &'static str) -> Self {
        Self {
            expected: expected.into(),
            actual,
        }
    }
}
