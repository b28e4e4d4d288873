//! Error types for the typed shape wrappers.

use structwire_core::{FieldError, ValueTypeError};

/// Errors produced when converting between [`StructInstance`](structwire_core::StructInstance)
/// and a typed shape in [`shapes`](crate::shapes).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    /// The instance was built from a different schema.
    #[error("expected a '{expected}' instance, found '{actual}'")]
    WrongShape {
        expected: &'static str,
        actual: String,
    },

    /// A REQUIRED field of the shape is unset.
    #[error("'{shape}' is missing required field '{field}'")]
    MissingField {
        shape: &'static str,
        field: &'static str,
    },

    /// A field holds a value of an unexpected type.
    #[error("field '{field}': {source}")]
    FieldType {
        field: &'static str,
        #[source]
        source: ValueTypeError,
    },

    /// Assigning a field on the generic instance failed.
    #[error(transparent)]
    Field(#[from] FieldError),
}
