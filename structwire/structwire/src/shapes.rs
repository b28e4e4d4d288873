//! Built-in struct shapes.
//!
//! - `ServiceException`: an error raised by a remote service, with an
//!   optional stack trace and the inputs that triggered it.
//! - `ExternalDataUnit`: a reference to a dataset published by an external
//!   resource, all fields DEFAULT.

use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
    sync::Arc,
};

use once_cell::sync::Lazy;
use structwire_core::{DataTypeDef, StructInstance, StructSchema, Value, ValueTypeError};

use crate::error::ShapeError;

pub static SERVICE_EXCEPTION: Lazy<Arc<StructSchema>> = Lazy::new(|| {
    StructSchema::builder("ServiceException")
        .required(1, "message", DataTypeDef::String)
        .optional(2, "stacktrace", DataTypeDef::String)
        .optional(
            3,
            "inputs",
            DataTypeDef::map(DataTypeDef::String, DataTypeDef::String),
        )
        .build()
        .expect("ServiceException schema has unique positive ids")
});

pub static EXTERNAL_DATA_UNIT: Lazy<Arc<StructSchema>> = Lazy::new(|| {
    StructSchema::builder("ExternalDataUnit")
        .default_field(1, "resource_name", DataTypeDef::String)
        .default_field(2, "resource_url", DataTypeDef::String)
        .default_field(3, "resource_version", DataTypeDef::String)
        .default_field(4, "resource_release_date", DataTypeDef::String)
        .default_field(5, "data_url", DataTypeDef::String)
        .default_field(6, "data_id", DataTypeDef::String)
        .default_field(7, "description", DataTypeDef::String)
        .build()
        .expect("ExternalDataUnit schema has unique positive ids")
});

pub fn service_exception() -> Arc<StructSchema> {
    Arc::clone(&SERVICE_EXCEPTION)
}

pub fn external_data_unit() -> Arc<StructSchema> {
    Arc::clone(&EXTERNAL_DATA_UNIT)
}

/// Look up a built-in shape by struct name.
pub fn shape_by_name(name: &str) -> Option<Arc<StructSchema>> {
    match name {
        "ServiceException" => Some(service_exception()),
        "ExternalDataUnit" => Some(external_data_unit()),
        _ => None,
    }
}

/// Typed form of a `ServiceException` instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceException {
    message: String,
    stacktrace: Option<String>,
    inputs: Option<BTreeMap<String, String>>,
}

impl ServiceException {
    pub const MESSAGE: i16 = 1;
    pub const STACKTRACE: i16 = 2;
    pub const INPUTS: i16 = 3;

    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_stacktrace(mut self, stacktrace: impl Into<String>) -> Self {
        self.stacktrace = Some(stacktrace.into());
        self
    }

    /// Add one input entry, creating the map on first use.
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn stacktrace(&self) -> Option<&str> {
        self.stacktrace.as_deref()
    }

    pub fn inputs(&self) -> Option<&BTreeMap<String, String>> {
        self.inputs.as_ref()
    }

    pub fn to_instance(&self) -> Result<StructInstance, ShapeError> {
        let mut instance = StructInstance::new(service_exception());
        instance.set(Self::MESSAGE, self.message.as_str())?;
        instance.set_opt(Self::STACKTRACE, self.stacktrace.as_deref().map(Value::from))?;
        instance.set_opt(
            Self::INPUTS,
            self.inputs
                .as_ref()
                .map(|inputs| Value::map_of(inputs.iter().map(|(k, v)| (k.as_str(), v.as_str())))),
        )?;
        Ok(instance)
    }
}

impl TryFrom<&StructInstance> for ServiceException {
    type Error = ShapeError;

    fn try_from(instance: &StructInstance) -> Result<Self, Self::Error> {
        if **instance.schema() != **SERVICE_EXCEPTION {
            return Err(ShapeError::WrongShape {
                expected: "ServiceException",
                actual: instance.name().to_string(),
            });
        }

        let message = instance
            .get(Self::MESSAGE)
            .ok_or(ShapeError::MissingField {
                shape: "ServiceException",
                field: "message",
            })?
            .try_str()
            .map_err(|source| ShapeError::FieldType {
                field: "message",
                source,
            })?
            .to_string();

        let stacktrace = instance
            .get(Self::STACKTRACE)
            .map(|v| v.try_str().map(str::to_string))
            .transpose()
            .map_err(|source| ShapeError::FieldType {
                field: "stacktrace",
                source,
            })?;

        let inputs = instance
            .get(Self::INPUTS)
            .map(string_map)
            .transpose()
            .map_err(|source| ShapeError::FieldType {
                field: "inputs",
                source,
            })?;

        Ok(Self {
            message,
            stacktrace,
            inputs,
        })
    }
}

fn string_map(value: &Value) -> Result<BTreeMap<String, String>, ValueTypeError> {
    value
        .try_map()?
        .iter()
        .map(|(k, v)| Ok((k.try_str()?.to_string(), v.try_str()?.to_string())))
        .collect()
}

/// Struct string form, e.g. `ServiceException(message:boom, inputs:{a=1, b=2})`.
impl Display for ServiceException {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let instance = self.to_instance().map_err(|_| fmt::Error)?;
        write!(f, "{instance}")
    }
}

impl std::error::Error for ServiceException {}
