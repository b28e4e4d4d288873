use std::sync::Arc;

use crate::error::ProtocolError;

use super::StructSchema;

/// Type tag carried on the wire in field, list, set, and map headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Stop = 0,
    Void = 1,
    Bool = 2,
    Byte = 3,
    Double = 4,
    I16 = 6,
    I32 = 8,
    I64 = 10,
    String = 11,
    Struct = 12,
    Map = 13,
    Set = 14,
    List = 15,
}

impl WireType {
    pub fn from_u8(tag: u8) -> Result<Self, ProtocolError> {
        Ok(match tag {
            0 => WireType::Stop,
            1 => WireType::Void,
            2 => WireType::Bool,
            3 => WireType::Byte,
            4 => WireType::Double,
            6 => WireType::I16,
            8 => WireType::I32,
            10 => WireType::I64,
            11 => WireType::String,
            12 => WireType::Struct,
            13 => WireType::Map,
            14 => WireType::Set,
            15 => WireType::List,
            other => return Err(ProtocolError::InvalidType(other)),
        })
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn type_name(self) -> &'static str {
        match self {
            WireType::Stop => "stop",
            WireType::Void => "void",
            WireType::Bool => "bool",
            WireType::Byte => "byte",
            WireType::Double => "double",
            WireType::I16 => "i16",
            WireType::I32 => "i32",
            WireType::I64 => "i64",
            WireType::String => "string",
            WireType::Struct => "struct",
            WireType::Map => "map",
            WireType::Set => "set",
            WireType::List => "list",
        }
    }
}

/// Presence obligation of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// Must be set before encode and present after a tagged decode.
    Required,
    Optional,
    /// Written when set, like `Optional`; carries no presence obligation.
    Default,
}

impl Requirement {
    pub fn is_required(self) -> bool {
        matches!(self, Requirement::Required)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Requirement::Required => "required",
            Requirement::Optional => "optional",
            Requirement::Default => "default",
        }
    }
}

/// Declared type of a field or container element.
///
/// `String` and `Binary` share [`WireType::String`] on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum DataTypeDef {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
    Struct(Arc<StructSchema>),
    List(Box<DataTypeDef>),
    Set(Box<DataTypeDef>),
    Map {
        key: Box<DataTypeDef>,
        value: Box<DataTypeDef>,
    },
}

impl DataTypeDef {
    pub fn list(elem: DataTypeDef) -> Self {
        DataTypeDef::List(Box::new(elem))
    }

    pub fn set(elem: DataTypeDef) -> Self {
        DataTypeDef::Set(Box::new(elem))
    }

    pub fn map(key: DataTypeDef, value: DataTypeDef) -> Self {
        DataTypeDef::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn wire_type(&self) -> WireType {
        match self {
            DataTypeDef::Bool => WireType::Bool,
            DataTypeDef::Byte => WireType::Byte,
            DataTypeDef::I16 => WireType::I16,
            DataTypeDef::I32 => WireType::I32,
            DataTypeDef::I64 => WireType::I64,
            DataTypeDef::Double => WireType::Double,
            DataTypeDef::String | DataTypeDef::Binary => WireType::String,
            DataTypeDef::Struct(_) => WireType::Struct,
            DataTypeDef::List(_) => WireType::List,
            DataTypeDef::Set(_) => WireType::Set,
            DataTypeDef::Map { .. } => WireType::Map,
        }
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(
            self,
            DataTypeDef::Struct(_)
                | DataTypeDef::List(_)
                | DataTypeDef::Set(_)
                | DataTypeDef::Map { .. }
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            DataTypeDef::Bool => "bool",
            DataTypeDef::Byte => "byte",
            DataTypeDef::I16 => "i16",
            DataTypeDef::I32 => "i32",
            DataTypeDef::I64 => "i64",
            DataTypeDef::Double => "double",
            DataTypeDef::String => "string",
            DataTypeDef::Binary => "binary",
            DataTypeDef::Struct(_) => "struct",
            DataTypeDef::List(_) => "list",
            DataTypeDef::Set(_) => "set",
            DataTypeDef::Map { .. } => "map",
        }
    }

    /// Type signature in IDL notation, e.g. `map<string,string>`.
    pub fn signature(&self) -> String {
        match self {
            DataTypeDef::Struct(schema) => schema.name().to_string(),
            DataTypeDef::List(elem) => format!("list<{}>", elem.signature()),
            DataTypeDef::Set(elem) => format!("set<{}>", elem.signature()),
            DataTypeDef::Map { key, value } => {
                format!("map<{},{}>", key.signature(), value.signature())
            }
            primitive => primitive.type_name().to_string(),
        }
    }
}

/// One entry of a struct shape: id, name, declared type, and presence obligation.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub id: i16,
    pub name: String,
    pub data_type: DataTypeDef,
    pub requirement: Requirement,
}

impl FieldDescriptor {
    pub fn new(
        id: i16,
        name: impl Into<String>,
        data_type: DataTypeDef,
        requirement: Requirement,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            data_type,
            requirement,
        }
    }

    pub fn wire_type(&self) -> WireType {
        self.data_type.wire_type()
    }

    pub fn is_required(&self) -> bool {
        self.requirement.is_required()
    }
}
