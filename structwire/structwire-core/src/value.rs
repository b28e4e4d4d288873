//! Typed field values held by a [`StructInstance`].

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::{error::ValueTypeError, instance::StructInstance, schema::DataTypeDef};

/// Bytes rendered by the string form of a binary value before truncating.
const BINARY_DISPLAY_LIMIT: usize = 128;

/// Value stored in a struct field or container.
///
/// Sets and maps are sorted by key, so two containers holding the same entries
/// always iterate and render identically. Equality and hashing are
/// derived from the total order in [`Ord`].
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
    String(Arc<str>),
    Binary(Arc<[u8]>),
    List(Vec<Value>),
    Set(BTreeSet<Value>),
    Map(BTreeMap<Value, Value>),
    Struct(StructInstance),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(Arc::from(s.as_ref()))
    }

    pub fn binary(b: impl AsRef<[u8]>) -> Self {
        Self::Binary(Arc::from(b.as_ref()))
    }

    pub fn map_of<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn set_of<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    pub fn list_of<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn try_bool(&self) -> Result<bool, ValueTypeError> {
        match self {
            Value::Bool(v) => Ok(*v),
            _ => Err(self.type_mismatch("Bool")),
        }
    }

    pub fn try_byte(&self) -> Result<i8, ValueTypeError> {
        match self {
            Value::Byte(v) => Ok(*v),
            _ => Err(self.type_mismatch("Byte")),
        }
    }

    pub fn try_i16(&self) -> Result<i16, ValueTypeError> {
        match self {
            Value::I16(v) => Ok(*v),
            _ => Err(self.type_mismatch("I16")),
        }
    }

    pub fn try_i32(&self) -> Result<i32, ValueTypeError> {
        match self {
            Value::I32(v) => Ok(*v),
            _ => Err(self.type_mismatch("I32")),
        }
    }

    pub fn try_i64(&self) -> Result<i64, ValueTypeError> {
        match self {
            Value::I64(v) => Ok(*v),
            _ => Err(self.type_mismatch("I64")),
        }
    }

    pub fn try_double(&self) -> Result<f64, ValueTypeError> {
        match self {
            Value::Double(v) => Ok(*v),
            _ => Err(self.type_mismatch("Double")),
        }
    }

    pub fn try_str(&self) -> Result<&str, ValueTypeError> {
        match self {
            Value::String(v) => Ok(v.as_ref()),
            _ => Err(self.type_mismatch("String")),
        }
    }

    pub fn try_bytes(&self) -> Result<&[u8], ValueTypeError> {
        match self {
            Value::Binary(v) => Ok(v.as_ref()),
            _ => Err(self.type_mismatch("Binary")),
        }
    }

    pub fn try_list(&self) -> Result<&[Value], ValueTypeError> {
        match self {
            Value::List(v) => Ok(v.as_slice()),
            _ => Err(self.type_mismatch("List")),
        }
    }

    pub fn try_set(&self) -> Result<&BTreeSet<Value>, ValueTypeError> {
        match self {
            Value::Set(v) => Ok(v),
            _ => Err(self.type_mismatch("Set")),
        }
    }

    pub fn try_map(&self) -> Result<&BTreeMap<Value, Value>, ValueTypeError> {
        match self {
            Value::Map(v) => Ok(v),
            _ => Err(self.type_mismatch("Map")),
        }
    }

    pub fn try_struct(&self) -> Result<&StructInstance, ValueTypeError> {
        match self {
            Value::Struct(v) => Ok(v),
            _ => Err(self.type_mismatch("Struct")),
        }
    }

    pub fn type_mismatch(&self, expected: impl Into<String>) -> ValueTypeError {
        ValueTypeError::new(expected, self.variant_name())
    }

    /// Deep check that this value, including every container element, has the declared type.
    pub fn conforms_to(&self, data_type: &DataTypeDef) -> bool {
        match (self, data_type) {
            (Value::Bool(_), DataTypeDef::Bool)
            | (Value::Byte(_), DataTypeDef::Byte)
            | (Value::I16(_), DataTypeDef::I16)
            | (Value::I32(_), DataTypeDef::I32)
            | (Value::I64(_), DataTypeDef::I64)
            | (Value::Double(_), DataTypeDef::Double)
            | (Value::String(_), DataTypeDef::String)
            | (Value::Binary(_), DataTypeDef::Binary) => true,
            (Value::List(items), DataTypeDef::List(elem)) => {
                items.iter().all(|v| v.conforms_to(elem))
            }
            (Value::Set(items), DataTypeDef::Set(elem)) => items.iter().all(|v| v.conforms_to(elem)),
            (Value::Map(entries), DataTypeDef::Map { key, value }) => entries
                .iter()
                .all(|(k, v)| k.conforms_to(key) && v.conforms_to(value)),
            (Value::Struct(instance), DataTypeDef::Struct(schema)) => {
                Arc::ptr_eq(instance.schema(), schema) || **instance.schema() == **schema
            }
            _ => false,
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::Byte(_) => "Byte",
            Value::I16(_) => "I16",
            Value::I32(_) => "I32",
            Value::I64(_) => "I64",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::Binary(_) => "Binary",
            Value::List(_) => "List",
            Value::Set(_) => "Set",
            Value::Map(_) => "Map",
            Value::Struct(_) => "Struct",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Byte(_) => 1,
            Value::I16(_) => 2,
            Value::I32(_) => 3,
            Value::I64(_) => 4,
            Value::Double(_) => 5,
            Value::String(_) => 6,
            Value::Binary(_) => 7,
            Value::List(_) => 8,
            Value::Set(_) => 9,
            Value::Map(_) => 10,
            Value::Struct(_) => 11,
        }
    }
}

/// Containers order by size first, then entry by entry.
fn cmp_sized<T: Ord>(
    a_len: usize,
    a: impl Iterator<Item = T>,
    b_len: usize,
    b: impl Iterator<Item = T>,
) -> Ordering {
    a_len.cmp(&b_len).then_with(|| a.cmp(b))
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Byte(a), Value::Byte(b)) => a.cmp(b),
            (Value::I16(a), Value::I16(b)) => a.cmp(b),
            (Value::I32(a), Value::I32(b)) => a.cmp(b),
            (Value::I64(a), Value::I64(b)) => a.cmp(b),
            (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Binary(a), Value::Binary(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => cmp_sized(a.len(), a.iter(), b.len(), b.iter()),
            (Value::Set(a), Value::Set(b)) => cmp_sized(a.len(), a.iter(), b.len(), b.iter()),
            (Value::Map(a), Value::Map(b)) => cmp_sized(a.len(), a.iter(), b.len(), b.iter()),
            (Value::Struct(a), Value::Struct(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.rank());
        match self {
            Value::Bool(v) => v.hash(state),
            Value::Byte(v) => v.hash(state),
            Value::I16(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::Double(v) => v.to_bits().hash(state),
            Value::String(v) => v.hash(state),
            Value::Binary(v) => v.hash(state),
            Value::List(v) => v.hash(state),
            Value::Set(v) => {
                state.write_usize(v.len());
                v.iter().for_each(|item| item.hash(state));
            }
            Value::Map(v) => {
                state.write_usize(v.len());
                v.iter().for_each(|entry| entry.hash(state));
            }
            Value::Struct(v) => v.hash(state),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::Double(v) => write_double(*v, f),
            Value::String(v) => f.write_str(v),
            Value::Binary(v) => write_binary(v, f),
            Value::List(items) => write_seq(items.iter(), f),
            Value::Set(items) => write_seq(items.iter(), f),
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                f.write_str("}")
            }
            Value::Struct(v) => write!(f, "{v}"),
        }
    }
}

/// Decimal between 1e-3 and 1e7, scientific (`1.0E20`) outside it.
fn write_double(v: f64, f: &mut Formatter<'_>) -> fmt::Result {
    if v.is_nan() {
        return f.write_str("NaN");
    }
    if v.is_infinite() {
        return f.write_str(if v > 0.0 { "Infinity" } else { "-Infinity" });
    }
    let magnitude = v.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        return write!(f, "{v:?}");
    }
    let sci = format!("{v:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((&sci, "0"));
    if mantissa.contains('.') {
        write!(f, "{mantissa}E{exponent}")
    } else {
        write!(f, "{mantissa}.0E{exponent}")
    }
}

fn write_seq<'a>(items: impl Iterator<Item = &'a Value>, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

fn write_binary(bytes: &[u8], f: &mut Formatter<'_>) -> fmt::Result {
    for (i, b) in bytes.iter().take(BINARY_DISPLAY_LIMIT).enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{b:02X}")?;
    }
    if bytes.len() > BINARY_DISPLAY_LIMIT {
        f.write_str("...")?;
    }
    Ok(())
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Byte(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::I16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Arc::from(v))
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::binary(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(Arc::from(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<BTreeSet<Value>> for Value {
    fn from(v: BTreeSet<Value>) -> Self {
        Value::Set(v)
    }
}

impl From<BTreeMap<Value, Value>> for Value {
    fn from(v: BTreeMap<Value, Value>) -> Self {
        Value::Map(v)
    }
}

impl From<StructInstance> for Value {
    fn from(v: StructInstance) -> Self {
        Value::Struct(v)
    }
}
