//! Struct instances: one optional typed slot per field of a [`StructSchema`].

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::{
    error::{CodecError, FieldError},
    schema::{DataTypeDef, FieldDescriptor, StructSchema},
    value::Value,
};

/// A record of one struct shape. `None` slots are unset.
///
/// Setters type-check against the field descriptor, so a set slot always
/// conforms to its declared type. `Clone` is a deep copy: containers are owned
/// by the instance and never shared with the caller.
#[derive(Debug, Clone)]
pub struct StructInstance {
    schema: Arc<StructSchema>,
    slots: Vec<Option<Value>>,
}

impl StructInstance {
    pub fn new(schema: Arc<StructSchema>) -> Self {
        let slots = vec![None; schema.len()];
        Self { schema, slots }
    }

    pub fn schema(&self) -> &Arc<StructSchema> {
        &self.schema
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn get(&self, id: i16) -> Option<&Value> {
        self.schema
            .position_of(id)
            .and_then(|pos| self.slots[pos].as_ref())
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.schema
            .field_by_name(name)
            .and_then(|field| self.get(field.id))
    }

    pub fn is_set(&self, id: i16) -> bool {
        self.get(id).is_some()
    }

    /// Assign a field, replacing any previous value.
    pub fn set(&mut self, id: i16, value: impl Into<Value>) -> Result<&mut Self, FieldError> {
        self.set_opt(id, Some(value.into()))
    }

    /// Assign or, with `None`, unset a field.
    pub fn set_opt(&mut self, id: i16, value: Option<Value>) -> Result<&mut Self, FieldError> {
        let pos = self.position(id)?;
        if let Some(v) = &value {
            check_type(&self.schema.fields()[pos], v)?;
        }
        self.slots[pos] = value;
        Ok(self)
    }

    pub fn set_by_name(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<&mut Self, FieldError> {
        let id = self.id_of(name)?;
        self.set(id, value)
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, id: i16, value: impl Into<Value>) -> Result<Self, FieldError> {
        self.set(id, value)?;
        Ok(self)
    }

    /// Unset a field, returning its previous value.
    pub fn unset(&mut self, id: i16) -> Result<Option<Value>, FieldError> {
        let pos = self.position(id)?;
        Ok(self.slots[pos].take())
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Insert one entry into a map field, creating the map when the field is unset.
    pub fn put_to_map(
        &mut self,
        id: i16,
        key: impl Into<Value>,
        value: impl Into<Value>,
    ) -> Result<&mut Self, FieldError> {
        let pos = self.position(id)?;
        let field = &self.schema.fields()[pos];
        let DataTypeDef::Map {
            key: key_type,
            value: value_type,
        } = &field.data_type
        else {
            return Err(mismatch(field, "Map"));
        };
        let (key, value) = (key.into(), value.into());
        check_element(field, key_type, &key)?;
        check_element(field, value_type, &value)?;

        let slot = self.slots[pos].get_or_insert_with(|| Value::Map(BTreeMap::new()));
        if let Value::Map(entries) = slot {
            entries.insert(key, value);
        }
        Ok(self)
    }

    /// Append one element to a list field, creating the list when the field is unset.
    pub fn add_to_list(&mut self, id: i16, item: impl Into<Value>) -> Result<&mut Self, FieldError> {
        let pos = self.position(id)?;
        let field = &self.schema.fields()[pos];
        let DataTypeDef::List(elem) = &field.data_type else {
            return Err(mismatch(field, "List"));
        };
        let item = item.into();
        check_element(field, elem, &item)?;

        let slot = self.slots[pos].get_or_insert_with(|| Value::List(Vec::new()));
        if let Value::List(items) = slot {
            items.push(item);
        }
        Ok(self)
    }

    /// Insert one element into a set field, creating the set when the field is unset.
    pub fn add_to_set(&mut self, id: i16, item: impl Into<Value>) -> Result<&mut Self, FieldError> {
        let pos = self.position(id)?;
        let field = &self.schema.fields()[pos];
        let DataTypeDef::Set(elem) = &field.data_type else {
            return Err(mismatch(field, "Set"));
        };
        let item = item.into();
        check_element(field, elem, &item)?;

        let slot = self.slots[pos].get_or_insert_with(|| Value::Set(BTreeSet::new()));
        if let Value::Set(items) = slot {
            items.insert(item);
        }
        Ok(self)
    }

    /// Number of entries in a container field; 0 when unset or not a container.
    pub fn container_len(&self, id: i16) -> usize {
        match self.get(id) {
            Some(Value::List(v)) => v.len(),
            Some(Value::Set(v)) => v.len(),
            Some(Value::Map(v)) => v.len(),
            _ => 0,
        }
    }

    /// Descriptors paired with their slots, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, Option<&Value>)> {
        self.schema
            .fields()
            .iter()
            .zip(self.slots.iter().map(Option::as_ref))
    }

    /// Fail if any REQUIRED field is unset.
    pub fn validate(&self) -> Result<(), CodecError> {
        match self
            .fields()
            .find(|(field, slot)| field.is_required() && slot.is_none())
        {
            Some((field, _)) => Err(CodecError::Validation {
                struct_name: self.name().to_string(),
                field: field.name.clone(),
                rendered: self.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn position(&self, id: i16) -> Result<usize, FieldError> {
        self.schema
            .position_of(id)
            .ok_or_else(|| FieldError::UnknownId {
                struct_name: self.name().to_string(),
                id,
            })
    }

    fn id_of(&self, name: &str) -> Result<i16, FieldError> {
        self.schema
            .field_by_name(name)
            .map(|field| field.id)
            .ok_or_else(|| FieldError::UnknownName {
                struct_name: self.name().to_string(),
                name: name.to_string(),
            })
    }
}

fn check_type(field: &FieldDescriptor, value: &Value) -> Result<(), FieldError> {
    if value.conforms_to(&field.data_type) {
        Ok(())
    } else {
        Err(FieldError::TypeMismatch {
            field: field.name.clone(),
            expected: field.data_type.signature(),
            actual: value.variant_name(),
        })
    }
}

fn check_element(
    field: &FieldDescriptor,
    elem: &DataTypeDef,
    value: &Value,
) -> Result<(), FieldError> {
    if value.conforms_to(elem) {
        Ok(())
    } else {
        Err(FieldError::TypeMismatch {
            field: field.name.clone(),
            expected: elem.signature(),
            actual: value.variant_name(),
        })
    }
}

fn mismatch(field: &FieldDescriptor, container: &'static str) -> FieldError {
    FieldError::TypeMismatch {
        field: field.name.clone(),
        expected: field.data_type.signature(),
        actual: container,
    }
}

/// Shape name first, then each field in declaration order: unset < set, then by value.
impl Ord for StructInstance {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name()
            .cmp(other.name())
            .then_with(|| self.slots.cmp(&other.slots))
    }
}

impl PartialOrd for StructInstance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for StructInstance {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StructInstance {}

impl Hash for StructInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for slot in &self.slots {
            state.write_u8(slot.is_some() as u8);
            if let Some(v) = slot {
                v.hash(state);
            }
        }
    }
}

/// `Name(field:value, ...)`: REQUIRED fields always, others only when set.
impl Display for StructInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name())?;
        let mut first = true;
        for (field, slot) in self.fields() {
            if slot.is_none() && !field.is_required() {
                continue;
            }
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}:", field.name)?;
            match slot {
                Some(v) => write!(f, "{v}")?,
                None => f.write_str("null")?,
            }
            first = false;
        }
        f.write_str(")")
    }
}
