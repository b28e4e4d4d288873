use std::{
    collections::HashMap,
    fmt::{Display, Formatter, Result},
    sync::Arc,
};

use crate::error::SchemaError;

use super::{DataTypeDef, FieldDescriptor, Requirement};

/// Ordered field descriptors shared by every instance of one record type.
///
/// Declaration order is also the positional order of the compact encoding.
#[derive(Debug, Clone)]
pub struct StructSchema {
    name: String,
    fields: Vec<FieldDescriptor>,
    positions: HashMap<i16, usize>,
    optional_count: usize,
}

impl StructSchema {
    pub fn builder(name: impl Into<String>) -> StructSchemaBuilder {
        StructSchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Slot position of the field with `id`.
    pub fn position_of(&self, id: i16) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn field(&self, id: i16) -> Option<&FieldDescriptor> {
        self.position_of(id).map(|pos| &self.fields[pos])
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Number of OPTIONAL/DEFAULT fields; the width of the compact presence bit-vector.
    pub fn optional_count(&self) -> usize {
        self.optional_count
    }
}

impl PartialEq for StructSchema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.fields == other.fields
    }
}

impl Display for StructSchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = super::format_struct_schema(self)?;
        f.write_str(&text)
    }
}

/// Builder for [`StructSchema`]; fields are kept in call order.
#[derive(Debug)]
pub struct StructSchemaBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl StructSchemaBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn required(self, id: i16, name: impl Into<String>, data_type: DataTypeDef) -> Self {
        self.field(FieldDescriptor::new(id, name, data_type, Requirement::Required))
    }

    pub fn optional(self, id: i16, name: impl Into<String>, data_type: DataTypeDef) -> Self {
        self.field(FieldDescriptor::new(id, name, data_type, Requirement::Optional))
    }

    pub fn default_field(self, id: i16, name: impl Into<String>, data_type: DataTypeDef) -> Self {
        self.field(FieldDescriptor::new(id, name, data_type, Requirement::Default))
    }

    /// Check id/name uniqueness and freeze the shape.
    pub fn build(self) -> std::result::Result<Arc<StructSchema>, SchemaError> {
        let mut positions = HashMap::with_capacity(self.fields.len());
        let mut names = HashMap::with_capacity(self.fields.len());

        for (pos, field) in self.fields.iter().enumerate() {
            if field.id <= 0 {
                return Err(SchemaError::InvalidFieldId {
                    struct_name: self.name,
                    name: field.name.clone(),
                    id: field.id,
                });
            }
            if positions.insert(field.id, pos).is_some() {
                return Err(SchemaError::DuplicateFieldId {
                    struct_name: self.name,
                    id: field.id,
                });
            }
            if names.insert(field.name.as_str(), pos).is_some() {
                return Err(SchemaError::DuplicateFieldName {
                    struct_name: self.name.clone(),
                    name: field.name.clone(),
                });
            }
        }

        let optional_count = self.fields.iter().filter(|f| !f.is_required()).count();
        Ok(Arc::new(StructSchema {
            name: self.name,
            fields: self.fields,
            positions,
            optional_count,
        }))
    }
}
