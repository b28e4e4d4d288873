use std::fmt::{Error, Result, Write as _};

use super::{DataTypeDef, FieldDescriptor, StructSchema};

/// Render a struct shape as indented text, one field per entry.
///
/// Primitive fields fit on one line with their requirement. Compound fields
/// expand into `type:` blocks, and nested struct shapes expand recursively.
pub fn format_struct_schema(schema: &StructSchema) -> std::result::Result<String, Error> {
    let mut out = String::new();
    writeln!(out, "{}:", schema.name())?;
    for field in schema.fields() {
        format_field(field, 4, &mut out)?;
    }
    Ok(out)
}

fn format_field(field: &FieldDescriptor, indent: usize, out: &mut String) -> Result {
    let pad = " ".repeat(indent);
    let label = format!("{}: {}", field.id, field.name);
    if field.data_type.is_primitive() {
        writeln!(
            out,
            "{pad}{label}: {{ type: {}, requirement: {} }}",
            field.data_type.type_name(),
            field.requirement.as_str()
        )?;
    } else {
        writeln!(out, "{pad}{label}:")?;
        writeln!(out, "{pad}    requirement: {}", field.requirement.as_str())?;
        format_data_type(&field.data_type, indent + 4, out)?;
    }
    Ok(())
}

fn format_data_type(data_type: &DataTypeDef, indent: usize, out: &mut String) -> Result {
    let pad = " ".repeat(indent);
    writeln!(out, "{pad}type: {}", data_type.type_name())?;

    match data_type {
        DataTypeDef::Struct(schema) => {
            writeln!(out, "{pad}name: {}", schema.name())?;
            writeln!(out, "{pad}fields:")?;
            for child in schema.fields() {
                format_field(child, indent + 4, out)?;
            }
        }
        DataTypeDef::List(elem) | DataTypeDef::Set(elem) => {
            format_labeled_type("item", elem, indent, out)?;
        }
        DataTypeDef::Map { key, value } => {
            format_labeled_type("key", key, indent, out)?;
            format_labeled_type("value", value, indent, out)?;
        }
        _ => unreachable!("{data_type:?} is not a compound type"),
    }

    Ok(())
}

fn format_labeled_type(
    label: &str,
    data_type: &DataTypeDef,
    indent: usize,
    out: &mut String,
) -> Result {
    let pad = " ".repeat(indent);
    if data_type.is_primitive() {
        writeln!(out, "{pad}{label}: {{ type: {} }}", data_type.type_name())?;
    } else {
        writeln!(out, "{pad}{label}:")?;
        format_data_type(data_type, indent + 4, out)?;
    }
    Ok(())
}
