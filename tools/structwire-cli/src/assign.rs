//! Text field assignments: `field=value`, repeated for list/set fields,
//! and `field.key=value` for map entries.

use anyhow::{Context, Result, bail};
use structwire::core::{DataTypeDef, StructInstance, Value};

/// Parse `name=value` for clap.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{raw}'"))
}

/// Apply one assignment to `instance`.
pub fn apply(instance: &mut StructInstance, target: &str, text: &str) -> Result<()> {
    let (name, key) = match target.split_once('.') {
        Some((name, key)) => (name, Some(key)),
        None => (target, None),
    };
    let field = instance
        .schema()
        .field_by_name(name)
        .cloned()
        .with_context(|| format!("'{}' has no field '{name}'", instance.name()))?;

    match (&field.data_type, key) {
        (DataTypeDef::Map { key: key_type, value }, Some(key)) => {
            let key = parse_value(key_type, key)?;
            let value = parse_value(value, text)?;
            instance.put_to_map(field.id, key, value)?;
        }
        (DataTypeDef::Map { .. }, None) => bail!("map field '{name}' needs FIELD.KEY=VALUE"),
        (_, Some(_)) => bail!("field '{name}' is not a map"),
        (DataTypeDef::List(elem), None) => {
            instance.add_to_list(field.id, parse_value(elem, text)?)?;
        }
        (DataTypeDef::Set(elem), None) => {
            instance.add_to_set(field.id, parse_value(elem, text)?)?;
        }
        (data_type, None) => {
            instance.set(field.id, parse_value(data_type, text)?)?;
        }
    }
    Ok(())
}

fn parse_value(data_type: &DataTypeDef, text: &str) -> Result<Value> {
    let value = match data_type {
        DataTypeDef::Bool => Value::Bool(text.parse()?),
        DataTypeDef::Byte => Value::Byte(text.parse()?),
        DataTypeDef::I16 => Value::I16(text.parse()?),
        DataTypeDef::I32 => Value::I32(text.parse()?),
        DataTypeDef::I64 => Value::I64(text.parse()?),
        DataTypeDef::Double => Value::Double(text.parse()?),
        DataTypeDef::String => Value::from(text),
        DataTypeDef::Binary => Value::from(parse_hex(text)?),
        other => bail!("cannot parse {} values from text", other.signature()),
    };
    Ok(value)
}

/// Hex pairs, optionally separated by whitespace.
fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if !digits.is_ascii() || digits.len() % 2 != 0 {
        bail!("expected hex byte pairs, got '{text}'");
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("invalid hex byte '{}'", &digits[i..i + 2]))
        })
        .collect()
}
