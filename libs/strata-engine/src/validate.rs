//! Schema check of decoded values.
//!
//! Fields the schema does not declare are ignored, null fields count as
//! absent. Every declared field that is present must match its type. The
//! encoder applies the same primitive and map-key checks to host values.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Number;
use strata_api::{Field, HierarchicalValue, PrimitiveKind, Schema, TypeNode, shape_name};

use crate::error::DecodeError;
use crate::path;

/// Check a decoded top-level value against the schema.
pub fn check_record(value: &HierarchicalValue, schema: &Schema) -> Result<(), DecodeError> {
    check_struct(value, schema.fields(), path::ROOT, || schema.to_string())
}

fn check_struct(
    value: &HierarchicalValue,
    fields: &[Field],
    at: &str,
    describe: impl FnOnce() -> String,
) -> Result<(), DecodeError> {
    let HierarchicalValue::Object(map) = value else {
        return Err(mismatch(at, describe(), value));
    };

    for field in fields {
        match map.get(&field.name) {
            None | Some(HierarchicalValue::Null) => {}
            Some(v) => check_value(v, &field.field_type, &path::field(at, &field.name))?,
        }
    }
    Ok(())
}

fn check_value(value: &HierarchicalValue, ty: &TypeNode, at: &str) -> Result<(), DecodeError> {
    match ty {
        TypeNode::Primitive(kind) => {
            if accepts(*kind, value) {
                Ok(())
            } else {
                Err(mismatch(at, kind.to_string(), value))
            }
        }
        TypeNode::Struct(fields) => check_struct(value, fields, at, || ty.to_string()),
        TypeNode::List(element) => {
            let HierarchicalValue::Array(items) = value else {
                return Err(mismatch(at, ty.to_string(), value));
            };
            for (i, item) in items.iter().enumerate() {
                if !item.is_null() {
                    check_value(item, element, &path::index(at, i))?;
                }
            }
            Ok(())
        }
        TypeNode::Map { key: key_kind, value: value_type } => {
            let HierarchicalValue::Object(entries) = value else {
                return Err(mismatch(at, ty.to_string(), value));
            };
            for (key, item) in entries {
                if item.is_null() {
                    continue;
                }
                if !accepts_key(*key_kind, key) {
                    return Err(DecodeError::InvalidMapKey {
                        path: at.to_string(),
                        key: key.clone(),
                        kind: *key_kind,
                    });
                }
                check_value(item, value_type, &path::field(at, key))?;
            }
            Ok(())
        }
    }
}

/// Whether a non-null value is acceptable for a primitive kind.
pub(crate) fn accepts(kind: PrimitiveKind, value: &HierarchicalValue) -> bool {
    match kind {
        // Only null (already filtered out) would fit.
        PrimitiveKind::Void | PrimitiveKind::Unknown => false,
        PrimitiveKind::Boolean => value.is_boolean(),
        PrimitiveKind::Byte => fits_integer(value, i8::MIN.into(), i8::MAX.into()),
        PrimitiveKind::Short => fits_integer(value, i16::MIN.into(), i16::MAX.into()),
        PrimitiveKind::Int => fits_integer(value, i32::MIN.into(), i32::MAX.into()),
        PrimitiveKind::Long => value.is_i64(),
        PrimitiveKind::Float | PrimitiveKind::Double | PrimitiveKind::Decimal { .. } => value.is_number(),
        PrimitiveKind::String => value.is_string(),
        PrimitiveKind::Char { length } | PrimitiveKind::Varchar { length } => value
            .as_str()
            .is_some_and(|s| s.chars().count() <= length as usize),
        PrimitiveKind::Date
        | PrimitiveKind::Timestamp
        | PrimitiveKind::IntervalYearMonth
        | PrimitiveKind::IntervalDayTime => value.is_string(),
        PrimitiveKind::Binary => value.as_str().is_some_and(|s| STANDARD.decode(s).is_ok()),
    }
}

/// Whether a map key, always text in the hierarchy, spells a value of the
/// declared key kind.
pub(crate) fn accepts_key(kind: PrimitiveKind, key: &str) -> bool {
    let value = match kind {
        PrimitiveKind::Boolean => match key {
            "true" => HierarchicalValue::Bool(true),
            "false" => HierarchicalValue::Bool(false),
            _ => return false,
        },
        PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Int | PrimitiveKind::Long => {
            match key.parse::<i64>() {
                Ok(n) => HierarchicalValue::from(n),
                Err(_) => return false,
            }
        }
        PrimitiveKind::Float | PrimitiveKind::Double | PrimitiveKind::Decimal { .. } => {
            match key.parse::<f64>().ok().and_then(Number::from_f64) {
                Some(n) => HierarchicalValue::Number(n),
                None => return false,
            }
        }
        _ => HierarchicalValue::String(key.to_string()),
    };
    accepts(kind, &value)
}

fn fits_integer(value: &HierarchicalValue, min: i64, max: i64) -> bool {
    value.as_i64().is_some_and(|n| (min..=max).contains(&n))
}

fn mismatch(at: &str, expected: String, found: &HierarchicalValue) -> DecodeError {
    DecodeError::TypeMismatch {
        path: at.to_string(),
        expected,
        found: shape_name(found),
    }
}
