use std::borrow::Cow;

use crate::value::{HierarchicalValue, Row};

/// Descriptor of a field being read: its declared name and its position in
/// the declaring struct. Keyed representations look up by name, positional
/// ones by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef<'a> {
    pub position: usize,
    pub name: &'a str,
}

impl<'a> FieldRef<'a> {
    pub fn new(position: usize, name: &'a str) -> Self {
        Self { position, name }
    }
}

/// Structured-value accessor. Reads fields out of one host record
/// representation.
///
/// The codec is written against this capability, not against a concrete
/// host type. A returned `Null` is treated exactly like `None`.
pub trait StructAccessor {
    /// All fields carried by the record, in the record's own order.
    fn fields_of(&self) -> Vec<(Cow<'_, str>, &HierarchicalValue)>;

    /// Value of one declared field, `None` when absent.
    fn field_value(&self, field: FieldRef<'_>) -> Option<&HierarchicalValue>;
}

/// Keyed representation: a struct value.
impl StructAccessor for serde_json::Map<String, HierarchicalValue> {
    fn fields_of(&self) -> Vec<(Cow<'_, str>, &HierarchicalValue)> {
        self.iter().map(|(name, value)| (Cow::Borrowed(name.as_str()), value)).collect()
    }

    fn field_value(&self, field: FieldRef<'_>) -> Option<&HierarchicalValue> {
        self.get(field.name)
    }
}

/// Positional representation: a sequence standing for a struct, one
/// element per declared field.
impl StructAccessor for Vec<HierarchicalValue> {
    fn fields_of(&self) -> Vec<(Cow<'_, str>, &HierarchicalValue)> {
        self.iter()
            .enumerate()
            .map(|(i, value)| (Cow::Owned(positional_name(i)), value))
            .collect()
    }

    fn field_value(&self, field: FieldRef<'_>) -> Option<&HierarchicalValue> {
        self.get(field.position)
    }
}

impl StructAccessor for Row {
    fn fields_of(&self) -> Vec<(Cow<'_, str>, &HierarchicalValue)> {
        self.0.fields_of()
    }

    fn field_value(&self, field: FieldRef<'_>) -> Option<&HierarchicalValue> {
        self.0.field_value(field)
    }
}

/// View a value as a record, if its shape allows it.
///
/// Structs are read by name, sequences by position.
pub fn as_record(value: &HierarchicalValue) -> Option<&dyn StructAccessor> {
    match value {
        HierarchicalValue::Object(map) => Some(map),
        HierarchicalValue::Array(items) => Some(items),
        _ => None,
    }
}

/// Internal column name of an unnamed position.
fn positional_name(position: usize) -> String {
    format!("_col{position}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keyed_lookup_ignores_position() {
        let value = json!({"b": 2, "a": 1});
        let record = as_record(&value).unwrap();
        assert_eq!(record.field_value(FieldRef::new(0, "a")), Some(&json!(1)));
        assert_eq!(record.field_value(FieldRef::new(0, "missing")), None);
    }

    #[test]
    fn positional_lookup_ignores_name() {
        let row = Row::new(vec![json!("x"), json!(null)]);
        assert_eq!(row.field_value(FieldRef::new(0, "whatever")), Some(&json!("x")));
        assert_eq!(row.field_value(FieldRef::new(1, "b")), Some(&json!(null)));
        assert_eq!(row.field_value(FieldRef::new(5, "c")), None);
    }

    #[test]
    fn fields_of_keeps_record_order() {
        let value = json!({"z": 1, "a": 2});
        let names: Vec<String> = as_record(&value)
            .unwrap()
            .fields_of()
            .into_iter()
            .map(|(name, _)| name.into_owned())
            .collect();
        assert_eq!(names, vec!["z", "a"]);

        let row = Row::new(vec![json!(1), json!(2)]);
        let names: Vec<String> = row.fields_of().into_iter().map(|(n, _)| n.into_owned()).collect();
        assert_eq!(names, vec!["_col0", "_col1"]);
    }

    #[test]
    fn scalars_are_not_records() {
        assert!(as_record(&json!(42)).is_none());
        assert!(as_record(&json!(null)).is_none());
    }
}
