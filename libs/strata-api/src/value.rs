/// In-memory hierarchical value tree.
///
/// - object → struct (ordered field → value)
/// - array → sequence
/// - bool / number / string → scalar
/// - null → null
pub type HierarchicalValue = serde_json::Value;

/// Positional host row. Order matches `Schema.fields`.
///
/// `Null` (or a missing trailing position) means the column is absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(pub Vec<HierarchicalValue>);

impl Row {
    pub fn new(values: Vec<HierarchicalValue>) -> Self {
        Self(values)
    }
}

impl From<Vec<HierarchicalValue>> for Row {
    fn from(values: Vec<HierarchicalValue>) -> Self {
        Self(values)
    }
}

/// Short shape name used in mismatch errors.
pub fn shape_name(value: &HierarchicalValue) -> &'static str {
    match value {
        HierarchicalValue::Null => "null",
        HierarchicalValue::Bool(_) => "bool",
        HierarchicalValue::Number(_) => "number",
        HierarchicalValue::String(_) => "string",
        HierarchicalValue::Array(_) => "sequence",
        HierarchicalValue::Object(_) => "struct",
    }
}
