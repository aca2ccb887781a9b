use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════
//  Primitive Kind
// ════════════════════════════════════════════════════════════════

/// Scalar categories of the column-type grammar.
///
/// `Void` and `Unknown` can be declared but never written: the encoder
/// rejects them field by field (see [`PrimitiveKind::is_representable`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Void,
    Boolean,
    /// `tinyint`
    Byte,
    /// `smallint`
    Short,
    Int,
    /// `bigint`
    Long,
    Float,
    Double,
    String,
    Char { length: u32 },
    Varchar { length: u32 },
    Date,
    Timestamp,
    Binary,
    Decimal { precision: u8, scale: u8 },
    IntervalYearMonth,
    IntervalDayTime,
    Unknown,
}

impl PrimitiveKind {
    /// Whether values of this kind have a representation in the target format.
    pub fn is_representable(self) -> bool {
        match self {
            PrimitiveKind::Void | PrimitiveKind::Unknown => false,
            PrimitiveKind::Boolean
            | PrimitiveKind::Byte
            | PrimitiveKind::Short
            | PrimitiveKind::Int
            | PrimitiveKind::Long
            | PrimitiveKind::Float
            | PrimitiveKind::Double
            | PrimitiveKind::String
            | PrimitiveKind::Char { .. }
            | PrimitiveKind::Varchar { .. }
            | PrimitiveKind::Date
            | PrimitiveKind::Timestamp
            | PrimitiveKind::Binary
            | PrimitiveKind::Decimal { .. }
            | PrimitiveKind::IntervalYearMonth
            | PrimitiveKind::IntervalDayTime => true,
        }
    }
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveKind::Void => write!(f, "void"),
            PrimitiveKind::Boolean => write!(f, "boolean"),
            PrimitiveKind::Byte => write!(f, "tinyint"),
            PrimitiveKind::Short => write!(f, "smallint"),
            PrimitiveKind::Int => write!(f, "int"),
            PrimitiveKind::Long => write!(f, "bigint"),
            PrimitiveKind::Float => write!(f, "float"),
            PrimitiveKind::Double => write!(f, "double"),
            PrimitiveKind::String => write!(f, "string"),
            PrimitiveKind::Char { length } => write!(f, "char({length})"),
            PrimitiveKind::Varchar { length } => write!(f, "varchar({length})"),
            PrimitiveKind::Date => write!(f, "date"),
            PrimitiveKind::Timestamp => write!(f, "timestamp"),
            PrimitiveKind::Binary => write!(f, "binary"),
            PrimitiveKind::Decimal { precision, scale } => {
                write!(f, "decimal({precision},{scale})")
            }
            PrimitiveKind::IntervalYearMonth => write!(f, "interval_year_month"),
            PrimitiveKind::IntervalDayTime => write!(f, "interval_day_time"),
            PrimitiveKind::Unknown => write!(f, "unknown"),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Type Node
// ════════════════════════════════════════════════════════════════

/// Declared type of a column or nested field. Drives both encode and
/// decode traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeNode {
    Primitive(PrimitiveKind),
    /// Ordered named fields, names unique within one level.
    Struct(Vec<Field>),
    /// `array<T>`, a sequence on the wire.
    List(Box<TypeNode>),
    /// `map<K,V>`, a struct on the wire, keys become field names.
    Map { key: PrimitiveKind, value: Box<TypeNode> },
}

impl TypeNode {
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeNode::Primitive(_))
    }

    /// Nested field list for struct types.
    pub fn struct_fields(&self) -> Option<&[Field]> {
        match self {
            TypeNode::Struct(fields) => Some(fields),
            _ => None,
        }
    }
}

impl From<PrimitiveKind> for TypeNode {
    fn from(kind: PrimitiveKind) -> Self {
        TypeNode::Primitive(kind)
    }
}

impl std::fmt::Display for TypeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeNode::Primitive(kind) => write!(f, "{kind}"),
            TypeNode::Struct(fields) => write_struct(f, fields),
            TypeNode::List(element) => write!(f, "array<{element}>"),
            TypeNode::Map { key, value } => write!(f, "map<{key},{value}>"),
        }
    }
}

fn write_struct(f: &mut std::fmt::Formatter<'_>, fields: &[Field]) -> std::fmt::Result {
    f.write_str("struct<")?;
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}:{}", field.name, field.field_type)?;
    }
    f.write_str(">")
}

// ════════════════════════════════════════════════════════════════
//  Field & Schema
// ════════════════════════════════════════════════════════════════

/// One named field of a struct or of the root schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: TypeNode,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: impl Into<TypeNode>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
        }
    }
}

/// Root record shape: ordered columns, equivalent to an anonymous struct.
///
/// Field position in `fields` is the column position the structured-value
/// accessor is queried with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// The schema viewed as a single struct type.
    pub fn as_struct_type(&self) -> TypeNode {
        TypeNode::Struct(self.fields.clone())
    }
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_struct(f, &self.fields)
    }
}
