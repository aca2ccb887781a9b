use serde::{Deserialize, Serialize};

use crate::value::HierarchicalValue;

// ════════════════════════════════════════════════════════════════
//  Serialized Format
// ════════════════════════════════════════════════════════════════

/// Representation of a serialized record.
///
/// Only `Text` is implemented; `Binary` is declared so that asking for it
/// fails loudly instead of misreading bytes as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerializedFormat {
    #[default]
    Text,
    Binary,
}

impl std::fmt::Display for SerializedFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializedFormat::Text => write!(f, "text"),
            SerializedFormat::Binary => write!(f, "binary"),
        }
    }
}

impl std::str::FromStr for SerializedFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(SerializedFormat::Text),
            "binary" => Ok(SerializedFormat::Binary),
            other => Err(format!("unknown serialized format {other:?}, expected \"text\" or \"binary\"")),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Serialized Record
// ════════════════════════════════════════════════════════════════

/// Serialized bytes of one record together with their declared format.
///
/// Exchanged with the host in both directions: produced by encode,
/// consumed by decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializedRecord {
    bytes: Vec<u8>,
    format: SerializedFormat,
}

impl SerializedRecord {
    pub fn new(bytes: Vec<u8>, format: SerializedFormat) -> Self {
        Self { bytes, format }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text.into().into_bytes(), SerializedFormat::Text)
    }

    pub fn binary(bytes: Vec<u8>) -> Self {
        Self::new(bytes, SerializedFormat::Binary)
    }

    pub fn format(&self) -> SerializedFormat {
        self.format
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The bytes as UTF-8 text.
    pub fn as_text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.bytes)
    }
}

// ════════════════════════════════════════════════════════════════
//  Value Writer
// ════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("value written inside a struct without a field name")]
    NoFieldName,

    #[error("field name set outside of a struct")]
    NotInStruct,

    #[error("end_{expected} does not match the open scope")]
    ScopeMismatch { expected: &'static str },

    #[error("{depth} scope(s) still open at finish")]
    UnbalancedScope { depth: usize },
}

/// Stream-oriented writer of hierarchical values.
///
/// Every `begin_*` must be matched by the corresponding `end_*`. Inside a
/// struct, each value (scalar or nested scope) is preceded by
/// `set_field_name`.
pub trait ValueWriter {
    fn begin_struct(&mut self) -> Result<(), WriteError>;
    fn end_struct(&mut self) -> Result<(), WriteError>;
    fn begin_list(&mut self) -> Result<(), WriteError>;
    fn end_list(&mut self) -> Result<(), WriteError>;

    /// Name the next value written into the current struct.
    fn set_field_name(&mut self, name: &str) -> Result<(), WriteError>;

    /// Drop a pending field name without writing a value.
    fn clear_field_name(&mut self);

    /// Write an already-built value at the current position.
    fn write_value(&mut self, value: &HierarchicalValue) -> Result<(), WriteError>;

    /// Number of scopes currently open.
    fn depth(&self) -> usize;

    /// Consume the writer and return the serialized output.
    fn finish(self: Box<Self>) -> Result<Vec<u8>, WriteError>;
}

// ════════════════════════════════════════════════════════════════
//  Loader
// ════════════════════════════════════════════════════════════════

/// Malformed input rejected by a [`Loader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub message: String,
    /// 1-based `(line, column)` when the loader can tell.
    pub position: Option<(usize, usize)>,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), position: None }
    }

    pub fn at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self { message: message.into(), position: Some((line, column)) }
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some((line, column)) => write!(f, "{} at line {line} column {column}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::str::Utf8Error> for LoadError {
    fn from(e: std::str::Utf8Error) -> Self {
        Self::new(format!("input is not valid UTF-8: {e}"))
    }
}

/// Deepest container nesting a loader accepts, the top-level struct
/// included. Column types may nest one level less.
pub const MAX_NESTING: usize = 256;

/// Parses raw text into its sequence of top-level values.
pub trait Loader: Send + Sync {
    fn load(&self, text: &str) -> Result<Vec<HierarchicalValue>, LoadError>;
}

// ════════════════════════════════════════════════════════════════
//  Format Backend
// ════════════════════════════════════════════════════════════════

/// Format backend: a factory for writers plus a shared loader.
///
/// - `writer()`: fresh writer per encode call; writers are never shared.
/// - `loader()`: stateless, shared by all decode calls.
pub trait FormatBackend: Send + Sync {
    fn writer(&self) -> Box<dyn ValueWriter>;
    fn loader(&self) -> &dyn Loader;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_str() {
        assert_eq!("TEXT".parse::<SerializedFormat>(), Ok(SerializedFormat::Text));
        assert_eq!(" binary ".parse::<SerializedFormat>(), Ok(SerializedFormat::Binary));
        assert!("csv".parse::<SerializedFormat>().is_err());
    }

    #[test]
    fn record_text_view() {
        let record = SerializedRecord::text("{a:1}");
        assert_eq!(record.format(), SerializedFormat::Text);
        assert_eq!(record.len(), 5);
        assert_eq!(record.as_text().ok(), Some("{a:1}"));

        let bad = SerializedRecord::new(vec![0xff, 0xfe], SerializedFormat::Text);
        assert!(bad.as_text().is_err());
    }

    #[test]
    fn load_error_display() {
        assert_eq!(LoadError::at("expected value", 1, 4).to_string(), "expected value at line 1 column 4");
        assert_eq!(LoadError::new("truncated").to_string(), "truncated");
    }
}
