use strata_api::{ErrorKind, LoadError, PluginError, PrimitiveKind, SerializedFormat, WriteError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{names} column name(s) but {types} column type(s)")]
    Mismatch { names: usize, types: usize },

    #[error("column types, offset {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("duplicate field name '{name}'")]
    DuplicateField { name: String },
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("{path}: type {kind} cannot be written")]
    UnrepresentableType { path: String, kind: PrimitiveKind },

    #[error("{path}: expected {expected}, found {found}")]
    ShapeMismatch { path: String, expected: String, found: &'static str },

    #[error("{path}: map key '{key}' is not a valid {kind}")]
    InvalidMapKey { path: String, key: String, kind: PrimitiveKind },

    #[error("writer: {0}")]
    Writer(#[from] WriteError),

    #[error("{0} serialization is not supported")]
    UnsupportedEncoding(SerializedFormat),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("input contains no value")]
    Empty,

    #[error("input contains {count} top-level values, expected exactly one")]
    MultipleTopLevelValues { count: usize },

    #[error("{0} deserialization is not supported")]
    UnsupportedEncoding(SerializedFormat),

    #[error("parse: {0}")]
    Parse(#[from] LoadError),

    #[error("{path}: expected {expected}, found {found}")]
    TypeMismatch { path: String, expected: String, found: &'static str },

    #[error("{path}: map key '{key}' is not a valid {kind}")]
    InvalidMapKey { path: String, key: String, kind: PrimitiveKind },
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl EngineError {
    /// Add context to the error.
    ///
    /// `Config` gets the context prepended to its message; other variants
    /// carry structured data and are returned unchanged.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            EngineError::Config(msg) => EngineError::Config(format!("{ctx}: {msg}")),
            other => other,
        }
    }

    /// Convert to the host-facing error, choosing the kind by cause.
    pub fn into_plugin_error(self) -> PluginError {
        match self {
            EngineError::Config(msg) => PluginError::new(ErrorKind::Config, msg),
            EngineError::Schema(e) => PluginError::new(ErrorKind::Schema, e.to_string()),
            EngineError::Encode(EncodeError::Writer(e)) => e.into(),
            EngineError::Encode(e) => PluginError::new(ErrorKind::Record, e.to_string()),
            EngineError::Decode(e) => PluginError::new(ErrorKind::Record, e.to_string()),
        }
    }
}

impl From<EngineError> for PluginError {
    fn from(e: EngineError) -> Self {
        e.into_plugin_error()
    }
}

impl From<SchemaError> for PluginError {
    fn from(e: SchemaError) -> Self {
        EngineError::from(e).into_plugin_error()
    }
}

impl From<EncodeError> for PluginError {
    fn from(e: EncodeError) -> Self {
        EngineError::from(e).into_plugin_error()
    }
}

impl From<DecodeError> for PluginError {
    fn from(e: DecodeError) -> Self {
        EngineError::from(e).into_plugin_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_cause() {
        let schema: PluginError = SchemaError::Mismatch { names: 2, types: 3 }.into();
        assert_eq!(schema.kind(), ErrorKind::Schema);
        assert_eq!(schema.message(), "2 column name(s) but 3 column type(s)");

        let writer: PluginError = EncodeError::Writer(WriteError::NoFieldName).into();
        assert_eq!(writer.kind(), ErrorKind::Writer);

        let gate: PluginError = EncodeError::UnrepresentableType {
            path: "$.v".into(),
            kind: PrimitiveKind::Void,
        }
        .into();
        assert_eq!(gate.kind(), ErrorKind::Record);
        assert_eq!(gate.message(), "$.v: type void cannot be written");

        let empty: PluginError = DecodeError::Empty.into();
        assert_eq!(empty.kind(), ErrorKind::Record);
    }

    #[test]
    fn config_context() {
        let err = EngineError::Config("bad value".into()).with_context("serde.toml");
        assert_eq!(err.to_string(), "config error: serde.toml: bad value");
    }
}
