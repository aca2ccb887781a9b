use std::collections::HashMap;

use serde::Deserialize;
use strata_api::SerializedFormat;

use crate::error::EngineError;

/// Table-property key of the comma-separated column names.
pub const COLUMNS: &str = "columns";
/// Table-property key of the column-type list.
pub const COLUMN_TYPES: &str = "columns.types";
/// Table-property key of the serialized representation (`text` | `binary`).
pub const ENCODING: &str = "ion.encoding";
/// Table-property key toggling schema validation of decoded values.
pub const DECODE_VALIDATE: &str = "ion.decode.validate";

/// Codec configuration, parsed from TOML or from table properties.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SerDeConfig {
    /// Comma-separated column names.
    pub columns: String,

    /// Column-type list, e.g. `int:string:struct<a:int>`.
    #[serde(alias = "columns.types")]
    pub column_types: String,

    /// Serialized record representation.
    #[serde(alias = "ion.encoding")]
    pub format: SerializedFormat,

    /// Check decoded values against the schema.
    pub validate_on_decode: bool,
}

impl Default for SerDeConfig {
    fn default() -> Self {
        Self {
            columns: String::new(),
            column_types: String::new(),
            format: SerializedFormat::Text,
            validate_on_decode: true,
        }
    }
}

impl SerDeConfig {
    pub fn new(columns: impl Into<String>, column_types: impl Into<String>) -> Self {
        Self {
            columns: columns.into(),
            column_types: column_types.into(),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: SerializedFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_validation(mut self, validate_on_decode: bool) -> Self {
        self.validate_on_decode = validate_on_decode;
        self
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content).map_err(|e| e.with_context(path))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Build configuration from table properties.
    ///
    /// Missing keys keep their defaults; unrecognized keys are ignored.
    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self, EngineError> {
        let mut config = Self::default();

        if let Some(columns) = props.get(COLUMNS) {
            config.columns = columns.clone();
        }
        if let Some(types) = props.get(COLUMN_TYPES) {
            config.column_types = types.clone();
        }
        if let Some(encoding) = props.get(ENCODING) {
            config.format = encoding
                .parse()
                .map_err(|e: String| EngineError::Config(format!("{ENCODING}: {e}")))?;
        }
        if let Some(validate) = props.get(DECODE_VALIDATE) {
            config.validate_on_decode = parse_bool(validate)
                .ok_or_else(|| EngineError::Config(format!("{DECODE_VALIDATE}: expected true or false, got {validate:?}")))?;
        }

        Ok(config)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
