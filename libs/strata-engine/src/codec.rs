use std::sync::Arc;

use format_ion_text::IonTextBackend;
use strata_api::{
    DecodeStats, FormatBackend, HierarchicalValue, Schema, SerializedFormat, SerializedRecord,
    StructAccessor,
};

use crate::config::SerDeConfig;
use crate::decoder::Decoder;
use crate::encoder;
use crate::error::{DecodeError, EncodeError, EngineError};
use crate::schema_parser::parse_schema;

/// Schema-bound codec between host records and serialized hierarchical
/// values.
///
/// Immutable after `initialize`; encode and decode take `&self` and keep no
/// per-call state, so one codec may be shared across threads.
pub struct Codec {
    schema: Schema,
    format: SerializedFormat,
    validate_on_decode: bool,
    backend: Arc<dyn FormatBackend>,
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("schema", &self.schema)
            .field("format", &self.format)
            .field("validate_on_decode", &self.validate_on_decode)
            .finish_non_exhaustive()
    }
}

impl Codec {
    /// Build the schema from the configured column lists and bind the text
    /// backend.
    pub fn initialize(config: &SerDeConfig) -> Result<Self, EngineError> {
        Self::with_backend(config, Arc::new(IonTextBackend::new()))
    }

    pub fn with_backend(
        config: &SerDeConfig,
        backend: Arc<dyn FormatBackend>,
    ) -> Result<Self, EngineError> {
        let schema = parse_schema(&config.columns, &config.column_types)?;

        tracing::debug!(
            columns = schema.len(),
            format = %config.format,
            validate = config.validate_on_decode,
            "codec initialized"
        );

        Ok(Self {
            schema,
            format: config.format,
            validate_on_decode: config.validate_on_decode,
            backend,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn serialized_format(&self) -> SerializedFormat {
        self.format
    }

    pub fn validates_on_decode(&self) -> bool {
        self.validate_on_decode
    }

    /// Encode one host record as a single top-level struct.
    pub fn encode(&self, record: &dyn StructAccessor) -> Result<SerializedRecord, EncodeError> {
        if self.format != SerializedFormat::Text {
            return Err(EncodeError::UnsupportedEncoding(self.format));
        }

        let bytes = encoder::encode(record, &self.schema, self.backend.writer())?;
        tracing::trace!(bytes = bytes.len(), "record encoded");
        Ok(SerializedRecord::new(bytes, SerializedFormat::Text))
    }

    /// Decode a serialized record into exactly one hierarchical value.
    ///
    /// `stats` is updated even when decoding fails.
    pub fn decode(
        &self,
        raw: &SerializedRecord,
        stats: &mut DecodeStats,
    ) -> Result<HierarchicalValue, DecodeError> {
        if self.format != SerializedFormat::Text {
            stats.set_raw_data_size(raw.len());
            return Err(DecodeError::UnsupportedEncoding(self.format));
        }

        let result = Decoder::new(&self.schema, self.backend.loader())
            .validate(self.validate_on_decode)
            .decode(raw, stats);

        match &result {
            Ok(_) => tracing::trace!(bytes = stats.raw_data_size(), "record decoded"),
            Err(e) => tracing::warn!(bytes = stats.raw_data_size(), error = %e, "record rejected"),
        }
        result
    }
}
