use strata_api::{
    DecodeStats, HierarchicalValue, LoadError, Loader, Schema, SerializedFormat, SerializedRecord,
};

use crate::error::DecodeError;
use crate::validate;

/// Decodes serialized records of one schema.
pub struct Decoder<'a> {
    schema: &'a Schema,
    loader: &'a dyn Loader,
    validate: bool,
}

impl<'a> Decoder<'a> {
    /// Decoder with schema validation on.
    pub fn new(schema: &'a Schema, loader: &'a dyn Loader) -> Self {
        Self { schema, loader, validate: true }
    }

    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Load exactly one top-level value from `raw`.
    ///
    /// `stats.raw_data_size` is set to the untrimmed input length before
    /// anything else happens.
    pub fn decode(
        &self,
        raw: &SerializedRecord,
        stats: &mut DecodeStats,
    ) -> Result<HierarchicalValue, DecodeError> {
        stats.set_raw_data_size(raw.len());

        if raw.format() != SerializedFormat::Text {
            return Err(DecodeError::UnsupportedEncoding(raw.format()));
        }

        let text = raw.as_text().map_err(LoadError::from)?;
        let values = self.loader.load(text.trim())?;
        let value = single_value(values)?;

        if self.validate {
            validate::check_record(&value, self.schema)?;
        }
        Ok(value)
    }
}

fn single_value(values: Vec<HierarchicalValue>) -> Result<HierarchicalValue, DecodeError> {
    let count = values.len();
    let mut values = values.into_iter();
    match (values.next(), count) {
        (None, _) => Err(DecodeError::Empty),
        (Some(value), 1) => Ok(value),
        (Some(_), count) => Err(DecodeError::MultipleTopLevelValues { count }),
    }
}
