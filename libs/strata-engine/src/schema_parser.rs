use std::collections::HashSet;

use strata_api::{Field, Schema};

use crate::error::SchemaError;
use crate::type_parser;

/// Build the root schema from the column-name list and the column-type list.
///
/// Blank names and blank types together give a zero-column schema. Names
/// and types are paired by position; their counts must match. Void and
/// unknown types are accepted here and rejected only when a value is
/// encoded.
pub fn parse_schema(column_names: &str, column_types: &str) -> Result<Schema, SchemaError> {
    let names = split_column_names(column_names)?;
    let types = type_parser::parse_type_list(column_types)?;

    if names.len() != types.len() {
        return Err(SchemaError::Mismatch {
            names: names.len(),
            types: types.len(),
        });
    }

    let mut seen = HashSet::with_capacity(names.len());
    for name in &names {
        if !seen.insert(name.as_str()) {
            return Err(SchemaError::DuplicateField { name: name.clone() });
        }
    }

    let fields = names
        .into_iter()
        .zip(types)
        .map(|(name, field_type)| Field { name, field_type })
        .collect();

    Ok(Schema::new(fields))
}

fn split_column_names(column_names: &str) -> Result<Vec<String>, SchemaError> {
    if column_names.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    let mut offset = 0;
    for raw in column_names.split(',') {
        let name = raw.trim();
        if name.is_empty() {
            return Err(SchemaError::Parse {
                position: offset,
                message: "empty column name".to_string(),
            });
        }
        names.push(name.to_string());
        offset += raw.len() + 1;
    }
    Ok(names)
}
