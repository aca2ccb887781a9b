use strata_api::{
    Field, FieldRef, HierarchicalValue, Schema, StructAccessor, TypeNode, ValueWriter, WriteError,
    as_record, shape_name,
};

use crate::error::EncodeError;
use crate::path;
use crate::validate;

// ═══════════════════════════════════════════════════════════════
//  Scope guard
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy)]
enum ScopeKind {
    Struct,
    List,
}

/// One open struct or list on the writer.
///
/// `close` ends the scope and reports writer errors; a scope dropped while
/// still open (error path) is ended on drop so the writer never keeps a
/// dangling scope.
struct Scope<'w> {
    writer: &'w mut dyn ValueWriter,
    kind: ScopeKind,
    open: bool,
}

impl<'w> Scope<'w> {
    fn begin(writer: &'w mut dyn ValueWriter, kind: ScopeKind) -> Result<Self, WriteError> {
        match kind {
            ScopeKind::Struct => writer.begin_struct()?,
            ScopeKind::List => writer.begin_list()?,
        }
        Ok(Self { writer, kind, open: true })
    }

    fn writer(&mut self) -> &mut dyn ValueWriter {
        &mut *self.writer
    }

    fn close(mut self) -> Result<(), WriteError> {
        self.open = false;
        self.end()
    }

    fn end(&mut self) -> Result<(), WriteError> {
        match self.kind {
            ScopeKind::Struct => self.writer.end_struct(),
            ScopeKind::List => self.writer.end_list(),
        }
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        if self.open {
            self.open = false;
            if let Err(e) = self.end() {
                tracing::trace!(error = %e, "failed to unwind writer scope");
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Encode
// ═══════════════════════════════════════════════════════════════

/// Encode one host record as a struct and return the writer's output.
///
/// Nothing is returned on failure; the writer is dropped with it.
pub fn encode(
    record: &dyn StructAccessor,
    schema: &Schema,
    mut writer: Box<dyn ValueWriter>,
) -> Result<Vec<u8>, EncodeError> {
    encode_into(record, schema, writer.as_mut())?;
    Ok(writer.finish()?)
}

/// Encode one host record as a struct into a caller-owned writer.
///
/// On error every scope opened by this call has been ended again.
pub fn encode_into(
    record: &dyn StructAccessor,
    schema: &Schema,
    writer: &mut dyn ValueWriter,
) -> Result<(), EncodeError> {
    encode_struct(record, schema.fields(), writer, path::ROOT)
}

fn encode_struct(
    record: &dyn StructAccessor,
    fields: &[Field],
    writer: &mut dyn ValueWriter,
    at: &str,
) -> Result<(), EncodeError> {
    let mut scope = Scope::begin(writer, ScopeKind::Struct)?;

    for (position, field) in fields.iter().enumerate() {
        scope.writer().set_field_name(&field.name)?;

        match record.field_value(FieldRef::new(position, &field.name)) {
            // Null is written as field absence.
            None | Some(HierarchicalValue::Null) => scope.writer().clear_field_name(),
            Some(value) => {
                let field_path = path::field(at, &field.name);
                encode_value(value, &field.field_type, scope.writer(), &field_path)?;
            }
        }
    }

    scope.close()?;
    Ok(())
}

fn encode_value(
    value: &HierarchicalValue,
    ty: &TypeNode,
    writer: &mut dyn ValueWriter,
    at: &str,
) -> Result<(), EncodeError> {
    match ty {
        TypeNode::Primitive(kind) => {
            if !kind.is_representable() {
                return Err(EncodeError::UnrepresentableType {
                    path: at.to_string(),
                    kind: *kind,
                });
            }
            // Anything written here must also pass decode validation.
            if !validate::accepts(*kind, value) {
                return Err(shape_mismatch(at, ty, value));
            }
            writer.write_value(value)?;
            Ok(())
        }
        TypeNode::Struct(fields) => {
            let record = as_record(value).ok_or_else(|| shape_mismatch(at, ty, value))?;
            encode_struct(record, fields, writer, at)
        }
        TypeNode::List(element) => {
            let HierarchicalValue::Array(items) = value else {
                return Err(shape_mismatch(at, ty, value));
            };
            let mut scope = Scope::begin(writer, ScopeKind::List)?;
            for (i, item) in items.iter().enumerate() {
                if item.is_null() {
                    // Positions are kept, so nulls stay explicit inside sequences.
                    scope.writer().write_value(item)?;
                } else {
                    encode_value(item, element, scope.writer(), &path::index(at, i))?;
                }
            }
            scope.close()?;
            Ok(())
        }
        TypeNode::Map { key: key_kind, value: value_type } => {
            let HierarchicalValue::Object(entries) = value else {
                return Err(shape_mismatch(at, ty, value));
            };
            let mut scope = Scope::begin(writer, ScopeKind::Struct)?;
            for (key, item) in entries {
                if item.is_null() {
                    continue;
                }
                let entry_path = path::field(at, key);
                if !key_kind.is_representable() {
                    return Err(EncodeError::UnrepresentableType {
                        path: entry_path,
                        kind: *key_kind,
                    });
                }
                if !validate::accepts_key(*key_kind, key) {
                    return Err(EncodeError::InvalidMapKey {
                        path: at.to_string(),
                        key: key.clone(),
                        kind: *key_kind,
                    });
                }
                scope.writer().set_field_name(key)?;
                encode_value(item, value_type, scope.writer(), &entry_path)?;
            }
            scope.close()?;
            Ok(())
        }
    }
}

fn shape_mismatch(at: &str, expected: &TypeNode, found: &HierarchicalValue) -> EncodeError {
    EncodeError::ShapeMismatch {
        path: at.to_string(),
        expected: expected.to_string(),
        found: shape_name(found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use format_ion_text::TextWriter;
    use serde_json::json;
    use strata_api::{PrimitiveKind, Row};

    use crate::schema_parser::parse_schema;

    fn encode_text(record: &HierarchicalValue, schema: &Schema) -> Result<String, EncodeError> {
        let record = as_record(record).expect("test records are structs");
        let bytes = encode(record, schema, Box::new(TextWriter::new()))?;
        Ok(String::from_utf8(bytes).unwrap())
    }

    #[test]
    fn flat_record_in_schema_order() {
        let schema = parse_schema("b,a", "int,string").unwrap();
        let out = encode_text(&json!({"a": "x", "b": 1}), &schema).unwrap();
        assert_eq!(out, r#"{b:1,a:"x"}"#);
    }

    #[test]
    fn null_and_missing_fields_are_omitted() {
        let schema = parse_schema("a,b,c", "int,int,int").unwrap();
        let out = encode_text(&json!({"a": 1, "b": null}), &schema).unwrap();
        assert_eq!(out, "{a:1}");
    }

    #[test]
    fn fields_outside_schema_are_dropped() {
        let schema = parse_schema("a", "int").unwrap();
        let out = encode_text(&json!({"a": 1, "extra": true}), &schema).unwrap();
        assert_eq!(out, "{a:1}");
    }

    #[test]
    fn positional_row() {
        let schema = parse_schema("id,point", "bigint,struct<x:double,y:double>").unwrap();
        let row = Row::new(vec![json!(7), json!([1.5, null])]);
        let bytes = encode(&row, &schema, Box::new(TextWriter::new())).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{id:7,point:{x:1.5e0}}");
    }

    #[test]
    fn unrepresentable_kinds_fail() {
        for ty in ["void", "unknown"] {
            let schema = parse_schema("a,v", &format!("int,{ty}")).unwrap();
            let err = encode_text(&json!({"a": 1, "v": "anything"}), &schema).unwrap_err();
            match err {
                EncodeError::UnrepresentableType { path, kind } => {
                    assert_eq!(path, "$.v");
                    assert!(!kind.is_representable());
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn nested_unrepresentable_reports_path() {
        let schema = parse_schema("a", "struct<b:struct<c:unknown>>").unwrap();
        let err = encode_text(&json!({"a": {"b": {"c": 1}}}), &schema).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::UnrepresentableType { ref path, kind: PrimitiveKind::Unknown } if path == "$.a.b.c"
        ));
    }

    #[test]
    fn shape_mismatches() {
        let schema = parse_schema("s", "struct<x:int>").unwrap();
        let err = encode_text(&json!({"s": 5}), &schema).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::ShapeMismatch { ref path, found: "number", .. } if path == "$.s"
        ));

        let schema = parse_schema("p", "int").unwrap();
        let err = encode_text(&json!({"p": {"x": 1}}), &schema).unwrap_err();
        assert!(matches!(err, EncodeError::ShapeMismatch { found: "struct", .. }));

        let err = encode_text(&json!({"p": "x"}), &schema).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::ShapeMismatch { ref path, ref expected, found: "string" }
                if path == "$.p" && expected == "int"
        ));

        let schema = parse_schema("l", "array<int>").unwrap();
        let err = encode_text(&json!({"l": "nope"}), &schema).unwrap_err();
        assert!(matches!(err, EncodeError::ShapeMismatch { ref expected, .. } if expected == "array<int>"));
    }

    #[test]
    fn lists_and_maps() {
        let schema = parse_schema("xs,m", "array<struct<k:int>>,map<string,array<int>>").unwrap();
        let out = encode_text(
            &json!({"xs": [{"k": 1}, null, {"k": null}], "m": {"p": [1, 2], "q": null}}),
            &schema,
        )
        .unwrap();
        assert_eq!(out, "{xs:[{k:1},null,{}],m:{p:[1,2]}}");
    }

    #[test]
    fn primitives_must_pass_decode_checks() {
        let cases = [
            ("tinyint", json!(300)),
            ("bigint", json!(1.5)),
            ("boolean", json!("true")),
            ("varchar(2)", json!("abc")),
            ("binary", json!("hello")),
        ];
        for (ty, value) in cases {
            let schema = parse_schema("v", ty).unwrap();
            let err = encode_text(&json!({ "v": value }), &schema).unwrap_err();
            assert!(matches!(err, EncodeError::ShapeMismatch { .. }), "{ty}: {err:?}");
        }

        let schema = parse_schema("b", "binary").unwrap();
        assert_eq!(encode_text(&json!({"b": "aGVsbG8="}), &schema).unwrap(), r#"{b:"aGVsbG8="}"#);
    }

    #[test]
    fn map_keys_are_checked() {
        let schema = parse_schema("m", "map<int,string>").unwrap();
        assert_eq!(
            encode_text(&json!({"m": {"1": "a", "x": null}}), &schema).unwrap(),
            r#"{m:{'1':"a"}}"#
        );

        let err = encode_text(&json!({"m": {"abc": "a"}}), &schema).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::InvalidMapKey { ref path, ref key, kind: PrimitiveKind::Int }
                if path == "$.m" && key == "abc"
        ));

        let schema = parse_schema("m", "map<void,int>").unwrap();
        assert_eq!(encode_text(&json!({"m": {}}), &schema).unwrap(), "{m:{}}");
        let err = encode_text(&json!({"m": {"k": 1}}), &schema).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::UnrepresentableType { ref path, kind: PrimitiveKind::Void } if path == "$.m.k"
        ));
    }

    #[test]
    fn list_element_errors_carry_index() {
        let schema = parse_schema("xs", "array<struct<k:void>>").unwrap();
        let err = encode_text(&json!({"xs": [{}, {"k": 1}]}), &schema).unwrap_err();
        assert!(matches!(err, EncodeError::UnrepresentableType { ref path, .. } if path == "$.xs[1].k"));
    }

    #[test]
    fn scopes_are_balanced_after_failure() {
        let schema = parse_schema("a,b", "struct<b:struct<c:int,d:array<void>>>,int").unwrap();
        let record = json!({"a": {"b": {"c": 1, "d": [1]}}, "b": 2});
        let mut writer = TextWriter::new();
        let err = encode_into(as_record(&record).unwrap(), &schema, &mut writer).unwrap_err();
        assert!(matches!(err, EncodeError::UnrepresentableType { .. }));
        assert_eq!(writer.depth(), 0);
    }

    #[test]
    fn empty_schema_writes_empty_struct() {
        let schema = parse_schema("", "").unwrap();
        assert_eq!(encode_text(&json!({"ignored": 1}), &schema).unwrap(), "{}");
    }
}
