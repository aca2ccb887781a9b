use std::collections::HashMap;

use serde_json::json;
use strata_api::{
    DecodeStats, ErrorKind, FieldRef, HierarchicalValue, MAX_NESTING, PluginError, Row,
    SerializedFormat, SerializedRecord, as_record,
};
use strata_engine::{Codec, DecodeError, EncodeError, EngineError, SchemaError, SerDeConfig};

fn codec(columns: &str, types: &str) -> Codec {
    Codec::initialize(&SerDeConfig::new(columns, types)).unwrap()
}

fn encode(codec: &Codec, record: &HierarchicalValue) -> Result<SerializedRecord, EncodeError> {
    codec.encode(as_record(record).unwrap())
}

fn decode(codec: &Codec, text: &str) -> Result<HierarchicalValue, DecodeError> {
    codec.decode(&SerializedRecord::text(text), &mut DecodeStats::new())
}

#[test]
fn test_round_trip() {
    let codec = codec(
        "id,name,score,active,address,tags,attrs",
        "bigint:string:double:boolean:struct<city:string,zip:int>:array<string>:map<string,int>",
    );
    let record = json!({
        "id": 42,
        "name": "ada",
        "score": 0.5,
        "active": true,
        "address": {"city": "Riga", "zip": 1010},
        "tags": ["a", "b"],
        "attrs": {"x": 1, "y": 2}
    });

    let raw = encode(&codec, &record).unwrap();
    let decoded = decode(&codec, raw.as_text().unwrap()).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn test_decoded_value_reads_back_through_accessor() {
    let codec = codec("a,b", "int,struct<c:string>");
    let decoded = decode(&codec, r#"{"a": 1, "b": {"c": "x"}}"#).unwrap();

    let record = as_record(&decoded).unwrap();
    assert_eq!(record.field_value(FieldRef::new(0, "a")), Some(&json!(1)));

    let reencoded = codec.encode(record).unwrap();
    assert_eq!(reencoded.as_text().unwrap(), r#"{a:1,b:{c:"x"}}"#);
}

#[test]
fn test_null_fields_are_omitted() {
    let codec = codec("a,b,c", "int,string,struct<d:int>");
    let raw = encode(&codec, &json!({"a": null, "b": "kept", "c": null})).unwrap();
    assert_eq!(raw.as_text().unwrap(), r#"{b:"kept"}"#);

    let decoded = decode(&codec, raw.as_text().unwrap()).unwrap();
    assert_eq!(decoded.get("a"), None);
}

#[test]
fn test_single_value_invariant() {
    let codec = codec("a", "int");
    assert!(matches!(decode(&codec, "   "), Err(DecodeError::Empty)));
    assert!(matches!(
        decode(&codec, r#"{"a":1} {"a":2}"#),
        Err(DecodeError::MultipleTopLevelValues { count: 2 })
    ));
    assert_eq!(decode(&codec, "\n{\"a\":1}\n").unwrap(), json!({"a": 1}));
}

#[test]
fn test_unrepresentable_type_gate() {
    let codec = codec("a,v", "int,void");

    // Absent values never reach the gate.
    let raw = encode(&codec, &json!({"a": 1})).unwrap();
    assert_eq!(raw.as_text().unwrap(), "{a:1}");

    let err = encode(&codec, &json!({"a": 1, "v": 0})).unwrap_err();
    assert!(matches!(err, EncodeError::UnrepresentableType { ref path, .. } if path == "$.v"));
}

#[test]
fn test_nested_struct_depth() {
    let codec = codec("a", "struct<b:struct<c:int>>");
    let record = json!({"a": {"b": {"c": 42}}});

    let raw = encode(&codec, &record).unwrap();
    assert_eq!(raw.as_text().unwrap(), "{a:{b:{c:42}}}");
    assert_eq!(decode(&codec, raw.as_text().unwrap()).unwrap(), record);
}

#[test]
fn test_empty_schema() {
    let codec = codec("", "");
    assert!(codec.schema().is_empty());

    let raw = codec.encode(&Row::new(Vec::new())).unwrap();
    assert_eq!(raw.as_text().unwrap(), "{}");
    assert_eq!(decode(&codec, "{}").unwrap(), json!({}));
}

#[test]
fn test_statistics_use_untrimmed_length() {
    let codec = codec("a", "int");
    let text = "\t {\"a\": 7}  \n";
    let mut stats = DecodeStats::new();

    codec.decode(&SerializedRecord::text(text), &mut stats).unwrap();
    assert_eq!(stats.raw_data_size(), text.len() as u64);

    // Failed decodes still report the size they were given.
    let mut stats = DecodeStats::new();
    assert!(codec.decode(&SerializedRecord::text("  "), &mut stats).is_err());
    assert_eq!(stats.raw_data_size(), 2);
}

#[test]
fn test_count_mismatch_is_rejected() {
    let err = Codec::initialize(&SerDeConfig::new("a,b,c", "int,int")).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Schema(SchemaError::Mismatch { names: 3, types: 2 })
    ));
}

#[test]
fn test_binary_format_fails_loudly() {
    let config = SerDeConfig::new("a", "int").with_format(SerializedFormat::Binary);
    let codec = Codec::initialize(&config).unwrap();

    assert!(matches!(
        encode(&codec, &json!({"a": 1})),
        Err(EncodeError::UnsupportedEncoding(SerializedFormat::Binary))
    ));
    assert!(matches!(
        decode(&codec, r#"{"a": 1}"#),
        Err(DecodeError::UnsupportedEncoding(SerializedFormat::Binary))
    ));
}

#[test]
fn test_decode_validation() {
    let codec = codec("id,point", "int,struct<x:double,y:double>");
    let err = decode(&codec, r#"{"id": 1, "point": {"x": "left"}}"#).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::TypeMismatch { ref path, found: "string", .. } if path == "$.point.x"
    ));

    let lenient = Codec::initialize(
        &SerDeConfig::new("id,point", "int,struct<x:double,y:double>").with_validation(false),
    )
    .unwrap();
    assert!(decode(&lenient, r#"{"id": 1, "point": {"x": "left"}}"#).is_ok());
}

#[test]
fn test_config_from_table_properties() {
    let props: HashMap<String, String> = [
        ("columns", "k,v"),
        ("columns.types", "string:array<int>"),
        ("ion.decode.validate", "false"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let codec = Codec::initialize(&SerDeConfig::from_properties(&props).unwrap()).unwrap();
    assert!(!codec.validates_on_decode());
    assert_eq!(codec.schema().to_string(), "struct<k:string,v:array<int>>");
}

#[test]
fn test_errors_surface_as_plugin_errors() {
    let err: PluginError = Codec::initialize(&SerDeConfig::new("a", "int,int"))
        .unwrap_err()
        .into();
    assert_eq!(err.kind(), ErrorKind::Schema);

    let codec = codec("a", "int");
    let err: PluginError = decode(&codec, "{").unwrap_err().into();
    assert_eq!(err.kind(), ErrorKind::Record);
    assert!(err.message().contains("line 1"));
}

#[test]
fn test_decodes_ion_text() {
    let codec = codec("a", "struct<b:struct<c:int>>");
    let expected = json!({"a": {"b": {"c": 42}}});

    assert_eq!(decode(&codec, "{a:{b:{c:42}}}").unwrap(), expected);
    assert_eq!(decode(&codec, "$ion_1_0 {a:{b:{c:42}}}").unwrap(), expected);
    assert_eq!(
        decode(&codec, "// header\n{ 'a': /* inline */ {b: row::{c: 0x2A}} }").unwrap(),
        expected
    );
}

#[test]
fn test_encode_rejects_what_decode_would_reject() {
    let codec = codec("a,t,b", "int,tinyint,binary");

    for record in [json!({"a": "x"}), json!({"t": 300}), json!({"b": "hello"})] {
        let err = encode(&codec, &record).unwrap_err();
        assert!(matches!(err, EncodeError::ShapeMismatch { .. }), "{record}: {err}");
    }

    let record = json!({"a": 1, "t": -128, "b": "aGVsbG8="});
    let raw = encode(&codec, &record).unwrap();
    assert_eq!(decode(&codec, raw.as_text().unwrap()).unwrap(), record);
}

#[test]
fn test_deep_schema_round_trips() {
    let levels = 200;
    let ty = format!("{}int{}", "struct<x:".repeat(levels), ">".repeat(levels));
    let codec = codec("a", &ty);

    let mut record = json!(7);
    for _ in 0..levels {
        record = json!({"x": record});
    }
    let record = json!({"a": record});

    let raw = encode(&codec, &record).unwrap();
    assert_eq!(decode(&codec, raw.as_text().unwrap()).unwrap(), record);
}

#[test]
fn test_schema_nesting_is_limited() {
    let deepest = MAX_NESTING - 1;
    let ty = format!("{}int{}", "array<".repeat(deepest), ">".repeat(deepest));
    assert!(Codec::initialize(&SerDeConfig::new("a", &ty)).is_ok());

    let ty = format!("array<{ty}>");
    let err = Codec::initialize(&SerDeConfig::new("a", &ty)).unwrap_err();
    assert!(matches!(err, EngineError::Schema(_)));

    let ty = "array<".repeat(100_000);
    assert!(Codec::initialize(&SerDeConfig::new("a", &ty)).is_err());
}

#[test]
fn test_map_keys_follow_key_type() {
    let int_keys = codec("m", "map<int,string>");
    let void_keys = codec("m", "map<void,int>");

    let record = json!({"m": {"1": "a", "-2": "b"}});
    let raw = encode(&int_keys, &record).unwrap();
    assert_eq!(decode(&int_keys, raw.as_text().unwrap()).unwrap(), record);

    let err = encode(&int_keys, &json!({"m": {"abc": "a"}})).unwrap_err();
    assert!(matches!(err, EncodeError::InvalidMapKey { ref key, .. } if key == "abc"));
    assert!(matches!(
        decode(&int_keys, r#"{m:{abc:"a"}}"#),
        Err(DecodeError::InvalidMapKey { .. })
    ));

    let err = encode(&void_keys, &json!({"m": {"k": 1}})).unwrap_err();
    assert!(matches!(err, EncodeError::UnrepresentableType { .. }));
}
