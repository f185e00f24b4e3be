//! Integration tests for CloudEvent JSON conversion with extension attributes

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use cloudevent_json::{
    parse_source, CloudEvent, CloudEventExt, CodecConfig, CodecError, CodecRegistry, DecodeError,
    EncodeError, ExtensionMap, ReservedKeyPolicy, UriReferenceString,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountOpen {
    account_id: Uuid,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Extension1 {
    ext1: String,
    ext2: Uuid,
}

fn uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).unwrap()
}

fn source(raw: &str) -> UriReferenceString {
    parse_source(raw).unwrap()
}

fn event_time() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(10 * 3600)
        .unwrap()
        .with_ymd_and_hms(2022, 6, 23, 22, 21, 27)
        .unwrap()
        + Duration::milliseconds(456)
}

fn account() -> AccountOpen {
    AccountOpen {
        account_id: uuid("a0dfa09a-f2ef-11ec-80fc-137c580906c5"),
        name: "Test Account".to_string(),
    }
}

fn struct_event() -> CloudEventExt<AccountOpen, Extension1> {
    CloudEventExt::builder(
        uuid("274132d8-f2e2-11ec-9897-6f1fa956d500"),
        source("https://kjson.io/test"),
        "test1",
        Extension1 {
            ext1: "Fred".to_string(),
            ext2: uuid("88adcea0-f2e2-11ec-abd8-cb487f52b4aa"),
        },
    )
    .subject("ABC")
    .time(event_time())
    .data(account())
    .build()
    .unwrap()
}

fn map_event() -> CloudEventExt<AccountOpen, ExtensionMap> {
    let mut extension = ExtensionMap::new();
    extension.insert("value1".to_string(), "Horse".to_string());
    extension.insert("value2".to_string(), "Zebra".to_string());

    CloudEventExt::builder(
        uuid("274132d8-f2e2-11ec-9897-6f1fa956d500"),
        source("https://kjson.io/test2"),
        "test1",
        extension,
    )
    .subject("ABC")
    .time(event_time())
    .data(account())
    .build()
    .unwrap()
}

fn registry_for<T, E>() -> CodecRegistry
where
    T: Serialize + serde::de::DeserializeOwned + 'static,
    E: Serialize + serde::de::DeserializeOwned + 'static,
{
    let mut registry = CodecRegistry::new();
    registry.add_cloud_event_ext_to_json::<T, E>();
    registry.add_cloud_event_ext_from_json::<T, E>();
    registry
}

#[test]
fn test_serialize_struct_extension() {
    let registry = registry_for::<AccountOpen, Extension1>();

    let json = registry.encode(&struct_event()).unwrap();

    assert_eq!(
        json,
        json!({
            "id": "274132d8-f2e2-11ec-9897-6f1fa956d500",
            "source": "https://kjson.io/test",
            "specversion": "1.0",
            "type": "test1",
            "datacontenttype": "application/json",
            "subject": "ABC",
            "time": "2022-06-23T22:21:27.456+10:00",
            "ext1": "Fred",
            "ext2": "88adcea0-f2e2-11ec-abd8-cb487f52b4aa",
            "data": {
                "accountId": "a0dfa09a-f2ef-11ec-80fc-137c580906c5",
                "name": "Test Account"
            }
        })
    );
    assert!(json.get("extension").is_none());
}

#[test]
fn test_serialize_keeps_canonical_order() {
    let registry = registry_for::<AccountOpen, Extension1>();

    let json = registry.encode(&struct_event()).unwrap();

    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "id",
            "source",
            "specversion",
            "type",
            "datacontenttype",
            "subject",
            "time",
            "ext1",
            "ext2",
            "data"
        ]
    );
}

#[test]
fn test_serialize_map_extension_exhaustive() {
    let registry = registry_for::<AccountOpen, ExtensionMap>();

    let json = registry.encode(&map_event()).unwrap();
    let object = json.as_object().unwrap();

    assert_eq!(object.len(), 10);
    assert_eq!(object.get("value1"), Some(&json!("Horse")));
    assert_eq!(object.get("value2"), Some(&json!("Zebra")));
    assert_eq!(object.get("source"), Some(&json!("https://kjson.io/test2")));
}

#[test]
fn test_round_trip_struct_extension() {
    let registry = registry_for::<AccountOpen, Extension1>();
    let event = struct_event();

    let text = registry.to_json_string(&event).unwrap();
    let decoded: CloudEventExt<AccountOpen, Extension1> = registry.from_json_str(&text).unwrap();

    assert_eq!(decoded, event);
    assert_eq!(decoded.extension().ext1, "Fred");
    assert_eq!(decoded.data().unwrap().name, "Test Account");
    assert_eq!(decoded.time(), Some(&event_time()));
}

#[test]
fn test_round_trip_map_extension() {
    let registry = registry_for::<AccountOpen, ExtensionMap>();
    let event = map_event();

    let text = registry.to_json_string(&event).unwrap();
    let decoded: CloudEventExt<AccountOpen, ExtensionMap> = registry.from_json_str(&text).unwrap();

    assert_eq!(decoded.extension().len(), 2);
    assert_eq!(decoded.extension().get("value1").map(String::as_str), Some("Horse"));
    assert_eq!(decoded.extension().get("value2").map(String::as_str), Some("Zebra"));
    assert_eq!(decoded, event);
}

#[test]
fn test_report_error_path_in_data() {
    let mut data = ExtensionMap::new();
    data.insert("accountId".to_string(), "123456789".to_string());
    data.insert("name".to_string(), "Test Account".to_string());
    let event = CloudEventExt::builder(
        uuid("274132d8-f2e2-11ec-9897-6f1fa956d500"),
        source("https://kjson.io/test"),
        "test1",
        Extension1 {
            ext1: "Fred".to_string(),
            ext2: uuid("88adcea0-f2e2-11ec-abd8-cb487f52b4aa"),
        },
    )
    .data(data)
    .build()
    .unwrap();

    let mut registry = CodecRegistry::new();
    registry.add_cloud_event_ext_to_json::<ExtensionMap, Extension1>();
    registry.add_cloud_event_ext_from_json::<AccountOpen, Extension1>();

    let text = registry.to_json_string(&event).unwrap();
    let err = registry
        .from_json_str::<CloudEventExt<AccountOpen, Extension1>>(&text)
        .unwrap_err();

    match err {
        CodecError::Decode(DecodeError::Type { path, target, value, message }) => {
            assert_eq!(path.to_string(), "/data/accountId");
            assert!(target.ends_with("AccountOpen"));
            assert_eq!(value, "\"123456789\"");
            assert!(message.to_lowercase().contains("uuid"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_optional_attributes_omitted() {
    let registry = registry_for::<AccountOpen, Extension1>();
    let event = struct_event();
    assert!(event.dataschema().is_none());

    let json = registry.encode(&event).unwrap();

    assert!(json.get("dataschema").is_none());
    assert!(json.get("data_base64").is_none());
}

#[test]
fn test_dataschema_round_trip() {
    let registry = registry_for::<AccountOpen, Extension1>();
    let (event, extension) = struct_event().without_extension();
    assert!(event.data().is_some());
    let event = CloudEventExt::builder(event.id(), event.source().clone(), event.event_type(), extension)
        .dataschema(Url::parse("https://kjson.io/schema/account.json").unwrap())
        .data(account())
        .build()
        .unwrap();

    let json = registry.encode(&event).unwrap();
    assert_eq!(json["dataschema"], "https://kjson.io/schema/account.json");

    let decoded: CloudEventExt<AccountOpen, Extension1> = registry.decode(&json).unwrap();
    assert_eq!(decoded, event);
}

#[test]
fn test_non_object_extension_rejected() {
    let mut registry = CodecRegistry::new();
    registry.register_encoder(|_, extension: &Extension1| Ok(json!([extension.ext1])));
    registry.add_cloud_event_ext_to_json::<AccountOpen, Extension1>();

    let err = registry.to_json_string(&struct_event()).unwrap_err();

    match err {
        CodecError::Encode(EncodeError::ExtensionNotObject { kind }) => assert_eq!(kind, "array"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_registered_codecs_apply_to_extension_and_data() {
    let mut registry = registry_for::<AccountOpen, Extension1>();
    registry.register_encoder(|_, extension: &Extension1| {
        Ok(json!({"ext1": extension.ext1.to_uppercase(), "ext2": extension.ext2}))
    });
    registry.register_encoder(|_, account: &AccountOpen| Ok(json!({"name": account.name})));

    let json = registry.encode(&struct_event()).unwrap();

    assert_eq!(json["ext1"], "FRED");
    assert_eq!(json["data"], json!({"name": "Test Account"}));
}

#[test]
fn test_reserved_extension_key_policy() {
    let mut extension = ExtensionMap::new();
    extension.insert("subject".to_string(), "shadow".to_string());
    let event = CloudEvent::<AccountOpen>::builder(
        uuid("274132d8-f2e2-11ec-9897-6f1fa956d500"),
        source("https://kjson.io/test"),
        "test1",
    )
    .subject("ABC")
    .build()
    .unwrap()
    .with_extension(extension);

    let strict = registry_for::<AccountOpen, ExtensionMap>();
    let err = strict.encode(&event).unwrap_err();
    assert_eq!(err.to_string(), "extension attribute 'subject' shadows a standard attribute");

    let mut lenient = CodecRegistry::with_config(CodecConfig {
        reserved_keys: ReservedKeyPolicy::Overwrite,
        ..CodecConfig::default()
    });
    lenient.add_cloud_event_ext_to_json::<AccountOpen, ExtensionMap>();
    let json = lenient.encode(&event).unwrap();
    assert_eq!(json["subject"], "shadow");
}

#[test]
fn test_decode_extension_keys_in_input_order() {
    let registry = registry_for::<Value, ExtensionMap<Value>>();
    let json = json!({
        "zulu": 1,
        "id": "274132d8-f2e2-11ec-9897-6f1fa956d500",
        "source": "https://kjson.io/test",
        "alpha": {"nested": true},
        "specversion": "1.0",
        "type": "test1",
        "mike": null
    });

    let event: CloudEventExt<Value, ExtensionMap<Value>> = registry.decode(&json).unwrap();

    let keys: Vec<&str> = event.extension().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["zulu", "alpha", "mike"]);
    assert_eq!(event.extension()["alpha"], json!({"nested": true}));
}

#[test]
fn test_plain_event_serializes_without_registry() {
    let event = CloudEvent::builder(
        uuid("e0c9a45c-dbc1-11ec-929c-5be38bfa231a"),
        source("http://kjson.io/test"),
        "io.kjson.cloudevent.test",
    )
    .subject("Dummy")
    .time(event_time())
    .data(account())
    .build()
    .unwrap();

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["data"]["accountId"], "a0dfa09a-f2ef-11ec-80fc-137c580906c5");
    assert_eq!(json["time"], "2022-06-23T22:21:27.456+10:00");

    let decoded: CloudEvent<AccountOpen> = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, event);
}

#[test]
fn test_shipped_config_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/cloudevent.yaml");

    let config = CodecConfig::load_from_file(path).unwrap();

    assert_eq!(config, CodecConfig::default());
}

#[test]
fn test_relative_source_round_trip() {
    let registry = registry_for::<AccountOpen, ExtensionMap>();
    let text = r#"{"id":"274132d8-f2e2-11ec-9897-6f1fa956d500","source":"/mycontext/subcontext","specversion":"1.0","type":"test1","value1":"Horse"}"#;

    let event: CloudEventExt<AccountOpen, ExtensionMap> = registry.from_json_str(text).unwrap();
    assert_eq!(event.source().as_str(), "/mycontext/subcontext");

    assert_eq!(registry.to_json_string(&event).unwrap(), text);
}
