//! JSON conversion for [`CloudEventExt`].
//!
//! Extension context attributes live in the same JSON object as the standard
//! attributes, so the serde derive used for [`crate::CloudEvent`] is not
//! enough. Decoding partitions the object by key: standard keys fill the
//! envelope, and everything else is gathered into one object and decoded as
//! the extension type `E`. Encoding writes the standard attributes, then the
//! entries of the encoded extension object, then `data` and `data_base64`.
//!
//! `T` and `E` themselves go through a [`CodecRegistry`], so any per-type
//! codec registered there applies to the payload and extension as well.

pub mod registry;

use std::any::type_name;
use std::convert::Infallible;
use std::fmt::Display;

use serde::de::{DeserializeOwned, Error as _};
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use url::Url;
use uuid::Uuid;

use crate::attributes::{self, is_standard_attribute};
use crate::config::ReservedKeyPolicy;
use crate::error::{kind_of, DecodeError, EncodeError};
use crate::event::CloudEventBuilder;
use crate::event_ext::CloudEventExt;
use crate::pointer::JsonPointer;

pub use registry::CodecRegistry;

/// Convert a JSON object into a [`CloudEventExt`].
///
/// # Errors
///
/// - [`DecodeError::MissingField`] if `id`, `source`, `specversion` or
///   `type` is absent or null
/// - [`DecodeError::Type`] if a value cannot be converted to its target
///   type, with the JSON pointer of that value
/// - [`DecodeError::Validation`] if the decoded attributes break an
///   envelope invariant
pub fn decode_cloud_event_ext<T, E>(
    registry: &CodecRegistry,
    value: &Value,
) -> Result<CloudEventExt<T, E>, DecodeError>
where
    T: DeserializeOwned + 'static,
    E: DeserializeOwned + 'static,
{
    let object = value.as_object().ok_or_else(|| {
        DecodeError::type_error(
            JsonPointer::root(),
            type_name::<CloudEventExt<T, E>>(),
            value,
            format!("expected an object, found {}", kind_of(value)),
        )
    })?;
    let (standard, extension) = attributes::partition(object);
    tracing::debug!(
        extensions = extension.len(),
        "Decoding CloudEvent with extension attributes"
    );

    let extension: E = registry.decode(&Value::Object(extension))?;

    let id = required_attribute(&standard, "id", "uuid::Uuid", Uuid::parse_str)?;
    let source = required_attribute(
        &standard,
        "source",
        "iri_string::types::UriReferenceString",
        attributes::parse_source,
    )?;
    let specversion = required_attribute(&standard, "specversion", "String", text)?;
    let event_type = required_attribute(&standard, "type", "String", text)?;
    let datacontenttype = optional_attribute(&standard, "datacontenttype", "String", text)?;
    let dataschema = optional_attribute(&standard, "dataschema", "url::Url", Url::parse)?;
    let subject = optional_attribute(&standard, "subject", "String", text)?;
    let time = optional_attribute(
        &standard,
        "time",
        "chrono::DateTime<chrono::FixedOffset>",
        attributes::parse_time,
    )?;
    let data = match standard.get("data") {
        None | Some(Value::Null) => None,
        Some(data) => Some(registry.decode::<T>(data).map_err(|e| e.within("data"))?),
    };
    let data_base64 = optional_attribute(&standard, "data_base64", "String", text)?;

    let mut builder = CloudEventBuilder::new(id, source, event_type).specversion(specversion);
    builder = match datacontenttype {
        Some(datacontenttype) => builder.datacontenttype(datacontenttype),
        None => builder.without_datacontenttype(),
    };
    if let Some(dataschema) = dataschema {
        builder = builder.dataschema(dataschema);
    }
    if let Some(subject) = subject {
        builder = builder.subject(subject);
    }
    if let Some(time) = time {
        builder = builder.time(time);
    }
    if let Some(data) = data {
        builder = builder.data(data);
    }
    if let Some(data_base64) = data_base64 {
        builder = builder.data_base64(data_base64);
    }

    Ok(builder.extension(extension).build()?)
}

/// Convert a [`CloudEventExt`] into a single flat JSON object.
///
/// # Errors
///
/// - [`EncodeError::ExtensionNotObject`] if `E` does not encode to an object
/// - [`EncodeError::ReservedExtensionKey`] if an extension key is a standard
///   attribute name and the registry's policy is
///   [`ReservedKeyPolicy::Reject`], or if it is `data` or `data_base64`
///   under any policy
/// - [`EncodeError::Serialize`] if `T` or `E` fails to serialize
pub fn encode_cloud_event_ext<T, E>(
    registry: &CodecRegistry,
    event: &CloudEventExt<T, E>,
) -> Result<Map<String, Value>, EncodeError>
where
    T: Serialize + 'static,
    E: Serialize + 'static,
{
    let mut object = Map::new();
    object.insert("id".to_string(), Value::String(event.id().to_string()));
    object.insert("source".to_string(), Value::String(event.source().as_str().to_string()));
    object.insert("specversion".to_string(), Value::String(event.specversion().to_string()));
    object.insert("type".to_string(), Value::String(event.event_type().to_string()));
    if let Some(datacontenttype) = event.datacontenttype() {
        object.insert("datacontenttype".to_string(), Value::String(datacontenttype.to_string()));
    }
    if let Some(dataschema) = event.dataschema() {
        object.insert("dataschema".to_string(), Value::String(dataschema.to_string()));
    }
    if let Some(subject) = event.subject() {
        object.insert("subject".to_string(), Value::String(subject.to_string()));
    }
    if let Some(time) = event.time() {
        object.insert("time".to_string(), Value::String(attributes::format_time(time)));
    }

    let extension = match registry.encode(event.extension())? {
        Value::Object(extension) => extension,
        other => {
            return Err(EncodeError::ExtensionNotObject {
                kind: kind_of(&other),
            })
        }
    };
    let extension_count = extension.len();
    for (key, value) in extension {
        if is_standard_attribute(&key) {
            // A payload key in the extension would be read back as the payload.
            if is_payload_attribute(&key) {
                return Err(EncodeError::ReservedExtensionKey { key });
            }
            match registry.config().reserved_keys {
                ReservedKeyPolicy::Reject => return Err(EncodeError::ReservedExtensionKey { key }),
                ReservedKeyPolicy::Overwrite => {
                    tracing::warn!(key = %key, "Extension attribute overwrites a standard attribute")
                }
            }
        }
        object.insert(key, value);
    }

    if let Some(data) = event.data() {
        object.insert("data".to_string(), registry.encode(data)?);
    }
    if let Some(data_base64) = event.data_base64() {
        object.insert("data_base64".to_string(), Value::String(data_base64.to_string()));
    }

    tracing::debug!(
        id = %event.id(),
        extensions = extension_count,
        "Encoded CloudEvent with extension attributes"
    );
    Ok(object)
}

fn is_payload_attribute(key: &str) -> bool {
    key == "data" || key == "data_base64"
}

fn text(raw: &str) -> Result<String, Infallible> {
    Ok(raw.to_string())
}

fn optional_attribute<V, Err, P>(
    standard: &Map<String, Value>,
    key: &str,
    target: &str,
    parse: P,
) -> Result<Option<V>, DecodeError>
where
    Err: Display,
    P: FnOnce(&str) -> Result<V, Err>,
{
    let value = match standard.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };
    let pointer = JsonPointer::root().prefixed(key);
    let raw = value.as_str().ok_or_else(|| {
        DecodeError::type_error(
            pointer.clone(),
            target,
            value,
            format!("expected a string, found {}", kind_of(value)),
        )
    })?;
    parse(raw)
        .map(Some)
        .map_err(|e| DecodeError::type_error(pointer, target, value, e.to_string()))
}

fn required_attribute<V, Err, P>(
    standard: &Map<String, Value>,
    key: &str,
    target: &str,
    parse: P,
) -> Result<V, DecodeError>
where
    Err: Display,
    P: FnOnce(&str) -> Result<V, Err>,
{
    optional_attribute(standard, key, target, parse)?.ok_or_else(|| DecodeError::MissingField {
        field: key.to_string(),
        path: JsonPointer::root().prefixed(key),
    })
}

/// Serializes through [`encode_cloud_event_ext`] with a fresh
/// [`CodecRegistry::new`]: the default [`ReservedKeyPolicy::Reject`] applies
/// and no registered codecs are consulted. Use [`CodecRegistry::encode`] to
/// honour a configured registry.
impl<T, E> Serialize for CloudEventExt<T, E>
where
    T: Serialize + 'static,
    E: Serialize + 'static,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode_cloud_event_ext(&CodecRegistry::new(), self)
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

/// Deserializes through [`decode_cloud_event_ext`] with a fresh
/// [`CodecRegistry::new`], so `T` and `E` decode with plain serde and no
/// registered decoders are consulted. Use [`CodecRegistry::decode`] to
/// honour a configured registry.
impl<'de, T, E> Deserialize<'de> for CloudEventExt<T, E>
where
    T: DeserializeOwned + 'static,
    E: DeserializeOwned + 'static,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode_cloud_event_ext(&CodecRegistry::new(), &value).map_err(D::Error::custom)
    }
}
