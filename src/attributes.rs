//! Standard CloudEvents attribute names and the helpers shared by the
//! plain envelope and the extension codec.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use iri_string::types::{UriReferenceStr, UriReferenceString};
use serde::Serializer;
use serde_json::{Map, Value};

/// The CloudEvents specification version produced by default.
pub const SPEC_VERSION: &str = "1.0";

/// The `datacontenttype` used when the caller does not pick one.
pub const DEFAULT_DATA_CONTENT_TYPE: &str = "application/json";

/// Every attribute name the envelope reserves. Any other top-level key is an
/// extension attribute.
pub const STANDARD_ATTRIBUTES: [&str; 10] = [
    "id",
    "source",
    "specversion",
    "type",
    "datacontenttype",
    "dataschema",
    "subject",
    "time",
    "data",
    "data_base64",
];

pub fn is_standard_attribute(key: &str) -> bool {
    STANDARD_ATTRIBUTES.contains(&key)
}

/// Split a serialized envelope into its standard entries and its extension
/// entries. Both halves keep the input order.
pub fn partition(object: &Map<String, Value>) -> (Map<String, Value>, Map<String, Value>) {
    let mut standard = Map::new();
    let mut extension = Map::new();
    for (key, value) in object {
        let half = if is_standard_attribute(key) {
            &mut standard
        } else {
            &mut extension
        };
        half.insert(key.clone(), value.clone());
    }
    tracing::trace!(
        standard = standard.len(),
        extension = extension.len(),
        "Partitioned envelope attributes"
    );
    (standard, extension)
}

/// Render a timestamp the way the envelope carries it: RFC 3339 with the
/// original offset, fractional seconds only when present.
pub fn format_time(time: &DateTime<FixedOffset>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a `source` attribute. Any RFC 3986 URI-reference is accepted,
/// including relative references, and the text is kept as given.
pub fn parse_source(raw: &str) -> Result<UriReferenceString, iri_string::validate::Error> {
    UriReferenceStr::new(raw).map(|uri| uri.to_owned())
}

pub fn parse_time(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw)
}

pub(crate) fn serialize_time<S: Serializer>(
    time: &Option<DateTime<FixedOffset>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match time {
        Some(time) => serializer.serialize_str(&format_time(time)),
        None => serializer.serialize_none(),
    }
}
