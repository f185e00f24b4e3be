//! # cloudevent-json: CloudEvents v1 envelopes as JSON
//!
//! Typed CloudEvents envelopes and their mapping to and from JSON, including
//! extension context attributes that sit next to the standard attributes in
//! the same JSON object.
//!
//! ## Features
//!
//! - **Plain envelope**: [`CloudEvent<T>`] with a generic payload, validated at construction
//! - **Extension attributes**: [`CloudEventExt<T, E>`] flattens `E` into the envelope
//! - **Codec registry**: per-type JSON overrides that the extension codec honours for `T` and `E`
//! - **Path-aware errors**: decode failures carry the JSON pointer of the bad value
//!
//! ## Example
//!
//! ```
//! use cloudevent_json::{CloudEventExt, CodecRegistry, ExtensionMap};
//! use serde_json::json;
//!
//! let mut registry = CodecRegistry::new();
//! registry.add_cloud_event_ext_to_json::<serde_json::Value, ExtensionMap>();
//! registry.add_cloud_event_ext_from_json::<serde_json::Value, ExtensionMap>();
//!
//! let json = json!({
//!     "id": "274132d8-f2e2-11ec-9897-6f1fa956d500",
//!     "source": "https://kjson.io/test",
//!     "specversion": "1.0",
//!     "type": "test1",
//!     "value1": "Horse",
//!     "data": {"name": "Test Account"}
//! });
//!
//! let event: CloudEventExt<serde_json::Value, ExtensionMap> = registry.decode(&json).unwrap();
//! assert_eq!(event.extension().get("value1").map(String::as_str), Some("Horse"));
//!
//! let encoded = registry.encode(&event).unwrap();
//! assert_eq!(encoded["value1"], "Horse");
//! ```

pub mod attributes;
pub mod codec;
pub mod config;
pub mod error;
pub mod event;
pub mod event_ext;
pub mod pointer;

// Re-export key types
pub use attributes::{STANDARD_ATTRIBUTES, is_standard_attribute, parse_source};
pub use codec::{CodecRegistry, decode_cloud_event_ext, encode_cloud_event_ext};
pub use config::{CodecConfig, ReservedKeyPolicy};
pub use error::{CodecError, ConfigError, DecodeError, EncodeError, ValidationError};
pub use event::{CloudEvent, CloudEventBuilder};
pub use event_ext::{CloudEventExt, CloudEventExtBuilder, ExtensionMap};
pub use pointer::{JsonPointer, PathSegment};

pub use iri_string::types::UriReferenceString;
