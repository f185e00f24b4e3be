//! Codec registry for converting typed values to and from JSON values.
//!
//! Every type converts with its serde implementation unless a custom encoder
//! or decoder has been registered for it. Registration is keyed by the
//! concrete type, so a generic type gets one entry per instantiation.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::CodecConfig;
use crate::error::{CodecError, DecodeError, EncodeError};
use crate::event_ext::CloudEventExt;
use crate::pointer::JsonPointer;

type EncodeFn = Box<dyn Fn(&CodecRegistry, &dyn Any) -> Result<Value, EncodeError> + Send + Sync>;
type DecodeFn =
    Box<dyn Fn(&CodecRegistry, &Value) -> Result<Box<dyn Any>, DecodeError> + Send + Sync>;

/// Registry of per-type JSON conversions, plus the options they run with.
#[derive(Default)]
pub struct CodecRegistry {
    config: CodecConfig,
    encoders: HashMap<TypeId, EncodeFn>,
    decoders: HashMap<TypeId, DecodeFn>,
}

impl CodecRegistry {
    /// Create a registry with default options and no custom codecs
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Register a custom encoder for `V`.
    ///
    /// # Example
    ///
    /// ```
    /// use cloudevent_json::CodecRegistry;
    /// use serde_json::{json, Value};
    ///
    /// #[derive(serde::Serialize, serde::Deserialize)]
    /// struct Celsius(f64);
    ///
    /// let mut registry = CodecRegistry::new();
    /// registry.register_encoder(|_, c: &Celsius| Ok(json!({"celsius": c.0})));
    ///
    /// assert_eq!(registry.encode(&Celsius(21.5)).unwrap(), json!({"celsius": 21.5}));
    /// ```
    pub fn register_encoder<V, F>(&mut self, encoder: F)
    where
        V: 'static,
        F: Fn(&CodecRegistry, &V) -> Result<Value, EncodeError> + Send + Sync + 'static,
    {
        self.encoders.insert(
            TypeId::of::<V>(),
            Box::new(move |registry: &CodecRegistry, value: &dyn Any| match value.downcast_ref::<V>() {
                Some(value) => encoder(registry, value),
                None => Err(EncodeError::Serialize {
                    target: type_name::<V>().to_string(),
                    message: "registered encoder received a different type".to_string(),
                }),
            }),
        );
    }

    /// Register a custom decoder for `V`.
    pub fn register_decoder<V, F>(&mut self, decoder: F)
    where
        V: 'static,
        F: Fn(&CodecRegistry, &Value) -> Result<V, DecodeError> + Send + Sync + 'static,
    {
        self.decoders.insert(
            TypeId::of::<V>(),
            Box::new(move |registry: &CodecRegistry, value: &Value| {
                decoder(registry, value).map(|decoded| Box::new(decoded) as Box<dyn Any>)
            }),
        );
    }

    /// Route encoding of `CloudEventExt<T, E>` through the extension codec,
    /// with `T` and `E` themselves encoded by this registry.
    pub fn add_cloud_event_ext_to_json<T, E>(&mut self)
    where
        T: Serialize + 'static,
        E: Serialize + 'static,
    {
        self.register_encoder(|registry, event: &CloudEventExt<T, E>| {
            super::encode_cloud_event_ext(registry, event).map(Value::Object)
        });
    }

    /// Route decoding of `CloudEventExt<T, E>` through the extension codec,
    /// with `T` and `E` themselves decoded by this registry.
    pub fn add_cloud_event_ext_from_json<T, E>(&mut self)
    where
        T: DeserializeOwned + 'static,
        E: DeserializeOwned + 'static,
    {
        self.register_decoder(|registry, value| super::decode_cloud_event_ext::<T, E>(registry, value));
    }

    pub fn has_encoder<V: 'static>(&self) -> bool {
        self.encoders.contains_key(&TypeId::of::<V>())
    }

    pub fn has_decoder<V: 'static>(&self) -> bool {
        self.decoders.contains_key(&TypeId::of::<V>())
    }

    /// Convert `value` to JSON, using the registered encoder for `V` if any.
    pub fn encode<V>(&self, value: &V) -> Result<Value, EncodeError>
    where
        V: Serialize + 'static,
    {
        match self.encoders.get(&TypeId::of::<V>()) {
            Some(encoder) => encoder(self, value as &dyn Any),
            None => serde_json::to_value(value).map_err(|e| EncodeError::Serialize {
                target: type_name::<V>().to_string(),
                message: e.to_string(),
            }),
        }
    }

    /// Convert `value` to `V`, using the registered decoder for `V` if any.
    pub fn decode<V>(&self, value: &Value) -> Result<V, DecodeError>
    where
        V: DeserializeOwned + 'static,
    {
        match self.decoders.get(&TypeId::of::<V>()) {
            Some(decoder) => decoder(self, value)?
                .downcast::<V>()
                .map(|decoded| *decoded)
                .map_err(|_| {
                    DecodeError::type_error(
                        JsonPointer::root(),
                        type_name::<V>(),
                        value,
                        "registered decoder produced a different type",
                    )
                }),
            None => decode_with_serde(value),
        }
    }

    /// Serialize `value` to a JSON string, pretty-printed if configured.
    pub fn to_json_string<V>(&self, value: &V) -> Result<String, CodecError>
    where
        V: Serialize + 'static,
    {
        let json = self.encode(value)?;
        let text = if self.config.pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            serde_json::to_string(&json)?
        };
        Ok(text)
    }

    /// Parse a JSON string into `V`.
    pub fn from_json_str<V>(&self, text: &str) -> Result<V, CodecError>
    where
        V: DeserializeOwned + 'static,
    {
        let json: Value = serde_json::from_str(text)?;
        Ok(self.decode(&json)?)
    }
}

static NULL: Value = Value::Null;

/// Decode with serde, reporting the path of the failing value.
fn decode_with_serde<V: DeserializeOwned>(value: &Value) -> Result<V, DecodeError> {
    serde_path_to_error::deserialize::<_, V>(value).map_err(|err| {
        let path = JsonPointer::from(err.path());
        let found = path.resolve(value).unwrap_or(&NULL);
        DecodeError::type_error(path, type_name::<V>(), found, err.inner().to_string())
    })
}
