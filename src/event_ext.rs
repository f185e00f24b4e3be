//! The CloudEvents envelope with extension context attributes.

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use iri_string::types::UriReferenceString;
use url::Url;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::event::{CloudEvent, CloudEventBuilder};

/// An ordered string mapping, the usual extension type when the attribute
/// names are not known up front.
pub type ExtensionMap<V = String> = IndexMap<String, V>;

/// A CloudEvent with payload type `T` and extension attributes `E`.
///
/// `E` serializes to a JSON object whose entries sit next to the standard
/// attributes in the envelope (see [`crate::codec`]).
#[derive(Debug, Clone, PartialEq)]
pub struct CloudEventExt<T, E> {
    event: CloudEvent<T>,
    extension: E,
}

impl<T, E> CloudEventExt<T, E> {
    /// Start building an event with extension attributes.
    pub fn builder(
        id: Uuid,
        source: UriReferenceString,
        event_type: impl Into<String>,
        extension: E,
    ) -> CloudEventExtBuilder<T, E> {
        CloudEventBuilder::new(id, source, event_type).extension(extension)
    }

    /// Join an already validated event with its extension attributes.
    pub fn from_parts(event: CloudEvent<T>, extension: E) -> Self {
        Self { event, extension }
    }

    /// Split into the plain envelope and the extension attributes.
    pub fn without_extension(self) -> (CloudEvent<T>, E) {
        (self.event, self.extension)
    }

    /// The standard attributes as a plain [`CloudEvent`].
    pub fn event(&self) -> &CloudEvent<T> {
        &self.event
    }

    pub fn extension(&self) -> &E {
        &self.extension
    }

    pub fn into_extension(self) -> E {
        self.extension
    }

    pub fn id(&self) -> Uuid {
        self.event.id()
    }

    pub fn source(&self) -> &UriReferenceString {
        self.event.source()
    }

    pub fn specversion(&self) -> &str {
        self.event.specversion()
    }

    pub fn event_type(&self) -> &str {
        self.event.event_type()
    }

    pub fn datacontenttype(&self) -> Option<&str> {
        self.event.datacontenttype()
    }

    pub fn dataschema(&self) -> Option<&Url> {
        self.event.dataschema()
    }

    pub fn subject(&self) -> Option<&str> {
        self.event.subject()
    }

    pub fn time(&self) -> Option<&DateTime<FixedOffset>> {
        self.event.time()
    }

    pub fn data(&self) -> Option<&T> {
        self.event.data()
    }

    pub fn data_base64(&self) -> Option<&str> {
        self.event.data_base64()
    }

    pub fn decode_data_base64(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        self.event.decode_data_base64()
    }
}

/// Builder for [`CloudEventExt`].
#[derive(Debug, Clone)]
pub struct CloudEventExtBuilder<T, E> {
    event: CloudEventBuilder<T>,
    extension: E,
}

impl<T, E> CloudEventExtBuilder<T, E> {
    pub(crate) fn new(event: CloudEventBuilder<T>, extension: E) -> Self {
        Self { event, extension }
    }

    pub fn specversion(self, specversion: impl Into<String>) -> Self {
        self.map(|event| event.specversion(specversion))
    }

    pub fn datacontenttype(self, datacontenttype: impl Into<String>) -> Self {
        self.map(|event| event.datacontenttype(datacontenttype))
    }

    pub fn without_datacontenttype(self) -> Self {
        self.map(CloudEventBuilder::without_datacontenttype)
    }

    pub fn dataschema(self, dataschema: Url) -> Self {
        self.map(|event| event.dataschema(dataschema))
    }

    pub fn subject(self, subject: impl Into<String>) -> Self {
        self.map(|event| event.subject(subject))
    }

    pub fn time(self, time: DateTime<FixedOffset>) -> Self {
        self.map(|event| event.time(time))
    }

    pub fn data(self, data: T) -> Self {
        self.map(|event| event.data(data))
    }

    pub fn data_base64(self, encoded: impl Into<String>) -> Self {
        self.map(|event| event.data_base64(encoded))
    }

    pub fn data_binary(self, bytes: &[u8]) -> Self {
        self.map(|event| event.data_binary(bytes))
    }

    pub fn build(self) -> Result<CloudEventExt<T, E>, ValidationError> {
        let event = self.event.build()?;
        Ok(CloudEventExt::from_parts(event, self.extension))
    }

    fn map(self, f: impl FnOnce(CloudEventBuilder<T>) -> CloudEventBuilder<T>) -> Self {
        Self {
            event: f(self.event),
            extension: self.extension,
        }
    }
}
