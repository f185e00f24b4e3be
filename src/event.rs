//! The plain CloudEvents v1 envelope.
//!
//! [`CloudEvent`] carries a single generic payload and maps to JSON with the
//! default serde behaviour: absent optional attributes are omitted, and the
//! same validation as the builder runs when deserializing.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, FixedOffset, Utc};
use iri_string::types::UriReferenceString;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::attributes::{self, DEFAULT_DATA_CONTENT_TYPE, SPEC_VERSION};
use crate::error::ValidationError;
use crate::event_ext::CloudEventExt;

/// A CloudEvents v1 envelope with payload type `T`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "CloudEventRepr<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct CloudEvent<T> {
    id: Uuid,
    source: UriReferenceString,
    specversion: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    datacontenttype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dataschema: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "attributes::serialize_time"
    )]
    time: Option<DateTime<FixedOffset>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_base64: Option<String>,
}

/// Wire shape of [`CloudEvent`], validated on conversion.
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct CloudEventRepr<T> {
    id: Uuid,
    source: UriReferenceString,
    specversion: String,
    #[serde(rename = "type")]
    event_type: String,
    datacontenttype: Option<String>,
    dataschema: Option<Url>,
    subject: Option<String>,
    time: Option<DateTime<FixedOffset>>,
    data: Option<T>,
    data_base64: Option<String>,
}

impl<T> TryFrom<CloudEventRepr<T>> for CloudEvent<T> {
    type Error = ValidationError;

    fn try_from(repr: CloudEventRepr<T>) -> Result<Self, Self::Error> {
        let event = CloudEvent {
            id: repr.id,
            source: repr.source,
            specversion: repr.specversion,
            event_type: repr.event_type,
            datacontenttype: repr.datacontenttype,
            dataschema: repr.dataschema,
            subject: repr.subject,
            time: repr.time,
            data: repr.data,
            data_base64: repr.data_base64,
        };
        event.validate()?;
        Ok(event)
    }
}

impl<T> CloudEvent<T> {
    /// Start building an event with its three required attributes.
    ///
    /// # Example
    ///
    /// ```
    /// use cloudevent_json::{parse_source, CloudEvent};
    /// use uuid::Uuid;
    ///
    /// let event = CloudEvent::builder(
    ///     Uuid::parse_str("e0c9a45c-dbc1-11ec-929c-5be38bfa231a").unwrap(),
    ///     parse_source("/mycontext/subcontext").unwrap(),
    ///     "io.kjson.cloudevent.test",
    /// )
    /// .subject("Dummy")
    /// .data("String content".to_string())
    /// .build()
    /// .unwrap();
    ///
    /// assert_eq!(event.datacontenttype(), Some("application/json"));
    /// ```
    pub fn builder(id: Uuid, source: UriReferenceString, event_type: impl Into<String>) -> CloudEventBuilder<T> {
        CloudEventBuilder::new(id, source, event_type)
    }

    /// Start building an event with a random id and the current time.
    pub fn generate(source: UriReferenceString, event_type: impl Into<String>) -> CloudEventBuilder<T> {
        CloudEventBuilder::new(Uuid::new_v4(), source, event_type).time(Utc::now().fixed_offset())
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if self.specversion.is_empty() {
            return Err(ValidationError::EmptySpecVersion);
        }
        if self.event_type.is_empty() {
            return Err(ValidationError::EmptyType);
        }
        if self.datacontenttype.as_deref() == Some("") {
            return Err(ValidationError::EmptyDataContentType);
        }
        if self.subject.as_deref() == Some("") {
            return Err(ValidationError::EmptySubject);
        }
        if self.data.is_some() && self.data_base64.is_some() {
            return Err(ValidationError::DataConflict);
        }
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The `source` attribute, a URI-reference kept exactly as given.
    pub fn source(&self) -> &UriReferenceString {
        &self.source
    }

    pub fn specversion(&self) -> &str {
        &self.specversion
    }

    /// The `type` attribute.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn datacontenttype(&self) -> Option<&str> {
        self.datacontenttype.as_deref()
    }

    pub fn dataschema(&self) -> Option<&Url> {
        self.dataschema.as_ref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn time(&self) -> Option<&DateTime<FixedOffset>> {
        self.time.as_ref()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn data_base64(&self) -> Option<&str> {
        self.data_base64.as_deref()
    }

    /// Decode the `data_base64` payload, if there is one.
    pub fn decode_data_base64(&self) -> Option<Result<Vec<u8>, base64::DecodeError>> {
        self.data_base64.as_deref().map(|encoded| STANDARD.decode(encoded))
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Attach extension attributes to this event.
    pub fn with_extension<E>(self, extension: E) -> CloudEventExt<T, E> {
        CloudEventExt::from_parts(self, extension)
    }
}

/// Builder for [`CloudEvent`]; validation happens in [`CloudEventBuilder::build`].
#[derive(Debug, Clone)]
pub struct CloudEventBuilder<T> {
    event: CloudEvent<T>,
}

impl<T> CloudEventBuilder<T> {
    pub fn new(id: Uuid, source: UriReferenceString, event_type: impl Into<String>) -> Self {
        Self {
            event: CloudEvent {
                id,
                source,
                specversion: SPEC_VERSION.to_string(),
                event_type: event_type.into(),
                datacontenttype: Some(DEFAULT_DATA_CONTENT_TYPE.to_string()),
                dataschema: None,
                subject: None,
                time: None,
                data: None,
                data_base64: None,
            },
        }
    }

    pub fn specversion(mut self, specversion: impl Into<String>) -> Self {
        self.event.specversion = specversion.into();
        self
    }

    pub fn datacontenttype(mut self, datacontenttype: impl Into<String>) -> Self {
        self.event.datacontenttype = Some(datacontenttype.into());
        self
    }

    /// Drop the default `datacontenttype` so the attribute is omitted.
    pub fn without_datacontenttype(mut self) -> Self {
        self.event.datacontenttype = None;
        self
    }

    pub fn dataschema(mut self, dataschema: Url) -> Self {
        self.event.dataschema = Some(dataschema);
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.event.subject = Some(subject.into());
        self
    }

    pub fn time(mut self, time: DateTime<FixedOffset>) -> Self {
        self.event.time = Some(time);
        self
    }

    pub fn data(mut self, data: T) -> Self {
        self.event.data = Some(data);
        self
    }

    pub fn data_base64(mut self, encoded: impl Into<String>) -> Self {
        self.event.data_base64 = Some(encoded.into());
        self
    }

    /// Set `data_base64` from raw bytes.
    pub fn data_binary(self, bytes: &[u8]) -> Self {
        let encoded = STANDARD.encode(bytes);
        self.data_base64(encoded)
    }

    /// Move on to building an event with extension attributes.
    pub fn extension<E>(self, extension: E) -> crate::event_ext::CloudEventExtBuilder<T, E> {
        crate::event_ext::CloudEventExtBuilder::new(self, extension)
    }

    pub fn build(self) -> Result<CloudEvent<T>, ValidationError> {
        self.event.validate()?;
        Ok(self.event)
    }
}
