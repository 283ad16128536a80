//! Outgoing request construction.
//!
//! A [`RequestBuilder`] produces one [`OutgoingRequest`] per record by running
//! two separable steps from a [`RequestStrategy`]: `set_body` followed by
//! `set_header`. The stock strategies only differ in their body step; the
//! header step is a no-op unless a specialised strategy overrides it.
//! Credentials are not applied here; the dispatcher attaches them at send time.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};

use super::config::{HttpMethod, Serializer, Settings};
use super::serialise::{serialise_form, serialise_json};
use crate::record::Record;

/// Content type attached to JSON bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// An HTTP request described as plain data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingRequest {
    pub method: HttpMethod,
    /// Target path on the endpoint.
    pub path: String,
    pub body: Vec<u8>,
    /// Explicit content type; `None` leaves the client default in place.
    pub content_type: Option<String>,
    /// Pre-encoded `Authorization` header value.
    pub authorization: Option<String>,
    /// Extra headers added by a strategy's header step.
    pub headers: Vec<(String, String)>,
}

impl OutgoingRequest {
    /// Create a request with an empty body and no headers.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Vec::new(),
            content_type: None,
            authorization: None,
            headers: Vec::new(),
        }
    }

    /// Attach HTTP Basic credentials.
    pub fn basic_auth(&mut self, username: &str, password: &str) {
        let encoded = BASE64_STANDARD.encode(format!("{username}:{password}"));
        self.authorization = Some(format!("Basic {encoded}"));
    }

    /// Add a header to be sent alongside the request.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Body as text, for diagnostics.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Body and header steps used to shape a request for a record.
pub trait RequestStrategy: Send + Sync {
    /// Serialise the record into the request body.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialised.
    fn set_body(
        &self,
        request: &mut OutgoingRequest,
        record: &Record,
    ) -> Result<(), serde_json::Error>;

    /// Add headers derived from the record. Does nothing by default.
    fn set_header(&self, _request: &mut OutgoingRequest, _record: &Record) {}
}

/// Form-encoded body with the client's default content type.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormBody;

impl RequestStrategy for FormBody {
    fn set_body(
        &self,
        request: &mut OutgoingRequest,
        record: &Record,
    ) -> Result<(), serde_json::Error> {
        request.body = serialise_form(record.fields())?.into_bytes();
        Ok(())
    }
}

/// JSON body tagged with `application/json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonBody;

impl RequestStrategy for JsonBody {
    fn set_body(
        &self,
        request: &mut OutgoingRequest,
        record: &Record,
    ) -> Result<(), serde_json::Error> {
        request.body = serialise_json(record.fields())?.into_bytes();
        request.content_type = Some(JSON_CONTENT_TYPE.to_owned());
        Ok(())
    }
}

/// Select the stock strategy for a serializer.
pub fn strategy_for(serializer: Serializer) -> Box<dyn RequestStrategy> {
    match serializer {
        Serializer::Form => Box::new(FormBody),
        Serializer::Json => Box::new(JsonBody),
    }
}

/// Builds requests for a fixed method and path.
pub struct RequestBuilder {
    method: HttpMethod,
    path: String,
    strategy: Box<dyn RequestStrategy>,
}

impl RequestBuilder {
    /// Create a builder using the strategy matching `serializer`.
    pub fn new(method: HttpMethod, path: impl Into<String>, serializer: Serializer) -> Self {
        Self::with_strategy(method, path, strategy_for(serializer))
    }

    /// Create a builder from resolved settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.http_method,
            settings.endpoint.path(),
            settings.serializer,
        )
    }

    /// Create a builder with a custom strategy.
    pub fn with_strategy(
        method: HttpMethod,
        path: impl Into<String>,
        strategy: Box<dyn RequestStrategy>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            strategy,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Build the request for `record`. The body is attached for every method.
    ///
    /// # Errors
    ///
    /// Returns an error if the strategy cannot serialise the record.
    pub fn build(&self, record: &Record) -> Result<OutgoingRequest, serde_json::Error> {
        let mut request = OutgoingRequest::new(self.method, self.path.clone());
        self.strategy.set_body(&mut request, record)?;
        self.strategy.set_header(&mut request, record);
        Ok(request)
    }
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish()
    }
}
