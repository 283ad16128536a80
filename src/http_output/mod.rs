//! HTTP output: one HTTP request per record.
//!
//! Records handed to an [`EmissionLoop`] are passed one at a time to the
//! [`Dispatcher`], which consults the [`RateLimiter`], serialises the record
//! through a [`RequestStrategy`] and sends it over a connection owned by the
//! [`ConnectionManager`].
//!
//! # Serialization Formats
//!
//! - **Form** (default): `application/x-www-form-urlencoded` bodies of
//!   `key=value` pairs in record order. The content type is left to the HTTP
//!   client default.
//! - **JSON**: the record fields as a JSON object, sent as
//!   `application/json`.
//!
//! # Failure Semantics
//!
//! - **2xx**: delivered.
//! - **Any other status**: logged at warn level, never raised.
//! - **Transport errors**: logged at warn level, raised only when
//!   `raise_on_error` is set.
//!
//! Nothing is retried.

mod config;
mod connection;
mod dispatcher;
mod emission;
mod output;
mod rate_limit;
mod request;
mod serialise;
mod url_encoding;


pub use config::{
    AuthMode, Credentials, DEFAULT_RATE_LIMIT_MSEC, DEFAULT_REUSE_LIMIT, Endpoint, HttpMethod,
    Secret, Serializer, Settings, SettingsBuilder, Validation,
};
pub use connection::{
    Connection, ConnectionManager, Connector, DEFAULT_CONTENT_TYPE, HttpResponse, Session,
    UreqConnector,
};
pub use dispatcher::{Dispatcher, MAX_BODY_SNIPPET, SendOutcome};
pub use emission::{Chain, EmissionLoop, EmissionSummary, NullChain};
pub use output::HttpOutput;
pub use rate_limit::{RateLimiter, TimeProvider, system_time_provider};
pub use request::{
    FormBody, JSON_CONTENT_TYPE, JsonBody, OutgoingRequest, RequestBuilder, RequestStrategy,
    strategy_for,
};
pub use serialise::{serialise_form, serialise_json};
