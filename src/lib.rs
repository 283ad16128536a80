//! HTTP output plugin: forwards each log record to an HTTP endpoint as a
//! single request.
//!
//! Configuration arrives as a [`RawConfig`] (string pairs or an INI section)
//! and is resolved into typed [`Settings`]. [`HttpOutput`] wires the settings
//! to a `ureq`-backed connector and the `log` facade; the lower-level
//! [`Dispatcher`] and [`EmissionLoop`] accept injected collaborators.

pub mod error;
pub mod file_config;
pub mod http_output;
pub mod output_log;
pub mod record;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use error::{ConfigError, OutputError, TransportError};
pub use file_config::RawConfig;
pub use http_output::{
    AuthMode, Chain, Dispatcher, EmissionLoop, EmissionSummary, Endpoint, HttpMethod, HttpOutput,
    NullChain, SendOutcome, Serializer, Settings, SettingsBuilder,
};
pub use output_log::{FacadeLogger, OutputLogger, SharedLogger};
pub use record::{Fields, Record};
