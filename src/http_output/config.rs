//! Typed settings resolved from raw configuration.
//!
//! [`Settings::resolve`] is deliberately lenient: enum values it does not
//! recognise fall back to their documented defaults instead of failing, and
//! malformed booleans or integers do the same. Only a missing or unparseable
//! `endpoint_url` is fatal. [`Settings::resolve_strict`] applies the same
//! mapping but rejects anything it would otherwise have downgraded.

use std::fmt;

use url::Url;

use crate::error::ConfigError;
use crate::file_config::RawConfig;

/// Default number of requests sent over one connection before renewal.
pub const DEFAULT_REUSE_LIMIT: u64 = 1000;
/// Default rate-limit window; zero disables limiting.
pub const DEFAULT_RATE_LIMIT_MSEC: u64 = 0;

/// HTTP methods supported by the output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HttpMethod {
    GET,
    PUT,
    #[default]
    POST,
    DELETE,
}

impl HttpMethod {
    /// Convert to the string representation used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GET => "GET",
            Self::PUT => "PUT",
            Self::POST => "POST",
            Self::DELETE => "DELETE",
        }
    }

    /// Parse a configured method name, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "get" => Some(Self::GET),
            "put" => Some(Self::PUT),
            "post" => Some(Self::POST),
            "delete" => Some(Self::DELETE),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoding used for request bodies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Serializer {
    /// `key=value` pairs joined by `&`.
    #[default]
    Form,
    /// The record mapping as a JSON object.
    Json,
}

impl Serializer {
    /// Parse a configured serializer name, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "form" => Some(Self::Form),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Authentication scheme applied to each request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    None,
    Basic,
}

impl AuthMode {
    /// Parse a configured authentication mode, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Some(Self::None),
            "basic" => Some(Self::Basic),
            _ => None,
        }
    }
}

/// A credential that never appears in formatted output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the underlying value for transmission.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Username and password used for Basic authentication.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Secret,
}

/// Endpoint URL parsed once at configuration time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
    host: String,
    port: u16,
}

impl Endpoint {
    /// Parse an absolute URL with a host.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            url: raw.to_owned(),
            reason,
        };
        let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| invalid("URL has no host".into()))?
            .to_owned();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| invalid(format!("no known port for scheme '{}'", url.scheme())))?;
        Ok(Self { url, host, port })
    }

    /// The URL as configured.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Path component used as the request target.
    pub fn path(&self) -> &str {
        match self.url.path() {
            "" => "/",
            path => path,
        }
    }

    /// Whether the session must negotiate TLS.
    pub fn is_secure(&self) -> bool {
        self.scheme() == "https"
    }

    /// `scheme://host:port` prefix for absolute request URLs.
    pub fn origin(&self) -> String {
        // `host_str` keeps the brackets around IPv6 literals.
        format!("{}://{}:{}", self.scheme(), self.host, self.port)
    }

    /// Absolute URL for `path` on this endpoint.
    pub fn target(&self, path: &str) -> String {
        format!("{}{}", self.origin(), path)
    }
}

/// How [`Settings`] treats values it cannot interpret.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Validation {
    /// Fall back to defaults silently.
    #[default]
    Lenient,
    /// Reject with [`ConfigError::InvalidValue`].
    Strict,
}

/// Immutable configuration for the HTTP output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: Endpoint,
    pub ssl_no_verify: bool,
    pub http_method: HttpMethod,
    pub serializer: Serializer,
    pub rate_limit_msec: u64,
    pub raise_on_error: bool,
    pub authentication: AuthMode,
    pub credentials: Credentials,
    pub reuse_limit: u64,
}

impl Settings {
    /// Resolve settings, downgrading invalid values to their defaults.
    pub fn resolve(raw: &RawConfig) -> Result<Self, ConfigError> {
        Self::resolve_with(raw, Validation::Lenient)
    }

    /// Resolve settings, rejecting any value that would be downgraded.
    pub fn resolve_strict(raw: &RawConfig) -> Result<Self, ConfigError> {
        Self::resolve_with(raw, Validation::Strict)
    }

    /// Resolve settings under the given validation mode.
    pub fn resolve_with(raw: &RawConfig, mode: Validation) -> Result<Self, ConfigError> {
        let endpoint = match raw.get("endpoint_url") {
            Some(url) if !url.trim().is_empty() => Endpoint::parse(url)?,
            _ => return Err(ConfigError::MissingEndpoint),
        };
        let reader = Reader { raw, mode };
        Ok(Self {
            endpoint,
            ssl_no_verify: reader.typed("ssl_no_verify", parse_bool, false)?,
            http_method: reader.typed("http_method", HttpMethod::parse, HttpMethod::POST)?,
            serializer: reader.typed("serializer", Serializer::parse, Serializer::Form)?,
            rate_limit_msec: reader.typed("rate_limit_msec", parse_u64, DEFAULT_RATE_LIMIT_MSEC)?,
            raise_on_error: reader.typed("raise_on_error", parse_bool, true)?,
            authentication: reader.typed("authentication", AuthMode::parse, AuthMode::None)?,
            credentials: Credentials {
                username: raw.get("username").unwrap_or_default().to_owned(),
                password: Secret::new(raw.get("password").unwrap_or_default()),
            },
            reuse_limit: reader.typed("reuse_limit", parse_u64, DEFAULT_REUSE_LIMIT)?,
        })
    }

    /// Start a builder targeting `endpoint_url`.
    pub fn builder(endpoint_url: impl Into<String>) -> SettingsBuilder {
        SettingsBuilder::new().with_endpoint_url(endpoint_url)
    }

    /// Credentials to attach, if Basic authentication is enabled.
    pub fn basic_credentials(&self) -> Option<&Credentials> {
        match self.authentication {
            AuthMode::Basic => Some(&self.credentials),
            AuthMode::None => None,
        }
    }
}

struct Reader<'a> {
    raw: &'a RawConfig,
    mode: Validation,
}

impl Reader<'_> {
    fn typed<T>(
        &self,
        key: &str,
        parse: impl Fn(&str) -> Option<T>,
        default: T,
    ) -> Result<T, ConfigError> {
        let Some(value) = self.raw.get(key) else {
            return Ok(default);
        };
        match (parse(value), self.mode) {
            (Some(parsed), _) => Ok(parsed),
            (None, Validation::Lenient) => Ok(default),
            (None, Validation::Strict) => Err(ConfigError::invalid_value(key, value)),
        }
    }
}

/// Parse a flag value. An empty value enables the flag.
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

/// Builder for constructing [`Settings`] from code.
#[derive(Clone, Debug, Default)]
pub struct SettingsBuilder {
    endpoint_url: Option<String>,
    ssl_no_verify: bool,
    http_method: HttpMethod,
    serializer: Serializer,
    rate_limit_msec: u64,
    raise_on_error: Option<bool>,
    credentials: Option<Credentials>,
    reuse_limit: Option<u64>,
}

macro_rules! value_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = value;
            self
        }
    };
}

impl SettingsBuilder {
    /// Create a builder with no endpoint configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint URL (required).
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    value_setter!(
        #[doc = "Disable certificate validation for HTTPS endpoints."]
        with_ssl_no_verify,
        ssl_no_verify,
        bool
    );
    value_setter!(
        #[doc = "Set the HTTP method. Defaults to POST."]
        with_method,
        http_method,
        HttpMethod
    );
    value_setter!(
        #[doc = "Set the body serializer. Defaults to form encoding."]
        with_serializer,
        serializer,
        Serializer
    );
    value_setter!(
        #[doc = "Set the minimum interval between attempts in milliseconds."]
        with_rate_limit_msec,
        rate_limit_msec,
        u64
    );

    /// Control whether transport errors propagate to the caller.
    pub fn with_raise_on_error(mut self, raise: bool) -> Self {
        self.raise_on_error = Some(raise);
        self
    }

    /// Configure HTTP Basic authentication.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: Secret::new(password),
        });
        self
    }

    /// Set the number of requests allowed per connection.
    pub fn with_reuse_limit(mut self, limit: u64) -> Self {
        self.reuse_limit = Some(limit);
        self
    }

    fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        match self.endpoint_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Endpoint::parse(url),
            _ => Err(ConfigError::MissingEndpoint),
        }
    }

    /// Check the builder would produce valid [`Settings`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the endpoint is missing or invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint().map(drop)
    }

    /// Validate and produce [`Settings`].
    pub fn build(self) -> Result<Settings, ConfigError> {
        let endpoint = self.endpoint()?;
        let (authentication, credentials) = match self.credentials {
            Some(credentials) => (AuthMode::Basic, credentials),
            None => (AuthMode::None, Credentials::default()),
        };
        Ok(Settings {
            endpoint,
            ssl_no_verify: self.ssl_no_verify,
            http_method: self.http_method,
            serializer: self.serializer,
            rate_limit_msec: self.rate_limit_msec,
            raise_on_error: self.raise_on_error.unwrap_or(true),
            authentication,
            credentials,
            reuse_limit: self.reuse_limit.unwrap_or(DEFAULT_REUSE_LIMIT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn raw(extra: &[(&str, &str)]) -> RawConfig {
        let mut raw = RawConfig::from_pairs([("endpoint_url", "http://localhost:9880/api/logs")]);
        for (k, v) in extra {
            raw.set(*k, *v);
        }
        raw
    }

    #[test]
    fn defaults_apply() {
        let settings = Settings::resolve(&raw(&[])).expect("resolve");
        assert!(!settings.ssl_no_verify);
        assert_eq!(settings.http_method, HttpMethod::POST);
        assert_eq!(settings.serializer, Serializer::Form);
        assert_eq!(settings.rate_limit_msec, 0);
        assert!(settings.raise_on_error);
        assert_eq!(settings.authentication, AuthMode::None);
        assert_eq!(settings.credentials.username, "");
        assert_eq!(settings.reuse_limit, 1000);
    }

    #[test]
    fn endpoint_is_parsed_once() {
        let settings = Settings::resolve(&raw(&[])).expect("resolve");
        let endpoint = &settings.endpoint;
        assert_eq!(endpoint.scheme(), "http");
        assert_eq!(endpoint.host(), "localhost");
        assert_eq!(endpoint.port(), 9880);
        assert_eq!(endpoint.path(), "/api/logs");
        assert!(!endpoint.is_secure());
        assert_eq!(endpoint.target("/api/logs"), "http://localhost:9880/api/logs");
    }

    #[test]
    fn https_endpoint_uses_default_port() {
        let endpoint = Endpoint::parse("https://logs.example.com").expect("parse");
        assert!(endpoint.is_secure());
        assert_eq!(endpoint.port(), 443);
        assert_eq!(endpoint.path(), "/");
    }

    #[rstest]
    #[case("get", HttpMethod::GET)]
    #[case("put", HttpMethod::PUT)]
    #[case("POST", HttpMethod::POST)]
    #[case("delete", HttpMethod::DELETE)]
    #[case("patch", HttpMethod::POST)]
    #[case("", HttpMethod::POST)]
    fn http_method_falls_back_to_post(#[case] value: &str, #[case] expected: HttpMethod) {
        let settings = Settings::resolve(&raw(&[("http_method", value)])).expect("resolve");
        assert_eq!(settings.http_method, expected);
    }

    #[rstest]
    #[case("json", Serializer::Json)]
    #[case("form", Serializer::Form)]
    #[case("msgpack", Serializer::Form)]
    fn serializer_falls_back_to_form(#[case] value: &str, #[case] expected: Serializer) {
        let settings = Settings::resolve(&raw(&[("serializer", value)])).expect("resolve");
        assert_eq!(settings.serializer, expected);
    }

    #[rstest]
    #[case("basic", AuthMode::Basic)]
    #[case("none", AuthMode::None)]
    #[case("digest", AuthMode::None)]
    fn authentication_falls_back_to_none(#[case] value: &str, #[case] expected: AuthMode) {
        let settings = Settings::resolve(&raw(&[("authentication", value)])).expect("resolve");
        assert_eq!(settings.authentication, expected);
    }

    #[test]
    fn malformed_numbers_use_defaults() {
        let settings = Settings::resolve(&raw(&[("reuse_limit", "lots"), ("rate_limit_msec", "-5")]))
            .expect("resolve");
        assert_eq!(settings.reuse_limit, DEFAULT_REUSE_LIMIT);
        assert_eq!(settings.rate_limit_msec, DEFAULT_RATE_LIMIT_MSEC);
    }

    #[rstest]
    #[case("true", true)]
    #[case("", true)]
    #[case("no", false)]
    #[case("false", false)]
    fn flags_parse(#[case] value: &str, #[case] expected: bool) {
        let settings = Settings::resolve(&raw(&[("ssl_no_verify", value)])).expect("resolve");
        assert_eq!(settings.ssl_no_verify, expected);
    }

    #[test]
    fn missing_endpoint_is_an_error() {
        let err = Settings::resolve(&RawConfig::from_pairs([("serializer", "json")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEndpoint));
        let err = Settings::resolve(&RawConfig::from_pairs([("endpoint_url", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEndpoint));
    }

    #[test]
    fn relative_endpoint_is_an_error() {
        let err = Settings::resolve(&RawConfig::from_pairs([("endpoint_url", "/api/logs")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }

    #[test]
    fn strict_mode_rejects_downgrades() {
        let err = Settings::resolve_strict(&raw(&[("http_method", "patch")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "http_method"));
        let err = Settings::resolve_strict(&raw(&[("reuse_limit", "x")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "reuse_limit"));
        assert!(Settings::resolve_strict(&raw(&[("serializer", "json")])).is_ok());
    }

    #[test]
    fn debug_output_redacts_password() {
        let settings = Settings::resolve(&raw(&[
            ("authentication", "basic"),
            ("username", "alice"),
            ("password", "hunter2"),
        ]))
        .expect("resolve");
        let rendered = format!("{settings:?}");
        assert!(rendered.contains("alice"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("hunter2"));
        assert_eq!(settings.credentials.password.expose(), "hunter2");
    }

    #[test]
    fn builder_matches_resolved_settings() {
        let built = Settings::builder("http://localhost:9880/api/logs")
            .with_serializer(Serializer::Json)
            .with_basic_auth("user", "pass")
            .with_reuse_limit(3)
            .build()
            .expect("build");
        let resolved = Settings::resolve(&raw(&[
            ("serializer", "json"),
            ("authentication", "basic"),
            ("username", "user"),
            ("password", "pass"),
            ("reuse_limit", "3"),
        ]))
        .expect("resolve");
        assert_eq!(built, resolved);
    }

    #[test]
    fn builder_requires_endpoint() {
        let err = SettingsBuilder::new().build().unwrap_err();
        assert!(matches!(err, ConfigError::MissingEndpoint));
    }

    #[test]
    fn validate_reports_bad_endpoint_without_consuming() {
        let builder = Settings::builder("mailto:ops@example.com");
        assert!(matches!(
            builder.validate(),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
        assert!(Settings::builder("http://localhost/").validate().is_ok());
    }
}
