//! Raw key/value configuration input.
//!
//! [`RawConfig`] is the untyped form handed to
//! [`Settings::resolve`](crate::http_output::Settings::resolve). It can be
//! assembled from pairs by a host framework or read from a section of an INI
//! file using the `rust-ini` crate. No semantics are applied here; typing,
//! defaults and fallbacks belong to `Settings`.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use ini::Ini;

use crate::error::ConfigError;

/// Ordered raw configuration entries. Later entries override earlier ones.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawConfig {
    entries: Vec<(String, String)>,
}

impl RawConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from key/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Append a single entry.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Look up the most recent value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse INI text and extract `section` (or the general section when `None`).
    pub fn from_ini_str(text: &str, section: Option<&str>) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|err| ConfigError::Ini(err.to_string()))?;
        let Some(props) = ini.section(section) else {
            return Ok(Self::default());
        };
        Ok(Self::from_pairs(
            props.iter().map(|(key, value)| (key.to_string(), value.to_owned())),
        ))
    }

    /// Read an INI file from disk and extract `section`.
    pub fn load_ini(path: impl AsRef<Path>, section: Option<&str>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ConfigError::Io(std::io::Error::new(
                ErrorKind::NotFound,
                format!("{} doesn't exist", path.display()),
            )),
            _ => ConfigError::Io(err),
        })?;
        Self::from_ini_str(&text, section)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn later_entries_override_earlier_ones() {
        let raw = RawConfig::from_pairs([("serializer", "form"), ("serializer", "json")]);
        assert_eq!(raw.get("serializer"), Some("json"));
        assert_eq!(raw.get("missing"), None);
    }

    #[test]
    fn reads_named_section() {
        let text = "[other]\nendpoint_url = http://ignored\n\n[match.app]\nendpoint_url = http://localhost:8080/api\nserializer = json\n";
        let raw = RawConfig::from_ini_str(text, Some("match.app")).expect("parse ini");
        assert_eq!(raw.get("endpoint_url"), Some("http://localhost:8080/api"));
        assert_eq!(raw.get("serializer"), Some("json"));
    }

    #[test]
    fn reads_general_section() {
        let text = "endpoint_url = http://localhost/\n";
        let raw = RawConfig::from_ini_str(text, None).expect("parse ini");
        assert_eq!(raw.get("endpoint_url"), Some("http://localhost/"));
    }

    #[test]
    fn missing_section_is_empty() {
        let raw = RawConfig::from_ini_str("[a]\nk = v\n", Some("b")).expect("parse ini");
        assert_eq!(raw.iter().count(), 0);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[out]\nendpoint_url = https://example.com/in\nreuse_limit = 5")
            .expect("write ini");
        let raw = RawConfig::load_ini(file.path(), Some("out")).expect("load ini");
        assert_eq!(raw.get("reuse_limit"), Some("5"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RawConfig::load_ini("/nonexistent/out_http.ini", None).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().contains("doesn't exist"));
    }
}
