//! Form encoding for request bodies.
//!
//! Follows the `application/x-www-form-urlencoded` byte serialiser: ASCII
//! alphanumerics and `*-._` pass through, spaces become `+`, and every other
//! byte is percent-encoded.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Bytes to percent-encode in a form component (space handled separately).
pub(super) const FORM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// Encode a single form key or value, mapping spaces to `+` in one pass.
pub(super) fn form_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut first = true;
    for chunk in s.split(' ') {
        if !first {
            result.push('+');
        }
        first = false;
        result.extend(utf8_percent_encode(chunk, FORM_ENCODE_SET));
    }
    result
}
