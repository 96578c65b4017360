//! Adapter for the portal's JSONP framing.
//!
//! The stock lookup endpoint answers `callback({...});` instead of plain JSON.
//! Everything outside this module works on the unwrapped payload.

use crate::{HkexError, Result};

/// Returns the JSON payload inside a `name(...)` / `name(...);` wrapper.
///
/// The callback name must be a JavaScript identifier (dots allowed for
/// namespaced callbacks). Surrounding whitespace is ignored.
pub fn strip_callback(body: &str) -> Result<&str> {
    let trimmed = body.trim();

    let open = trimmed
        .find('(')
        .ok_or_else(|| malformed("missing opening parenthesis", trimmed))?;
    let name = trimmed[..open].trim_end();
    if name.is_empty() || !name.chars().all(is_callback_char) {
        return Err(malformed("invalid callback name", trimmed));
    }

    let without_semicolon = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    let inner = without_semicolon
        .strip_suffix(')')
        .ok_or_else(|| malformed("missing closing parenthesis", trimmed))?;

    match inner.get(open + 1..) {
        Some(payload) => Ok(payload.trim()),
        None => Err(malformed("empty callback body", trimmed)),
    }
}

fn is_callback_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.'
}

fn malformed(reason: &str, body: &str) -> HkexError {
    HkexError::InvalidResponse(format!(
        "Malformed JSONP response ({}): {}",
        reason,
        body.chars().take(80).collect::<String>()
    ))
}
