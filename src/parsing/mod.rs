//! Parsers for the portal's response formats.

pub mod callback;
pub mod html;
