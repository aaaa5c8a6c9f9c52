//! Response document formats.

use crate::error::ParseError;
use crate::{json, xml};
use apitest_match::Value;

/// Media type constants the harness asserts against.
pub mod media_types {
    pub const JSON: &str = "application/json";
    pub const XML: &str = "application/xml";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    /// Expected-response file extension: `<name>.json` / `<name>.xml`.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            Format::Json => media_types::JSON,
            Format::Xml => media_types::XML,
        }
    }

    /// Decode raw text into the common tree. Malformed input is a hard
    /// error, never a match failure.
    pub fn decode(&self, text: &str) -> Result<Value, ParseError> {
        match self {
            Format::Json => json::decode(text),
            Format::Xml => xml::decode(text),
        }
    }

    /// Normalize for diff display.
    pub fn pretty(&self, text: &str) -> Result<String, ParseError> {
        match self {
            Format::Json => json::pretty(text),
            Format::Xml => xml::pretty(text),
        }
    }
}
