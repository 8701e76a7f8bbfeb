//! Payload rendering
//!
//! A normalized payload renders to one of two bodies: XML (the default)
//! or JSON, selected by the `format` request parameter. Both renderings
//! are deterministic; payload key order is preserved as-is.

pub mod xml;

use serde_json::Value;

use crate::Result;

/// Output format for a rendered payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Nested-element XML body (the default)
    Xml,
    /// JSON body
    Json,
}

impl Format {
    /// Select the format from the request's `format` parameter.
    ///
    /// `"2"` selects JSON; anything else, including an absent parameter,
    /// selects XML.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        if value == Some("2") { Self::Json } else { Self::Xml }
    }

    /// Content type of the rendered body
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Xml => "application/xml",
            Self::Json => "application/json",
        }
    }
}

/// Render a payload in the requested format.
pub fn render(payload: &Value, format: Format) -> Result<String> {
    match format {
        Format::Json => Ok(serde_json::to_string(payload)?),
        Format::Xml => xml::render(payload),
    }
}
