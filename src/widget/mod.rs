//! Widget variants and payload normalization
//!
//! Each widget variant accepts its own result shape from a provider and
//! produces a canonical ordered payload (`serde_json::Value` with key
//! order preserved). See [`normalize`] for the per-variant contracts.

pub mod axis;
pub mod normalize;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

/// Plain text annotation for text widget entries (the default)
pub const TEXT_NONE: u64 = 0;
/// Warning annotation for text widget entries
pub const TEXT_WARN: u64 = 1;
/// Informational annotation for text widget entries
pub const TEXT_INFO: u64 = 2;

/// The widget variants supported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    /// One or more plain numbers
    Number,
    /// Red/amber/green triple
    Rag,
    /// Annotated text messages
    Text,
    /// Pie chart segments
    Pie,
    /// Line chart with optional axis labels
    Line,
    /// Meter with min/max bounds
    Meter,
    /// Funnel steps
    Funnel,
    /// Bullet graph
    Bullet,
}

impl WidgetKind {
    /// Normalize a provider result into this variant's canonical payload.
    ///
    /// Returns [`crate::Error::Widget`] when the result violates the
    /// variant's input contract.
    pub fn normalize(self, result: Value) -> Result<Value> {
        match self {
            Self::Number => normalize::number(result),
            Self::Rag => normalize::rag(result),
            Self::Text => normalize::text(result),
            Self::Pie => normalize::pie(result),
            Self::Line => normalize::line(result),
            Self::Meter => normalize::meter(result),
            Self::Funnel => normalize::funnel(result),
            Self::Bullet => normalize::bullet(result),
        }
    }

    /// The configuration name of this variant (`number`, `rag`, ...)
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Rag => "rag",
            Self::Text => "text",
            Self::Pie => "pie",
            Self::Line => "line",
            Self::Meter => "meter",
            Self::Funnel => "funnel",
            Self::Bullet => "bullet",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
