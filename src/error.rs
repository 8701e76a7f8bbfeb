//! Error types for the widget gateway

use std::{io, string::FromUtf8Error};

use thiserror::Error;

/// Result type alias for the widget gateway
pub type Result<T> = std::result::Result<T, Error>;

/// Widget gateway errors
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A widget result violated its variant's input contract
    #[error("Invalid widget result: {0}")]
    Widget(String),

    /// Widget not found in the registry
    #[error("Widget not found: {0}")]
    WidgetNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// UTF-8 decoding error
    #[error("Failed parsing utf8 string: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a contract-violation error for a widget result
    pub fn widget(message: impl Into<String>) -> Self {
        Self::Widget(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
