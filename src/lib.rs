//! Widget Gateway Library
//!
//! Adapts handler return values into the JSON/XML payload shapes expected
//! by dashboard widget APIs.
//!
//! # Features
//!
//! - **Authorization Gate**: Basic-scheme API key check guarding widget routes
//! - **Widget Normalizers**: one per widget variant (number, RAG, text, pie,
//!   line, meter, funnel, bullet), reshaping handler results into canonical
//!   ordered payloads
//! - **Dual-Format Rendering**: XML or JSON body selected by the `format`
//!   request parameter
//! - **Static Definitions**: YAML widget definitions served without code
//!
//! Control flow per request: gate check, provider fetch, normalize, render.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod registry;
pub mod render;
pub mod widget;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => {
            subscriber.with(fmt::layer().json()).init();
        }
        _ => {
            subscriber.with(fmt::layer()).init();
        }
    }

    Ok(())
}
