//! HTTP router and handlers

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, compression::CompressionLayer, trace::TraceLayer};
use tracing::{debug, warn};

use super::auth::{ResolvedGate, gate_middleware};
use crate::registry::{WidgetRegistry, WidgetRequest};
use crate::render::{Format, render};

/// Shared application state
pub struct AppState {
    /// Registered widgets
    pub registry: WidgetRegistry,
    /// Resolved gate configuration
    pub gate: Arc<ResolvedGate>,
}

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    let gate = Arc::clone(&state.gate);

    Router::new()
        .route("/health", get(health_handler))
        .route("/widgets", get(list_handler))
        .route("/widgets/{name}", get(widget_handler).post(widget_handler))
        // Gate middleware (applied before other layers)
        .layer(middleware::from_fn_with_state(gate, gate_middleware))
        .layer(CatchPanicLayer::new())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - liveness probe
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /widgets - list registered widgets
async fn list_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let widgets: Vec<_> = state
        .registry
        .entries()
        .into_iter()
        .map(|(name, entry)| {
            json!({
                "name": name,
                "kind": entry.kind.as_str(),
                "description": entry.description,
            })
        })
        .collect();
    Json(json!({ "widgets": widgets }))
}

/// GET|POST /widgets/{name} - serve one widget feed.
///
/// Flow: provider fetch, normalize per the widget's variant, render in
/// the format selected by the `format` parameter (form body checked
/// before query string).
async fn widget_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(entry) = state.registry.get(&name) else {
        return (
            StatusCode::NOT_FOUND,
            crate::Error::WidgetNotFound(name).to_string(),
        )
            .into_response();
    };

    let request = WidgetRequest::new(query.as_deref(), form_body(&headers, &body));

    let result = match entry.provider.fetch(&request).await {
        Ok(result) => result,
        Err(e) => {
            warn!(widget = %name, error = %e, "Provider failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let payload = match entry.kind.normalize(result) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(widget = %name, error = %e, "Widget result violated its contract");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let format = Format::from_param(request.param("format"));
    match render(&payload, format) {
        Ok(rendered) => {
            debug!(widget = %name, format = ?format, "Rendered widget payload");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, format.content_type())],
                rendered,
            )
                .into_response()
        }
        Err(e) => {
            warn!(widget = %name, error = %e, "Rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// The request body as a form-parameter string, when it is one.
fn form_body<'a>(headers: &HeaderMap, body: &'a Bytes) -> Option<&'a str> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())?;
    if !content_type.starts_with("application/x-www-form-urlencoded") {
        return None;
    }
    std::str::from_utf8(body).ok()
}
