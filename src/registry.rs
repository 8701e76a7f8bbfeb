//! Widget registry and providers
//!
//! The registry maps widget names to the provider that produces their
//! result and the variant used to normalize it. Providers registered in
//! code implement [`WidgetProvider`]; YAML definition files loaded from
//! configured directories register [`StaticWidget`] providers.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::widget::WidgetKind;
use crate::{Error, Result};

/// Request-scoped parameters handed to a provider
#[derive(Debug, Clone, Default)]
pub struct WidgetRequest {
    /// Decoded query-string parameters
    pub query: HashMap<String, String>,
    /// Decoded form-body parameters
    pub form: HashMap<String, String>,
}

impl WidgetRequest {
    /// Build a request view from raw query and form bodies.
    ///
    /// Bodies that fail to decode contribute no parameters.
    #[must_use]
    pub fn new(query: Option<&str>, form: Option<&str>) -> Self {
        Self {
            query: decode_params(query),
            form: decode_params(form),
        }
    }

    /// Look up a parameter, checking the form body before the query string.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.form
            .get(name)
            .or_else(|| self.query.get(name))
            .map(String::as_str)
    }
}

/// Decode a urlencoded parameter string into a map.
fn decode_params(raw: Option<&str>) -> HashMap<String, String> {
    let Some(raw) = raw else {
        return HashMap::new();
    };
    match serde_urlencoded::from_str(raw) {
        Ok(params) => params,
        Err(e) => {
            debug!(error = %e, "Ignoring undecodable parameter string");
            HashMap::new()
        }
    }
}

/// A data source for one widget: the wrapped handler callable.
#[async_trait]
pub trait WidgetProvider: Send + Sync {
    /// Produce this widget's result for one request.
    ///
    /// The returned value must follow the input contract of the variant
    /// the widget was registered with.
    async fn fetch(&self, request: &WidgetRequest) -> Result<Value>;
}

/// A provider serving the fixed data of a widget definition
#[derive(Debug, Clone)]
pub struct StaticWidget {
    data: Value,
}

impl StaticWidget {
    /// Create a provider that always serves `data`
    #[must_use]
    pub fn new(data: Value) -> Self {
        Self { data }
    }
}

#[async_trait]
impl WidgetProvider for StaticWidget {
    async fn fetch(&self, _request: &WidgetRequest) -> Result<Value> {
        Ok(self.data.clone())
    }
}

/// A widget definition file
///
/// ```yaml
/// name: sales_today
/// kind: number
/// description: Orders taken today
/// data: [311, 294]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetDefinition {
    /// Unique widget name (used as the route segment)
    #[serde(default)]
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Widget variant used to normalize the data
    pub kind: WidgetKind,
    /// The widget result served for every request
    pub data: Value,
}

/// Parse a widget definition from YAML content
pub fn parse_definition(content: &str) -> Result<WidgetDefinition> {
    serde_yaml::from_str(content)
        .map_err(|e| Error::Config(format!("Failed to parse widget definition YAML: {e}")))
}

/// Parse a widget definition from a file
pub async fn parse_definition_file(path: &Path) -> Result<WidgetDefinition> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Config(format!("Failed to read widget definition {path:?}: {e}")))?;

    let mut definition = parse_definition(&content)?;

    // Use filename as name if not specified
    if definition.name.is_empty() {
        if let Some(stem) = path.file_stem() {
            definition.name = stem.to_string_lossy().to_string();
        }
    }

    Ok(definition)
}

/// Load and validate a single widget definition file
pub async fn load_definition_file(path: &Path) -> Result<WidgetDefinition> {
    let definition = parse_definition_file(path).await?;
    validate_definition(&definition)?;
    Ok(definition)
}

/// Validate a widget definition
pub fn validate_definition(definition: &WidgetDefinition) -> Result<()> {
    if definition.name.is_empty() {
        return Err(Error::config("Widget name is required"));
    }

    if !definition
        .name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(Error::Config(format!(
            "Widget name '{}' must contain only alphanumeric characters, underscores and dashes",
            definition.name
        )));
    }

    // Dry-run the normalizer so bad data fails at load time, not per request.
    definition.kind.normalize(definition.data.clone()).map_err(|e| {
        Error::Config(format!(
            "Widget '{}' data does not satisfy the {} contract: {e}",
            definition.name, definition.kind
        ))
    })?;

    Ok(())
}

/// A registered widget
#[derive(Clone)]
pub struct WidgetEntry {
    /// Widget variant used to normalize provider results
    pub kind: WidgetKind,
    /// Human-readable description
    pub description: String,
    /// The data source
    pub provider: Arc<dyn WidgetProvider>,
}

/// Registry of widgets served by the gateway
///
/// Built at startup and immutable afterwards; request handling only
/// reads it.
#[derive(Default)]
pub struct WidgetRegistry {
    widgets: HashMap<String, WidgetEntry>,
}

impl WidgetRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a widget backed by `provider`.
    ///
    /// Re-registering a name logs a warning and replaces the previous
    /// entry.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        kind: WidgetKind,
        description: impl Into<String>,
        provider: Arc<dyn WidgetProvider>,
    ) {
        let name = name.into();
        let entry = WidgetEntry {
            kind,
            description: description.into(),
            provider,
        };
        if self.widgets.insert(name.clone(), entry).is_some() {
            warn!(widget = %name, "Replaced existing widget registration");
        }
    }

    /// Look up a widget by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&WidgetEntry> {
        self.widgets.get(name)
    }

    /// Number of registered widgets
    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Registered widget names, sorted for deterministic listings
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.widgets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registered widgets sorted by name
    #[must_use]
    pub fn entries(&self) -> Vec<(&str, &WidgetEntry)> {
        let mut entries: Vec<(&str, &WidgetEntry)> = self
            .widgets
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
            .collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
    }

    /// Load all widget definitions from a directory (recursive).
    ///
    /// Hidden entries are skipped; files must end in `.yaml` or `.yml`.
    /// Returns the number of widgets registered.
    pub async fn load_directory(&mut self, path: &str) -> Result<usize> {
        let path = Path::new(path);

        if !path.exists() {
            return Err(Error::Config(format!(
                "Widget directory does not exist: {path:?}"
            )));
        }
        if !path.is_dir() {
            return Err(Error::Config(format!(
                "Widget path is not a directory: {path:?}"
            )));
        }

        let count = self.load_directory_recursive(path).await?;

        info!(count, path = %path.display(), "Loaded widget definitions");
        Ok(count)
    }

    async fn load_directory_recursive(&mut self, dir: &Path) -> Result<usize> {
        let mut count = 0;
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| Error::Config(format!("Failed to read directory {dir:?}: {e}")))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::Config(format!("Failed to read directory entry: {e}")))?
        {
            let path = entry.path();

            // Skip hidden files/directories
            if path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with('.'))
            {
                continue;
            }

            if path.is_dir() {
                count += Box::pin(self.load_directory_recursive(&path)).await?;
                continue;
            }

            let is_yaml = path
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml");
            if !is_yaml {
                continue;
            }

            match load_definition_file(&path).await {
                Ok(definition) => {
                    debug!(widget = %definition.name, kind = %definition.kind, "Loaded widget definition");
                    self.register(
                        definition.name,
                        definition.kind,
                        definition.description,
                        Arc::new(StaticWidget::new(definition.data)),
                    );
                    count += 1;
                }
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "Failed to load widget definition");
                }
            }
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_precedence_form_over_query() {
        let request = WidgetRequest::new(Some("format=1&page=3"), Some("format=2"));
        assert_eq!(request.param("format"), Some("2"));
        assert_eq!(request.param("page"), Some("3"));
        assert_eq!(request.param("missing"), None);
    }

    #[test]
    fn test_params_are_percent_decoded() {
        let request = WidgetRequest::new(Some("label=hello%20world&format="), None);
        assert_eq!(request.param("label"), Some("hello world"));
        assert_eq!(request.param("format"), Some(""));
    }

    #[test]
    fn test_absent_bodies_give_no_params() {
        let request = WidgetRequest::new(None, None);
        assert!(request.query.is_empty());
        assert!(request.form.is_empty());
    }

    #[test]
    fn test_parse_definition() {
        let definition = parse_definition(
            "name: sales_today\nkind: number\ndescription: Orders today\ndata: [311, 294]\n",
        )
        .unwrap();
        assert_eq!(definition.name, "sales_today");
        assert_eq!(definition.kind, WidgetKind::Number);
        assert_eq!(definition.data, json!([311, 294]));
    }

    #[test]
    fn test_validate_rejects_bad_name() {
        let definition = WidgetDefinition {
            name: "no spaces".to_string(),
            description: String::new(),
            kind: WidgetKind::Number,
            data: json!(1),
        };
        assert!(validate_definition(&definition).is_err());
    }

    #[test]
    fn test_validate_dry_runs_normalizer() {
        let definition = WidgetDefinition {
            name: "meter".to_string(),
            description: String::new(),
            kind: WidgetKind::Meter,
            data: json!([1, 2]), // missing max
        };
        let err = validate_definition(&definition).unwrap_err();
        assert!(err.to_string().contains("meter"));
    }

    #[tokio::test]
    async fn test_static_widget_serves_fixed_data() {
        let provider = StaticWidget::new(json!([10, 9]));
        let result = provider.fetch(&WidgetRequest::default()).await.unwrap();
        assert_eq!(result, json!([10, 9]));
    }

    #[tokio::test]
    async fn test_load_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("sales.yaml"),
            "kind: number\ndata: [311, 294]\n",
        )
        .unwrap();
        std::fs::write(
            temp_dir.path().join("uptime.yml"),
            "name: uptime\nkind: meter\ndata: [99.2, 0, 100]\n",
        )
        .unwrap();
        // Skipped: not YAML, hidden, or invalid
        std::fs::write(temp_dir.path().join("notes.txt"), "ignore me").unwrap();
        std::fs::write(temp_dir.path().join(".hidden.yaml"), "kind: number\ndata: 1\n").unwrap();
        std::fs::write(
            temp_dir.path().join("broken.yaml"),
            "kind: meter\ndata: [1]\n",
        )
        .unwrap();

        let mut registry = WidgetRegistry::new();
        let count = registry
            .load_directory(&temp_dir.path().to_string_lossy())
            .await
            .unwrap();

        assert_eq!(count, 2);
        // Name defaults to the file stem when unset.
        assert!(registry.get("sales").is_some());
        assert!(registry.get("uptime").is_some());
        assert!(registry.get("broken").is_none());
    }

    #[tokio::test]
    async fn test_load_missing_directory_is_an_error() {
        let mut registry = WidgetRegistry::new();
        assert!(registry.load_directory("/nonexistent/widgets").await.is_err());
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = WidgetRegistry::new();
        registry.register(
            "sales",
            WidgetKind::Number,
            "Sales",
            Arc::new(StaticWidget::new(json!(10))),
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("sales").unwrap().kind, WidgetKind::Number);
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.names(), ["sales"]);
    }
}
