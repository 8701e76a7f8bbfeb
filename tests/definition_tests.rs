//! Widget definition loading tests

use std::path::Path;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use widget_gateway::config::{Config, WidgetsConfig};
use widget_gateway::gateway::Gateway;
use widget_gateway::registry::{load_definition_file, parse_definition, validate_definition};
use widget_gateway::widget::WidgetKind;

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

#[test]
fn test_parse_full_definition() {
    let definition = parse_definition(concat!(
        "name: signup_funnel\n",
        "kind: funnel\n",
        "description: Signup conversion\n",
        "data:\n",
        "  items:\n",
        "    - [100, step 1]\n",
        "    - [50, step 2]\n",
        "  sort: true\n",
    ))
    .unwrap();
    assert_eq!(definition.name, "signup_funnel");
    assert_eq!(definition.kind, WidgetKind::Funnel);
    assert_eq!(
        definition.data,
        json!({"items": [[100, "step 1"], [50, "step 2"]], "sort": true})
    );
    validate_definition(&definition).unwrap();
}

#[test]
fn test_validation_rejects_contract_violations() {
    let definition = parse_definition("name: bad\nkind: bullet\ndata: {item: {}}\n").unwrap();
    let err = validate_definition(&definition).unwrap_err();
    assert!(err.to_string().contains("bad"), "error names the widget: {err}");
}

#[test]
fn test_unknown_kind_fails_parse() {
    assert!(parse_definition("name: x\nkind: sparkline\ndata: 1\n").is_err());
}

#[tokio::test]
async fn test_name_defaults_to_file_stem() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "cpu-load.yaml", "kind: number\ndata: 42\n");

    let definition = load_definition_file(&temp_dir.path().join("cpu-load.yaml"))
        .await
        .unwrap();
    assert_eq!(definition.name, "cpu-load");
}

#[tokio::test]
async fn test_gateway_loads_configured_directories() {
    let temp_dir = TempDir::new().unwrap();
    write(
        temp_dir.path(),
        "sales.yaml",
        "kind: number\ndescription: Orders today\ndata: [311, 294]\n",
    );
    write(
        temp_dir.path(),
        "status.yaml",
        "kind: rag\ndata: [[1, red], [2, amber], [3, green]]\n",
    );

    let config = Config {
        widgets: WidgetsConfig {
            directories: vec![
                temp_dir.path().to_string_lossy().to_string(),
                "/nonexistent/widgets".to_string(),
            ],
        },
        ..Config::default()
    };

    let mut gateway = Gateway::new(config);
    let count = gateway.load_widgets().await.unwrap();
    // The missing directory is skipped, not fatal.
    assert_eq!(count, 2);
}
