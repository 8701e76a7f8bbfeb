//! Bullet graph axis resolution
//!
//! A bullet graph axis is either an explicit ordered sequence of points
//! or a generating recipe `{min, max, points, precision}`. Both forms
//! resolve into the `{"point": [...]}` mapping the payload carries.

use serde_json::{Map, Value};

use crate::{Error, Result};

/// Recipe keys consumed during generation; everything else is carried
/// through into the resolved axis mapping.
const RECIPE_KEYS: [&str; 4] = ["min", "max", "points", "precision"];

/// Resolve an axis value into an explicit `{"point": [...]}` mapping.
///
/// Accepted forms:
/// - a bare sequence of numbers, wrapped as-is;
/// - a mapping that already carries a non-null `point` entry, passed
///   through unchanged;
/// - a mapping with a `{min, max, points, precision}` recipe, from which
///   `points` evenly spaced samples between min and max inclusive are
///   generated. `points` defaults to 1 and `precision` to 0.
///
/// Invariant: `points == 1` yields exactly `[min, max]`, a two-element
/// axis. `points < 1` is a contract error.
pub fn resolve(axis: Value) -> Result<Value> {
    match axis {
        Value::Array(points) => {
            let mut map = Map::new();
            map.insert("point".to_string(), Value::Array(points));
            Ok(Value::Object(map))
        }
        Value::Object(spec) => {
            if spec.get("point").is_some_and(|p| !p.is_null()) {
                return Ok(Value::Object(spec));
            }
            generate(spec)
        }
        _ => Err(Error::widget("bullet graph axis must be a sequence or a mapping")),
    }
}

/// Generate axis points from a `{min, max, points, precision}` recipe.
fn generate(spec: Map<String, Value>) -> Result<Value> {
    let min = recipe_number(&spec, "min")?;
    let max = recipe_number(&spec, "max")?;
    let count = match spec.get("points") {
        None => 1,
        Some(value) => value
            .as_i64()
            .ok_or_else(|| Error::widget("bullet graph axis points must be an integer"))?,
    };
    let precision = match spec.get("precision") {
        None => 0,
        Some(value) => value
            .as_u64()
            .ok_or_else(|| Error::widget("bullet graph axis precision must be a non-negative integer"))?,
    };

    if count < 1 {
        return Err(Error::widget("bullet graph axis needs at least 1 point"));
    }

    let samples: Vec<f64> = if count == 1 {
        // A single requested point still spans the axis.
        vec![min, max]
    } else {
        let step = (max - min) / (count - 1) as f64;
        (0..count).map(|i| step * i as f64 + min).collect()
    };

    let points: Vec<Value> = if precision == 0 {
        samples
            .into_iter()
            .map(|x| Value::from(x.round() as i64))
            .collect()
    } else {
        let factor = 10f64.powi(i32::try_from(precision).unwrap_or(i32::MAX));
        samples
            .into_iter()
            .map(|x| Value::from((x * factor).round() / factor))
            .collect()
    };

    // Recipe keys are consumed; any other axis keys ride along ahead of
    // the generated points.
    let mut resolved = Map::new();
    for (key, value) in spec {
        if !RECIPE_KEYS.contains(&key.as_str()) && key != "point" {
            resolved.insert(key, value);
        }
    }
    resolved.insert("point".to_string(), Value::Array(points));
    Ok(Value::Object(resolved))
}

/// Read a required numeric recipe field.
fn recipe_number(spec: &Map<String, Value>, key: &str) -> Result<f64> {
    spec.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| Error::widget(format!("bullet graph axis requires a numeric {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_explicit_sequence_is_wrapped() {
        let axis = resolve(json!([1, 5, 10])).unwrap();
        assert_eq!(axis, json!({"point": [1, 5, 10]}));
    }

    #[test]
    fn test_existing_points_pass_through() {
        let axis = resolve(json!({"point": [1, 5, 10, 15, 20]})).unwrap();
        assert_eq!(axis, json!({"point": [1, 5, 10, 15, 20]}));
    }

    #[test]
    fn test_generated_integer_points() {
        let axis = resolve(json!({"min": 0, "max": 20, "points": 5, "precision": 0})).unwrap();
        assert_eq!(axis, json!({"point": [0, 5, 10, 15, 20]}));
    }

    #[test]
    fn test_single_point_spans_min_and_max() {
        let axis = resolve(json!({"min": 0, "max": 20, "points": 1})).unwrap();
        assert_eq!(axis, json!({"point": [0, 20]}));
    }

    #[test]
    fn test_points_default_to_one() {
        let axis = resolve(json!({"min": 3, "max": 9})).unwrap();
        assert_eq!(axis, json!({"point": [3, 9]}));
    }

    #[test]
    fn test_zero_points_is_contract_error() {
        let err = resolve(json!({"min": 0, "max": 20, "points": 0})).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_precision_rounds_samples() {
        let axis = resolve(json!({"min": 0, "max": 1, "points": 4, "precision": 2})).unwrap();
        assert_eq!(axis, json!({"point": [0.0, 0.33, 0.67, 1.0]}));
    }

    #[test]
    fn test_missing_bounds_are_contract_errors() {
        assert!(resolve(json!({"max": 20})).is_err());
        assert!(resolve(json!({"min": 0})).is_err());
    }

    #[test]
    fn test_scalar_axis_rejected() {
        assert!(resolve(json!(5)).is_err());
    }
}
