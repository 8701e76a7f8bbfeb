//! Per-variant payload normalizers
//!
//! Each normalizer is a pure function from a provider result to the
//! canonical payload shape of its widget variant. Inputs are
//! `serde_json::Value` trees; the accepted shape is documented per
//! function. Results outside the documented contract fail with
//! [`Error::Widget`] where that is cheap to detect.

use std::cmp::Ordering;

use serde_json::{Map, Value, json};

use super::{TEXT_NONE, axis};
use crate::{Error, Result};

/// Wrap a bare value into a singleton sequence.
///
/// Every variant that accepts "a value or a list of values" goes through
/// this helper so the edge-case behavior stays consistent.
pub fn as_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Number widget: a value or a list of values.
///
/// Produces `{"item": [{"value": v}, ...]}`. Null entries are dropped
/// entirely.
pub fn number(result: Value) -> Result<Value> {
    let items: Vec<Value> = as_items(result)
        .into_iter()
        .filter(|v| !v.is_null())
        .map(|v| json!({ "value": v }))
        .collect();
    Ok(json!({ "item": items }))
}

/// RAG widget: a sequence of values or `[value, text]` pairs, in
/// red/amber/green order.
///
/// Produces `{"item": [{"value", "text"?}, ...]}`. A null value renders
/// as an empty string; `text` is omitted when absent.
pub fn rag(result: Value) -> Result<Value> {
    let mut items = Vec::new();
    for entry in as_items(result) {
        let mut parts = as_items(entry).into_iter();
        let mut item = Map::new();
        let value = match parts.next() {
            Some(Value::Null) | None => json!(""),
            Some(value) => value,
        };
        item.insert("value".to_string(), value);
        if let Some(text) = parts.next() {
            item.insert("text".to_string(), text);
        }
        items.push(Value::Object(item));
    }
    Ok(json!({ "item": items }))
}

/// Text widget: a message or a sequence of messages or `[text, type]`
/// pairs.
///
/// Produces `{"item": [{"text", "type"}, ...]}`. The type defaults to
/// [`TEXT_NONE`] when absent or null.
pub fn text(result: Value) -> Result<Value> {
    let mut items = Vec::new();
    for entry in as_items(result) {
        let mut parts = as_items(entry).into_iter();
        let mut item = Map::new();
        item.insert("text".to_string(), parts.next().unwrap_or(json!("")));
        let kind = match parts.next() {
            Some(Value::Null) | None => json!(TEXT_NONE),
            Some(kind) => kind,
        };
        item.insert("type".to_string(), kind);
        items.push(Value::Object(item));
    }
    Ok(json!({ "item": items }))
}

/// Pie chart widget: a sequence of `[value]`, `[value, label]` or
/// `[value, label, colour]` entries (a bare scalar counts as the value).
///
/// Produces `{"item": [{"value", "label"?, "colour"?}, ...]}`; fields
/// are present only up to the entry length supplied.
pub fn pie(result: Value) -> Result<Value> {
    let mut items = Vec::new();
    for entry in as_items(result) {
        let mut parts = as_items(entry).into_iter();
        let value = parts
            .next()
            .ok_or_else(|| Error::widget("pie chart entry requires a value"))?;
        let mut item = Map::new();
        item.insert("value".to_string(), value);
        if let Some(label) = parts.next() {
            item.insert("label".to_string(), label);
        }
        if let Some(colour) = parts.next() {
            item.insert("colour".to_string(), colour);
        }
        items.push(Value::Object(item));
    }
    Ok(json!({ "item": items }))
}

/// Line chart widget: `[values, x_axis?, y_axis?, colour?]`.
///
/// Produces `{"item": values, "settings": {"axisx"?, "axisy"?,
/// "colour"?}}`. Axis labels are auto-wrapped into a sequence and a null
/// axis becomes `[""]`; `settings` is always present.
pub fn line(result: Value) -> Result<Value> {
    let mut parts = as_items(result).into_iter();
    let values = parts
        .next()
        .ok_or_else(|| Error::widget("line chart result requires a list of data points"))?;

    let mut data = Map::new();
    data.insert("item".to_string(), Value::Array(as_items(values)));

    let mut settings = Map::new();
    if let Some(x_axis) = parts.next() {
        settings.insert("axisx".to_string(), axis_labels(x_axis));
    }
    if let Some(y_axis) = parts.next() {
        settings.insert("axisy".to_string(), axis_labels(y_axis));
    }
    if let Some(colour) = parts.next() {
        settings.insert("colour".to_string(), colour);
    }
    data.insert("settings".to_string(), Value::Object(settings));

    Ok(Value::Object(data))
}

/// An axis label or list of labels; null becomes a single empty label.
fn axis_labels(value: Value) -> Value {
    let value = if value.is_null() { json!("") } else { value };
    Value::Array(as_items(value))
}

/// Meter widget: `[value, min, max]`, where min and max are a value or a
/// `[value, text]` pair.
///
/// Produces `{"item": value, "max": {"value", "text"?}, "min": {"value",
/// "text"?}}`.
pub fn meter(result: Value) -> Result<Value> {
    let Value::Array(parts) = result else {
        return Err(Error::widget("meter result must be a (value, min, max) triple"));
    };
    let [value, min, max]: [Value; 3] = parts
        .try_into()
        .map_err(|_| Error::widget("meter result must be a (value, min, max) triple"))?;

    let mut data = Map::new();
    data.insert("item".to_string(), value);
    data.insert("max".to_string(), meter_bound(max));
    data.insert("min".to_string(), meter_bound(min));
    Ok(Value::Object(data))
}

/// A meter bound: a value or a `[value, text]` pair.
fn meter_bound(bound: Value) -> Value {
    let mut parts = as_items(bound).into_iter();
    let mut map = Map::new();
    map.insert("value".to_string(), parts.next().unwrap_or(Value::Null));
    if let Some(text) = parts.next() {
        map.insert("text".to_string(), text);
    }
    Value::Object(map)
}

/// Funnel widget: a mapping with an `items` sequence of `[value, label]`
/// pairs and optional `type`, `percentage` and `sort` keys.
///
/// Produces `{"item": [{"value", "label"}, ...], "type", "percentage"}`.
/// When `sort` is true, items are stably sorted by value descending
/// before mapping; labels never participate in the ordering.
pub fn funnel(result: Value) -> Result<Value> {
    let Value::Object(spec) = result else {
        return Err(Error::widget("funnel result must be a mapping with an items entry"));
    };

    let mut items = spec.get("items").cloned().map(as_items).unwrap_or_default();

    if spec.get("sort").is_some_and(|v| v.as_bool().unwrap_or(false)) {
        items.sort_by(|a, b| {
            entry_value(b)
                .partial_cmp(&entry_value(a))
                .unwrap_or(Ordering::Equal)
        });
    }

    let mapped: Vec<Value> = items
        .into_iter()
        .map(|entry| {
            let mut item = Map::new();
            for (key, value) in ["value", "label"].into_iter().zip(as_items(entry)) {
                item.insert(key.to_string(), value);
            }
            Value::Object(item)
        })
        .collect();

    let mut data = Map::new();
    data.insert("item".to_string(), Value::Array(mapped));
    data.insert(
        "type".to_string(),
        spec.get("type").cloned().unwrap_or_else(|| json!("standard")),
    );
    data.insert(
        "percentage".to_string(),
        spec.get("percentage").cloned().unwrap_or_else(|| json!("show")),
    );
    Ok(Value::Object(data))
}

/// The sortable value of a funnel entry.
fn entry_value(entry: &Value) -> f64 {
    let value = match entry {
        Value::Array(pair) => pair.first().unwrap_or(&Value::Null),
        other => other,
    };
    value.as_f64().unwrap_or(0.0)
}

/// Bullet graph widget: a nested mapping with an `item` entry carrying
/// label, sublabel, axis, range, measure and comparative data.
///
/// Passed through unchanged except that `item.axis` is resolved into an
/// explicit `{"point": [...]}` sequence; see [`axis::resolve`] for the
/// accepted axis forms.
pub fn bullet(result: Value) -> Result<Value> {
    let Value::Object(mut data) = result else {
        return Err(Error::widget("bullet graph result must be a mapping"));
    };

    let Some(Value::Object(item)) = data.get_mut("item") else {
        return Err(Error::widget("bullet graph result requires an item mapping"));
    };
    let Some(spec) = item.get_mut("axis") else {
        return Err(Error::widget("bullet graph item requires an axis"));
    };
    *spec = axis::resolve(std::mem::take(spec))?;

    Ok(Value::Object(data))
}
