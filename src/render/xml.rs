//! XML payload rendering
//!
//! Renders a payload tree as nested elements under a `<root>` element.
//! Mapping entries become child elements named after the key; when the
//! entry value is a sequence, each member becomes its own sibling
//! element under that key, never a single container element. Scalars
//! become text nodes. The tree carries no attributes.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::Value;

use crate::Result;

/// Render a payload as an XML document.
pub fn render(payload: &Value) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    writer.write_event(Event::Start(BytesStart::new("root")))?;
    write_value(&mut writer, payload)?;
    writer.write_event(Event::End(BytesEnd::new("root")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

/// Write a payload value into the current element.
fn write_value<W: Write>(writer: &mut Writer<W>, value: &Value) -> Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                write_value(writer, item)?;
            }
        }
        Value::Object(map) => {
            for (tag, item) in map {
                if let Value::Array(entries) = item {
                    // Repeated sibling elements, one per entry.
                    for entry in entries {
                        write_element(writer, tag, entry)?;
                    }
                } else {
                    write_element(writer, tag, item)?;
                }
            }
        }
        scalar => {
            writer.write_event(Event::Text(BytesText::new(&scalar_text(scalar))))?;
        }
    }
    Ok(())
}

/// Write one `<tag>...</tag>` element around a value.
fn write_element<W: Write>(writer: &mut Writer<W>, tag: &str, value: &Value) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    write_value(writer, value)?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Text-node content for a scalar; nulls render as empty text.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_scalar_payload() {
        let body = render(&json!("test")).unwrap();
        assert_eq!(body, r#"<?xml version="1.0"?><root>test</root>"#);
    }

    #[test]
    fn test_mapping_entries_in_insertion_order() {
        let body = render(&json!({"a": 1, "b": 2})).unwrap();
        assert_eq!(body, r#"<?xml version="1.0"?><root><a>1</a><b>2</b></root>"#);
    }

    #[test]
    fn test_sequence_becomes_repeated_siblings() {
        let body = render(&json!({"list": [1, 2, 3]})).unwrap();
        assert_eq!(
            body,
            r#"<?xml version="1.0"?><root><list>1</list><list>2</list><list>3</list></root>"#
        );
    }

    #[test]
    fn test_nested_mappings_in_sequences() {
        let body = render(&json!({
            "item": [{"value": 1, "text": "x"}, {"value": 2}],
        }))
        .unwrap();
        assert_eq!(
            body,
            concat!(
                r#"<?xml version="1.0"?><root>"#,
                "<item><value>1</value><text>x</text></item>",
                "<item><value>2</value></item>",
                "</root>",
            )
        );
    }

    #[test]
    fn test_text_content_is_escaped() {
        let body = render(&json!({"text": "a < b & c"})).unwrap();
        assert_eq!(
            body,
            r#"<?xml version="1.0"?><root><text>a &lt; b &amp; c</text></root>"#
        );
    }

    #[test]
    fn test_null_renders_as_empty_text() {
        let body = render(&json!({"value": null})).unwrap();
        assert_eq!(body, r#"<?xml version="1.0"?><root><value></value></root>"#);
    }

    #[test]
    fn test_deterministic_output() {
        let payload = json!({"item": [{"value": 1}], "settings": {"axisx": ["a"]}});
        assert_eq!(render(&payload).unwrap(), render(&payload).unwrap());
    }
}
