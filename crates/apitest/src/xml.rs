//! XML front-end.
//!
//! Elements decode into the common tree through a fixed mapping applied to
//! both the pattern and the actual document, so tokens embedded in text or
//! attribute values land in the same tree positions on both sides:
//!
//! - a document is `{root_tag: content}`
//! - element content is an object with up to three entries, in order:
//!   `"@attributes"` (attribute name/value object), `"@text"` (the
//!   whitespace-normalized text content, omitted when empty), and
//!   `"@children"` (the child elements as an ordered array of single-entry
//!   `{tag: content}` objects)
//!
//! Because child elements form an array, sibling order is significant,
//! unlike JSON object keys. Attributes live in an object, so patterns may
//! omit attributes the actual document carries.

use crate::error::ParseError;
use apitest_match::Value;
use std::fmt::Write;

pub fn decode(text: &str) -> Result<Value, ParseError> {
    let doc = roxmltree::Document::parse(text).map_err(|e| ParseError::Xml(e.to_string()))?;
    let root = doc.root_element();
    Ok(Value::Object(vec![(
        root.tag_name().name().to_string(),
        content(root),
    )]))
}

fn content(node: roxmltree::Node) -> Value {
    let mut entries = Vec::new();

    let attrs: Vec<(String, Value)> = node
        .attributes()
        .map(|a| (a.name().to_string(), Value::String(a.value().to_string())))
        .collect();
    if !attrs.is_empty() {
        entries.push(("@attributes".to_string(), Value::Object(attrs)));
    }

    let text = element_text(node);
    if !text.is_empty() {
        entries.push(("@text".to_string(), Value::String(text)));
    }

    let children: Vec<Value> = node
        .children()
        .filter(|c| c.is_element())
        .map(|c| Value::Object(vec![(c.tag_name().name().to_string(), content(c))]))
        .collect();
    if !children.is_empty() {
        entries.push(("@children".to_string(), Value::Array(children)));
    }

    Value::Object(entries)
}

fn element_text(node: roxmltree::Node) -> String {
    let mut text = String::new();
    for child in node.children() {
        if child.is_text() {
            if let Some(t) = child.text() {
                text.push_str(t);
            }
        }
    }
    normalize_whitespace(&text)
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Deterministic re-rendering for diff display: two-space indentation, no
/// whitespace-only text nodes, attributes in document order.
pub fn pretty(text: &str) -> Result<String, ParseError> {
    let doc = roxmltree::Document::parse(text).map_err(|e| ParseError::Xml(e.to_string()))?;
    let mut out = String::new();
    render(doc.root_element(), 0, &mut out);
    Ok(out)
}

fn render(node: roxmltree::Node, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let tag = node.tag_name().name();

    let _ = write!(out, "{}<{}", indent, tag);
    for attr in node.attributes() {
        let _ = write!(out, " {}=\"{}\"", attr.name(), escape(attr.value()));
    }

    let text = element_text(node);
    let children: Vec<_> = node.children().filter(|c| c.is_element()).collect();

    if children.is_empty() && text.is_empty() {
        out.push_str("/>\n");
    } else if children.is_empty() {
        let _ = writeln!(out, ">{}</{}>", escape(&text), tag);
    } else {
        out.push_str(">\n");
        if !text.is_empty() {
            let _ = writeln!(out, "{}  {}", indent, escape(&text));
        }
        for child in &children {
            render(*child, depth + 1, out);
        }
        let _ = writeln!(out, "{}</{}>", indent, tag);
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_leaf() {
        let v = decode("<name>Star-Wars T-shirt</name>").unwrap();
        assert_eq!(
            v,
            Value::Object(vec![(
                "name".to_string(),
                Value::Object(vec![(
                    "@text".to_string(),
                    Value::String("Star-Wars T-shirt".to_string())
                )])
            )])
        );
    }

    #[test]
    fn test_decode_normalizes_whitespace() {
        let v = decode("<name>\n  spaced   out\n</name>").unwrap();
        assert_eq!(
            v.get("name").unwrap().get("@text").unwrap(),
            &Value::String("spaced out".to_string())
        );
    }

    #[test]
    fn test_decode_empty_element() {
        let v = decode("<empty/>").unwrap();
        assert_eq!(
            v,
            Value::Object(vec![("empty".to_string(), Value::Object(vec![]))])
        );
    }

    #[test]
    fn test_decode_attributes_and_children() {
        let v = decode(r#"<products kind="list"><product>a</product><product>b</product></products>"#)
            .unwrap();
        let products = v.get("products").unwrap();
        assert_eq!(
            products.get("@attributes").unwrap(),
            &Value::Object(vec![(
                "kind".to_string(),
                Value::String("list".to_string())
            )])
        );
        match products.get("@children").unwrap() {
            Value::Array(children) => {
                assert_eq!(children.len(), 2);
                assert_eq!(
                    children[0].get("product").unwrap().get("@text").unwrap(),
                    &Value::String("a".to_string())
                );
            }
            other => panic!("expected children array, got {}", other),
        }
    }

    #[test]
    fn test_malformed_is_parse_error() {
        assert!(matches!(decode("<open>"), Err(ParseError::Xml(_))));
    }

    #[test]
    fn test_pretty_is_deterministic() {
        let ugly = "<root>\n   <item  id=\"1\">a</item><empty></empty>\n</root>";
        let expected = "<root>\n  <item id=\"1\">a</item>\n  <empty/>\n</root>\n";
        assert_eq!(pretty(ugly).unwrap(), expected);
        assert_eq!(pretty(&pretty(ugly).unwrap()).unwrap(), expected);
    }

    #[test]
    fn test_pretty_escapes_text() {
        let out = pretty("<a>1 &lt; 2</a>").unwrap();
        assert_eq!(out, "<a>1 &lt; 2</a>\n");
    }
}
