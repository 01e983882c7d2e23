//! XML parser that builds node trees.
//!
//! This parser uses quick-xml's streaming API to build node trees. The reader
//! configuration is fixed and deliberately restrictive: DOCTYPE declarations
//! are ignored, general entity references are never resolved against external
//! definitions, and whitespace-only text nodes are not materialized. Text that
//! carries non-whitespace content is stored verbatim.

use std::path::Path;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::node::{new_node, NodeInner, NodeRef, XmlContent, XmlElement, XmlProcessingInstruction};

/// Parses XML from a string into a tree rooted at a synthetic document node.
pub fn parse_str(xml: &str) -> Result<NodeRef> {
    let mut reader = Reader::from_str(xml);
    // Don't trim text - whitespace significance is decided here, not by the reader
    reader.config_mut().trim_text_start = false;
    reader.config_mut().trim_text_end = false;

    let root = new_node(None);
    let mut node_stack: Vec<NodeRef> = vec![root.clone()];
    let mut current_text: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                flush_text(&mut current_text, &node_stack);

                let mut element = parse_element(e, &reader)?;
                // An explicit start tag always prints a matching end tag
                element.set_self_closing(false);
                let node = new_node(Some(XmlContent::Element(element)));

                if let Some(parent) = node_stack.last() {
                    NodeInner::add_child_to_ref(parent, node.clone());
                }
                node_stack.push(node);
            }
            Ok(Event::End(_)) => {
                flush_text(&mut current_text, &node_stack);
                node_stack.pop();
            }
            Ok(Event::Empty(ref e)) => {
                // Self-closing tag
                flush_text(&mut current_text, &node_stack);

                let element = parse_element(e, &reader)?;
                let node = new_node(Some(XmlContent::Element(element)));

                if let Some(parent) = node_stack.last() {
                    NodeInner::add_child_to_ref(parent, node);
                }
            }
            Ok(Event::Text(e)) => {
                let raw =
                    std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                let text = unescape(raw).map_err(|e| Error::Parse(e.to_string()))?;
                match current_text {
                    Some(ref mut existing) => existing.push_str(&text),
                    None => current_text = Some(text.into_owned()),
                }
            }
            Ok(Event::CData(ref e)) => {
                // CDATA content is literal; no unescaping
                let text = String::from_utf8_lossy(e.as_ref());
                match current_text {
                    Some(ref mut existing) => existing.push_str(&text),
                    None => current_text = Some(text.into_owned()),
                }
            }
            Ok(Event::Comment(ref e)) => {
                flush_text(&mut current_text, &node_stack);
                let comment_text = String::from_utf8_lossy(e.as_ref()).to_string();
                let comment_node = new_node(Some(XmlContent::Comment(comment_text)));
                if let Some(parent) = node_stack.last() {
                    NodeInner::add_child_to_ref(parent, comment_node);
                }
            }
            Ok(Event::PI(ref e)) => {
                flush_text(&mut current_text, &node_stack);
                let raw = String::from_utf8_lossy(e.as_ref());
                let (target, content) = match raw.split_once(char::is_whitespace) {
                    Some((t, c)) => (t.to_string(), c.trim_start().to_string()),
                    None => (raw.to_string(), String::new()),
                };
                let pi_node = new_node(Some(XmlContent::ProcessingInstruction(
                    XmlProcessingInstruction::new(target, content),
                )));
                if let Some(parent) = node_stack.last() {
                    NodeInner::add_child_to_ref(parent, pi_node);
                }
            }
            Ok(Event::GeneralRef(ref e)) => {
                // Predefined and numeric character references are resolved
                // inline; anything DTD-defined is not (DTDs are not processed)
                let name = String::from_utf8_lossy(e.as_ref());
                if let Some(resolved) = resolve_reference(&name) {
                    match current_text {
                        Some(ref mut existing) => existing.push_str(&resolved),
                        None => current_text = Some(resolved),
                    }
                }
            }
            Ok(Event::Decl(_)) | Ok(Event::DocType(_)) => {
                // XML declaration and DOCTYPE are ignored
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Parse(format!("XML parse error: {}", e))),
        }
    }

    // A usable document has a root element
    let has_root = root.borrow().children().iter().any(|c| c.borrow().is_element());
    if !has_root {
        return Err(Error::Parse("document has no root element".to_string()));
    }

    Ok(root)
}

/// Parses XML from a file into a tree rooted at a synthetic document node.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<NodeRef> {
    let xml = std::fs::read_to_string(path)?;
    parse_str(&xml)
}

/// Resolves a predefined entity or numeric character reference.
fn resolve_reference(name: &str) -> Option<String> {
    match name {
        "amp" => Some("&".to_string()),
        "lt" => Some("<".to_string()),
        "gt" => Some(">".to_string()),
        "apos" => Some("'".to_string()),
        "quot" => Some("\"".to_string()),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse().ok()?
            } else {
                return None;
            };
            char::from_u32(code).map(|c| c.to_string())
        }
    }
}

/// Flushes accumulated text into a child node, dropping whitespace-only runs.
fn flush_text(current_text: &mut Option<String>, node_stack: &[NodeRef]) {
    if let Some(text) = current_text.take() {
        if text.trim().is_empty() {
            return;
        }
        let text_node = new_node(Some(XmlContent::Text(text)));
        if let Some(parent) = node_stack.last() {
            NodeInner::add_child_to_ref(parent, text_node);
        }
    }
}

/// Parses an element's name and attributes, preserving attribute order.
fn parse_element(e: &BytesStart, reader: &Reader<&[u8]>) -> Result<XmlElement> {
    let name = reader
        .decoder()
        .decode(e.name().as_ref())
        .map_err(|e| Error::Parse(e.to_string()))?
        .to_string();

    let mut attributes = Vec::new();
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| Error::Parse(format!("Attribute error: {}", e)))?;
        let key = reader
            .decoder()
            .decode(attr.key.as_ref())
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();
        attributes.push((key, value));
    }

    Ok(XmlElement::new(name, attributes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_xml() {
        let root = parse_str("<root><child>text</child></root>").unwrap();

        let root_borrowed = root.borrow();
        assert!(root_borrowed.is_document());
        assert_eq!(root_borrowed.child_count(), 1);

        let root_elem = root_borrowed.children()[0].clone();
        assert_eq!(root_elem.borrow().element().unwrap().qname(), "root");

        let child = root_elem.borrow().children()[0].clone();
        assert_eq!(child.borrow().element().unwrap().qname(), "child");

        let text = child.borrow().children()[0].clone();
        assert_eq!(text.borrow().content().unwrap().as_text(), Some("text"));
    }

    #[test]
    fn test_parse_attribute_order_preserved() {
        let root = parse_str(r#"<root b="2" a="1" c="3"/>"#).unwrap();
        let root_elem = root.borrow().children()[0].clone();
        let borrowed = root_elem.borrow();
        let attrs = borrowed.element().unwrap().attributes();
        let names: Vec<&str> = attrs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_whitespace_only_text_dropped() {
        let root = parse_str("<a>\n  <b/>\n  <c/>\n</a>").unwrap();
        let a = root.borrow().children()[0].clone();
        assert_eq!(a.borrow().child_count(), 2);
    }

    #[test]
    fn test_mixed_text_kept_verbatim() {
        let root = parse_str("<a> hello  world </a>").unwrap();
        let a = root.borrow().children()[0].clone();
        let text = a.borrow().children()[0].clone();
        assert_eq!(
            text.borrow().content().unwrap().as_text(),
            Some(" hello  world ")
        );
    }

    #[test]
    fn test_self_closing_tracked() {
        let root = parse_str("<a><b/><c></c></a>").unwrap();
        let a = root.borrow().children()[0].clone();
        let a_borrowed = a.borrow();
        let b = a_borrowed.children()[0].borrow();
        let c = a_borrowed.children()[1].borrow();
        assert!(b.element().unwrap().is_self_closing());
        assert!(!c.element().unwrap().is_self_closing());
    }

    #[test]
    fn test_entities_unescaped() {
        let root = parse_str(r#"<a x="1 &amp; 2">a &lt; b</a>"#).unwrap();
        let a = root.borrow().children()[0].clone();
        let a_borrowed = a.borrow();
        assert_eq!(a_borrowed.element().unwrap().attr("x"), Some("1 & 2"));
        let text = a_borrowed.children()[0].clone();
        assert_eq!(text.borrow().content().unwrap().as_text(), Some("a < b"));
    }

    #[test]
    fn test_comment_kept() {
        let root = parse_str("<a><!--note--></a>").unwrap();
        let a = root.borrow().children()[0].clone();
        let comment = a.borrow().children()[0].clone();
        let comment_borrowed = comment.borrow();
        match comment_borrowed.content() {
            Some(XmlContent::Comment(text)) => assert_eq!(text, "note"),
            other => panic!("expected comment, got {:?}", other),
        }
    }

    #[test]
    fn test_doctype_ignored() {
        let root = parse_str("<!DOCTYPE a SYSTEM \"a.dtd\"><a/>").unwrap();
        assert_eq!(root.borrow().child_count(), 1);
    }

    #[test]
    fn test_no_root_element_rejected() {
        assert!(parse_str("").is_err());
        assert!(parse_str("<!--only a comment-->").is_err());
    }

    #[test]
    fn test_malformed_rejected() {
        assert!(parse_str("<a><b></a>").is_err());
    }
}
