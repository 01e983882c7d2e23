//! XML printer that outputs node trees.
//!
//! Output is compact: no indentation or synthetic whitespace is introduced,
//! so a patched tree serializes deterministically. A childless element prints
//! as `<e/>` or `<e></e>` according to its self-closing flag.

use std::io::Write;

use crate::error::{Error, Result};
use crate::node::{NodeRef, XmlContent};

/// Options for XML printing.
#[derive(Debug, Clone, Default)]
pub struct XmlPrinterOptions {
    /// Whether to emit a leading XML declaration.
    pub xml_declaration: bool,
}

/// XML printer that outputs node trees.
pub struct XmlPrinter<W: Write> {
    writer: W,
    options: XmlPrinterOptions,
}

impl<W: Write> XmlPrinter<W> {
    /// Creates a new XML printer.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, XmlPrinterOptions::default())
    }

    /// Creates a new XML printer with the given options.
    pub fn with_options(writer: W, options: XmlPrinterOptions) -> Self {
        XmlPrinter { writer, options }
    }

    /// Prints a node tree to the output.
    pub fn print(&mut self, root: &NodeRef) -> std::io::Result<()> {
        if self.options.xml_declaration {
            writeln!(self.writer, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        }
        self.print_node(root)?;
        self.writer.flush()
    }

    fn print_node(&mut self, node: &NodeRef) -> std::io::Result<()> {
        let borrowed = node.borrow();

        match borrowed.content() {
            None => {
                // Synthetic document node: print its children
                for child in borrowed.children() {
                    self.print_node(child)?;
                }
            }
            Some(XmlContent::Text(text)) => {
                write!(self.writer, "{}", escape_xml(text))?;
            }
            Some(XmlContent::Comment(comment)) => {
                write!(self.writer, "<!--{}-->", comment)?;
            }
            Some(XmlContent::ProcessingInstruction(pi)) => {
                write!(self.writer, "{}", pi)?;
            }
            Some(XmlContent::Element(element)) => {
                write!(self.writer, "<{}", element.qname())?;
                for (name, value) in element.attributes() {
                    write!(self.writer, " {}=\"{}\"", name, escape_xml_attr(value))?;
                }

                if borrowed.children().is_empty() {
                    if element.is_self_closing() {
                        write!(self.writer, "/>")?;
                    } else {
                        write!(self.writer, "></{}>", element.qname())?;
                    }
                } else {
                    write!(self.writer, ">")?;
                    for child in borrowed.children() {
                        self.print_node(child)?;
                    }
                    write!(self.writer, "</{}>", element.qname())?;
                }
            }
        }

        Ok(())
    }
}

/// Prints a node tree to a string, without an XML declaration.
pub fn print_to_string(root: &NodeRef) -> Result<String> {
    let mut buf = Vec::new();
    let mut printer = XmlPrinter::new(&mut buf);
    printer.print(root)?;
    String::from_utf8(buf).map_err(|e| Error::Parse(e.to_string()))
}

/// Escapes special XML characters in text content.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escapes special XML characters in attribute values.
fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    fn roundtrip(xml: &str) -> String {
        print_to_string(&parse_str(xml).unwrap()).unwrap()
    }

    #[test]
    fn test_roundtrip_compact() {
        assert_eq!(roundtrip("<a><b/><c>text</c></a>"), "<a><b/><c>text</c></a>");
    }

    #[test]
    fn test_self_closing_forms_preserved() {
        assert_eq!(roundtrip("<a><b/></a>"), "<a><b/></a>");
        assert_eq!(roundtrip("<a><b></b></a>"), "<a><b></b></a>");
    }

    #[test]
    fn test_attributes_in_document_order() {
        assert_eq!(roundtrip(r#"<a z="1" y="2"/>"#), r#"<a z="1" y="2"/>"#);
    }

    #[test]
    fn test_escaping() {
        assert_eq!(
            roundtrip(r#"<a x="1 &amp; 2">a &lt; b</a>"#),
            r#"<a x="1 &amp; 2">a &lt; b</a>"#
        );
        assert_eq!(escape_xml("<test>"), "&lt;test&gt;");
        assert_eq!(escape_xml_attr("\"test\""), "&quot;test&quot;");
    }

    #[test]
    fn test_comment_and_pi_roundtrip() {
        assert_eq!(roundtrip("<a><!--note--></a>"), "<a><!--note--></a>");
        assert_eq!(
            roundtrip(r#"<a><?target data?></a>"#),
            r#"<a><?target data?></a>"#
        );
    }

    #[test]
    fn test_xml_declaration_option() {
        let tree = parse_str("<a/>").unwrap();
        let mut buf = Vec::new();
        let mut printer = XmlPrinter::with_options(
            &mut buf,
            XmlPrinterOptions {
                xml_declaration: true,
            },
        );
        printer.print(&tree).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a/>");
    }
}
