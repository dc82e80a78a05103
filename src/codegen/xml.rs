//! Minimal XML element tree used by the generators
//!
//! Attributes keep the order they were added in and every value is escaped
//! on the way out, so rendering is byte-for-byte reproducible.

use std::fmt::Write;

const INDENT: &str = "    ";

/// Formats a float as the shortest decimal that reads back to the same value
///
/// `f64`'s `Display` never uses the locale or an exponent. Negative zero is
/// written as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

/// Escapes the five XML special characters for use in attribute values
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Comments may not contain `--` or end in `-`
fn escape_comment(text: &str) -> String {
    let mut escaped = text.replace("--", "- -");
    if escaped.ends_with('-') {
        escaped.push(' ');
    }
    escaped
}

/// A child of an element
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Comment(String),
}

/// An element with ordered attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Root element carrying the SUMO schema location
    pub fn schema_root(name: &'static str, xsd: &str) -> Self {
        Self::new(name)
            .attr("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance")
            .attr("xsi:noNamespaceSchemaLocation", xsd)
    }

    pub fn attr(mut self, name: &'static str, value: impl ToString) -> Self {
        self.attributes.push((name, value.to_string()));
        self
    }

    pub fn attr_number(self, name: &'static str, value: f64) -> Self {
        self.attr(name, format_number(value))
    }

    pub fn attr_opt(self, name: &'static str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    pub fn attr_opt_number(self, name: &'static str, value: Option<f64>) -> Self {
        match value {
            Some(value) => self.attr_number(name, value),
            None => self,
        }
    }

    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Comment(text.into()));
        self
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Renders the element as a complete document with an XML declaration
    pub fn to_document(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\n");
        self.write_to(&mut out, 0);
        out
    }

    fn write_to(&self, out: &mut String, depth: usize) {
        let indent = INDENT.repeat(depth);
        let _ = write!(out, "{}<{}", indent, self.name);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }

        if self.children.is_empty() {
            out.push_str("/>\n");
            return;
        }

        out.push_str(">\n");
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.write_to(out, depth + 1),
                XmlNode::Comment(text) => {
                    let _ = writeln!(out, "{}{}<!-- {} -->", indent, INDENT, escape_comment(text));
                }
            }
        }
        let _ = writeln!(out, "{}</{}>", indent, self.name);
    }
}
