//! Minimal owned XML element tree, read and written with quick-xml.
//!
//! Values follow the `<Name value="..."/>` convention used by the bundle
//! documents; element text is accepted as a fallback when no `value`
//! attribute is present.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resolve::path::PathExpr;

pub const VALUE_ATTR: &str = "value";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Malformed(String),
    #[error("element '{0}' is never closed")]
    Unclosed(String),
    #[error("document has no root element")]
    Empty,
    #[error("document has more than one root element")]
    MultipleRoots,
    #[error("failed to write XML: {0}")]
    Write(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlNode {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<(String, String)>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn parse(xml: &str) -> Result<XmlNode, XmlError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| XmlError::Malformed(e.to_string()))?;
            match event {
                Event::Start(e) => stack.push(node_from_start(&e)?),
                Event::Empty(e) => {
                    let node = node_from_start(&e)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::End(_) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| XmlError::Malformed("unexpected closing tag".into()))?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| XmlError::Malformed(e.to_string()))?;
                    if let Some(top) = stack.last_mut() {
                        append_text(top, &text);
                    }
                }
                Event::CData(c) => {
                    let raw = c.into_inner();
                    let text = String::from_utf8_lossy(&raw);
                    if let Some(top) = stack.last_mut() {
                        append_text(top, &text);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::Unclosed(open.name));
        }
        root.ok_or(XmlError::Empty)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// The node's value: its `value` attribute, else its text.
    pub fn value(&self) -> Option<&str> {
        self.attribute(VALUE_ATTR).or(self.text.as_deref())
    }

    /// The `index`-th child (zero-based) named `name`.
    pub fn child(&self, name: &str, index: usize) -> Option<&XmlNode> {
        self.children.iter().filter(|c| c.name == name).nth(index)
    }

    /// Like [`XmlNode::child`], creating missing siblings up to `index`.
    pub fn child_mut_or_create(&mut self, name: &str, index: usize) -> &mut XmlNode {
        let existing = self.children.iter().filter(|c| c.name == name).count();
        for _ in existing..=index {
            self.children.push(XmlNode::new(name));
        }
        let position = self
            .children
            .iter()
            .enumerate()
            .filter(|(_, c)| c.name == name)
            .nth(index)
            .map(|(i, _)| i)
            .unwrap_or(self.children.len() - 1);
        &mut self.children[position]
    }

    /// Walk `path` below this node (this node's own name is not part of the path).
    pub fn find(&self, path: &PathExpr) -> Option<&XmlNode> {
        let mut node = self;
        for segment in path.segments() {
            node = node.child(&segment.name, segment.index)?;
        }
        Some(node)
    }

    /// Walk `path` below this node, creating every missing element.
    pub fn create(&mut self, path: &PathExpr) -> &mut XmlNode {
        let mut node = self;
        for segment in path.segments() {
            node = node.child_mut_or_create(&segment.name, segment.index);
        }
        node
    }

    /// Serialise with two-space indentation.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_node(&mut writer, self)?;
        String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Write(e.to_string()))
    }
}

fn node_from_start(start: &BytesStart<'_>) -> Result<XmlNode, XmlError> {
    let mut node = XmlNode::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Malformed(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::Malformed(e.to_string()))?
            .into_owned();
        node.attributes.push((key, value));
    }
    Ok(node)
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(XmlError::MultipleRoots),
    }
}

fn append_text(node: &mut XmlNode, text: &str) {
    match &mut node.text {
        Some(existing) => existing.push_str(text),
        None => node.text = Some(text.to_string()),
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), XmlError> {
    let mut start = BytesStart::new(node.name.as_str());
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children.is_empty() && node.text.is_none() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|e| XmlError::Write(e.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| XmlError::Write(e.to_string()))?;
    if let Some(text) = &node.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| XmlError::Write(e.to_string()))?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.name.as_str())))
        .map_err(|e| XmlError::Write(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_value_attributes_and_text() {
        let root = XmlNode::parse(
            r#"<Root><Loop><Supplier value="ATT"/><PON>123</PON></Loop></Root>"#,
        )
        .unwrap();
        assert_eq!(root.name, "Root");
        let lp = root.child("Loop", 0).unwrap();
        assert_eq!(lp.child("Supplier", 0).unwrap().value(), Some("ATT"));
        assert_eq!(lp.child("PON", 0).unwrap().value(), Some("123"));
    }

    #[test]
    fn malformed_is_reported() {
        assert!(XmlNode::parse("<Root><Loop></Root>").is_err());
        assert!(XmlNode::parse("<Root>").is_err());
        assert_eq!(XmlNode::parse(""), Err(XmlError::Empty));
    }

    #[test]
    fn indexed_lookup_and_create() {
        let mut root = XmlNode::new("Body");
        let path = PathExpr::compile("Loop(1).Supplier").unwrap();
        root.create(&path).set_attribute(VALUE_ATTR, "X");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.find(&path).unwrap().value(), Some("X"));
        assert!(root.find(&PathExpr::compile("Loop.Supplier").unwrap()).is_none());
    }

    #[test]
    fn writes_attributes() {
        let mut root = XmlNode::new("Body");
        root.create(&PathExpr::compile("DS.Supplier").unwrap())
            .set_attribute("link", "//Loop/Supplier");
        let xml = root.to_xml().unwrap();
        assert!(xml.contains(r#"<Supplier link="//Loop/Supplier"/>"#), "{xml}");
        let reparsed = XmlNode::parse(&xml).unwrap();
        assert_eq!(reparsed, root);
    }
}
