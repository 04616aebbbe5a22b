//! Markup loading and serialization.
//!
//! Templates are written as HTML fragments. Tokenizing is delegated to
//! `quick-xml` in a lenient configuration: attribute values may be unquoted
//! or absent, void elements (`<input>`, `<br>`) need no closing tag, and
//! end tags that do not match an open element are ignored.
//!
//! Serialization is the inverse used for inspection and snapshots: text and
//! attribute values are escaped, void elements are written without a closing
//! tag, fragments serialize as their children.

use std::fmt::Write as _;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event as XmlEvent};

use crate::document::Document;
use crate::error::DomError;
use crate::node::{NodeId, NodeKind, is_void};

impl Document {
    /// Build a document from an HTML fragment.
    ///
    /// Top-level nodes become children of [`Document::root`].
    pub fn parse(markup: &str) -> Result<Self, DomError> {
        let doc = Self::new();
        doc.append_markup(doc.root(), markup)?;
        Ok(doc)
    }

    /// Parse `markup` and append the resulting nodes to `parent`.
    pub fn append_markup(&self, parent: NodeId, markup: &str) -> Result<(), DomError> {
        let mut reader = Reader::from_str(markup);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.trim_text(false);

        let mut open: Vec<(NodeId, String)> = Vec::new();
        let current = |open: &[(NodeId, String)]| open.last().map_or(parent, |(id, _)| *id);

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader
                .read_event()
                .map_err(|source| DomError::Markup { position, source })?;
            match event {
                XmlEvent::Start(start) => {
                    let (el, tag) = self.element_from(&start, position)?;
                    self.append_child(current(&open), el)?;
                    if !is_void(&tag) {
                        open.push((el, tag));
                    }
                }
                XmlEvent::Empty(start) => {
                    let (el, _) = self.element_from(&start, position)?;
                    self.append_child(current(&open), el)?;
                }
                XmlEvent::End(end) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    if let Some(depth) = open
                        .iter()
                        .rposition(|(_, tag)| tag.eq_ignore_ascii_case(&name))
                    {
                        open.truncate(depth);
                    }
                }
                XmlEvent::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|source| DomError::Markup { position, source })?;
                    if !text.is_empty() {
                        let node = self.create_text(text.into_owned());
                        self.append_child(current(&open), node)?;
                    }
                }
                XmlEvent::CData(data) => {
                    let node = self.create_text(String::from_utf8_lossy(&data).into_owned());
                    self.append_child(current(&open), node)?;
                }
                XmlEvent::Comment(comment) => {
                    let node = self.create_comment(String::from_utf8_lossy(&comment).into_owned());
                    self.append_child(current(&open), node)?;
                }
                XmlEvent::Eof => break,
                XmlEvent::Decl(_) | XmlEvent::PI(_) | XmlEvent::DocType(_) => {}
            }
        }
        Ok(())
    }

    fn element_from(
        &self,
        start: &BytesStart<'_>,
        position: u64,
    ) -> Result<(NodeId, String), DomError> {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let el = self.create_element(tag.clone());
        for attr in start.html_attributes() {
            let attr = attr.map_err(|e| DomError::Markup {
                position,
                source: e.into(),
            })?;
            let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|source| DomError::Markup { position, source })?;
            self.set_attribute(el, name, value.into_owned())?;
        }
        Ok((el, tag))
    }

    /// Serialize `node` and its subtree.
    pub fn to_html(&self, node: NodeId) -> Result<String, DomError> {
        let mut out = String::new();
        self.write_node(node, &mut out)?;
        Ok(out)
    }

    /// Serialize only the children of `node`.
    pub fn inner_html(&self, node: NodeId) -> Result<String, DomError> {
        let mut out = String::new();
        for child in self.child_nodes(node)? {
            self.write_node(child, &mut out)?;
        }
        Ok(out)
    }

    fn write_node(&self, node: NodeId, out: &mut String) -> Result<(), DomError> {
        match self.kind(node)? {
            NodeKind::Text => escape_into(&self.text_content(node)?, false, out),
            NodeKind::Comment => {
                let _ = write!(out, "<!--{}-->", self.text_content(node)?);
            }
            NodeKind::Fragment => {
                for child in self.child_nodes(node)? {
                    self.write_node(child, out)?;
                }
            }
            NodeKind::Element => {
                let tag = self.tag(node)?;
                out.push('<');
                out.push_str(&tag);
                for attr in self.attributes(node)? {
                    out.push(' ');
                    out.push_str(&attr.name);
                    out.push_str("=\"");
                    escape_into(&attr.value, true, out);
                    out.push('"');
                }
                out.push('>');
                if is_void(&tag) {
                    return Ok(());
                }
                for child in self.child_nodes(node)? {
                    self.write_node(child, out)?;
                }
                let _ = write!(out, "</{tag}>");
            }
        }
        Ok(())
    }
}

fn escape_into(raw: &str, attribute: bool, out: &mut String) {
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
