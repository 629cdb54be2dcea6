//! Reading and writing layout documents as XML.

use crate::tree::{Element, LayoutDocument, Node};
use crate::{LayoutError, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

impl LayoutDocument {
    /// Parse a layout document
    ///
    /// Whitespace-only text is dropped; comments, processing instructions and
    /// the XML declaration are not retained.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);

        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|e| LayoutError::Parse {
                position: reader.buffer_position() as u64,
                message: e.to_string(),
            })?;

            match event {
                Event::Start(start) => open.push(element_from(&start)?),
                Event::Empty(start) => {
                    let element = element_from(&start)?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| LayoutError::Malformed("unbalanced end tag".into()))?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| LayoutError::Malformed(e.to_string()))?;
                    if text.trim().is_empty() {
                        continue;
                    }
                    if let Some(parent) = open.last_mut() {
                        parent.children.push(Node::Text(text.into_owned()));
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = open.last_mut() {
                        let text = String::from_utf8_lossy(&data).into_owned();
                        parent.children.push(Node::Text(text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(LayoutError::Malformed(format!(
                "element <{}> is never closed",
                unclosed.name
            )));
        }

        root.map(LayoutDocument::new)
            .ok_or_else(|| LayoutError::Malformed("document has no root element".into()))
    }

    /// Serialize the document as indented XML
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        write_element(&mut writer, &self.root)?;
        String::from_utf8(writer.into_inner()).map_err(|e| LayoutError::Write(e.to_string()))
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| LayoutError::Malformed(e.to_string()))?
        .to_string();
    let mut element = Element::new(name);

    for attr in start.attributes() {
        let attr = attr.map_err(|e| LayoutError::Malformed(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| LayoutError::Malformed(e.to_string()))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| LayoutError::Malformed(e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

fn attach(open: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = open.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(LayoutError::Malformed(format!(
            "second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(write_error)?;
        return Ok(());
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    for child in &element.children {
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(write_error)?;
    Ok(())
}

fn write_error(e: impl std::fmt::Display) -> LayoutError {
    LayoutError::Write(e.to_string())
}
