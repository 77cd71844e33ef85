//! Owned, namespace-resolved element tree.
//!
//! The decoder needs random access (mode detection looks ahead, accounts are
//! read after the profile body), so documents are read into a small tree
//! first and queried afterwards.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use crate::error::DecodeError;

/// Resolved namespace of an element or attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ns {
    /// No prefix and no default namespace in scope.
    Unbound,
    Bound(String),
    /// A prefix with no declaration in scope.
    Unknown(String),
}

impl Ns {
    fn from_resolved(resolved: ResolveResult<'_>) -> Self {
        match resolved {
            ResolveResult::Unbound => Ns::Unbound,
            ResolveResult::Bound(ns) => Ns::Bound(String::from_utf8_lossy(ns.as_ref()).into_owned()),
            ResolveResult::Unknown(prefix) => {
                Ns::Unknown(String::from_utf8_lossy(&prefix).into_owned())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub ns: Ns,
    pub local: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub ns: Ns,
    pub local: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlElement>,
    /// Concatenated text and CDATA content.
    pub text: String,
}

impl XmlElement {
    /// This element and all its descendants, breadth first.
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = vec![self];
        let mut i = 0;
        while i < out.len() {
            let current = out[i];
            out.extend(current.children.iter());
            i += 1;
        }
        out
    }
}

fn malformed(reader: &NsReader<&[u8]>, message: impl Into<String>) -> DecodeError {
    DecodeError::Malformed {
        position: reader.buffer_position(),
        message: message.into(),
    }
}

fn open_element(reader: &NsReader<&[u8]>, ns: Ns, start: &BytesStart<'_>) -> Result<XmlElement, DecodeError> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(reader, e.to_string()))?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let ns = Ns::from_resolved(resolved);
        let local = String::from_utf8_lossy(local.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| malformed(reader, e.to_string()))?
            .into_owned();
        attributes.push(XmlAttribute { ns, local, value });
    }
    Ok(XmlElement {
        ns,
        local: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

/// Parse `input` into its root element.
pub fn parse(input: &str) -> Result<XmlElement, DecodeError> {
    if input.trim().is_empty() {
        return Err(DecodeError::Empty);
    }
    let mut reader = NsReader::from_str(input);
    reader.trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_resolved_event();
        let (ns, event) = match event {
            Ok((resolved, event)) => (Ns::from_resolved(resolved), event),
            Err(e) => return Err(malformed(&reader, e.to_string())),
        };
        match event {
            Event::Start(ref start) => {
                let element = open_element(&reader, ns, start)?;
                stack.push(element);
            }
            Event::Empty(ref start) => {
                let element = open_element(&reader, ns, start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => return Err(malformed(&reader, "more than one root element")),
                }
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(malformed(&reader, "unbalanced end tag"));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => return Err(malformed(&reader, "more than one root element")),
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| malformed(&reader, e.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(malformed(&reader, "unexpected end of document"));
    }
    root.ok_or(DecodeError::Empty)
}
