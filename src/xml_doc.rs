//! A lightweight element tree over quick-xml for SAP assessment documents.
//!
//! The batch editor only ever rewrites the text of a handful of known leaf
//! elements, so documents are modelled as a tree of optional named slots:
//! every mutation is a conditional write guarded by slot presence, and the
//! rest of the document (attributes, comments, CDATA, processing
//! instructions) round-trips untouched. Element lookup ignores namespace
//! prefixes, matching on local names only.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("xml parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("document has no root element")]
    NoRootElement,
    #[error("unexpected closing tag </{0}>")]
    UnexpectedClosingTag(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

/// One element with its qualified tag name as written in the source document.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
    self_closing: bool,
}

impl Element {
    fn new(tag: String, attributes: Vec<(String, String)>, self_closing: bool) -> Self {
        Self {
            tag,
            attributes,
            children: Vec::new(),
            self_closing,
        }
    }

    /// Tag name with any namespace prefix removed.
    pub fn local_name(&self) -> &str {
        match self.tag.split_once(':') {
            Some((_, local)) => local,
            None => &self.tag,
        }
    }

    /// First direct child element with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|child| child.local_name() == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|child| child.local_name() == name)
    }

    /// All elements in this subtree whose path matches `path`: the first
    /// segment matches at any depth, the remaining segments must be direct
    /// children (the equivalent of an ElementTree `.//A/B` search).
    pub fn find_all_mut(&mut self, path: &[&str]) -> Vec<&mut Element> {
        let mut found = Vec::new();
        if !path.is_empty() {
            collect_anywhere_mut(self, path, &mut found);
        }
        found
    }

    /// Concatenated text content of this element's direct text and CDATA
    /// nodes, or `None` when there are none.
    pub fn text(&self) -> Option<String> {
        let mut content: Option<String> = None;
        for child in &self.children {
            if let XmlNode::Text(text) | XmlNode::CData(text) = child {
                content.get_or_insert_with(String::new).push_str(text);
            }
        }
        content
    }

    /// Replaces this element's text content, leaving any child elements in
    /// place.
    pub fn set_text(&mut self, value: impl Into<String>) {
        self.children
            .retain(|child| !matches!(child, XmlNode::Text(_) | XmlNode::CData(_)));
        self.children.insert(0, XmlNode::Text(value.into()));
        self.self_closing = false;
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }
}

fn collect_anywhere_mut<'a>(element: &'a mut Element, path: &[&str], out: &mut Vec<&'a mut Element>) {
    for child in element.elements_mut() {
        if child.local_name() == path[0] {
            collect_chain_mut(child, &path[1..], out);
        } else {
            collect_anywhere_mut(child, path, out);
        }
    }
}

fn collect_chain_mut<'a>(element: &'a mut Element, path: &[&str], out: &mut Vec<&'a mut Element>) {
    if path.is_empty() {
        out.push(element);
        return;
    }
    for child in element.elements_mut() {
        if child.local_name() == path[0] {
            collect_chain_mut(child, &path[1..], out);
        }
    }
}

/// One parsed assessment document: the root element plus whatever surrounds
/// it (comments, a doctype). The XML declaration is regenerated on write.
#[derive(Clone, Debug, PartialEq)]
pub struct XmlDocument {
    prolog: Vec<XmlNode>,
    root: Element,
    epilog: Vec<XmlNode>,
}

impl XmlDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self, XmlError> {
        Self::parse_str(std::str::from_utf8(bytes)?)
    }

    pub fn parse_str(text: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(text);
        let mut stack: Vec<Element> = Vec::new();
        let mut prolog: Vec<XmlNode> = Vec::new();
        let mut root: Option<Element> = None;
        let mut epilog: Vec<XmlNode> = Vec::new();

        loop {
            let node = match reader.read_event()? {
                Event::Start(start) => {
                    stack.push(element_from_start(&start, false)?);
                    continue;
                }
                Event::End(end) => {
                    let element = stack.pop().ok_or_else(|| {
                        XmlError::UnexpectedClosingTag(
                            String::from_utf8_lossy(end.name().as_ref()).into_owned(),
                        )
                    })?;
                    XmlNode::Element(element)
                }
                Event::Empty(start) => XmlNode::Element(element_from_start(&start, true)?),
                Event::Text(text) => XmlNode::Text(text.unescape()?.into_owned()),
                Event::CData(cdata) => XmlNode::CData(std::str::from_utf8(&cdata)?.to_string()),
                Event::Comment(comment) => {
                    XmlNode::Comment(std::str::from_utf8(&comment)?.to_string())
                }
                Event::PI(pi) => {
                    XmlNode::ProcessingInstruction(std::str::from_utf8(&pi)?.to_string())
                }
                Event::DocType(doctype) => XmlNode::DocType(doctype.unescape()?.into_owned()),
                // The declaration is not preserved; output always carries a
                // fresh UTF-8 declaration.
                Event::Decl(_) => continue,
                Event::Eof => break,
                _ => continue,
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => match node {
                    XmlNode::Element(element) if root.is_none() => root = Some(element),
                    node if root.is_none() => prolog.push(node),
                    node => epilog.push(node),
                },
            }
        }

        Ok(Self {
            prolog,
            root: root.ok_or(XmlError::NoRootElement)?,
            epilog,
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Serializes the document with an XML declaration and UTF-8 encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, XmlError> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }
        Ok(writer.into_inner())
    }
}

fn element_from_start(start: &BytesStart, self_closing: bool) -> Result<Element, XmlError> {
    let tag = std::str::from_utf8(start.name().as_ref())?.to_string();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute?;
        attributes.push((
            std::str::from_utf8(attribute.key.as_ref())?.to_string(),
            attribute.unescape_value()?.into_owned(),
        ));
    }
    Ok(Element::new(tag, attributes, self_closing))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), XmlError> {
    match node {
        XmlNode::Element(element) => write_element(writer, element)?,
        XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text.as_str())))?,
        XmlNode::CData(text) => {
            writer.write_event(Event::CData(BytesCData::new(text.as_str())))?
        }
        XmlNode::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
        }
        XmlNode::ProcessingInstruction(text) => {
            writer.write_event(Event::PI(BytesPI::new(text.as_str())))?
        }
        XmlNode::DocType(text) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(text.as_str())))?
        }
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.tag.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() && element.self_closing {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.tag.as_str())))?;
    Ok(())
}
