//! A minimal generic element tree over the `quick-xml` event stream.
//!
//! The tree is schema-agnostic: tags keep their namespace prefix exactly as
//! written (`gnc:account`, `act:id`, ...), and all GnuCash semantics live in
//! the mappers. Callers that already hold a document can also build `Elem`
//! values themselves and hand them to [`parse_tree`](crate::parse_tree).

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ParseError, ParseResult};

/// One XML element: prefixed tag, attributes, concatenated text content,
/// and child elements in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Elem {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Elem>,
}

impl Elem {
    pub fn new(tag: impl Into<String>) -> Elem {
        Elem {
            tag: tag.into(),
            ..Elem::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First child with the given prefixed tag.
    pub fn child(&self, tag: &str) -> Option<&Elem> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// All children with the given prefixed tag, in document order.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Elem> {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Trimmed text content of this element.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Trimmed text content of the first child with the given tag, if that
    /// child exists and has non-empty text.
    pub fn text_of(&self, tag: &str) -> Option<&str> {
        let text = self.child(tag)?.text();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Reads a whole document and returns its root element.
pub fn read_document<R: BufRead>(reader: R) -> ParseResult<Elem> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text_start = true;
    xml.config_mut().trim_text_end = true;

    let mut buf = Vec::new();
    let mut stack: Vec<Elem> = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(start) => {
                stack.push(open(&start)?);
            }
            Event::Empty(start) => {
                let elem = open(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(elem),
                    None => return Ok(elem),
                }
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(cdata) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Event::End(_) => {
                // quick-xml validates end-tag nesting, so the stack cannot
                // underflow here on well-formed input.
                let elem = stack.pop().ok_or_else(|| {
                    ParseError::malformed("document", "", "unexpected closing tag")
                })?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(elem),
                    None => return Ok(elem),
                }
            }
            Event::Eof => {
                return Err(ParseError::malformed(
                    "document",
                    "",
                    "unexpected end of document",
                ));
            }
            _ => {} // declaration, comments, processing instructions
        }
        buf.clear();
    }
}

fn open(start: &quick_xml::events::BytesStart<'_>) -> ParseResult<Elem> {
    let mut elem = Elem::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::InvalidAttr)?;
        elem.attrs.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            attr.unescape_value()?.into_owned(),
        ));
    }
    Ok(elem)
}
