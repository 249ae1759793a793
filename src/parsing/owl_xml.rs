//! Reduced OWL/XML triplification.
//!
//! This is not an RDF/XML parser. It walks the element tree and recovers the
//! class and property assertions reachable by one traversal shape:
//!
//! - `owl:Class` children become triples keyed by the class subject, and an
//!   `owl:equivalentClass` / `owl:Class` / `owl:oneOf` enumeration yields
//!   `(member, rdf:type, class)` for every `rdf:Description rdf:about` member;
//! - `rdf:RDF` and `rdf:Description` are transparent containers;
//! - inside any other element, children with `rdf:resource` or without element
//!   children are leaf triples, the rest are walked with the nearest subject.
//!
//! Predicates are the qualified element names taken verbatim (`rdfs:label`
//! stays the IRI `rdfs:label`). `rdf:about`, `rdf:ID` and `rdf:resource` are
//! resolved against `xml:base`, or against the document's own IRI when the
//! root declares none. Leaf values starting with `http` or with that base
//! become IRIs, everything else plain literals. Statements without a
//! derivable subject all share the blank node `_:blank`. Anything outside
//! this shape, such as collections other than `owl:oneOf`, reification or
//! datatypes, is dropped.

use crate::core::QuadSet;
use crate::error::{Error, Result};
use log::warn;
use oxigraph::model::{BlankNode, GraphName, Literal, NamedNode, Quad, Term};
use oxiri::Iri;
use quick_xml::escape::unescape_with;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;

const RDF_ROOT: &str = "rdf:RDF";
const RDF_DESCRIPTION: &str = "rdf:Description";
const RDF_ABOUT: &str = "rdf:about";
const RDF_ID: &str = "rdf:ID";
const RDF_RESOURCE: &str = "rdf:resource";
const RDF_TYPE: &str = "rdf:type";
const OWL_CLASS: &str = "owl:Class";
const OWL_EQUIVALENT_CLASS: &str = "owl:equivalentClass";
const OWL_ONE_OF: &str = "owl:oneOf";
const XML_BASE: &str = "xml:base";

/// Local name of the shared fallback subject `_:blank`.
pub const FALLBACK_BLANK_NODE: &str = "blank";

/// Base for documents reduced without a name of their own.
pub const DEFAULT_DOCUMENT_BASE: &str = "file:///";

const PREDEFINED_ENTITIES: [(&str, &str); 5] =
    [("amp", "&"), ("lt", "<"), ("gt", ">"), ("apos", "'"), ("quot", "\"")];

/// Reduce an OWL/XML document to quads, resolving relative references
/// against [`DEFAULT_DOCUMENT_BASE`] unless the document sets `xml:base`.
pub fn reduce(text: &str) -> Result<QuadSet> {
    reduce_with_base(text, DEFAULT_DOCUMENT_BASE)
}

/// Reduce an OWL/XML document whose own IRI is `document_base`.
pub fn reduce_with_base(text: &str, document_base: &str) -> Result<QuadSet> {
    let root = parse_document(text)?;
    let base = root
        .attribute(XML_BASE)
        .and_then(|base| Iri::parse(base.to_string()).ok())
        .or_else(|| Iri::parse(document_base.to_string()).ok())
        .ok_or_else(|| Error::InvalidSource(format!("invalid document base <{}>", document_base)))?;

    let mut reducer = Reducer::new(base);
    reducer.traverse(&root, "");
    if reducer.dropped > 0 {
        warn!("OWL/XML reducer dropped {} statements without valid IRIs", reducer.dropped);
    }
    Ok(reducer.quads)
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

#[derive(Debug)]
enum Node {
    Element(Element),
    Text(String),
}

impl Element {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    fn has_element_children(&self) -> bool {
        self.elements().next().is_some()
    }

    fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(el) => el.collect_text(out),
            }
        }
    }

    /// Descendants (not self) with the given name, in document order.
    fn descendants_named<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if child.name == name {
                out.push(child);
            }
            child.descendants_named(name, out);
        }
    }

    fn first_descendant_named(&self, name: &str) -> Option<&Element> {
        for child in self.elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.first_descendant_named(name) {
                return Some(found);
            }
        }
        None
    }
}

struct Reducer {
    base: Iri<String>,
    /// `base` without its fragment; resolved references start with it
    base_prefix: String,
    quads: QuadSet,
    dropped: usize,
}

impl Reducer {
    fn new(base: Iri<String>) -> Self {
        let base_prefix = strip_fragment(base.as_str()).to_string();
        Self { base, base_prefix, quads: QuadSet::new(), dropped: 0 }
    }

    fn traverse(&mut self, element: &Element, inherited: &str) {
        let subject = self.subject_of(element, inherited);

        match element.name.as_str() {
            OWL_CLASS => {
                for child in element.elements() {
                    if child.name == OWL_EQUIVALENT_CLASS {
                        self.equivalent_class(child, &subject);
                    } else {
                        let value = self.leaf_value(child);
                        self.emit(&subject, &child.name, value);
                    }
                }
            }
            RDF_ROOT | RDF_DESCRIPTION => {
                for child in element.elements() {
                    self.traverse(child, &subject);
                }
            }
            _ => {
                for child in element.elements() {
                    if child.attribute(RDF_RESOURCE).is_some() || !child.has_element_children() {
                        let value = self.leaf_value(child);
                        self.emit(&subject, &child.name, value);
                    } else {
                        self.traverse(child, &subject);
                    }
                }
            }
        }
    }

    fn equivalent_class(&mut self, element: &Element, class_subject: &str) {
        for class in element.elements().filter(|el| el.name == OWL_CLASS) {
            let Some(one_of) = class.first_descendant_named(OWL_ONE_OF) else {
                continue;
            };
            let mut members = Vec::new();
            one_of.descendants_named(RDF_DESCRIPTION, &mut members);
            for member in members {
                if let Some(about) = member.attribute(RDF_ABOUT) {
                    let member_subject = self.resolve(about);
                    self.emit(&member_subject, RDF_TYPE, Some(class_subject.to_string()));
                }
            }
        }
    }

    fn subject_of(&self, element: &Element, inherited: &str) -> String {
        if let Some(about) = element.attribute(RDF_ABOUT) {
            return self.resolve(about);
        }
        if let Some(id) = element.attribute(RDF_ID) {
            return self.resolve(&format!("#{}", id));
        }
        inherited.to_string()
    }

    fn leaf_value(&self, element: &Element) -> Option<String> {
        if let Some(resource) = element.attribute(RDF_RESOURCE) {
            return Some(self.resolve(resource));
        }
        let text = element.text_content();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Relative references are resolved against the base; anything that
    /// does not resolve is kept as written.
    fn resolve(&self, value: &str) -> String {
        self.base.resolve(value).map_or_else(|_| value.to_string(), Iri::into_inner)
    }

    fn is_iri_value(&self, value: &str) -> bool {
        value.starts_with("http") || value.starts_with(&self.base_prefix)
    }

    fn emit(&mut self, subject: &str, predicate: &str, value: Option<String>) {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            return;
        };
        let Ok(predicate) = NamedNode::new(predicate) else {
            self.dropped += 1;
            return;
        };
        let object: Term = if self.is_iri_value(&value) {
            match NamedNode::new(value.as_str()) {
                Ok(iri) => iri.into(),
                Err(_) => Literal::new_simple_literal(value).into(),
            }
        } else {
            Literal::new_simple_literal(value).into()
        };

        let quad = if subject.is_empty() {
            Quad::new(
                BlankNode::new_unchecked(FALLBACK_BLANK_NODE),
                predicate,
                object,
                GraphName::DefaultGraph,
            )
        } else if let Some(id) = subject.strip_prefix("_:") {
            match BlankNode::new(id) {
                Ok(node) => Quad::new(node, predicate, object, GraphName::DefaultGraph),
                Err(_) => {
                    self.dropped += 1;
                    return;
                }
            }
        } else {
            match NamedNode::new(subject) {
                Ok(node) => Quad::new(node, predicate, object, GraphName::DefaultGraph),
                Err(_) => {
                    self.dropped += 1;
                    return;
                }
            }
        };
        self.quads.insert(quad);
    }
}

fn strip_fragment(iri: &str) -> &str {
    iri.split_once('#').map_or(iri, |(head, _)| head)
}

fn parse_document(text: &str) -> Result<Element> {
    let mut reader = Reader::from_str(text);
    let mut entities: HashMap<String, String> = PREDEFINED_ENTITIES
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::Parse(format!("XML error at byte {}: {}", reader.buffer_position(), e))
        })?;
        match event {
            Event::Start(start) => stack.push(read_element(&start, &entities)?),
            Event::Empty(start) => {
                let element = read_element(&start, &entities)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::Parse("unbalanced closing tag".to_string()))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(&text);
                    parent.children.push(Node::Text(expand_entities(&raw, &entities).into_owned()));
                }
            }
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(&data).into_owned();
                    parent.children.push(Node::Text(raw));
                }
            }
            Event::DocType(doctype) => {
                entities.extend(entity_declarations(&String::from_utf8_lossy(&doctype))?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::Parse(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| Error::Parse("document has no root element".to_string()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

fn read_element(start: &BytesStart<'_>, entities: &HashMap<String, String>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| Error::Parse(format!("<{}>: {}", name, e)))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attribute.value);
        attributes.push((key, expand_entities(&raw, entities).into_owned()));
    }
    Ok(Element { name, attributes, children: Vec::new() })
}

fn entity_declarations(doctype: &str) -> Result<HashMap<String, String>> {
    let declaration = Regex::new(r#"<!ENTITY\s+([A-Za-z_][\w.-]*)\s+(?:"([^"]*)"|'([^']*)')\s*>"#)?;
    let mut entities = HashMap::new();
    for captures in declaration.captures_iter(doctype) {
        let value = captures.get(2).or_else(|| captures.get(3)).map_or("", |m| m.as_str());
        entities.insert(captures[1].to_string(), value.to_string());
    }
    Ok(entities)
}

/// Expand predefined, numeric and DTD-declared entity references. Text with
/// an unknown or unterminated reference is kept as written.
fn expand_entities<'a>(raw: &'a str, entities: &HashMap<String, String>) -> Cow<'a, str> {
    unescape_with(raw, |name| entities.get(name).map(String::as_str)).unwrap_or(Cow::Borrowed(raw))
}
