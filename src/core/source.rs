//! Ontology source documents and their format dispatch.

use crate::core::QuadSet;
use crate::error::{Error, Result};
use crate::parsing::{owl_xml, rdf_parser};
use serde::{Deserialize, Serialize};

/// Source format, resolved once from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// `.ttl`
    Turtle,
    /// `.owl` and `.rdf`, handled by the reduced OWL/XML walker
    OwlXml,
}

impl SourceKind {
    /// Built-in extension mapping, used when no configuration is at hand.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "ttl" => Some(SourceKind::Turtle),
            "owl" | "rdf" => Some(SourceKind::OwlXml),
            _ => None,
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (stem, extension) = file_name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Self::from_extension(extension)
    }

    pub fn triplify(self, text: &str) -> Result<QuadSet> {
        match self {
            SourceKind::Turtle => rdf_parser::parse_turtle(text),
            SourceKind::OwlXml => owl_xml::reduce(text),
        }
    }
}

/// A source file's full text, tagged with its format.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub kind: SourceKind,
    pub text: String,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let kind = SourceKind::from_file_name(&name)
            .ok_or_else(|| Error::InvalidSource(format!("unsupported file format: {}", name)))?;
        Ok(Self { name, kind, text: text.into() })
    }

    pub fn with_kind(name: impl Into<String>, kind: SourceKind, text: impl Into<String>) -> Self {
        Self { name: name.into(), kind, text: text.into() }
    }

    /// `file:` IRI naming this document, the base for its relative references.
    pub fn base_iri(&self) -> String {
        format!("{}{}", owl_xml::DEFAULT_DOCUMENT_BASE, urlencoding::encode(&self.name))
    }

    pub fn triplify(&self) -> Result<QuadSet> {
        let result = match self.kind {
            SourceKind::OwlXml => owl_xml::reduce_with_base(&self.text, &self.base_iri()),
            SourceKind::Turtle => self.kind.triplify(&self.text),
        };
        result.map_err(|e| match e {
            Error::Parse(msg) => Error::Parse(format!("{}: {}", self.name, msg)),
            other => other,
        })
    }
}

/// Triplify source text whose format is given by its file extension.
pub fn triplify(text: &str, extension: &str) -> Result<QuadSet> {
    let kind = SourceKind::from_extension(extension.trim_start_matches('.'))
        .ok_or_else(|| Error::InvalidSource(format!("unsupported file format: {}", extension)))?;
    kind.triplify(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(SourceKind::from_file_name("pizza.owl"), Some(SourceKind::OwlXml));
        assert_eq!(SourceKind::from_file_name("model.rdf"), Some(SourceKind::OwlXml));
        assert_eq!(SourceKind::from_file_name("data.ttl"), Some(SourceKind::Turtle));
        assert_eq!(SourceKind::from_file_name("quads.nq"), None);
        assert_eq!(SourceKind::from_file_name("Data.TTL"), None);
        assert_eq!(SourceKind::from_file_name("ttl"), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = triplify("", "json").unwrap_err();
        assert!(matches!(err, Error::InvalidSource(_)));
    }

    #[test]
    fn test_document_dispatch() {
        let doc = SourceDocument::new(
            "people.ttl",
            "<http://example.org/a> <http://example.org/knows> <http://example.org/b> .",
        )
        .unwrap();
        assert_eq!(doc.kind, SourceKind::Turtle);
        assert_eq!(doc.triplify().unwrap().len(), 1);
    }

    #[test]
    fn test_base_iri_is_encoded_file_name() {
        let doc = SourceDocument::with_kind("my pizza.owl", SourceKind::OwlXml, "");
        assert_eq!(doc.base_iri(), "file:///my%20pizza.owl");
    }
}
