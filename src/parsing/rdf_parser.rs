//! Turtle and N-Quads text handling on top of Oxigraph's parsers.
//!
//! Turtle sources are parsed all-or-nothing: a syntax error anywhere fails the
//! file and none of its quads are kept. The same rule applies when a cache
//! file is read back.

use crate::core::QuadSet;
use crate::error::{Error, Result};
use oxigraph::io::{RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::Quad;

/// Parse a Turtle document into an accumulation set.
pub fn parse_turtle(text: &str) -> Result<QuadSet> {
    parse_all(text, RdfFormat::Turtle)
}

/// Parse an N-Quads document (the cache format).
pub fn parse_nquads(text: &str) -> Result<QuadSet> {
    parse_all(text, RdfFormat::NQuads)
}

fn parse_all(text: &str, format: RdfFormat) -> Result<QuadSet> {
    let mut quads = QuadSet::new();
    for quad in RdfParser::from_format(format).for_reader(text.as_bytes()) {
        let quad = quad.map_err(|e| Error::Parse(e.to_string()))?;
        quads.insert(quad);
    }
    Ok(quads)
}

/// Serialize quads as N-Quads text, one quad per line.
pub fn serialize_nquads<'a>(quads: impl IntoIterator<Item = &'a Quad>) -> Result<Vec<u8>> {
    let mut serializer = RdfSerializer::from_format(RdfFormat::NQuads).for_writer(Vec::new());
    for quad in quads {
        serializer
            .serialize_quad(quad)
            .map_err(|e| Error::Serialization(e.to_string()))?;
    }
    serializer.finish().map_err(|e| Error::Serialization(e.to_string()))
}
