//! Source format parsers and the query text normalizer.
//!
//! - **rdf_parser** - Turtle and N-Quads through Oxigraph, plus N-Quads serialization
//! - **owl_xml** - the reduced OWL/XML walker used for `.owl` and `.rdf` sources
//! - **query_normalizer** - rewrites user query text into strict SPARQL

pub mod owl_xml;
pub mod query_normalizer;
pub mod rdf_parser;

pub use query_normalizer::QueryNormalizer;
