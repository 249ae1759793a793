//! Oxigraph-based SPARQL query engine adapter.
//!
//! The adapter evaluates a query against a [`TripleStore`] and reports the
//! solutions as a stream of [`BindingEvent`]s. A SELECT query always ends with
//! either [`BindingEvent::End`] or [`BindingEvent::Error`]; ASK, CONSTRUCT and
//! DESCRIBE queries produce a single [`BindingEvent::Unsupported`].
//!
//! # Example
//!
//! ```ignore
//! use graphforge::querying::oxigraph_adapter::OxigraphAdapter;
//! use graphforge::store::TripleStore;
//! use std::collections::BTreeMap;
//!
//! let store = TripleStore::from_nquads(
//!     "<http://example.org/alice> <http://example.org/knows> <http://example.org/bob> .\n",
//!     BTreeMap::new(),
//! )?;
//!
//! let adapter = OxigraphAdapter::new();
//! let bindings = adapter.execute_query_bindings("SELECT ?s ?o WHERE { ?s ?p ?o }", &store)?;
//! for binding in bindings {
//!     println!("Subject: {:?}, Object: {:?}", binding.get("s"), binding.get("o"));
//! }
//! ```

use crate::error::{Error, Result};
use crate::querying::query_processing::SparqlEngine;
use crate::store::TripleStore;
use log::debug;
use oxigraph::model::Term;
use oxigraph::sparql::{QueryResults, SparqlEvaluator};
use std::sync::mpsc::{self, Sender};

/// One solution: variable name and display value, in solution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    values: Vec<(String, String)>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, variable: impl Into<String>, value: impl Into<String>) {
        self.values.push((variable.into(), value.into()));
    }

    pub fn get(&self, variable: &str) -> Option<&str> {
        self.values.iter().find(|(name, _)| name == variable).map(|(_, value)| value.as_str())
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Binding {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut binding = Binding::new();
        for (variable, value) in iter {
            binding.push(variable, value);
        }
        binding
    }
}

/// Events a running query reports to its consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingEvent {
    Row(Binding),
    /// All rows have been delivered; distinct from a result with no rows
    End,
    Error(String),
    /// The query produced something other than variable bindings
    Unsupported(String),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OxigraphAdapter;

impl OxigraphAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Runs a query to completion and returns its solutions.
    pub fn execute_query_bindings(&self, query: &str, store: &TripleStore) -> Result<Vec<Binding>> {
        let (tx, rx) = mpsc::channel();
        self.execute(query, store, &tx);
        drop(tx);

        let mut bindings = Vec::new();
        for event in rx {
            match event {
                BindingEvent::Row(binding) => bindings.push(binding),
                BindingEvent::End => return Ok(bindings),
                BindingEvent::Error(message) => return Err(Error::Query(message)),
                BindingEvent::Unsupported(kind) => return Err(Error::UnsupportedResult(kind)),
            }
        }
        Err(Error::Query("result stream closed before its end".to_string()))
    }
}

impl SparqlEngine for OxigraphAdapter {
    fn execute(&self, query: &str, store: &TripleStore, events: &Sender<BindingEvent>) {
        debug!("Executing query on Oxigraph store:\n{}", query);

        let prepared = match SparqlEvaluator::new().parse_query(query) {
            Ok(prepared) => prepared,
            Err(e) => {
                let _ = events.send(BindingEvent::Error(e.to_string()));
                return;
            }
        };
        let results = match prepared.on_store(store.source()).execute() {
            Ok(results) => results,
            Err(e) => {
                let _ = events.send(BindingEvent::Error(e.to_string()));
                return;
            }
        };

        match results {
            QueryResults::Solutions(solutions) => {
                for solution in solutions {
                    let event = match solution {
                        Ok(solution) => BindingEvent::Row(
                            solution
                                .iter()
                                .map(|(variable, term)| (variable.as_str(), term_value(term)))
                                .collect(),
                        ),
                        Err(e) => {
                            let _ = events.send(BindingEvent::Error(e.to_string()));
                            return;
                        }
                    };
                    if events.send(event).is_err() {
                        debug!("Query consumer went away, stopping");
                        return;
                    }
                }
                let _ = events.send(BindingEvent::End);
            }
            QueryResults::Boolean(_) => {
                let _ = events.send(BindingEvent::Unsupported("boolean (ASK) result".to_string()));
            }
            _ => {
                let _ = events.send(BindingEvent::Unsupported(
                    "graph (CONSTRUCT or DESCRIBE) result".to_string(),
                ));
            }
        }
    }
}

/// Display value of a bound term: the IRI, the literal's lexical form, or
/// `_:id` for a blank node.
pub fn term_value(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn store() -> TripleStore {
        TripleStore::from_nquads(
            "<http://example.org/alice> <http://example.org/knows> <http://example.org/bob> .\n\
             <http://example.org/alice> <http://example.org/age> \"30\" .\n",
            BTreeMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_select_bindings() {
        let adapter = OxigraphAdapter::new();
        let bindings = adapter
            .execute_query_bindings(
                "SELECT ?o WHERE { <http://example.org/alice> <http://example.org/knows> ?o }",
                &store(),
            )
            .unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].get("o"), Some("http://example.org/bob"));
    }

    #[test]
    fn test_literal_values_are_lexical() {
        let adapter = OxigraphAdapter::new();
        let bindings = adapter
            .execute_query_bindings("SELECT ?age WHERE { ?s <http://example.org/age> ?age }", &store())
            .unwrap();
        assert_eq!(bindings[0].get("age"), Some("30"));
    }

    #[test]
    fn test_empty_result_still_ends() {
        let (tx, rx) = mpsc::channel();
        OxigraphAdapter::new().execute(
            "SELECT ?s WHERE { ?s <http://example.org/missing> ?o }",
            &store(),
            &tx,
        );
        drop(tx);
        let events: Vec<BindingEvent> = rx.into_iter().collect();
        assert_eq!(events, vec![BindingEvent::End]);
    }

    #[test]
    fn test_ask_is_unsupported() {
        let adapter = OxigraphAdapter::new();
        let err = adapter.execute_query_bindings("ASK { ?s ?p ?o }", &store()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedResult(_)));
    }

    #[test]
    fn test_construct_is_unsupported() {
        let adapter = OxigraphAdapter::new();
        let err = adapter
            .execute_query_bindings("CONSTRUCT { ?s ?p ?o } WHERE { ?s ?p ?o }", &store())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedResult(_)));
    }

    #[test]
    fn test_syntax_error_is_query_error() {
        let adapter = OxigraphAdapter::new();
        let err = adapter.execute_query_bindings("SELECT WHERE {", &store()).unwrap_err();
        assert!(matches!(err, Error::Query(_)));
    }
}
