use crate::core::QuadSet;
use crate::error::Result;
use crate::parsing::rdf_parser;
use oxigraph::model::Quad;
use oxigraph::store::Store;
use std::collections::BTreeMap;

/// De-duplicated quad collection plus the prefix map used to build queries.
///
/// Content lives for the process only. Loading a project always starts from
/// an empty store; nothing is merged across projects.
#[derive(Clone)]
pub struct TripleStore {
    store: Store,
    prefixes: BTreeMap<String, String>,
}

impl TripleStore {
    pub fn new(prefixes: BTreeMap<String, String>) -> Result<Self> {
        Ok(Self { store: Store::new()?, prefixes })
    }

    /// Builds a store holding exactly the quads of an N-Quads document.
    /// The text is parsed completely before anything is inserted.
    pub fn from_nquads(text: &str, prefixes: BTreeMap<String, String>) -> Result<Self> {
        let quads = rdf_parser::parse_nquads(text)?;
        let store = Self::new(prefixes)?;
        store.extend(&quads)?;
        Ok(store)
    }

    /// Returns `false` when the quad was already present.
    pub fn add(&self, quad: &Quad) -> Result<bool> {
        if self.store.contains(quad)? {
            return Ok(false);
        }
        self.store.insert(quad)?;
        Ok(true)
    }

    pub fn extend(&self, quads: &QuadSet) -> Result<usize> {
        let mut added = 0;
        for quad in quads {
            if self.add(quad)? {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn size(&self) -> Result<usize> {
        Ok(self.store.len()?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.store.is_empty()?)
    }

    /// Drops every quad by replacing the underlying collection.
    pub fn clear(&mut self) -> Result<()> {
        self.store = Store::new()?;
        Ok(())
    }

    /// Replaces the content with an N-Quads document.
    /// On a parse error the current content is left as it was.
    pub fn load_nquads(&mut self, text: &str) -> Result<usize> {
        let quads = rdf_parser::parse_nquads(text)?;
        let store = Store::new()?;
        for quad in &quads {
            store.insert(quad)?;
        }
        self.store = store;
        self.size()
    }

    pub fn prefixes(&self) -> &BTreeMap<String, String> {
        &self.prefixes
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// The collection queries are evaluated against.
    pub fn source(&self) -> &Store {
        &self.store
    }

    pub fn quads(&self) -> Result<QuadSet> {
        let mut quads = QuadSet::new();
        for quad in self.store.iter() {
            quads.insert(quad?);
        }
        Ok(quads)
    }

    pub fn dump_nquads(&self) -> Result<Vec<u8>> {
        rdf_parser::serialize_nquads(&self.quads()?)
    }
}
