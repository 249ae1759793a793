//! Core data structures and types for GraphForge

use oxigraph::model::Quad;
use std::collections::HashSet;

/// De-duplicated quads in first-insertion order.
///
/// Set semantics decide membership; the order is only kept so the same input
/// always serializes to the same N-Quads text.
#[derive(Debug, Clone, Default)]
pub struct QuadSet {
    quads: Vec<Quad>,
    seen: HashSet<Quad>,
}

impl QuadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a quad; returns `false` when it was already present.
    pub fn insert(&mut self, quad: Quad) -> bool {
        if self.seen.contains(&quad) {
            return false;
        }
        self.seen.insert(quad.clone());
        self.quads.push(quad);
        true
    }

    pub fn contains(&self, quad: &Quad) -> bool {
        self.seen.contains(quad)
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Quad> {
        self.quads.iter()
    }
}

impl Extend<Quad> for QuadSet {
    fn extend<I: IntoIterator<Item = Quad>>(&mut self, iter: I) {
        for quad in iter {
            self.insert(quad);
        }
    }
}

impl FromIterator<Quad> for QuadSet {
    fn from_iter<I: IntoIterator<Item = Quad>>(iter: I) -> Self {
        let mut set = QuadSet::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for QuadSet {
    type Item = Quad;
    type IntoIter = std::vec::IntoIter<Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.into_iter()
    }
}

impl<'a> IntoIterator for &'a QuadSet {
    type Item = &'a Quad;
    type IntoIter = std::slice::Iter<'a, Quad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.iter()
    }
}

pub mod source;
pub use source::{triplify, SourceDocument, SourceKind};
