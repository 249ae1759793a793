//! In-memory quad store used as the query source of a session.

pub mod triple_store;

pub use triple_store::TripleStore;
