//! # GraphForge
//!
//! GraphForge is a browser for folders of ontology files. It keeps an N-Quads
//! cache (`quads.nq`) next to the OWL/XML and Turtle sources of every project,
//! regenerates that cache only when a source has changed, and runs SPARQL
//! queries over the cache of the selected project.
//!
//! ## Features
//!
//! - Incremental triplification with per-folder locking and abortable writes
//! - A reduced OWL/XML reader and a standards-conformant Turtle parser
//! - Query normalization (`a` shorthand, bare IRIs, prefix declarations)
//! - Tabular results with an optional bar series for two-column numeric results
//!
//! ## Example
//!
//! ```rust
//! use graphforge::core::triplify;
//! use graphforge::Result;
//!
//! fn example() -> Result<()> {
//!     let quads = triplify("<http://ex/a> <http://ex/p> <http://ex/b> .", "ttl")?;
//!     assert_eq!(quads.len(), 1);
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::new_without_default)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::case_sensitive_file_extension_comparisons)]

/// Session object tying the application folder, pipeline and store together
pub mod api;

/// Configuration structures and utilities
pub mod config;

/// Quad sets and source documents
pub mod core;

pub mod error;

/// Source format parsers and the query normalizer
pub mod parsing;

/// Incremental triplification of "Source Data" folders
pub mod pipeline;

/// Application folder, projects and the directory tree
pub mod project;

/// Query execution, result tables and plot series
pub mod querying;

/// Directory handles and persisted application state
pub mod storage;

/// In-memory triple store
pub mod store;

// Re-export commonly used types
pub use error::{Error, Result};
