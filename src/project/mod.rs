//! Directory and project model of the application folder.
//!
//! A project is a top-level directory with a "Source Data" child. The tree
//! walk in [`tree`] is pure and knows nothing about rendering or the pipeline.

pub mod demo;
pub mod tree;
pub mod workspace;

pub use tree::DirectoryTree;
pub use workspace::{copy_name, NumberedText, Workspace};
