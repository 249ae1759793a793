//! Incremental triplification of project "Source Data" folders.
//!
//! [`staleness`] decides whether a folder's cache has to be rebuilt;
//! [`triplifier`] rebuilds it.

pub mod staleness;
pub mod triplifier;

pub use staleness::CacheState;
pub use triplifier::{Freshness, ProjectOutcome, RegenerationReport, SkippedFile, Triplifier};
