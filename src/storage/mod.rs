//! Storage access for the application folder.
//!
//! - **handle** - the capability-scoped [`DirectoryHandle`] abstraction
//! - **local** - the local filesystem implementation
//! - **persistence** - the JSON key-value file that remembers the application folder

pub mod handle;
pub mod local;
pub mod persistence;
#[cfg(test)]
pub(crate) mod testing;

pub use handle::{
    DirectoryHandle, Entry, EntryKind, FileInfo, PermissionMode, PermissionState, WritableFile,
};
pub use local::{LocalDirectory, LocalWritable};
pub use persistence::{HandleStore, APP_FOLDER_KEY};
