//! Capability-scoped directory handles.
//!
//! The triplification pipeline and the project model only talk to storage
//! through [`DirectoryHandle`]. Every read-write operation is preceded by an
//! explicit permission query, and a file is replaced through a
//! [`WritableFile`] that either commits on [`WritableFile::close`] or leaves the
//! previous content untouched on [`WritableFile::abort`].

use crate::error::Result;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionMode {
    Read,
    ReadWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    /// The user has to be asked before access is granted
    Prompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
}

/// A pending replacement of one file's content.
pub trait WritableFile {
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Commit everything written so far as the file's new content. When
    /// `not_before` lies in the future the committed file is dated to it.
    fn close(self, not_before: Option<SystemTime>) -> Result<()>;

    /// Discard everything written so far.
    fn abort(self) -> Result<()>;
}

pub trait DirectoryHandle: Clone + Send + Sync + Sized {
    type Writer: WritableFile;

    fn name(&self) -> &str;

    /// Stable identity of the folder, used to serialize writers per folder.
    fn key(&self) -> String;

    fn query_permission(&self, mode: PermissionMode) -> PermissionState;

    fn request_permission(&self, mode: PermissionMode) -> Result<PermissionState>;

    /// Direct children, sorted by name.
    fn entries(&self) -> Result<Vec<Entry>>;

    /// Child directory; `Error::NotFound` when absent and `create` is false.
    fn get_directory(&self, name: &str, create: bool) -> Result<Self>;

    /// Child file metadata; an empty file is created when absent and `create` is set.
    fn get_file(&self, name: &str, create: bool) -> Result<FileInfo>;

    fn read_bytes(&self, name: &str) -> Result<Vec<u8>>;

    /// Full UTF-8 text of a child file; invalid UTF-8 is `Error::InvalidSource`.
    fn read_text(&self, name: &str) -> Result<String>;

    fn create_writable(&self, name: &str) -> Result<Self::Writer>;

    fn remove_entry(&self, name: &str) -> Result<()>;
}
