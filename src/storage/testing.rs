//! Local folder wrapper with scripted permission answers and failing writes.

use crate::error::{Error, Result};
use crate::storage::{
    DirectoryHandle, Entry, FileInfo, LocalDirectory, LocalWritable, PermissionMode,
    PermissionState, WritableFile,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

#[derive(Clone)]
pub struct ScriptedDisk {
    inner: LocalDirectory,
    permission: PermissionState,
    on_request: PermissionState,
    broken_writes: bool,
    requests: Arc<AtomicUsize>,
}

impl ScriptedDisk {
    pub fn open(path: &Path) -> Self {
        Self {
            inner: LocalDirectory::open(path).unwrap(),
            permission: PermissionState::Granted,
            on_request: PermissionState::Granted,
            broken_writes: false,
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Answers `permission` to queries and `on_request` to requests.
    pub fn with_permission(mut self, permission: PermissionState, on_request: PermissionState) -> Self {
        self.permission = permission;
        self.on_request = on_request;
        self
    }

    /// Every write to a writable fails with a disk-full error.
    pub fn with_broken_writes(mut self) -> Self {
        self.broken_writes = true;
        self
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

pub struct ScriptedWriter {
    inner: LocalWritable,
    broken: bool,
}

impl WritableFile for ScriptedWriter {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.broken {
            return Err(Error::Io(std::io::Error::other("disk full")));
        }
        self.inner.write(data)
    }

    fn close(self, not_before: Option<SystemTime>) -> Result<()> {
        self.inner.close(not_before)
    }

    fn abort(self) -> Result<()> {
        self.inner.abort()
    }
}

impl DirectoryHandle for ScriptedDisk {
    type Writer = ScriptedWriter;

    fn name(&self) -> &str {
        self.inner.name()
    }
    fn key(&self) -> String {
        self.inner.key()
    }
    fn query_permission(&self, _mode: PermissionMode) -> PermissionState {
        self.permission
    }
    fn request_permission(&self, _mode: PermissionMode) -> Result<PermissionState> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.on_request)
    }
    fn entries(&self) -> Result<Vec<Entry>> {
        self.inner.entries()
    }
    fn get_directory(&self, name: &str, create: bool) -> Result<Self> {
        let inner = self.inner.get_directory(name, create)?;
        Ok(Self { inner, ..self.clone() })
    }
    fn get_file(&self, name: &str, create: bool) -> Result<FileInfo> {
        self.inner.get_file(name, create)
    }
    fn read_bytes(&self, name: &str) -> Result<Vec<u8>> {
        self.inner.read_bytes(name)
    }
    fn read_text(&self, name: &str) -> Result<String> {
        self.inner.read_text(name)
    }
    fn create_writable(&self, name: &str) -> Result<ScriptedWriter> {
        let inner = self.inner.create_writable(name)?;
        Ok(ScriptedWriter { inner, broken: self.broken_writes })
    }
    fn remove_entry(&self, name: &str) -> Result<()> {
        self.inner.remove_entry(name)
    }
}
