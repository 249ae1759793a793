//! Local filesystem implementation of [`DirectoryHandle`].
//!
//! Writes go to a `.crswap` sibling of the target and are renamed over it on
//! close, so readers only ever see the old content or the complete new one.

use crate::error::{Error, Result};
use crate::storage::handle::{
    DirectoryHandle, Entry, EntryKind, FileInfo, PermissionMode, PermissionState, WritableFile,
};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const SWAP_SUFFIX: &str = ".crswap";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDirectory {
    path: PathBuf,
    name: String,
}

impl LocalDirectory {
    /// Handle to an existing directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_dir() {
            return Err(Error::NotFound(format!("directory {}", path.display())));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { path, name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn child(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(Error::InvalidSource(format!("invalid entry name {:?}", name)));
        }
        Ok(self.path.join(name))
    }
}

fn not_found(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
    move |err| match err.kind() {
        io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        io::ErrorKind::PermissionDenied => Error::PermissionDenied(path.display().to_string()),
        _ => Error::Io(err),
    }
}

impl DirectoryHandle for LocalDirectory {
    type Writer = LocalWritable;

    fn name(&self) -> &str {
        &self.name
    }

    fn key(&self) -> String {
        fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone()).display().to_string()
    }

    fn query_permission(&self, mode: PermissionMode) -> PermissionState {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.is_dir() => match mode {
                PermissionMode::Read => PermissionState::Granted,
                PermissionMode::ReadWrite if meta.permissions().readonly() => {
                    PermissionState::Denied
                }
                PermissionMode::ReadWrite => PermissionState::Granted,
            },
            _ => PermissionState::Denied,
        }
    }

    /// There is nobody to prompt on a local filesystem; the answer is the
    /// current state.
    fn request_permission(&self, mode: PermissionMode) -> Result<PermissionState> {
        Ok(self.query_permission(mode))
    }

    fn entries(&self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.path).map_err(not_found(&self.path))? {
            let dir_entry = dir_entry?;
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(SWAP_SUFFIX) {
                continue;
            }
            let file_type = dir_entry.file_type()?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                continue;
            };
            entries.push(Entry { name, kind });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn get_directory(&self, name: &str, create: bool) -> Result<Self> {
        let path = self.child(name)?;
        if !path.is_dir() {
            if !create {
                return Err(Error::NotFound(path.display().to_string()));
            }
            fs::create_dir(&path).map_err(not_found(&path))?;
        }
        Ok(Self { path, name: name.to_string() })
    }

    fn get_file(&self, name: &str, create: bool) -> Result<FileInfo> {
        let path = self.child(name)?;
        if create && !path.exists() {
            OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .map_err(not_found(&path))?;
        }
        let meta = fs::metadata(&path).map_err(not_found(&path))?;
        if !meta.is_file() {
            return Err(Error::NotFound(format!("{} is not a file", path.display())));
        }
        Ok(FileInfo { name: name.to_string(), size: meta.len(), modified: meta.modified()? })
    }

    fn read_bytes(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.child(name)?;
        fs::read(&path).map_err(not_found(&path))
    }

    fn read_text(&self, name: &str) -> Result<String> {
        let bytes = self.read_bytes(name)?;
        String::from_utf8(bytes)
            .map_err(|e| Error::InvalidSource(format!("{} is not valid UTF-8: {}", name, e)))
    }

    fn create_writable(&self, name: &str) -> Result<LocalWritable> {
        let target = self.child(name)?;
        let swap = self.path.join(format!("{}{}", name, SWAP_SUFFIX));
        let file = File::create(&swap).map_err(not_found(&swap))?;
        Ok(LocalWritable { target, swap, writer: Some(BufWriter::new(file)) })
    }

    fn remove_entry(&self, name: &str) -> Result<()> {
        let path = self.child(name)?;
        let meta = fs::metadata(&path).map_err(not_found(&path))?;
        if meta.is_dir() {
            fs::remove_dir_all(&path).map_err(not_found(&path))
        } else {
            fs::remove_file(&path).map_err(not_found(&path))
        }
    }
}

/// Buffered writer into the swap file of one target.
/// Dropping it without `close` discards the swap file.
pub struct LocalWritable {
    target: PathBuf,
    swap: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl LocalWritable {
    fn discard(&mut self) -> io::Result<()> {
        self.writer.take();
        match fs::remove_file(&self.swap) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

impl WritableFile for LocalWritable {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::Io(io::Error::other("write after close")))?;
        writer.write_all(data)?;
        Ok(())
    }

    fn close(mut self, not_before: Option<SystemTime>) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            let file = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
            if let Some(time) = not_before.filter(|time| *time > SystemTime::now()) {
                file.set_modified(time)?;
            }
            file.sync_all()?;
        }
        fs::rename(&self.swap, &self.target)?;
        Ok(())
    }

    fn abort(mut self) -> Result<()> {
        self.discard()?;
        Ok(())
    }
}

impl Drop for LocalWritable {
    fn drop(&mut self) {
        // After a successful close the swap file is already gone.
        let _ = self.discard();
    }
}
