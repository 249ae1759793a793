//! The application folder and the projects inside it.
//!
//! Every operation checks read-write access on the root first and fails with
//! [`Error::PermissionDenied`] when it has been revoked, so the caller can ask
//! the user to re-authorize.

use crate::config::{GraphForgeConfig, APP_FOLDER_NAME};
use crate::error::{Error, Result};
use crate::pipeline::{ProjectOutcome, Triplifier};
use crate::project::tree::DirectoryTree;
use crate::storage::{
    DirectoryHandle, EntryKind, FileInfo, PermissionMode, PermissionState, WritableFile,
};
use log::{info, warn};
use std::fmt;
use std::sync::Arc;

pub struct Workspace<D: DirectoryHandle> {
    root: D,
    config: Arc<GraphForgeConfig>,
}

impl<D: DirectoryHandle> Workspace<D> {
    pub fn new(root: D, config: Arc<GraphForgeConfig>) -> Self {
        Self { root, config }
    }

    /// Creates (or reuses) the `GraphForge` folder inside `parent`.
    pub fn create_app_folder(parent: &D, config: Arc<GraphForgeConfig>) -> Result<Self> {
        let root = parent.get_directory(APP_FOLDER_NAME, true)?;
        info!("Application folder ready: {}", root.name());
        Ok(Self::new(root, config))
    }

    pub fn root(&self) -> &D {
        &self.root
    }

    pub fn config(&self) -> &GraphForgeConfig {
        &self.config
    }

    pub fn ensure_access(&self) -> Result<()> {
        match self.root.query_permission(PermissionMode::ReadWrite) {
            PermissionState::Granted => Ok(()),
            _ => Err(Error::PermissionDenied(
                "Access to the directory is not authorized. Please re-authorize.".to_string(),
            )),
        }
    }

    /// Asks for read-write access to the root again.
    pub fn reauthorize(&self) -> Result<()> {
        match self.root.request_permission(PermissionMode::ReadWrite)? {
            PermissionState::Granted => {
                info!("Directory access re-authorized");
                Ok(())
            }
            _ => {
                warn!("Directory re-authorization was denied");
                Err(Error::PermissionDenied("re-authorization was denied".to_string()))
            }
        }
    }

    pub fn tree(&self) -> Result<DirectoryTree> {
        self.ensure_access()?;
        DirectoryTree::walk(&self.root)
    }

    /// Top-level directories with a source data folder.
    pub fn projects(&self) -> Result<Vec<D>> {
        self.ensure_access()?;
        let mut projects = Vec::new();
        for entry in self.root.entries()? {
            if entry.kind != EntryKind::Directory {
                continue;
            }
            let dir = self.root.get_directory(&entry.name, false)?;
            match dir.get_directory(&self.config.source_data_dir, false) {
                Ok(_) => projects.push(dir),
                Err(Error::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(projects)
    }

    pub fn project(&self, name: &str) -> Result<D> {
        self.ensure_access()?;
        self.root.get_directory(name, false)
    }

    pub fn source_data(&self, project: &str) -> Result<D> {
        self.project(project)?.get_directory(&self.config.source_data_dir, false)
    }

    /// Provisions `<name>/<source data>/<cache>` with an empty cache.
    pub fn create_project(&self, name: &str) -> Result<D> {
        self.ensure_access()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Config("project name must not be empty".to_string()));
        }
        let project = self.root.get_directory(name, true)?;
        let source_data = project.get_directory(&self.config.source_data_dir, true)?;
        source_data.get_file(&self.config.cache_file_name, true)?;
        info!("Project '{}' created", name);
        Ok(project)
    }

    /// Triplifies every project, one after the other.
    pub fn refresh(&self, triplifier: &Triplifier) -> Result<Vec<ProjectOutcome>> {
        let projects = self.projects()?;
        Ok(triplifier.process_projects(&projects))
    }

    pub fn import_file(&self, project: &str, name: &str, content: &[u8]) -> Result<()> {
        let folder = self.source_data(project)?;
        write_file(&folder, name, content)?;
        info!("Imported '{}' into '{}'", name, project);
        Ok(())
    }

    /// Copies `from` to `to`, then removes `from`. An existing `to` is overwritten.
    pub fn rename_file(&self, project: &str, from: &str, to: &str) -> Result<()> {
        let folder = self.source_data(project)?;
        if from == to {
            return Ok(());
        }
        let content = folder.read_bytes(from)?;
        write_file(&folder, to, &content)?;
        folder.remove_entry(from)?;
        info!("File renamed from '{}' to '{}'", from, to);
        Ok(())
    }

    pub fn delete_file(&self, project: &str, name: &str) -> Result<()> {
        let folder = self.source_data(project)?;
        folder.remove_entry(name)?;
        info!("File '{}' deleted", name);
        Ok(())
    }

    /// Writes a copy next to the original and returns the copy's name.
    pub fn duplicate_file(&self, project: &str, name: &str) -> Result<String> {
        let folder = self.source_data(project)?;
        let content = folder.read_bytes(name)?;
        let mut index = 0;
        let copy_name = loop {
            let candidate = copy_name(name, index);
            match folder.get_file(&candidate, false) {
                Err(Error::NotFound(_)) => break candidate,
                Err(e) => return Err(e),
                Ok(_) => index += 1,
            }
        };
        write_file(&folder, &copy_name, &content)?;
        info!("File '{}' duplicated as '{}'", name, copy_name);
        Ok(copy_name)
    }

    /// Every file in the project's source data folder with its modification time.
    pub fn file_dates(&self, project: &str) -> Result<Vec<FileInfo>> {
        let folder = self.source_data(project)?;
        folder
            .entries()?
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::File)
            .map(|entry| folder.get_file(&entry.name, false))
            .collect()
    }

    pub fn read_numbered(&self, project: &str, name: &str) -> Result<NumberedText> {
        let folder = self.source_data(project)?;
        Ok(NumberedText::new(&folder.read_text(name)?))
    }
}

/// `pizza.owl` -> `pizza_copy.owl`, then `pizza_copy(1).owl`, `pizza_copy(2).owl`, ...
pub fn copy_name(name: &str, index: usize) -> String {
    let suffix = if index == 0 { "_copy".to_string() } else { format!("_copy({})", index) };
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !ext.is_empty() && ext.chars().all(|c| c.is_alphanumeric() || c == '_') =>
        {
            format!("{}{}.{}", stem, suffix, ext)
        }
        _ => format!("{}{}", name, suffix),
    }
}

fn write_file<D: DirectoryHandle>(folder: &D, name: &str, content: &[u8]) -> Result<()> {
    let mut writer = folder.create_writable(name)?;
    if let Err(e) = writer.write(content) {
        let _ = writer.abort();
        return Err(e);
    }
    writer.close(None)
}

/// File text split into 1-based numbered lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedText {
    lines: Vec<String>,
}

impl NumberedText {
    pub fn new(text: &str) -> Self {
        Self { lines: text.split('\n').map(|line| line.trim_end_matches('\r').to_string()).collect() }
    }

    pub fn lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines.iter().enumerate().map(|(i, line)| (i + 1, line.as_str()))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for NumberedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.lines.len().to_string().len();
        for (number, line) in self.lines() {
            writeln!(f, "{:>width$} | {}", number, line, width = width)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::ScriptedDisk;

    #[test]
    fn test_copy_name() {
        assert_eq!(copy_name("pizza.owl", 0), "pizza_copy.owl");
        assert_eq!(copy_name("pizza.owl", 1), "pizza_copy(1).owl");
        assert_eq!(copy_name("archive.tar.gz", 2), "archive.tar_copy(2).gz");
        assert_eq!(copy_name("README", 0), "README_copy");
    }

    #[test]
    fn test_numbered_text() {
        let text = NumberedText::new("a\r\n  b\nc");
        let lines: Vec<(usize, &str)> = text.lines().collect();
        assert_eq!(lines, vec![(1, "a"), (2, "  b"), (3, "c")]);
        assert_eq!(text.to_string(), "1 | a\n2 |   b\n3 | c\n");
    }

    #[test]
    fn test_revoked_access_blocks_operations() {
        let dir = tempfile::tempdir().unwrap();
        let root = ScriptedDisk::open(dir.path())
            .with_permission(PermissionState::Prompt, PermissionState::Denied);
        let ws = Workspace::new(root, Arc::new(GraphForgeConfig::default()));

        assert!(matches!(ws.tree(), Err(Error::PermissionDenied(_))));
        assert!(matches!(ws.create_project("Alpha"), Err(Error::PermissionDenied(_))));
        assert!(!dir.path().join("Alpha").exists());

        assert!(matches!(ws.reauthorize(), Err(Error::PermissionDenied(_))));
        assert_eq!(ws.root().requests(), 1);
    }

    #[test]
    fn test_reauthorize_granted() {
        let dir = tempfile::tempdir().unwrap();
        let root = ScriptedDisk::open(dir.path())
            .with_permission(PermissionState::Granted, PermissionState::Granted);
        let ws = Workspace::new(root, Arc::new(GraphForgeConfig::default()));
        assert!(ws.reauthorize().is_ok());
        assert!(ws.tree().is_ok());
    }
}
