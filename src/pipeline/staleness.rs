use crate::config::GraphForgeConfig;
use crate::error::Result;
use crate::storage::{DirectoryHandle, EntryKind, FileInfo};

/// Outcome of comparing a cache file against its sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    Missing,
    /// Names of the sources modified after the cache was last written
    Stale(Vec<String>),
    Fresh,
}

impl CacheState {
    /// A cache is stale when it is absent or any source is strictly newer.
    pub fn assess(cache: Option<&FileInfo>, sources: &[FileInfo]) -> Self {
        let Some(cache) = cache else {
            return CacheState::Missing;
        };
        let newer: Vec<String> = sources
            .iter()
            .filter(|source| source.modified > cache.modified)
            .map(|source| source.name.clone())
            .collect();
        if newer.is_empty() {
            CacheState::Fresh
        } else {
            CacheState::Stale(newer)
        }
    }
}

/// Qualifying source files directly inside `folder`, sorted by name.
pub fn source_files<D: DirectoryHandle>(
    folder: &D,
    config: &GraphForgeConfig,
) -> Result<Vec<FileInfo>> {
    folder
        .entries()?
        .into_iter()
        .filter(|entry| entry.kind == EntryKind::File && config.is_source_file(&entry.name))
        .map(|entry| folder.get_file(&entry.name, false))
        .collect()
}
