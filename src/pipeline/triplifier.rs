//! Regeneration of a folder's `quads.nq` cache from its source files.
//!
//! A run holds the folder's lock from the staleness check until the cache
//! writer is committed or discarded. Sources that fail to read as text or to
//! parse are skipped with a warning; anything that goes wrong while
//! serializing or writing discards the partial cache and fails the run.

use crate::config::GraphForgeConfig;
use crate::core::{QuadSet, SourceDocument};
use crate::error::{Error, Result};
use crate::parsing::rdf_parser;
use crate::pipeline::staleness::{self, CacheState};
use crate::storage::{DirectoryHandle, FileInfo, PermissionMode, PermissionState, WritableFile};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// The cache already covered every source
    UpToDate,
    Regenerated(RegenerationReport),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegenerationReport {
    pub files_written: usize,
    pub files_skipped: Vec<SkippedFile>,
    pub quads_written: usize,
    pub bytes_written: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub name: String,
    pub reason: String,
}

/// Result of one project in [`Triplifier::process_projects`].
#[derive(Debug)]
pub struct ProjectOutcome {
    pub project: String,
    pub result: Result<Freshness>,
}

pub struct Triplifier {
    config: Arc<GraphForgeConfig>,
    folder_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Triplifier {
    pub fn new(config: Arc<GraphForgeConfig>) -> Self {
        Self { config, folder_locks: Mutex::new(HashMap::new()) }
    }

    pub fn config(&self) -> &GraphForgeConfig {
        &self.config
    }

    /// Makes the folder's cache reflect its current sources.
    ///
    /// Returns [`Freshness::UpToDate`] without touching anything when no
    /// source is newer than the cache.
    pub fn ensure_fresh<D: DirectoryHandle>(&self, folder: &D) -> Result<Freshness> {
        let lock = self.folder_lock(&folder.key());
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        ensure_read_write(folder)?;

        let cache_name = self.config.cache_file_name.as_str();
        let cache = match folder.get_file(cache_name, false) {
            Ok(info) => Some(info),
            Err(Error::NotFound(_)) => {
                warn!("No {} in '{}', creating it", cache_name, folder.name());
                folder.get_file(cache_name, true)?;
                None
            }
            Err(e) => return Err(e),
        };

        let sources = staleness::source_files(folder, &self.config)?;
        match CacheState::assess(cache.as_ref(), &sources) {
            CacheState::Fresh => {
                debug!("{} in '{}' is up to date", cache_name, folder.name());
                return Ok(Freshness::UpToDate);
            }
            CacheState::Missing => {
                info!("Generating {} for '{}'", cache_name, folder.name());
            }
            CacheState::Stale(newer) => {
                info!(
                    "Regenerating {} for '{}', newer sources: {}",
                    cache_name,
                    folder.name(),
                    newer.join(", ")
                );
            }
        }

        let mut writer = folder.create_writable(cache_name)?;
        match write_sources(folder, &self.config, &sources, &mut writer) {
            Ok(report) => {
                // The cache is never dated before its newest source.
                let newest_source = sources.iter().map(|source| source.modified).max();
                writer.close(newest_source)?;
                info!(
                    "Wrote {} quads ({} bytes) from {} files to '{}', {} skipped",
                    report.quads_written,
                    report.bytes_written,
                    report.files_written,
                    folder.name(),
                    report.files_skipped.len()
                );
                Ok(Freshness::Regenerated(report))
            }
            Err(e) => {
                error!("Aborting {} write in '{}': {}", cache_name, folder.name(), e);
                if let Err(abort_err) = writer.abort() {
                    warn!("Could not discard partial {}: {}", cache_name, abort_err);
                }
                Err(e)
            }
        }
    }

    /// Runs [`Triplifier::ensure_fresh`] on the source folder of every project,
    /// one project at a time. A failing project is logged and does not stop
    /// the others.
    pub fn process_projects<D: DirectoryHandle>(&self, projects: &[D]) -> Vec<ProjectOutcome> {
        projects
            .iter()
            .map(|project| {
                let result = project
                    .get_directory(&self.config.source_data_dir, false)
                    .and_then(|folder| self.ensure_fresh(&folder));
                if let Err(e) = &result {
                    error!("Triplification failed for project '{}': {}", project.name(), e);
                }
                ProjectOutcome { project: project.name().to_string(), result }
            })
            .collect()
    }

    fn folder_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.folder_locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(key.to_string()).or_default())
    }
}

fn ensure_read_write<D: DirectoryHandle>(folder: &D) -> Result<()> {
    let state = match folder.query_permission(PermissionMode::ReadWrite) {
        PermissionState::Prompt => folder.request_permission(PermissionMode::ReadWrite)?,
        state => state,
    };
    match state {
        PermissionState::Granted => Ok(()),
        _ => Err(Error::PermissionDenied(format!("read-write access to '{}'", folder.name()))),
    }
}

/// Appends every source's new quads to `writer`. Quads already written by an
/// earlier file are not repeated.
fn write_sources<D: DirectoryHandle>(
    folder: &D,
    config: &GraphForgeConfig,
    sources: &[FileInfo],
    writer: &mut D::Writer,
) -> Result<RegenerationReport> {
    let mut report = RegenerationReport::default();
    let mut seen = QuadSet::new();

    for source in sources {
        let quads = match read_and_triplify(folder, config, &source.name) {
            Ok(quads) => quads,
            Err(e) if e.is_per_file() => {
                warn!("Skipping {}: {}", source.name, e);
                report.files_skipped.push(SkippedFile { name: source.name.clone(), reason: e.to_string() });
                continue;
            }
            Err(e) => return Err(e),
        };
        if quads.is_empty() {
            warn!("{} produced no quads", source.name);
            report.files_skipped.push(SkippedFile {
                name: source.name.clone(),
                reason: "no quads".to_string(),
            });
            continue;
        }

        let fresh: Vec<_> = quads.into_iter().filter(|quad| seen.insert(quad.clone())).collect();
        let bytes = rdf_parser::serialize_nquads(&fresh)?;
        writer.write(&bytes)?;
        debug!("{}: {} quads, {} bytes", source.name, fresh.len(), bytes.len());

        report.files_written += 1;
        report.quads_written += fresh.len();
        report.bytes_written += bytes.len();
    }
    Ok(report)
}

fn read_and_triplify<D: DirectoryHandle>(
    folder: &D,
    config: &GraphForgeConfig,
    name: &str,
) -> Result<QuadSet> {
    let kind = config
        .source_kind(name)
        .ok_or_else(|| Error::InvalidSource(format!("unsupported file format: {}", name)))?;
    let text = folder.read_text(name)?;
    SourceDocument::with_kind(name, kind, text).triplify()
}
