use crate::{
    config::GraphForgeConfig,
    error::{Error, Result},
    parsing::QueryNormalizer,
    pipeline::{ProjectOutcome, Triplifier},
    project::{demo, Workspace},
    querying::{OxigraphAdapter, QueryHandle, QueryOutcome, QueryProcessor},
    storage::{DirectoryHandle, HandleStore, LocalDirectory, APP_FOLDER_KEY},
    store::TripleStore,
};
use log::{error, info};
use std::{
    collections::BTreeMap,
    path::Path,
    sync::{Arc, PoisonError, RwLock},
};

/// What a session currently has loaded.
struct SessionState {
    store: TripleStore,
    project: Option<String>,
}

/// Owns the application folder, the pipeline and the loaded triple store.
///
/// Loading a project builds a complete new store before swapping it in under
/// the write lock; queries take a snapshot under the read lock, so a query
/// never sees a half-loaded store.
pub struct Session<D: DirectoryHandle> {
    config: Arc<GraphForgeConfig>,
    workspace: Workspace<D>,
    triplifier: Triplifier,
    processor: QueryProcessor<OxigraphAdapter>,
    state: RwLock<SessionState>,
}

impl<D: DirectoryHandle> Session<D> {
    pub fn new(root: D, config: Arc<GraphForgeConfig>) -> Result<Self> {
        let normalizer = QueryNormalizer::new(config.query.bracket_prefixed_names)?;
        let store = TripleStore::new(config.query.prefixes.clone())?;
        Ok(Session {
            workspace: Workspace::new(root, Arc::clone(&config)),
            triplifier: Triplifier::new(Arc::clone(&config)),
            processor: QueryProcessor::new(OxigraphAdapter::new(), normalizer),
            state: RwLock::new(SessionState { store, project: None }),
            config,
        })
    }

    pub fn config(&self) -> &GraphForgeConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Workspace<D> {
        &self.workspace
    }

    pub fn triplifier(&self) -> &Triplifier {
        &self.triplifier
    }

    pub fn reauthorize(&self) -> Result<()> {
        self.workspace.reauthorize()
    }

    /// Brings the cache of every project up to date.
    pub fn refresh(&self) -> Result<Vec<ProjectOutcome>> {
        self.workspace.refresh(&self.triplifier)
    }

    /// Replaces the store with the content of the project's cache file.
    /// If the cache cannot be read or parsed the previous store stays loaded.
    pub fn select_project(&self, name: &str) -> Result<usize> {
        let folder = self.workspace.source_data(name)?;
        let text = folder.read_text(&self.config.cache_file_name)?;

        let mut store = TripleStore::from_nquads(&text, BTreeMap::new()).map_err(|e| {
            error!("Error loading {} of '{}': {}", self.config.cache_file_name, name, e);
            e
        })?;
        let size = store.size()?;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        for (prefix, namespace) in state.store.prefixes() {
            store.set_prefix(prefix.clone(), namespace.clone());
        }
        state.store = store;
        state.project = Some(name.to_string());
        info!("Quads loaded into the store for '{}'. Total quads: {}", name, size);
        Ok(size)
    }

    pub fn current_project(&self) -> Option<String> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).project.clone()
    }

    /// The store as it is right now; later project switches do not affect it.
    pub fn snapshot(&self) -> TripleStore {
        self.state.read().unwrap_or_else(PoisonError::into_inner).store.clone()
    }

    pub fn store_size(&self) -> Result<usize> {
        self.snapshot().size()
    }

    /// Declares a prefix for later queries; it survives project switches.
    pub fn set_prefix(&self, prefix: &str, namespace: &str) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.store.set_prefix(prefix, namespace);
    }

    /// Starts a query; its events arrive on the returned handle.
    pub fn query(&self, text: &str) -> QueryHandle {
        self.processor.process_query(text, self.snapshot())
    }

    pub fn run_query(&self, text: &str) -> Result<QueryOutcome> {
        self.query(text).collect()
    }

    /// Runs independent queries side by side; one failing does not affect the others.
    pub fn run_queries(&self, texts: &[String]) -> Vec<Result<QueryOutcome>> {
        let handles: Vec<QueryHandle> = texts.iter().map(|text| self.query(text)).collect();
        handles.into_iter().map(QueryHandle::collect).collect()
    }
}

impl Session<LocalDirectory> {
    /// Opens the application folder remembered from an earlier `initialize`.
    pub fn restore(config: Arc<GraphForgeConfig>) -> Result<Self> {
        let handles = HandleStore::new(&config.state_file);
        let Some(path) = handles.get(APP_FOLDER_KEY)? else {
            return Err(Error::NotFound(
                "application folder not initialized, run `graphforge init <parent>`".to_string(),
            ));
        };
        let root = LocalDirectory::open(&path)?;
        Session::new(root, config)
    }

    /// Creates the application folder inside `parent`, remembers it and,
    /// when `with_demo` is set, downloads the demo project.
    /// A failed demo download is logged and does not fail initialization.
    pub async fn initialize(
        parent: &Path,
        config: Arc<GraphForgeConfig>,
        with_demo: bool,
    ) -> Result<Self> {
        let parent = LocalDirectory::open(parent)?;
        let workspace = Workspace::create_app_folder(&parent, Arc::clone(&config))?;
        let root = workspace.root().clone();

        HandleStore::new(&config.state_file)
            .put(APP_FOLDER_KEY, &root.path().display().to_string())?;

        if with_demo && config.demo.enabled {
            if let Err(e) = demo::provision_demo(&root, &config.demo, &config.source_data_dir).await {
                error!("Error creating demo project: {}", e);
            }
        }
        Session::new(root, config)
    }
}
