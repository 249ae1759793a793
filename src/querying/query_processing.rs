use crate::error::{Error, Result};
use crate::parsing::QueryNormalizer;
use crate::querying::oxigraph_adapter::BindingEvent;
use crate::querying::result_table::{QueryOutcome, ResultCollector};
use crate::store::TripleStore;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

pub trait SparqlEngine: Send + Sync + 'static {
    /// Evaluates `query` against `store`, reporting solutions on `events`.
    fn execute(&self, query: &str, store: &TripleStore, events: &Sender<BindingEvent>);
}

/// Consumer side of a running query.
pub struct QueryHandle {
    pub query: String,
    pub receiver: Receiver<BindingEvent>,
    worker: Option<thread::JoinHandle<()>>,
}

impl QueryHandle {
    // Blocking receive of the next event; None once the producer is gone
    pub fn receive(&self) -> Option<BindingEvent> {
        self.receiver.recv().ok()
    }

    /// Drains the stream into a table and, when the shape allows, a plot.
    pub fn collect(mut self) -> Result<QueryOutcome> {
        let mut collector = ResultCollector::new();
        let outcome = loop {
            match self.receiver.recv() {
                Ok(event) => {
                    if collector.accept(event)? {
                        break collector.finish(self.query.clone());
                    }
                }
                Err(_) => {
                    break Err(Error::Query("result stream closed before its end".to_string()))
                }
            }
        };
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        outcome
    }
}

/// Normalizes query text and runs it on a worker thread.
pub struct QueryProcessor<E: SparqlEngine> {
    engine: Arc<E>,
    normalizer: QueryNormalizer,
}

impl<E: SparqlEngine> QueryProcessor<E> {
    pub fn new(engine: E, normalizer: QueryNormalizer) -> Self {
        Self { engine: Arc::new(engine), normalizer }
    }

    pub fn normalizer(&self) -> &QueryNormalizer {
        &self.normalizer
    }

    /// Starts the query against a snapshot of `store`.
    pub fn process_query(&self, query: &str, store: TripleStore) -> QueryHandle {
        let normalized = self.normalizer.normalize(query, store.prefixes());
        let (tx, rx) = mpsc::channel();
        let engine = Arc::clone(&self.engine);
        let worker_query = normalized.clone();
        let worker = thread::spawn(move || {
            engine.execute(&worker_query, &store, &tx);
        });
        QueryHandle { query: normalized, receiver: rx, worker: Some(worker) }
    }
}
