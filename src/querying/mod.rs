//! Query execution over the session's triple store.
//!
//! - **query_processing** - normalization and the worker thread a query runs on
//! - **oxigraph_adapter** - evaluation through Oxigraph, reported as binding events
//! - **result_table** - collects events into a table
//! - **plot** - derives a bar series from two-column numeric tables

pub mod oxigraph_adapter;
pub mod plot;
pub mod query_processing;
pub mod result_table;

pub use oxigraph_adapter::{Binding, BindingEvent, OxigraphAdapter};
pub use plot::{prepare_plot_data, PlotSeries};
pub use query_processing::{QueryHandle, QueryProcessor, SparqlEngine};
pub use result_table::{QueryOutcome, ResultCollector, ResultTable};
