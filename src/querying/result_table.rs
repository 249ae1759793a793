use crate::error::{Error, Result};
use crate::querying::oxigraph_adapter::{Binding, BindingEvent};
use crate::querying::plot::{prepare_plot_data, PlotSeries};
use std::fmt;

/// Tabular query result. Columns are the variable names in the order they
/// were first seen across the rows; unbound cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl ResultTable {
    pub fn from_bindings(bindings: &[Binding]) -> Self {
        let mut headers: Vec<String> = Vec::new();
        for binding in bindings {
            for variable in binding.variables() {
                if !headers.iter().any(|h| h == variable) {
                    headers.push(variable.to_string());
                }
            }
        }
        let rows = bindings
            .iter()
            .map(|binding| {
                headers.iter().map(|h| binding.get(h).map(str::to_string)).collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = Option<&str>> {
        self.rows.iter().map(move |row| row.get(index).and_then(|cell| cell.as_deref()))
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.headers.is_empty() {
            return writeln!(f, "(no results)");
        }
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.as_deref().map_or(0, |c| c.chars().count()));
            }
        }

        write_row(f, self.headers.iter().map(String::as_str), &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "|-{}-|", rule.join("-|-"))?;
        for row in &self.rows {
            write_row(f, row.iter().map(|cell| cell.as_deref().unwrap_or("")), &widths)?;
        }
        writeln!(f, "{} row(s)", self.rows.len())
    }
}

fn write_row<'a>(
    f: &mut fmt::Formatter<'_>,
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> fmt::Result {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    writeln!(f, "| {} |", padded.join(" | "))
}

/// Everything one query run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    /// The query text as it was sent to the engine
    pub query: String,
    pub table: ResultTable,
    pub plot: Option<PlotSeries>,
}

/// Accumulates [`BindingEvent`]s until the stream ends.
#[derive(Debug, Default)]
pub struct ResultCollector {
    bindings: Vec<Binding>,
    ended: bool,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Ok(true)` once the terminal `End` event has been seen.
    /// `Error` and `Unsupported` are terminal failures.
    pub fn accept(&mut self, event: BindingEvent) -> Result<bool> {
        if self.ended {
            return Ok(true);
        }
        match event {
            BindingEvent::Row(binding) => {
                self.bindings.push(binding);
                Ok(false)
            }
            BindingEvent::End => {
                self.ended = true;
                Ok(true)
            }
            BindingEvent::Error(message) => Err(Error::Query(message)),
            BindingEvent::Unsupported(kind) => Err(Error::UnsupportedResult(kind)),
        }
    }

    pub fn finish(self, query: String) -> Result<QueryOutcome> {
        if !self.ended {
            return Err(Error::Query("result stream closed before its end".to_string()));
        }
        let table = ResultTable::from_bindings(&self.bindings);
        let plot = prepare_plot_data(&table);
        Ok(QueryOutcome { query, table, plot })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(pairs: &[(&str, &str)]) -> Binding {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_headers_in_first_seen_order() {
        let table = ResultTable::from_bindings(&[
            binding(&[("b", "1")]),
            binding(&[("a", "2"), ("b", "3")]),
        ]);
        assert_eq!(table.headers(), ["b".to_string(), "a".to_string()]);
        assert_eq!(table.rows()[0], vec![Some("1".to_string()), None]);
        assert_eq!(table.rows()[1], vec![Some("3".to_string()), Some("2".to_string())]);
    }

    #[test]
    fn test_collector_requires_end() {
        let mut collector = ResultCollector::new();
        assert!(!collector.accept(BindingEvent::Row(binding(&[("x", "1")]))).unwrap());
        assert!(collector.finish(String::new()).is_err());
    }

    #[test]
    fn test_empty_result_is_not_an_error() {
        let mut collector = ResultCollector::new();
        assert!(collector.accept(BindingEvent::End).unwrap());
        let outcome = collector.finish("SELECT".to_string()).unwrap();
        assert!(outcome.table.is_empty());
        assert!(outcome.plot.is_none());
    }

    #[test]
    fn test_unsupported_event() {
        let mut collector = ResultCollector::new();
        let err = collector.accept(BindingEvent::Unsupported("ASK".to_string())).unwrap_err();
        assert!(matches!(err, Error::UnsupportedResult(_)));
    }

    #[test]
    fn test_display_aligns_columns() {
        let table = ResultTable::from_bindings(&[
            binding(&[("name", "Margherita"), ("n", "3")]),
            binding(&[("name", "Hawaii"), ("n", "12")]),
        ]);
        let text = table.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "| name       | n  |");
        assert_eq!(lines[2], "| Margherita | 3  |");
        assert_eq!(lines.last(), Some(&"2 row(s)"));
    }
}
