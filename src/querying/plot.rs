use crate::querying::result_table::ResultTable;
use std::fmt;

/// Bar chart data derived from a two-column numeric result.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub values: Vec<f64>,
}

/// A table plots when it has exactly two columns, at least one row, and every
/// second-column cell is a finite number. The first column supplies the
/// categories.
pub fn prepare_plot_data(table: &ResultTable) -> Option<PlotSeries> {
    let [x_label, y_label] = table.headers() else {
        return None;
    };
    if table.is_empty() {
        return None;
    }

    let mut categories = Vec::with_capacity(table.len());
    let mut values = Vec::with_capacity(table.len());
    for row in table.rows() {
        let category = row.first()?.as_deref()?;
        let value = parse_number(row.get(1)?.as_deref()?)?;
        categories.push(category.to_string());
        values.push(value);
    }

    Some(PlotSeries {
        title: format!("Top {} by {}", x_label, y_label),
        x_label: x_label.clone(),
        y_label: y_label.clone(),
        categories,
        values,
    })
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

impl PlotSeries {
    const BAR_WIDTH: usize = 40;
}

impl fmt::Display for PlotSeries {
    /// Horizontal text bars scaled to the largest magnitude.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        let label_width = self.categories.iter().map(|c| c.chars().count()).max().unwrap_or(0);
        let max = self.values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        for (category, value) in self.categories.iter().zip(&self.values) {
            let len = if max > 0.0 {
                ((value.abs() / max) * Self::BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            writeln!(
                f,
                "{:<width$} | {} {}",
                category,
                "#".repeat(len),
                value,
                width = label_width
            )?;
        }
        writeln!(f, "x: {}, y: {}", self.x_label, self.y_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::querying::oxigraph_adapter::Binding;

    fn table(rows: &[&[(&str, &str)]]) -> ResultTable {
        let bindings: Vec<Binding> =
            rows.iter().map(|pairs| pairs.iter().copied().collect()).collect();
        ResultTable::from_bindings(&bindings)
    }

    #[test]
    fn test_two_numeric_columns_plot() {
        let plot = prepare_plot_data(&table(&[
            &[("topping", "Cheese"), ("count", "12")],
            &[("topping", "Ham"), ("count", "3.5")],
        ]))
        .unwrap();
        assert_eq!(plot.title, "Top topping by count");
        assert_eq!(plot.categories, vec!["Cheese", "Ham"]);
        assert_eq!(plot.values, vec![12.0, 3.5]);
    }

    #[test]
    fn test_three_columns_do_not_plot() {
        let t = table(&[&[("a", "x"), ("b", "1"), ("c", "2")]]);
        assert!(prepare_plot_data(&t).is_none());
    }

    #[test]
    fn test_non_numeric_second_column_does_not_plot() {
        let t = table(&[&[("a", "x"), ("b", "1")], &[("a", "y"), ("b", "many")]]);
        assert!(prepare_plot_data(&t).is_none());
    }

    #[test]
    fn test_nan_and_missing_cells_do_not_plot() {
        assert!(prepare_plot_data(&table(&[&[("a", "x"), ("b", "NaN")]])).is_none());
        assert!(prepare_plot_data(&table(&[&[("a", "x"), ("b", "1")], &[("a", "y")]])).is_none());
    }

    #[test]
    fn test_render_bars() {
        let plot = prepare_plot_data(&table(&[
            &[("k", "a"), ("v", "2")],
            &[("k", "bb"), ("v", "1")],
        ]))
        .unwrap();
        let text = plot.to_string();
        assert!(text.starts_with("Top k by v\n"));
        assert!(text.contains(&format!("a  | {} 2", "#".repeat(40))));
        assert!(text.contains(&format!("bb | {} 1", "#".repeat(20))));
    }
}
