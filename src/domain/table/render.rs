// ============================================================
// TABLE RENDERING
// ============================================================
// Plain-text preview (Display) and markdown pipe tables for prompts

use std::fmt;

use super::{is_missing, parse_number, DataFrame};

impl DataFrame {
    /// Render as a markdown pipe table with a leading index column.
    /// Numeric columns are right-aligned.
    pub fn to_markdown(&self) -> String {
        let index_labels: Vec<String> = self.index().iter().map(|i| i.to_string()).collect();
        let headers: Vec<String> = self.columns().iter().map(|c| escape_pipes(c)).collect();
        let cells: Vec<Vec<String>> = self
            .rows()
            .iter()
            .map(|row| row.iter().map(|c| escape_pipes(c)).collect())
            .collect();

        let index_width = index_labels.iter().map(|l| l.len()).max().unwrap_or(0).max(3);
        let widths = column_widths(&headers, &cells);
        let numeric = self.numeric_flags();

        let mut out = String::new();

        out.push_str(&format!("| {:>w$} |", "", w = index_width));
        for (pos, header) in headers.iter().enumerate() {
            out.push(' ');
            out.push_str(&align(header, widths[pos], numeric[pos]));
            out.push_str(" |");
        }
        out.push('\n');

        out.push_str(&format!("|{}:|", "-".repeat(index_width + 1)));
        for (pos, width) in widths.iter().enumerate() {
            if numeric[pos] {
                out.push_str(&format!("{}:|", "-".repeat(width + 1)));
            } else {
                out.push_str(&format!(":{}|", "-".repeat(width + 1)));
            }
        }

        for (label, row) in index_labels.iter().zip(&cells) {
            out.push('\n');
            out.push_str(&format!("| {:>w$} |", label, w = index_width));
            for (pos, cell) in row.iter().enumerate() {
                out.push(' ');
                out.push_str(&align(cell, widths[pos], numeric[pos]));
                out.push_str(" |");
            }
        }

        out
    }

    fn numeric_flags(&self) -> Vec<bool> {
        (0..self.num_columns())
            .map(|pos| {
                let mut present = self
                    .rows()
                    .iter()
                    .map(|row| row[pos].as_str())
                    .filter(|v| !is_missing(v))
                    .peekable();
                present.peek().is_some() && present.all(|v| parse_number(v).is_some())
            })
            .collect()
    }
}

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(
                f,
                "Empty DataFrame\nColumns: [{}]\nIndex: []",
                self.columns().join(", ")
            );
        }

        let index_labels: Vec<String> = self.index().iter().map(|i| i.to_string()).collect();
        let index_width = index_labels.iter().map(|l| l.len()).max().unwrap_or(0);
        let widths = column_widths(self.columns(), self.rows());

        write!(f, "{:w$}", "", w = index_width)?;
        for (header, width) in self.columns().iter().zip(&widths) {
            write!(f, "  {:>w$}", header, w = *width)?;
        }

        for (label, row) in index_labels.iter().zip(self.rows()) {
            write!(f, "\n{:<w$}", label, w = index_width)?;
            for (cell, width) in row.iter().zip(&widths) {
                write!(f, "  {:>w$}", cell, w = *width)?;
            }
        }

        Ok(())
    }
}

fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(pos, header)| {
            rows.iter()
                .map(|row| row[pos].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect()
}

fn align(value: &str, width: usize, right: bool) -> String {
    if right {
        format!("{:>w$}", value, w = width)
    } else {
        format!("{:<w$}", value, w = width)
    }
}

fn escape_pipes(value: &str) -> String {
    value.replace('|', "\\|")
}
