// ============================================================
// DATA FRAME
// ============================================================
// Named columns, ordered rows, original row labels kept across sorts

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{is_missing, parse_number};
use crate::domain::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Row labels; `0..n` at load time, carried along by `sort_values`
    index: Vec<usize>,
}

impl DataFrame {
    /// Build a frame from headers and rows. Every row must have one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((pos, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(AppError::ValidationError(format!(
                "Row {} has {} fields, expected {}",
                pos,
                row.len(),
                columns.len()
            )));
        }

        let index = (0..rows.len()).collect();
        Ok(Self {
            columns,
            rows,
            index,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows(), self.num_columns())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, position: usize) -> Option<&[String]> {
        self.rows.get(position).map(|r| r.as_slice())
    }

    pub fn column_position(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| AppError::NotFound(format!("Column '{}'", name)))
    }

    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let pos = self.column_position(name)?;
        Ok(self.rows.iter().map(|row| row[pos].as_str()).collect())
    }

    /// Column values as numbers; missing or non-numeric cells become `None`
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let pos = self.column_position(name)?;
        Ok(self.rows.iter().map(|row| parse_number(&row[pos])).collect())
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> DataFrame {
        let take = n.min(self.rows.len());
        DataFrame {
            columns: self.columns.clone(),
            rows: self.rows[..take].to_vec(),
            index: self.index[..take].to_vec(),
        }
    }

    /// Sorted copy of the frame. The column is compared numerically when all of
    /// its present values are numbers, otherwise as text. Missing values go last.
    pub fn sort_values(&self, column: &str, ascending: bool) -> Result<DataFrame> {
        let pos = self.column_position(column)?;

        let numeric = self
            .rows
            .iter()
            .map(|row| row[pos].as_str())
            .filter(|v| !is_missing(v))
            .all(|v| parse_number(v).is_some());

        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        if numeric {
            let keys: Vec<Option<f64>> =
                self.rows.iter().map(|row| parse_number(&row[pos])).collect();
            order.sort_by(|&a, &b| {
                compare_present(keys[a], keys[b], ascending, |x: f64, y: f64| x.total_cmp(&y))
            });
        } else {
            let keys: Vec<Option<&str>> = self
                .rows
                .iter()
                .map(|row| Some(row[pos].as_str()).filter(|v| !is_missing(v)))
                .collect();
            order.sort_by(|&a, &b| compare_present(keys[a], keys[b], ascending, |x, y| x.cmp(y)));
        }

        Ok(DataFrame {
            columns: self.columns.clone(),
            rows: order.iter().map(|&i| self.rows[i].clone()).collect(),
            index: order.iter().map(|&i| self.index[i]).collect(),
        })
    }

    /// Largest `n` rows by `column`, descending
    pub fn top_n(&self, column: &str, n: usize) -> Result<DataFrame> {
        Ok(self.sort_values(column, false)?.head(n))
    }
}

fn compare_present<T>(
    a: Option<T>,
    b: Option<T>,
    ascending: bool,
    cmp: impl Fn(T, T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = cmp(x, y);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn wine_frame() -> DataFrame {
        let alcohol = ["9.1", "14.2", "8.5", "13.9", "12.0"];
        let rows = alcohol
            .iter()
            .enumerate()
            .map(|(i, a)| vec![format!("wine{}", i), a.to_string()])
            .collect();
        DataFrame::new(strings(&["name", "alcohol"]), rows).unwrap()
    }

    #[test]
    fn test_top_three_by_alcohol() {
        let top = wine_frame().top_n("alcohol", 3).unwrap();
        let values: Vec<f64> = top
            .numeric_column("alcohol")
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(values, vec![14.2, 13.9, 12.0]);
        assert_eq!(top.index(), &[1, 3, 4]);
    }

    #[test]
    fn test_sort_ascending_numeric_not_lexicographic() {
        let frame = DataFrame::new(
            strings(&["n"]),
            vec![strings(&["10"]), strings(&["9"]), strings(&["100"])],
        )
        .unwrap();
        let sorted = frame.sort_values("n", true).unwrap();
        assert_eq!(sorted.column("n").unwrap(), vec!["9", "10", "100"]);
    }

    #[test]
    fn test_missing_values_sort_last() {
        let frame = DataFrame::new(
            strings(&["n"]),
            vec![strings(&[""]), strings(&["2"]), strings(&["NaN"]), strings(&["5"])],
        )
        .unwrap();
        let desc = frame.sort_values("n", false).unwrap();
        assert_eq!(desc.column("n").unwrap(), vec!["5", "2", "", "NaN"]);
        let asc = frame.sort_values("n", true).unwrap();
        assert_eq!(asc.column("n").unwrap(), vec!["2", "5", "", "NaN"]);
    }

    #[test]
    fn test_nan_spellings_do_not_break_numeric_order() {
        let values = ["5", "NAN", "1", "-nan", "3", "Nan", "2", "4"];
        let frame = DataFrame::new(
            strings(&["n"]),
            values.iter().map(|v| strings(&[v])).collect(),
        )
        .unwrap();

        let desc = frame.sort_values("n", false).unwrap();
        assert_eq!(
            desc.column("n").unwrap(),
            vec!["5", "4", "3", "2", "1", "NAN", "-nan", "Nan"]
        );
        let top = frame.top_n("n", 3).unwrap();
        assert_eq!(top.column("n").unwrap(), vec!["5", "4", "3"]);
        assert_eq!(top.index(), &[0, 7, 4]);
    }

    #[test]
    fn test_sort_text_column() {
        let frame = DataFrame::new(
            strings(&["city"]),
            vec![strings(&["Oslo"]), strings(&["Bern"]), strings(&["Lima"])],
        )
        .unwrap();
        let sorted = frame.sort_values("city", true).unwrap();
        assert_eq!(sorted.column("city").unwrap(), vec!["Bern", "Lima", "Oslo"]);
    }

    #[test]
    fn test_unknown_column_is_not_found() {
        let err = wine_frame().sort_values("quality", false).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_head_larger_than_frame() {
        let frame = wine_frame();
        assert_eq!(frame.head(100).num_rows(), 5);
        assert_eq!(frame.head(2).shape(), (2, 2));
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let err = DataFrame::new(strings(&["a", "b"]), vec![strings(&["1"])]).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
