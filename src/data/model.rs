use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64`, if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Null, NaN and infinities count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => !v.is_finite(),
            _ => false,
        }
    }
}

static NULL_CELL: CellValue = CellValue::Null;

// ---------------------------------------------------------------------------
// Column errors
// ---------------------------------------------------------------------------

/// Why a column cannot be plotted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColumnError {
    #[error("Column '{0}' not found")]
    NotFound(String),

    #[error("Column '{column}' is not numeric (row {row} holds '{value}')")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Column '{0}' has no values to plot")]
    Empty(String),
}

// ---------------------------------------------------------------------------
// TabularDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// A parsed table: ordered column names plus rows of cells.
///
/// Rows may be shorter than `column_names`; missing trailing cells read as
/// [`CellValue::Null`].
#[derive(Debug, Clone, Default)]
pub struct TabularDataset {
    /// Column names in source order.
    pub column_names: Vec<String>,
    /// Row-major cells.
    pub rows: Vec<Vec<CellValue>>,
}

impl TabularDataset {
    pub fn new(column_names: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { column_names, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Position of `name` among the columns.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }

    /// Iterate the cells of one column, top to bottom.
    pub fn column_cells(&self, idx: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(idx).unwrap_or(&NULL_CELL))
    }

    /// Collect the numeric values of a column, dropping missing cells.
    ///
    /// Fails on the first non-numeric, non-missing cell, or when nothing is
    /// left after dropping missing cells.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, ColumnError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| ColumnError::NotFound(name.to_string()))?;

        let mut values = Vec::with_capacity(self.len());
        for (row, cell) in self.column_cells(idx).enumerate() {
            if cell.is_missing() {
                continue;
            }
            match cell.as_f64() {
                Some(v) => values.push(v),
                None => {
                    return Err(ColumnError::NonNumeric {
                        column: name.to_string(),
                        row,
                        value: cell.to_string(),
                    })
                }
            }
        }

        if values.is_empty() {
            return Err(ColumnError::Empty(name.to_string()));
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TabularDataset {
        TabularDataset::new(
            vec!["id".into(), "score".into(), "label".into()],
            vec![
                vec![
                    CellValue::Integer(1),
                    CellValue::Float(2.5),
                    CellValue::String("a".into()),
                ],
                vec![CellValue::Integer(2), CellValue::Null, CellValue::Null],
                vec![CellValue::Integer(3), CellValue::Float(f64::NAN)],
                vec![
                    CellValue::Integer(4),
                    CellValue::Integer(7),
                    CellValue::String("b".into()),
                ],
            ],
        )
    }

    #[test]
    fn numeric_column_drops_missing_cells() {
        let ds = sample();
        assert_eq!(ds.numeric_column("score").unwrap(), vec![2.5, 7.0]);
        assert_eq!(ds.numeric_column("id").unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn numeric_column_rejects_text() {
        let err = sample().numeric_column("label").unwrap_err();
        assert_eq!(
            err,
            ColumnError::NonNumeric {
                column: "label".into(),
                row: 0,
                value: "a".into(),
            }
        );
    }

    #[test]
    fn numeric_column_unknown_name() {
        let err = sample().numeric_column("Score").unwrap_err();
        assert_eq!(err, ColumnError::NotFound("Score".into()));
        assert_eq!(err.to_string(), "Column 'Score' not found");
    }

    #[test]
    fn all_missing_column_is_empty() {
        let ds = TabularDataset::new(
            vec!["x".into()],
            vec![vec![CellValue::Null], vec![CellValue::Float(f64::NAN)]],
        );
        assert_eq!(
            ds.numeric_column("x").unwrap_err(),
            ColumnError::Empty("x".into())
        );
    }

    #[test]
    fn short_rows_read_as_null() {
        let ds = sample();
        let labels: Vec<_> = ds.column_cells(2).cloned().collect();
        assert_eq!(labels[2], CellValue::Null);
        assert_eq!(ds.len(), 4);
        assert_eq!(ds.column_index("label"), Some(2));
    }
}
