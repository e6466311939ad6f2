use std::collections::HashMap;

use super::error::ColumnError;
use super::model::{CellValue, ColumnKind};

// ---------------------------------------------------------------------------
// Table – the loaded sales dataset (and every derived result)
// ---------------------------------------------------------------------------

/// An ordered, row-major table. The column set is fixed at construction and
/// rows keep source order; operations return new tables instead of mutating.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table from column names and rows. Short rows are padded with
    /// nulls and long rows truncated so every row matches the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        Table { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of null cells across the whole table.
    pub fn missing_cell_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cell| cell.is_missing())
            .count()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`Table::column_index`] but failing with [`ColumnError::Missing`].
    pub fn require_column(&self, name: &str) -> Result<usize, ColumnError> {
        self.column_index(name)
            .ok_or_else(|| ColumnError::Missing(name.to_string()))
    }

    /// Cells of one column, in row order.
    pub fn column_cells(&self, idx: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().map(move |row| &row[idx])
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    pub fn column_kind(&self, idx: usize) -> ColumnKind {
        ColumnKind::classify(self.column_cells(idx))
    }

    /// Turn the integers of every numeric column that also holds a null or a
    /// float into floats, so each column has a single numeric type.
    pub(crate) fn widen_integer_columns(mut self) -> Self {
        for idx in 0..self.columns.len() {
            let widen = self.column_kind(idx) == ColumnKind::Numeric
                && self
                    .column_cells(idx)
                    .any(|c| matches!(c, CellValue::Null | CellValue::Float(_)));
            if !widen {
                continue;
            }
            for row in &mut self.rows {
                if let CellValue::Integer(i) = row[idx] {
                    row[idx] = CellValue::Float(i as f64);
                }
            }
        }
        self
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Project onto `names`, in the order given. An empty selection keeps
    /// every column.
    pub fn select_columns(&self, names: &[String]) -> Result<Table, ColumnError> {
        if names.is_empty() {
            return Ok(self.clone());
        }
        let indices = names
            .iter()
            .map(|n| self.require_column(n))
            .collect::<Result<Vec<_>, _>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(Table {
            columns: names.to_vec(),
            rows,
        })
    }

    /// Keep the rows whose mask entry is `true`, preserving order.
    pub(crate) fn filter_by_mask(&self, mask: &[bool]) -> Table {
        debug_assert_eq!(mask.len(), self.rows.len());
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .zip(mask)
                .filter(|(_, keep)| **keep)
                .map(|(row, _)| row.clone())
                .collect(),
        }
    }

    /// Mean of the numeric cells of `column`; `None` when it has none.
    pub fn mean(&self, column: &str) -> Result<Option<f64>, ColumnError> {
        let idx = self.require_column(column)?;
        let values: Vec<f64> = self
            .column_cells(idx)
            .filter_map(CellValue::as_f64)
            .filter(|v| !v.is_nan())
            .collect();
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(values.iter().sum::<f64>() / values.len() as f64))
    }

    // -----------------------------------------------------------------------
    // describe()
    // -----------------------------------------------------------------------

    /// Summary statistics for every categorical column.
    pub fn describe_categorical(&self) -> Vec<CategoricalSummary> {
        (0..self.columns.len())
            .filter(|&i| self.column_kind(i) == ColumnKind::Categorical)
            .map(|i| {
                let mut counts: HashMap<&CellValue, usize> = HashMap::new();
                let mut first_seen: Vec<&CellValue> = Vec::new();
                for cell in self.column_cells(i).filter(|c| !c.is_missing()) {
                    let n = counts.entry(cell).or_insert(0);
                    if *n == 0 {
                        first_seen.push(cell);
                    }
                    *n += 1;
                }
                // Ties go to the value seen first.
                let mut top: Option<(&CellValue, usize)> = None;
                for value in first_seen {
                    let n = counts[value];
                    if top.map_or(true, |(_, best)| n > best) {
                        top = Some((value, n));
                    }
                }
                CategoricalSummary {
                    column: self.columns[i].clone(),
                    count: counts.values().sum(),
                    unique: counts.len(),
                    top: top.map(|(v, _)| v.clone()),
                    freq: top.map_or(0, |(_, n)| n),
                }
            })
            .collect()
    }

    /// Summary statistics for every numeric column.
    pub fn describe_numeric(&self) -> Vec<NumericSummary> {
        (0..self.columns.len())
            .filter(|&i| self.column_kind(i) == ColumnKind::Numeric)
            .map(|i| {
                let mut values: Vec<f64> = self
                    .column_cells(i)
                    .filter_map(CellValue::as_f64)
                    .filter(|v| !v.is_nan())
                    .collect();
                values.sort_by(f64::total_cmp);
                NumericSummary::from_sorted(&self.columns[i], &values)
            })
            .collect()
    }

    /// `describe` rendered as a table: one row per column of `kind`.
    pub fn describe(&self, kind: ColumnKind) -> Table {
        match kind {
            ColumnKind::Categorical => {
                let columns = ["column", "count", "unique", "top", "freq"]
                    .map(String::from)
                    .to_vec();
                let rows = self
                    .describe_categorical()
                    .into_iter()
                    .map(|s| {
                        vec![
                            CellValue::String(s.column),
                            CellValue::Integer(s.count as i64),
                            CellValue::Integer(s.unique as i64),
                            s.top.unwrap_or(CellValue::Null),
                            CellValue::Integer(s.freq as i64),
                        ]
                    })
                    .collect();
                Table::new(columns, rows)
            }
            ColumnKind::Numeric => {
                let columns = ["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]
                    .map(String::from)
                    .to_vec();
                let rows = self
                    .describe_numeric()
                    .into_iter()
                    .map(|s| {
                        vec![
                            CellValue::String(s.column),
                            CellValue::Integer(s.count as i64),
                            CellValue::Float(s.mean),
                            CellValue::Float(s.std),
                            CellValue::Float(s.min),
                            CellValue::Float(s.q25),
                            CellValue::Float(s.q50),
                            CellValue::Float(s.q75),
                            CellValue::Float(s.max),
                        ]
                    })
                    .collect();
                Table::new(columns, rows)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<CellValue>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1).
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl NumericSummary {
    fn from_sorted(column: &str, values: &[f64]) -> Self {
        let count = values.len();
        let mean = if count == 0 {
            f64::NAN
        } else {
            values.iter().sum::<f64>() / count as f64
        };
        let std = if count < 2 {
            f64::NAN
        } else {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        };
        NumericSummary {
            column: column.to_string(),
            count,
            mean,
            std,
            min: values.first().copied().unwrap_or(f64::NAN),
            q25: quantile(values, 0.25),
            q50: quantile(values, 0.5),
            q75: quantile(values, 0.75),
            max: values.last().copied().unwrap_or(f64::NAN),
        }
    }
}

/// Linear-interpolated quantile of already sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
