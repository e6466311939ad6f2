use std::collections::HashMap;

use super::error::ColumnError;
use super::model::{CellValue, ColumnKind};
use super::table::Table;

/// One bar of a histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBar {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub column: String,
    pub kind: ColumnKind,
    pub bars: Vec<HistogramBar>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bars.iter().map(|b| b.count).sum()
    }
}

/// Distribution of one column, nulls excluded.
///
/// Numeric columns are cut into `bins` equal-width bins over `[min, max]`
/// (the last bin is closed). Categorical columns get one bar per distinct
/// value, in order of first appearance.
pub fn histogram(table: &Table, column: &str, bins: usize) -> Result<Histogram, ColumnError> {
    let idx = table.require_column(column)?;
    let kind = table.column_kind(idx);
    let bars = match kind {
        ColumnKind::Numeric => {
            let values: Vec<f64> = table
                .column_cells(idx)
                .filter_map(CellValue::as_f64)
                .filter(|v| v.is_finite())
                .collect();
            numeric_bars(&values, bins.max(1))
        }
        ColumnKind::Categorical => categorical_bars(table.column_cells(idx)),
    };
    Ok(Histogram {
        column: column.to_string(),
        kind,
        bars,
    })
}

fn numeric_bars(values: &[f64], bins: usize) -> Vec<HistogramBar> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return vec![HistogramBar {
            label: format!("{min}"),
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let b = (((v - min) / width) as usize).min(bins - 1);
        counts[b] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lo = min + width * i as f64;
            HistogramBar {
                label: format!("{:.0}–{:.0}", lo, lo + width),
                count,
            }
        })
        .collect()
}

fn categorical_bars<'a>(cells: impl Iterator<Item = &'a CellValue>) -> Vec<HistogramBar> {
    let mut position: HashMap<&CellValue, usize> = HashMap::new();
    let mut bars: Vec<HistogramBar> = Vec::new();
    for cell in cells.filter(|c| !c.is_missing()) {
        let i = *position.entry(cell).or_insert_with(|| {
            bars.push(HistogramBar {
                label: cell.to_string(),
                count: 0,
            });
            bars.len() - 1
        });
        bars[i].count += 1;
    }
    bars
}
