use std::collections::BTreeSet;

use super::error::ColumnError;
use super::model::{CellValue, ColumnKind};
use super::table::Table;
use crate::config::DashboardConfig;

// ---------------------------------------------------------------------------
// Column catalog: options and bounds for filter widgets
// ---------------------------------------------------------------------------

/// Distinct non-null values of `column`, ascending (numeric order for
/// numbers, lexicographic for text).
pub fn distinct_values(table: &Table, column: &str) -> Result<Vec<CellValue>, ColumnError> {
    let idx = table.require_column(column)?;
    let set: BTreeSet<&CellValue> = table
        .column_cells(idx)
        .filter(|c| !c.is_missing())
        .collect();
    Ok(set.into_iter().cloned().collect())
}

/// `(min, max)` of a numeric column, ignoring nulls and non-finite values.
pub fn numeric_range(table: &Table, column: &str) -> Result<(f64, f64), ColumnError> {
    let idx = table.require_column(column)?;
    if table.column_kind(idx) != ColumnKind::Numeric {
        return Err(ColumnError::NotNumeric(column.to_string()));
    }
    table
        .column_cells(idx)
        .filter_map(CellValue::as_f64)
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
        .ok_or_else(|| ColumnError::NoValues(column.to_string()))
}

/// Options for one multi-select control.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipControl {
    pub column: String,
    pub label: String,
    pub options: Vec<CellValue>,
}

/// Slider bounds, widened to whole numbers so the full span covers every
/// row.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeControl {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

/// Everything the explorer sidebar needs to draw its filter widgets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterControls {
    pub memberships: Vec<MembershipControl>,
    pub range: Option<RangeControl>,
}

impl FilterControls {
    /// Configured filter columns that are absent from the table get no
    /// control; a price column that is absent or non-numeric gets no slider.
    pub fn from_table(table: &Table, config: &DashboardConfig) -> Self {
        let memberships = config
            .filter_columns
            .iter()
            .filter_map(|fc| {
                let options = distinct_values(table, &fc.column).ok()?;
                Some(MembershipControl {
                    column: fc.column.clone(),
                    label: fc.label.clone(),
                    options,
                })
            })
            .collect();

        let range = match numeric_range(table, &config.price_column) {
            Ok((min, max)) => Some(RangeControl {
                column: config.price_column.clone(),
                min: min.floor(),
                max: max.ceil(),
            }),
            Err(e) => {
                log::warn!("no price slider: {e}");
                None
            }
        };

        FilterControls { memberships, range }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(
            vec!["Brand".into(), "Price".into(), "Transmission".into()],
            vec![
                vec!["Toyota".into(), CellValue::Float(15000.5), "Auto".into()],
                vec!["Audi".into(), CellValue::Integer(42000), CellValue::Null],
                vec!["Toyota".into(), CellValue::Null, "Manual".into()],
                vec![CellValue::Null, CellValue::Integer(9000), "Auto".into()],
            ],
        )
    }

    #[test]
    fn distinct_values_sorted_unique_without_nulls() {
        let t = table();
        assert_eq!(
            distinct_values(&t, "Brand").unwrap(),
            vec![CellValue::from("Audi"), CellValue::from("Toyota")]
        );
        assert_eq!(
            distinct_values(&t, "Transmission").unwrap(),
            vec![CellValue::from("Auto"), CellValue::from("Manual")]
        );
        assert_eq!(
            distinct_values(&t, "Color"),
            Err(ColumnError::Missing("Color".into()))
        );
    }

    #[test]
    fn distinct_numbers_sort_numerically() {
        let t = Table::new(
            vec!["n".into()],
            vec![
                vec![CellValue::Integer(10)],
                vec![CellValue::Integer(9)],
                vec![CellValue::Integer(100)],
                vec![CellValue::Integer(9)],
            ],
        );
        let values: Vec<i64> = distinct_values(&t, "n")
            .unwrap()
            .iter()
            .filter_map(|v| v.as_f64())
            .map(|v| v as i64)
            .collect();
        assert_eq!(values, vec![9, 10, 100]);
    }

    #[test]
    fn numeric_range_skips_nulls_and_rejects_text() {
        let t = table();
        assert_eq!(numeric_range(&t, "Price").unwrap(), (9000.0, 42000.0));
        assert_eq!(
            numeric_range(&t, "Brand"),
            Err(ColumnError::NotNumeric("Brand".into()))
        );
        assert_eq!(
            numeric_range(&t, "Mileage"),
            Err(ColumnError::Missing("Mileage".into()))
        );
    }

    #[test]
    fn all_nan_column_has_no_range() {
        let t = Table::new(
            vec!["Brand".into(), "Price".into()],
            vec![
                vec!["Ford".into(), CellValue::Float(f64::NAN)],
                vec!["Kia".into(), CellValue::Float(f64::NAN)],
            ],
        );
        assert_eq!(
            numeric_range(&t, "Price"),
            Err(ColumnError::NoValues("Price".into()))
        );
        let controls = FilterControls::from_table(&t, &DashboardConfig::default());
        assert_eq!(controls.range, None);
    }

    #[test]
    fn controls_skip_absent_columns() {
        let t = table();
        let controls = FilterControls::from_table(&t, &DashboardConfig::default());
        let columns: Vec<&str> = controls
            .memberships
            .iter()
            .map(|m| m.column.as_str())
            .collect();
        assert_eq!(columns, vec!["Brand", "Transmission"]);
        let range = controls.range.unwrap();
        assert_eq!((range.min, range.max), (9000.0, 42000.0));
    }
}
