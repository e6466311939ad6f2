use std::collections::{BTreeMap, BTreeSet};

use super::error::ColumnError;
use super::model::CellValue;
use super::table::Table;

// ---------------------------------------------------------------------------
// FilterSpec: the constraints chosen for one interaction
// ---------------------------------------------------------------------------

/// A conjunction of row constraints.
///
/// * membership – per column, the set of accepted values
/// * range      – per column, an inclusive numeric interval
/// * search     – lowercase needles, each of which must occur in some cell
///
/// A column absent from `memberships` / `ranges` is unconstrained. A present
/// membership set is always a real restriction, even if it became empty
/// through [`FilterSpec::and`] (then it matches nothing).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSpec {
    memberships: BTreeMap<String, BTreeSet<CellValue>>,
    ranges: BTreeMap<String, (f64, f64)>,
    search: Vec<String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep rows whose `column` value is one of `values`. An empty selection
    /// adds no constraint.
    pub fn with_membership(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = CellValue>,
    ) -> Self {
        let values: BTreeSet<CellValue> = values.into_iter().collect();
        if values.is_empty() {
            return self;
        }
        let column = column.into();
        let merged = match self.memberships.remove(&column) {
            Some(existing) => existing.intersection(&values).cloned().collect(),
            None => values,
        };
        self.memberships.insert(column, merged);
        self
    }

    /// Keep rows with `low <= column <= high`. Rows with a null or
    /// non-numeric value in `column` are dropped.
    pub fn with_range(mut self, column: impl Into<String>, low: f64, high: f64) -> Self {
        let column = column.into();
        let merged = match self.ranges.get(&column) {
            Some(&(lo, hi)) => (lo.max(low), hi.min(high)),
            None => (low, high),
        };
        self.ranges.insert(column, merged);
        self
    }

    /// Keep rows where some cell contains `text`, ignoring case. Blank text
    /// adds no constraint.
    pub fn with_search(mut self, text: &str) -> Self {
        let needle = text.trim().to_lowercase();
        if !needle.is_empty() && !self.search.contains(&needle) {
            self.search.push(needle);
        }
        self
    }

    /// The conjunction `self ∧ other`.
    pub fn and(mut self, other: FilterSpec) -> Self {
        for (column, values) in other.memberships {
            let merged = match self.memberships.remove(&column) {
                Some(existing) => existing.intersection(&values).cloned().collect(),
                None => values,
            };
            self.memberships.insert(column, merged);
        }
        for (column, (low, high)) in other.ranges {
            self = self.with_range(column, low, high);
        }
        for needle in other.search {
            if !self.search.contains(&needle) {
                self.search.push(needle);
            }
        }
        self
    }

    /// True when the spec constrains nothing.
    pub fn is_empty(&self) -> bool {
        self.memberships.is_empty() && self.ranges.is_empty() && self.search.is_empty()
    }
}

// ---------------------------------------------------------------------------
// apply()
// ---------------------------------------------------------------------------

/// Filter `table` by `spec`, keeping original row order and every column.
///
/// Any membership/range column missing from the table is an error: a
/// constraint is never silently dropped. Membership and range checks run
/// first; the substring scan only visits rows that are still in.
pub fn apply(table: &Table, spec: &FilterSpec) -> Result<Table, ColumnError> {
    let memberships = spec
        .memberships
        .iter()
        .map(|(col, values)| table.require_column(col).map(|idx| (idx, values)))
        .collect::<Result<Vec<_>, _>>()?;
    let ranges = spec
        .ranges
        .iter()
        .map(|(col, bounds)| table.require_column(col).map(|idx| (idx, *bounds)))
        .collect::<Result<Vec<_>, _>>()?;

    if spec.is_empty() {
        return Ok(table.clone());
    }

    let mask: Vec<bool> = table
        .rows()
        .iter()
        .map(|row| {
            memberships
                .iter()
                .all(|(idx, values)| values.contains(&row[*idx]))
                && ranges.iter().all(|(idx, (low, high))| {
                    row[*idx]
                        .as_f64()
                        .is_some_and(|v| *low <= v && v <= *high)
                })
                && spec.search.iter().all(|needle| row_contains(row, needle))
        })
        .collect();

    let out = table.filter_by_mask(&mask);
    log::debug!(
        "filter kept {} of {} rows ({} membership, {} range, {} search)",
        out.row_count(),
        table.row_count(),
        memberships.len(),
        ranges.len(),
        spec.search.len()
    );
    Ok(out)
}

/// Case-insensitive substring test over the search text of every cell,
/// numbers and missing values included. `needle` is already lowercase.
fn row_contains(row: &[CellValue], needle: &str) -> bool {
    row.iter()
        .any(|cell| cell.search_text().to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> CellValue {
        CellValue::from(s)
    }

    fn sales() -> Table {
        Table::new(
            vec!["Brand".into(), "Price".into(), "Body Style".into()],
            vec![
                vec!["A".into(), CellValue::Integer(100), "SUV".into()],
                vec!["A".into(), CellValue::Integer(300), "Sedan".into()],
                vec!["B".into(), CellValue::Integer(200), "Hatchback".into()],
            ],
        )
    }

    fn dealers() -> Table {
        Table::new(
            vec!["Brand".into(), "Dealer_Region".into(), "Price".into(), "Transmission".into()],
            vec![
                vec!["Ford".into(), "Austin".into(), CellValue::Integer(21000), "Auto".into()],
                vec!["Kia".into(), "Pasco".into(), CellValue::Integer(14500), "Manual".into()],
                vec!["Ford".into(), "Pasco".into(), CellValue::Null, "Auto".into()],
                vec!["Audi".into(), "Aurora".into(), CellValue::Integer(42000), "Auto".into()],
                vec!["Kia".into(), "Austin".into(), CellValue::Integer(9000), CellValue::Null],
                vec![CellValue::Null, "Aurora".into(), CellValue::Integer(30500), "Manual".into()],
            ],
        )
    }

    fn specs() -> Vec<FilterSpec> {
        vec![
            FilterSpec::new(),
            FilterSpec::new().with_membership("Brand", [v("Ford"), v("Kia")]),
            FilterSpec::new().with_membership("Dealer_Region", [v("Austin")]),
            FilterSpec::new().with_range("Price", 10000.0, 31000.0),
            FilterSpec::new().with_search("au"),
            FilterSpec::new().with_search("500"),
            FilterSpec::new()
                .with_membership("Transmission", [v("Auto")])
                .with_range("Price", 0.0, 25000.0),
            FilterSpec::new().with_membership("Brand", [v("Audi")]),
        ]
    }

    #[test]
    fn empty_spec_is_exact_identity() {
        for t in [sales(), dealers(), dealers().head(0)] {
            assert_eq!(apply(&t, &FilterSpec::new()).unwrap(), t);
        }
        // Blank selections construct an empty spec.
        let blank = FilterSpec::new()
            .with_membership("Brand", Vec::new())
            .with_search("   ");
        assert!(blank.is_empty());
        assert_eq!(apply(&dealers(), &blank).unwrap(), dealers());
    }

    #[test]
    fn sequential_application_equals_conjunction() {
        let t = dealers();
        for s1 in specs() {
            for s2 in specs() {
                let chained = apply(&apply(&t, &s1).unwrap(), &s2).unwrap();
                let combined = apply(&t, &s1.clone().and(s2.clone())).unwrap();
                assert_eq!(chained, combined, "s1={s1:?} s2={s2:?}");
            }
        }
    }

    #[test]
    fn membership_and_range_scenario() {
        let spec = FilterSpec::new()
            .with_membership("Brand", [v("A")])
            .with_range("Price", 150.0, 350.0);
        let out = apply(&sales(), &spec).unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.rows()[0][0], CellValue::from("A"));
        assert_eq!(out.rows()[0][1], CellValue::Integer(300));
        assert_eq!(out.columns(), sales().columns());
    }

    #[test]
    fn search_is_case_insensitive() {
        let out = apply(&sales(), &FilterSpec::new().with_search("b")).unwrap();
        assert_eq!(out.row_count(), 1);
        assert!(out.rows().iter().any(|r| r[0] == CellValue::from("B")));

        let out = apply(&sales(), &FilterSpec::new().with_search("SEDAN")).unwrap();
        assert_eq!(out.row_count(), 1);
    }

    #[test]
    fn search_sees_missing_cells_as_nan() {
        let t = Table::new(
            vec!["Brand".into(), "Price_category".into()],
            vec![
                vec!["Ford".into(), CellValue::Null],
                vec!["Kia".into(), "Budget".into()],
            ],
        );
        let out = apply(&t, &FilterSpec::new().with_search("nan")).unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.cell(0, "Brand"), Some(&CellValue::from("Ford")));

        // dealers() has a null price and a null brand.
        let out = apply(&dealers(), &FilterSpec::new().with_search("NaN")).unwrap();
        assert_eq!(out.row_count(), 3);
    }

    #[test]
    fn search_matches_formatted_numbers() {
        let out = apply(&dealers(), &FilterSpec::new().with_search("14500")).unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.cell(0, "Brand"), Some(&CellValue::from("Kia")));
    }

    #[test]
    fn range_drops_null_values_and_keeps_bounds() {
        let out = apply(
            &dealers(),
            &FilterSpec::new().with_range("Price", 9000.0, 21000.0),
        )
        .unwrap();
        let prices: Vec<&CellValue> = out.rows().iter().map(|r| &r[2]).collect();
        assert_eq!(
            prices,
            vec![
                &CellValue::Integer(21000),
                &CellValue::Integer(14500),
                &CellValue::Integer(9000)
            ]
        );
    }

    #[test]
    fn missing_column_is_an_error_not_ignored() {
        let spec = FilterSpec::new().with_membership("Fuel", [v("Diesel")]);
        assert_eq!(
            apply(&dealers(), &spec),
            Err(ColumnError::Missing("Fuel".into()))
        );
        let spec = FilterSpec::new().with_range("Mileage", 0.0, 1.0);
        assert!(apply(&dealers().head(0), &spec).is_err());
    }

    #[test]
    fn empty_table_yields_empty_table() {
        let empty = dealers().head(0);
        let spec = FilterSpec::new()
            .with_membership("Brand", [v("Ford")])
            .with_search("x");
        let out = apply(&empty, &spec).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.columns(), empty.columns());
    }

    #[test]
    fn disjoint_memberships_match_nothing() {
        let spec = FilterSpec::new()
            .with_membership("Brand", [v("Ford")])
            .and(FilterSpec::new().with_membership("Brand", [v("Kia")]));
        assert!(!spec.is_empty());
        assert!(apply(&dealers(), &spec).unwrap().is_empty());
    }

    #[test]
    fn row_order_is_preserved() {
        let out = apply(
            &dealers(),
            &FilterSpec::new().with_membership("Brand", [v("Kia"), v("Ford")]),
        )
        .unwrap();
        let brands: Vec<String> = out.rows().iter().map(|r| r[0].to_field()).collect();
        assert_eq!(brands, vec!["Ford", "Kia", "Ford", "Kia"]);
    }
}
