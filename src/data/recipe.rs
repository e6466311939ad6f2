use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::columns::{BODY_STYLE, BRAND, CAR_ID, COUNT, DEALER_REGION, PRICE, PRICE_CATEGORY};
use super::error::MissingColumnError;
use super::model::CellValue;
use super::table::Table;

/// How many groups the top/bottom charts keep.
pub const TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Recipe IR
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    /// Mean of the numeric, non-null values.
    Mean,
    /// Number of non-null values.
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub func: AggregateFn,
    pub column: String,
    pub output: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub order: SortOrder,
}

/// Pre-filter: keep only rows whose `column` value is among the `n` values
/// with the most non-null `count_of` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopGroups {
    pub column: String,
    pub count_of: String,
    pub n: usize,
}

/// A declarative table → table transform:
///
/// ```text
/// restrict_to_top? → group_by(keys) → aggregate → sort → limit? → dedupe?
/// ```
///
/// Groups come out in first-encountered order and every sort is stable, so
/// ties keep that order. Rows with a null grouping key are dropped. Null and
/// NaN sort keys go last whichever the direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub name: String,
    pub restrict: Option<TopGroups>,
    pub group_by: Vec<String>,
    pub aggregate: Aggregate,
    pub sort: Vec<SortKey>,
    pub limit: Option<usize>,
    pub dedupe: Vec<String>,
}

impl Recipe {
    pub fn new(name: impl Into<String>, group_by: &[&str], aggregate: Aggregate) -> Self {
        Recipe {
            name: name.into(),
            restrict: None,
            group_by: group_by.iter().map(|k| k.to_string()).collect(),
            aggregate,
            sort: Vec::new(),
            limit: None,
            dedupe: Vec::new(),
        }
    }

    pub fn sort_by(mut self, column: &str, order: SortOrder) -> Self {
        self.sort.push(SortKey {
            column: column.to_string(),
            order,
        });
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn dedupe(mut self, keys: &[&str]) -> Self {
        self.dedupe = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn restrict_to_top(mut self, column: &str, count_of: &str, n: usize) -> Self {
        self.restrict = Some(TopGroups {
            column: column.to_string(),
            count_of: count_of.to_string(),
            n,
        });
        self
    }

    // -- generic shapes --

    /// `key` groups ranked by mean `value`, keeping `n`.
    pub fn top_n_by_mean(name: &str, key: &str, value: &str, n: usize, order: SortOrder) -> Self {
        Recipe::new(name, &[key], Aggregate::mean(value))
            .sort_by(value, order)
            .limit(n)
    }

    /// Full cross-tabulation of row counts over `keys`.
    pub fn cross_tab_count(name: &str, keys: &[&str], id: &str) -> Self {
        Recipe::new(name, keys, Aggregate::count(id))
    }

    /// Frequency of each value of `column`, most frequent first.
    pub fn value_counts(name: &str, column: &str) -> Self {
        Recipe::new(name, &[column], Aggregate::count_as(column, COUNT))
            .sort_by(COUNT, SortOrder::Desc)
    }

    /// The most frequent `value` within each `group`, one row per group.
    /// Ties go to the smallest `value`.
    pub fn top_value_per_group(name: &str, group: &str, value: &str, id: &str) -> Self {
        Recipe::new(name, &[group, value], Aggregate::count(id))
            .sort_by(group, SortOrder::Asc)
            .sort_by(COUNT, SortOrder::Desc)
            .sort_by(value, SortOrder::Asc)
            .dedupe(&[group])
    }

    /// Input columns the recipe reads, in first-use order.
    pub fn required_columns(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let restrict = self
            .restrict
            .iter()
            .flat_map(|r| [r.column.as_str(), r.count_of.as_str()]);
        for col in restrict
            .chain(self.group_by.iter().map(String::as_str))
            .chain(std::iter::once(self.aggregate.column.as_str()))
        {
            if !out.iter().any(|c| c == col) {
                out.push(col.to_string());
            }
        }
        out
    }

    /// Column names of the result.
    pub fn output_columns(&self) -> Vec<String> {
        let mut cols = self.group_by.clone();
        cols.push(self.aggregate.output.clone());
        cols
    }

    pub fn missing_columns(&self, table: &Table) -> Vec<String> {
        self.required_columns()
            .into_iter()
            .filter(|c| !table.has_column(c))
            .collect()
    }

    /// Run the recipe. Never mutates `table`.
    pub fn run(&self, table: &Table) -> Result<Table, MissingColumnError> {
        let missing = self.missing_columns(table);
        if !missing.is_empty() {
            return Err(MissingColumnError {
                recipe: self.name.clone(),
                columns: missing,
            });
        }

        let restricted;
        let input = match &self.restrict {
            Some(top) => {
                restricted = restrict_to_top(table, top)?;
                &restricted
            }
            None => table,
        };

        let mut rows = self.group(input)?;
        let output = self.output_columns();

        let sort_keys = self
            .sort
            .iter()
            .map(|k| output_index(&output, &k.column, &self.name).map(|i| (i, k.order)))
            .collect::<Result<Vec<_>, _>>()?;
        rows.sort_by(|a, b| {
            sort_keys
                .iter()
                .map(|&(i, order)| compare_missing_last(&a[i], &b[i], order))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        if let Some(n) = self.limit {
            rows.truncate(n);
        }

        if !self.dedupe.is_empty() {
            let keys = self
                .dedupe
                .iter()
                .map(|c| output_index(&output, c, &self.name))
                .collect::<Result<Vec<_>, _>>()?;
            let mut seen: HashSet<Vec<CellValue>> = HashSet::new();
            rows.retain(|row| seen.insert(keys.iter().map(|&i| row[i].clone()).collect()));
        }

        log::debug!("recipe '{}' produced {} rows", self.name, rows.len());
        Ok(Table::new(output, rows))
    }

    fn group(&self, table: &Table) -> Result<Vec<Vec<CellValue>>, MissingColumnError> {
        let key_idx = self
            .group_by
            .iter()
            .map(|k| table.column_index(k))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| self.missing(self.group_by.clone()))?;
        let agg_idx = table
            .column_index(&self.aggregate.column)
            .ok_or_else(|| self.missing(vec![self.aggregate.column.clone()]))?;

        let mut ordering: Vec<Vec<CellValue>> = Vec::new();
        let mut slot: HashMap<Vec<CellValue>, Accumulator> = HashMap::new();

        for row in table.rows() {
            let key: Vec<CellValue> = key_idx.iter().map(|&i| row[i].clone()).collect();
            if key.iter().any(CellValue::is_missing) {
                continue;
            }
            let acc = slot.entry(key).or_insert_with_key(|k| {
                ordering.push(k.clone());
                Accumulator::default()
            });
            acc.push(&row[agg_idx]);
        }

        Ok(ordering
            .into_iter()
            .map(|key| {
                let value = slot
                    .get(&key)
                    .map_or(CellValue::Null, |acc| acc.finish(self.aggregate.func));
                let mut row = key;
                row.push(value);
                row
            })
            .collect())
    }

    fn missing(&self, columns: Vec<String>) -> MissingColumnError {
        MissingColumnError {
            recipe: self.name.clone(),
            columns,
        }
    }
}

impl Aggregate {
    /// Mean of `column`, output under the same name.
    pub fn mean(column: &str) -> Self {
        Aggregate {
            func: AggregateFn::Mean,
            column: column.to_string(),
            output: column.to_string(),
        }
    }

    /// Count of non-null `column` cells, output as `count`.
    pub fn count(column: &str) -> Self {
        Self::count_as(column, COUNT)
    }

    pub fn count_as(column: &str, output: &str) -> Self {
        Aggregate {
            func: AggregateFn::Count,
            column: column.to_string(),
            output: output.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    count: usize,
    sum: f64,
    numeric: usize,
}

impl Accumulator {
    fn push(&mut self, cell: &CellValue) {
        if cell.is_missing() {
            return;
        }
        self.count += 1;
        if let Some(v) = cell.as_f64() {
            self.sum += v;
            self.numeric += 1;
        }
    }

    fn finish(&self, func: AggregateFn) -> CellValue {
        match func {
            AggregateFn::Count => CellValue::Integer(self.count as i64),
            AggregateFn::Mean if self.numeric == 0 => CellValue::Float(f64::NAN),
            AggregateFn::Mean => CellValue::Float(self.sum / self.numeric as f64),
        }
    }
}

fn output_index(output: &[String], column: &str, recipe: &str) -> Result<usize, MissingColumnError> {
    output
        .iter()
        .position(|c| c == column)
        .ok_or_else(|| MissingColumnError {
            recipe: recipe.to_string(),
            columns: vec![column.to_string()],
        })
}

fn compare_missing_last(a: &CellValue, b: &CellValue, order: SortOrder) -> Ordering {
    match (a.is_missing(), b.is_missing()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match order {
            SortOrder::Asc => a.cmp(b),
            SortOrder::Desc => b.cmp(a),
        },
    }
}

/// Keep the rows whose `top.column` value is among the `top.n` largest
/// groups by non-null `top.count_of` count. Ties keep first-seen groups.
fn restrict_to_top(table: &Table, top: &TopGroups) -> Result<Table, MissingColumnError> {
    let counts = Recipe::new(
        format!("top {} {}", top.n, top.column),
        &[top.column.as_str()],
        Aggregate::count(&top.count_of),
    )
    .sort_by(COUNT, SortOrder::Desc)
    .limit(top.n)
    .run(table)?;

    let keep: HashSet<&CellValue> = counts.rows().iter().map(|r| &r[0]).collect();
    let col = table.column_index(&top.column).ok_or_else(|| MissingColumnError {
        recipe: top.column.clone(),
        columns: vec![top.column.clone()],
    })?;
    let mask: Vec<bool> = table.rows().iter().map(|r| keep.contains(&r[col])).collect();
    Ok(table.filter_by_mask(&mask))
}

// ---------------------------------------------------------------------------
// Dashboard catalog
// ---------------------------------------------------------------------------

pub fn top_brands_by_mean_price() -> Recipe {
    Recipe::top_n_by_mean("Top 10 Most Expensive Brands", BRAND, PRICE, TOP_N, SortOrder::Desc)
}

pub fn bottom_brands_by_mean_price() -> Recipe {
    Recipe::top_n_by_mean(
        "Bottom 10 Most Expensive Brands",
        BRAND,
        PRICE,
        TOP_N,
        SortOrder::Asc,
    )
}

pub fn region_brand_counts() -> Recipe {
    Recipe::cross_tab_count(
        "Brand x Dealer Region (Sales Count)",
        &[DEALER_REGION, BRAND],
        CAR_ID,
    )
}

pub fn price_category_distribution() -> Recipe {
    Recipe::value_counts("Price Category Distribution", PRICE_CATEGORY)
}

pub fn body_style_distribution() -> Recipe {
    Recipe::value_counts("Distribution of Body Styles", BODY_STYLE)
}

pub fn top_brand_per_region() -> Recipe {
    Recipe::top_value_per_group("Top Selling Brand in Each Region", DEALER_REGION, BRAND, CAR_ID)
}

pub fn top_body_style_per_top_brand() -> Recipe {
    Recipe::top_value_per_group(
        "Top Selling Body Style in Top 10 Brands",
        BRAND,
        BODY_STYLE,
        CAR_ID,
    )
    .restrict_to_top(BRAND, CAR_ID, TOP_N)
}
