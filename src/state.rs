use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::data::catalog::FilterControls;
use crate::data::error::{ColumnError, ExportError, LoadError};
use crate::data::export::export_csv;
use crate::data::filter::{apply, FilterSpec};
use crate::data::loader::load_file;
use crate::data::model::CellValue;
use crate::data::table::Table;
use crate::views::{Page, ViewRegistry};

// ---------------------------------------------------------------------------
// Widget selections
// ---------------------------------------------------------------------------

/// Raw values of the explorer widgets. Turned into a fresh [`FilterSpec`]
/// on every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSelections {
    /// Multi-select choices per column; empty means "any".
    pub memberships: BTreeMap<String, BTreeSet<CellValue>>,
    /// Slider position, `None` until the user moves it.
    pub price: Option<(f64, f64)>,
    pub search: String,
}

impl FilterSelections {
    /// Build the spec. A slider left at (or beyond) the full span adds no
    /// range constraint, so untouched widgets give back the whole table.
    pub fn to_spec(&self, controls: &FilterControls) -> FilterSpec {
        let mut spec = FilterSpec::new();
        for (column, values) in &self.memberships {
            spec = spec.with_membership(column.as_str(), values.iter().cloned());
        }
        if let (Some((low, high)), Some(range)) = (self.price, &controls.range) {
            if low > range.min || high < range.max {
                spec = spec.with_range(range.column.as_str(), low, high);
            }
        }
        spec.with_search(&self.search)
    }

    pub fn toggle(&mut self, column: &str, value: &CellValue) {
        let selected = self.memberships.entry(column.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
    }

    pub fn clear_column(&mut self, column: &str) {
        self.memberships.remove(column);
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. One per window/session; the
/// table itself is shared read-only.
pub struct AppState {
    pub config: DashboardConfig,
    pub registry: ViewRegistry,

    /// Loaded dataset (None until a file loads).
    pub dataset: Option<Arc<Table>>,
    /// Where the dataset came from.
    pub source: Option<PathBuf>,

    pub page: Page,
    pub controls: FilterControls,
    pub selections: FilterSelections,

    /// Explorer result for the current selections.
    pub filtered: Result<Table, ColumnError>,
    /// Columns shown (and exported) in the explorer; empty means all.
    pub display_columns: Vec<String>,
    pub max_rows: usize,

    /// Column on the histogram page.
    pub histogram_column: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let max_rows = config.display_rows.default;
        Self {
            config,
            registry: ViewRegistry::default(),
            dataset: None,
            source: None,
            page: Page::default(),
            controls: FilterControls::default(),
            selections: FilterSelections::default(),
            filtered: Ok(Table::default()),
            display_columns: Vec::new(),
            max_rows,
            histogram_column: None,
            status_message: None,
        }
    }

    /// Load `path` and make it the current dataset. On failure the previous
    /// dataset (if any) is kept and the error is reported in the status line.
    pub fn load_path(&mut self, path: &Path) -> Result<(), LoadError> {
        match load_file(path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows x {} columns from {}",
                    table.row_count(),
                    table.column_count(),
                    path.display()
                );
                self.set_dataset(table, Some(path.to_path_buf()));
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Ingest a newly loaded table, reset widgets and recompute.
    pub fn set_dataset(&mut self, table: Table, source: Option<PathBuf>) {
        self.controls = FilterControls::from_table(&table, &self.config);
        self.selections = FilterSelections::default();
        self.display_columns = Vec::new();
        self.histogram_column = self.histogram_columns_for(&table).into_iter().next();
        self.dataset = Some(Arc::new(table));
        self.source = source;
        self.status_message = None;
        self.refilter();
    }

    /// Columns offered on the histogram page.
    pub fn histogram_columns(&self) -> Vec<String> {
        self.dataset
            .as_deref()
            .map(|t| self.histogram_columns_for(t))
            .unwrap_or_default()
    }

    fn histogram_columns_for(&self, table: &Table) -> Vec<String> {
        table
            .columns()
            .iter()
            .filter(|c| !self.config.histogram_skip_columns.contains(*c))
            .cloned()
            .collect()
    }

    /// Recompute the explorer result from scratch.
    pub fn refilter(&mut self) {
        let Some(table) = &self.dataset else {
            return;
        };
        let spec = self.selections.to_spec(&self.controls);
        self.filtered = apply(table, &spec);
        if let Err(e) = &self.filtered {
            log::error!("filter failed: {e}");
        }
    }

    /// The filtered table projected onto the chosen display columns.
    pub fn explorer_view(&self) -> Result<Table, ColumnError> {
        let filtered = self.filtered.as_ref().map_err(Clone::clone)?;
        filtered.select_columns(&self.display_columns)
    }

    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        self.selections.toggle(column, value);
        self.refilter();
    }

    pub fn clear_filter(&mut self, column: &str) {
        self.selections.clear_column(column);
        self.refilter();
    }

    pub fn set_price_range(&mut self, low: f64, high: f64) {
        self.selections.price = Some((low.min(high), high.max(low)));
        self.refilter();
    }

    pub fn set_search(&mut self, text: String) {
        self.selections.search = text;
        self.refilter();
    }

    pub fn set_display_columns(&mut self, columns: Vec<String>) {
        self.display_columns = columns;
    }

    /// Write the explorer view to `path`.
    pub fn export_view(&mut self, path: &Path) -> Result<(), ExportError> {
        let view = match self.explorer_view() {
            Ok(view) => view,
            Err(e) => {
                log::error!("Export failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                return Err(e.into());
            }
        };
        match export_csv(&view, path) {
            Ok(()) => {
                self.status_message = Some(format!(
                    "Exported {} rows to {}",
                    view.row_count(),
                    path.display()
                ));
                Ok(())
            }
            Err(e) => {
                log::error!("Export failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::columns::{BRAND, PRICE};

    fn table() -> Table {
        Table::new(
            vec!["Car_id".into(), BRAND.into(), PRICE.into(), "Transmission".into()],
            vec![
                vec!["C1".into(), "Ford".into(), CellValue::Integer(21000), "Auto".into()],
                vec!["C2".into(), "Kia".into(), CellValue::Integer(9000), "Manual".into()],
                vec!["C3".into(), "Ford".into(), CellValue::Null, "Auto".into()],
            ],
        )
    }

    fn loaded() -> AppState {
        let mut state = AppState::new(DashboardConfig::default());
        state.set_dataset(table(), None);
        state
    }

    #[test]
    fn untouched_widgets_show_the_whole_table() {
        let mut state = loaded();
        assert_eq!(state.filtered, Ok(table()));

        // Moving the slider back to the full span still keeps null prices.
        let range = state.controls.range.clone().unwrap();
        state.set_price_range(range.min, range.max);
        assert_eq!(state.filtered.as_ref().map(Table::row_count), Ok(3));
    }

    #[test]
    fn narrowed_slider_becomes_a_range_constraint() {
        let mut state = loaded();
        state.set_price_range(10000.0, 42000.0);
        let filtered = state.filtered.clone().unwrap();
        assert_eq!(filtered.row_count(), 1);
        assert_eq!(filtered.cell(0, "Car_id"), Some(&CellValue::from("C1")));
    }

    #[test]
    fn toggling_twice_clears_the_selection() {
        let mut state = loaded();
        let kia = CellValue::from("Kia");
        state.toggle_filter_value(BRAND, &kia);
        assert_eq!(state.filtered.as_ref().map(Table::row_count), Ok(1));
        state.toggle_filter_value(BRAND, &kia);
        assert_eq!(state.filtered.as_ref().map(Table::row_count), Ok(3));
    }

    #[test]
    fn search_and_column_selection_shape_the_view() {
        let mut state = loaded();
        state.set_search("  FORD ".to_string());
        state.set_display_columns(vec![PRICE.to_string()]);
        let view = state.explorer_view().unwrap();
        assert_eq!(view.columns(), &[PRICE.to_string()]);
        assert_eq!(view.row_count(), 2);
    }

    #[test]
    fn histogram_columns_skip_identifiers() {
        let state = loaded();
        assert_eq!(
            state.histogram_columns(),
            vec![BRAND.to_string(), PRICE.to_string(), "Transmission".to_string()]
        );
        assert_eq!(state.histogram_column.as_deref(), Some(BRAND));
    }

    #[test]
    fn failed_load_keeps_previous_dataset() {
        let mut state = loaded();
        assert!(state.load_path(Path::new("/no/such/file.csv")).is_err());
        assert!(state.dataset.is_some());
        assert!(state.status_message.is_some());
    }

    #[test]
    fn export_reports_unknown_display_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut state = loaded();
        state.set_display_columns(vec!["Mileage".to_string()]);
        let err = state.export_view(&path).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Column(ColumnError::Missing(ref c)) if c == "Mileage"
        ));
        assert!(!path.exists());
        assert!(state.status_message.is_some());
    }

    #[test]
    fn export_writes_header_only_for_empty_view() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut state = loaded();
        state.set_search("no such text".to_string());
        state.export_view(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Car_id,Brand,Price,Transmission\n"
        );
    }
}
