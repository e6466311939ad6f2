use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::data::export::DEFAULT_EXPORT_NAME;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "CAR_EDA_CONFIG";
/// Environment variable overriding the dataset path.
pub const DATA_ENV: &str = "CAR_EDA_DATA";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// One multi-select filter in the explorer sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FilterColumn {
    /// Header name in the dataset (case- and space-sensitive).
    pub column: String,
    /// Label shown next to the control.
    pub label: String,
}

impl FilterColumn {
    fn new(column: &str, label: &str) -> Self {
        FilterColumn {
            column: column.to_string(),
            label: label.to_string(),
        }
    }
}

/// Bounds of the "rows to display" slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplayRows {
    pub min: usize,
    pub max: usize,
    pub step: usize,
    pub default: usize,
}

impl Default for DisplayRows {
    fn default() -> Self {
        DisplayRows {
            min: 50,
            max: 1000,
            step: 50,
            default: 200,
        }
    }
}

/// Dashboard settings. Every field has a default, so a config file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset loaded at start-up.
    pub data_path: PathBuf,
    /// File name suggested when exporting the filtered view.
    pub export_file_name: String,
    /// Multi-select filters, in sidebar order.
    pub filter_columns: Vec<FilterColumn>,
    /// Numeric column driving the price slider and the average-price metric.
    pub price_column: String,
    /// Show the free-text search box in the explorer sidebar.
    pub search_enabled: bool,
    /// Columns not offered on the histogram page (identifiers, free text).
    pub histogram_skip_columns: Vec<String>,
    pub histogram_bins: usize,
    /// Rows shown in the overview preview.
    pub preview_rows: usize,
    pub display_rows: DisplayRows,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from("updated_used_car.csv"),
            export_file_name: DEFAULT_EXPORT_NAME.to_string(),
            filter_columns: vec![
                FilterColumn::new("Brand", "Brand"),
                FilterColumn::new("Dealer_Region", "Dealer Region"),
                FilterColumn::new("Body Style", "Body Style"),
                FilterColumn::new("Transmission", "Transmission"),
            ],
            price_column: "Price".to_string(),
            search_enabled: true,
            histogram_skip_columns: ["Car_id", "Date", "Dealer_No", "Customer Name"]
                .map(String::from)
                .to_vec(),
            histogram_bins: 30,
            preview_rows: 10,
            display_rows: DisplayRows::default(),
        }
    }
}

impl DashboardConfig {
    /// Read the file named by `CAR_EDA_CONFIG`, or fall back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply the data path override: a command-line argument wins over
    /// `CAR_EDA_DATA`, which wins over the config file.
    pub fn with_data_override(mut self, cli_path: Option<PathBuf>) -> Self {
        if let Some(path) = cli_path.or_else(|| std::env::var_os(DATA_ENV).map(PathBuf::from)) {
            self.data_path = path;
        }
        self
    }
}
