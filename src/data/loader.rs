use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::CellValue;
use super::table::Table;

/// Field texts read as missing: the usual NA spellings of CSV exports.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, comma-separated (the dashboard's native input)
/// * `.json`    – `[{ "Brand": "Ford", "Price": 21000, ... }, ...]`
/// * `.parquet` – flat columns of strings, integers, floats or booleans
///
/// A file that parses but has no rows is an error: nothing can be shown.
/// Integer columns with gaps (or mixed with floats) load as floats.
pub fn load_file(path: &Path) -> Result<Table, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(std::fs::File::open(path)?, path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    if table.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(table.widen_integer_columns())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV from any reader. `path` only labels errors.
///
/// Types are inferred per column, not per cell, so a text column holding a
/// few numeric-looking values stays text.
pub fn read_csv<R: Read>(input: R, path: &Path) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::MissingHeaders {
            path: path.to_path_buf(),
        });
    }

    let width = headers.len();
    let mut raw_columns: Vec<Vec<Option<String>>> = vec![Vec::new(); width];

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() > width {
            return Err(LoadError::RaggedRow {
                path: path.to_path_buf(),
                row: row_no + 1,
                found: record.len(),
                expected: width,
            });
        }
        for (col_idx, column) in raw_columns.iter_mut().enumerate() {
            let field = record.get(col_idx).unwrap_or("");
            column.push((!NA_TOKENS.contains(&field)).then(|| field.to_string()));
        }
    }

    let typed: Vec<Vec<CellValue>> = raw_columns.into_iter().map(infer_column).collect();
    let n_rows = typed.first().map_or(0, Vec::len);
    let rows = (0..n_rows)
        .map(|r| typed.iter().map(|col| col[r].clone()).collect())
        .collect();

    Ok(Table::new(headers, rows))
}

/// Pick the narrowest type every non-null field of the column parses as.
fn infer_column(fields: Vec<Option<String>>) -> Vec<CellValue> {
    let present = || fields.iter().flatten();

    if present().all(|f| f.parse::<i64>().is_ok()) {
        return fields
            .iter()
            .map(|f| match f.as_deref().map(str::parse::<i64>) {
                Some(Ok(i)) => CellValue::Integer(i),
                _ => CellValue::Null,
            })
            .collect();
    }
    if present().all(|f| f.parse::<f64>().is_ok()) {
        return fields
            .iter()
            .map(|f| match f.as_deref().map(str::parse::<f64>) {
                Some(Ok(v)) => CellValue::Float(v),
                _ => CellValue::Null,
            })
            .collect();
    }
    if present().all(|f| parse_bool(f).is_some()) {
        return fields
            .iter()
            .map(|f| f.as_deref().and_then(parse_bool).map_or(CellValue::Null, CellValue::Bool))
            .collect();
    }
    fields
        .into_iter()
        .map(|f| f.map_or(CellValue::Null, CellValue::String))
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Car_id": "C_CND_000001", "Brand": "Ford", "Price": 26000 },
///   ...
/// ]
/// ```
///
/// Columns are the union of keys across records. `serde_json` objects keep
/// their keys sorted, so columns come out in key order.
fn load_json(path: &Path) -> Result<Table, LoadError> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root.as_array().ok_or_else(|| LoadError::Malformed {
        path: path.to_path_buf(),
        reason: "expected top-level JSON array".to_string(),
    })?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| LoadError::Malformed {
            path: path.to_path_buf(),
            reason: format!("row {i} is not a JSON object"),
        })?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            columns
                .iter()
                .map(|c| obj.get(c).map_or(CellValue::Null, json_to_cell))
                .collect()
        })
        .collect();

    Ok(Table::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file (one Arrow array per column).
/// Every top-level column becomes a table column; types without a numeric
/// mapping (dates, timestamps, dictionaries, ...) load as their display text.
fn load_parquet(path: &Path) -> Result<Table, LoadError> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let options = FormatOptions::default();
    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let formatters = batch
            .columns()
            .iter()
            .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
            .collect::<Result<Vec<_>, _>>()?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .zip(&formatters)
                    .map(|(col, fmt)| arrow_cell(col, fmt, row))
                    .collect(),
            );
        }
    }

    Ok(Table::new(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row. `fmt` renders
/// the types that have no typed arm.
fn arrow_cell(col: &ArrayRef, fmt: &ArrayFormatter<'_>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(i64::from(col.as_primitive::<Int8Type>().value(row))),
        DataType::Int16 => CellValue::Integer(i64::from(col.as_primitive::<Int16Type>().value(row))),
        DataType::Int32 => CellValue::Integer(i64::from(col.as_primitive::<Int32Type>().value(row))),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(i64::from(col.as_primitive::<UInt8Type>().value(row))),
        DataType::UInt16 => {
            CellValue::Integer(i64::from(col.as_primitive::<UInt16Type>().value(row)))
        }
        DataType::UInt32 => {
            CellValue::Integer(i64::from(col.as_primitive::<UInt32Type>().value(row)))
        }
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_or(CellValue::Float(v as f64), CellValue::Integer)
        }
        DataType::Float32 => {
            CellValue::Float(f64::from(col.as_primitive::<Float32Type>().value(row)))
        }
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => CellValue::String(fmt.value(row).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn parse(text: &str) -> Result<Table, LoadError> {
        read_csv(text.as_bytes(), &PathBuf::from("inline.csv"))
    }

    #[test]
    fn infers_types_per_column() {
        let t = parse("Car_id,Price,Rating,Zip,Certified\nC1,26000,4.5,01234,true\nC2,,3,abc,FALSE\n")
            .unwrap();
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.cell(0, "Price"), Some(&CellValue::Integer(26000)));
        assert_eq!(t.cell(1, "Price"), Some(&CellValue::Null));
        assert_eq!(t.cell(1, "Rating"), Some(&CellValue::Float(3.0)));
        // One non-numeric field keeps the whole column as text.
        assert_eq!(t.cell(0, "Zip"), Some(&CellValue::from("01234")));
        assert_eq!(t.cell(1, "Certified"), Some(&CellValue::Bool(false)));
    }

    #[test]
    fn na_tokens_become_nulls() {
        let t = parse("Brand,Price_category\nFord,NA\nKia,n/a\nAudi,High\n").unwrap();
        assert_eq!(t.missing_cell_count(), 2);
    }

    #[test]
    fn headers_keep_spaces_and_case() {
        let t = parse("Body Style,Dealer_Region\nSUV,Austin\n").unwrap();
        assert!(t.has_column("Body Style"));
        assert!(!t.has_column("body style"));
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_rejected() {
        let t = parse("a,b,c\n1,2\n").unwrap();
        assert_eq!(t.cell(0, "c"), Some(&CellValue::Null));

        let err = parse("a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, LoadError::RaggedRow { found: 3, expected: 2, .. }));
    }

    #[test]
    fn header_only_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "Brand,Price\n").unwrap();
        assert!(matches!(load_file(&path), Err(LoadError::Empty { .. })));
    }

    #[test]
    fn unreadable_or_unknown_files_fail() {
        assert!(matches!(
            load_file(Path::new("/definitely/not/here.csv")),
            Err(LoadError::Io(_))
        ));
        assert!(matches!(
            load_file(Path::new("cars.xlsx")),
            Err(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn json_records_load_with_union_of_keys() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"Brand":"Ford","Price":21000}},{{"Brand":"Kia","Color":"Red"}}]"#
        )
        .unwrap();
        let t = load_file(file.path()).unwrap();
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.column_count(), 3);
        assert_eq!(t.cell(0, "Price"), Some(&CellValue::Float(21000.0)));
        assert_eq!(t.cell(1, "Price"), Some(&CellValue::Null));
        assert_eq!(t.cell(1, "Color"), Some(&CellValue::from("Red")));
    }

    #[test]
    fn integer_columns_with_gaps_load_as_floats() {
        use crate::data::filter::{apply, FilterSpec};

        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "Brand,Price,Dealer_No\nFord,26000,7\nKia,,8\n").unwrap();
        let t = load_file(file.path()).unwrap();
        assert_eq!(t.cell(0, "Price"), Some(&CellValue::Float(26000.0)));
        assert_eq!(t.cell(1, "Price"), Some(&CellValue::Null));
        // No gaps, so still integers.
        assert_eq!(t.cell(1, "Dealer_No"), Some(&CellValue::Integer(8)));

        let found = apply(&t, &FilterSpec::new().with_search("26000.0")).unwrap();
        assert_eq!(found.row_count(), 1);
        let found = apply(&t, &FilterSpec::new().with_search("nan")).unwrap();
        assert_eq!(found.cell(0, "Brand"), Some(&CellValue::from("Kia")));
    }

    #[test]
    fn parquet_columns_map_to_cells() {
        use std::sync::Arc;

        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("Brand", DataType::Utf8, true),
            Field::new("Price", DataType::Int64, true),
            Field::new("Score", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Ford"), None])),
                Arc::new(Int64Array::from(vec![Some(21000), Some(9000)])),
                Arc::new(Float64Array::from(vec![Some(0.5), None])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let t = load_file(&path).unwrap();
        assert_eq!(t.columns(), &["Brand".to_string(), "Price".to_string(), "Score".to_string()]);
        assert_eq!(t.cell(0, "Brand"), Some(&CellValue::from("Ford")));
        assert_eq!(t.cell(1, "Brand"), Some(&CellValue::Null));
        assert_eq!(t.cell(1, "Price"), Some(&CellValue::Integer(9000)));
        assert_eq!(t.cell(0, "Score"), Some(&CellValue::Float(0.5)));
        assert_eq!(t.cell(1, "Score"), Some(&CellValue::Null));
    }

    #[test]
    fn parquet_dates_and_unsigned_prices_keep_their_values() {
        use std::sync::Arc;

        use arrow::array::{Date32Array, Int16Array, UInt32Array};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("Date", DataType::Date32, false),
            Field::new("Price", DataType::UInt32, false),
            Field::new("Dealer_No", DataType::Int16, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Date32Array::from(vec![19000, 19001])),
                Arc::new(UInt32Array::from(vec![21000, 9000])),
                Arc::new(Int16Array::from(vec![7, -3])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typed.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let t = load_file(&path).unwrap();
        assert_eq!(t.cell(0, "Date"), Some(&CellValue::from("2022-01-08")));
        assert_eq!(t.cell(1, "Date"), Some(&CellValue::from("2022-01-09")));
        assert_eq!(t.cell(0, "Price"), Some(&CellValue::Integer(21000)));
        assert_eq!(t.cell(1, "Price"), Some(&CellValue::Integer(9000)));
        assert_eq!(t.cell(1, "Dealer_No"), Some(&CellValue::Integer(-3)));
        assert_eq!(
            t.column_kind(t.column_index("Price").unwrap()),
            crate::data::model::ColumnKind::Numeric
        );
    }
}
