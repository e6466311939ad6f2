use std::io::Write;
use std::path::Path;

use super::error::ExportError;
use super::table::Table;

/// File name offered by the save dialog.
pub const DEFAULT_EXPORT_NAME: &str = "filtered_used_car_data.csv";

/// Write `table` as comma-separated UTF-8 with a header row and no index
/// column. A table without rows still gets its header line.
pub fn write_csv<W: Write>(table: &Table, out: W) -> Result<(), ExportError> {
    let mut writer = csv::WriterBuilder::new().from_writer(out);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_field()))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_csv_bytes(table: &Table) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    Ok(buf)
}

pub fn export_csv(table: &Table, path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(table, std::io::BufWriter::new(file))?;
    log::info!("Exported {} rows to {}", table.row_count(), path.display());
    Ok(())
}
