use super::ExportSource;
use crate::error::ExportError;

/// Comma-separated output: header row, then one record per data row.
///
/// Fields are quoted only when they contain a comma, a quote or a line
/// break. Partitions are written back to back; grouping is not representable
/// in this format. A source with no columns produces no bytes.
pub fn encode(source: ExportSource<'_>) -> Result<Vec<u8>, ExportError> {
    let columns = source.columns();
    if columns.is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(columns)?;
    for row in source.rows() {
        writer.write_record(row)?;
    }
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}
