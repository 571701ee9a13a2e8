use thiserror::Error;

/// Errors raised while building a [`Table`](crate::Table) from raw input.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("row {row} has {found} cells but the table has {expected} columns")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid record layout: {0}")]
    InvalidFormat(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
}

/// Errors raised by an export attempt. Only the failing export is affected;
/// the source table is left untouched.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{context}: text contains {ch:?}, which cannot be stored in a document")]
    InvalidXmlText { context: String, ch: char },
}

/// Non-fatal configuration problem: a stage was asked about a column the
/// table does not have and skipped that reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    #[error("filter column '{0}' does not exist; filter ignored")]
    UnknownFilterColumn(String),

    #[error("column '{0}' does not exist; projection entry ignored")]
    UnknownProjectionColumn(String),

    #[error("sort column '{0}' does not exist; skipped")]
    UnknownSortColumn(String),

    #[error("none of the sort columns exist; sorting skipped")]
    SortSkipped,

    #[error("group column '{0}' does not exist; skipped")]
    UnknownGroupColumn(String),
}
