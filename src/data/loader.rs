use std::collections::{HashMap, HashSet};
use std::path::Path;

use log::debug;
use serde_json::Value as JsonValue;

use super::model::Table;
use crate::error::TableError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row followed by records, every cell kept as text
/// * `.json` – `[{ "col": value, ... }, ...]`, every scalar stringified
pub fn load_file(path: &Path) -> Result<Table, TableError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let bytes = std::fs::read(path)?;
    match ext.as_str() {
        "csv" => load_table(&bytes),
        "json" => load_json(&bytes),
        other => Err(TableError::UnsupportedExtension(other.to_string())),
    }
}

/// Parse comma-delimited text with a header row into a [`Table`].
///
/// No type inference and no trimming: a cell reads back exactly as written.
/// Empty input produces a table with no columns and no rows.
pub fn load_table(raw: &[u8]) -> Result<Table, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(raw);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let columns = dedupe_headers(headers);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let table = Table::new(columns, rows)?;
    debug!(
        "loaded CSV table: {} columns, {} rows",
        table.column_count(),
        table.len()
    );
    Ok(table)
}

/// Repeated header names get `.1`, `.2`, … suffixes, the way dataframe
/// readers mangle them, so that column names stay unique.
fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(raw.len());

    for name in raw {
        if seen.insert(name.clone()) {
            out.push(name);
            continue;
        }
        let n = suffixes.entry(name.clone()).or_insert(0);
        loop {
            *n += 1;
            let candidate = format!("{name}.{n}");
            if seen.insert(candidate.clone()) {
                out.push(candidate);
                break;
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "name": "A", "category": "X", "qty": 3 },
///   { "name": "B", "category": "Y", "qty": null }
/// ]
/// ```
///
/// Columns appear in first-seen order. A key missing from a record reads as
/// an empty cell, as does `null`.
fn load_json(raw: &[u8]) -> Result<Table, TableError> {
    let root: JsonValue = serde_json::from_slice(raw)?;
    let records = root
        .as_array()
        .ok_or_else(|| TableError::InvalidFormat("expected top-level JSON array".into()))?;

    let mut columns: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut objects = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| TableError::InvalidFormat(format!("record {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !index.contains_key(key) {
                index.insert(key.clone(), columns.len());
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            let mut row = vec![String::new(); columns.len()];
            for (key, val) in obj {
                row[index[key]] = json_to_text(val);
            }
            row
        })
        .collect();

    let table = Table::new(columns, rows)?;
    debug!(
        "loaded JSON table: {} columns, {} rows",
        table.column_count(),
        table.len()
    );
    Ok(table)
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
