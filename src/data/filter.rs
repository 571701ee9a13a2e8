use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use super::model::Table;
use crate::error::ConfigWarning;

// ---------------------------------------------------------------------------
// Filter predicate: which values are accepted per column
// ---------------------------------------------------------------------------

/// Per-column selection: maps column_name → set of accepted values.
/// A column absent from the map is unconstrained; a column mapped to an
/// empty set accepts nothing.
pub type FilterSpec = BTreeMap<String, BTreeSet<String>>;

/// Which columns survive into the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnProjection {
    /// Keep every column.
    #[default]
    None,
    /// Keep only these columns, in table order.
    Include(BTreeSet<String>),
    /// Drop these columns, keep the rest in table order.
    Exclude(BTreeSet<String>),
}

/// Return indices of rows that pass all value filters.
///
/// A row passes a column filter when its value for that column is in the
/// accepted set. Filters on columns the table does not have are skipped and
/// reported through `warnings`.
pub fn filtered_indices(
    table: &Table,
    filters: &FilterSpec,
    warnings: &mut Vec<ConfigWarning>,
) -> Vec<usize> {
    let mut constraints: Vec<(usize, &BTreeSet<String>)> = Vec::with_capacity(filters.len());
    for (col, accepted) in filters {
        match table.column_index(col) {
            Some(idx) => constraints.push((idx, accepted)),
            None => {
                let w = ConfigWarning::UnknownFilterColumn(col.clone());
                warn!("{w}");
                warnings.push(w);
            }
        }
    }

    table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            constraints
                .iter()
                .all(|(idx, accepted)| accepted.contains(&row[*idx]))
        })
        .map(|(i, _)| i)
        .collect()
}

/// Apply a column projection.
pub fn project(
    table: &Table,
    projection: &ColumnProjection,
    warnings: &mut Vec<ConfigWarning>,
) -> Table {
    let (names, keep_named) = match projection {
        ColumnProjection::None => return table.clone(),
        ColumnProjection::Include(names) => (names, true),
        ColumnProjection::Exclude(names) => (names, false),
    };

    for name in names {
        if !table.has_column(name) {
            let w = ConfigWarning::UnknownProjectionColumn(name.clone());
            warn!("{w}");
            warnings.push(w);
        }
    }

    let kept: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| names.contains(*c) == keep_named)
        .map(|(i, _)| i)
        .collect();

    let columns = kept.iter().map(|&i| table.columns()[i].clone()).collect();
    let rows = table
        .rows()
        .iter()
        .map(|row| kept.iter().map(|&i| row[i].clone()).collect())
        .collect();
    Table::from_parts(columns, rows)
}

/// Value filtering followed by column projection.
pub fn filter(
    table: &Table,
    filters: &FilterSpec,
    projection: &ColumnProjection,
) -> (Table, Vec<ConfigWarning>) {
    let mut warnings = Vec::new();
    let indices = filtered_indices(table, filters, &mut warnings);
    let kept = table.with_rows(indices);
    let projected = project(&kept, projection, &mut warnings);
    debug!(
        "filter: {} of {} rows kept, {} of {} columns",
        projected.len(),
        table.len(),
        projected.column_count(),
        table.column_count()
    );
    (projected, warnings)
}
