use std::cmp::Ordering;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::model::Table;
use crate::error::ConfigWarning;

/// Direction applied uniformly to every sort column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Sort columns in priority order (first is the primary key).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub columns: Vec<String>,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>, order: SortOrder) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            order,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Stable lexical sort on the listed columns.
///
/// Cells compare as strings, byte-wise, so `"10"` sorts before `"9"`. Rows
/// that tie on every sort column keep their relative order in either
/// direction. Columns the table does not have are skipped with a warning;
/// when none remain the table comes back unchanged.
pub fn sort(table: &Table, spec: &SortSpec) -> (Table, Vec<ConfigWarning>) {
    let mut warnings = Vec::new();
    if spec.is_empty() {
        return (table.clone(), warnings);
    }

    let mut keys = Vec::with_capacity(spec.columns.len());
    for col in &spec.columns {
        match table.column_index(col) {
            Some(idx) => keys.push(idx),
            None => {
                let w = ConfigWarning::UnknownSortColumn(col.clone());
                warn!("{w}");
                warnings.push(w);
            }
        }
    }
    if keys.is_empty() {
        warn!("{}", ConfigWarning::SortSkipped);
        warnings.push(ConfigWarning::SortSkipped);
        return (table.clone(), warnings);
    }

    let rows = table.rows();
    let mut order: Vec<usize> = (0..rows.len()).collect();
    // `sort_by` is stable; reversing the comparison (not the result) keeps
    // ties in input order for descending sorts too.
    order.sort_by(|&a, &b| {
        let ord = compare_on(&rows[a], &rows[b], &keys);
        match spec.order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });

    debug!("sorted {} rows on {} column(s)", rows.len(), keys.len());
    (table.with_rows(order), warnings)
}

fn compare_on(a: &[String], b: &[String], keys: &[usize]) -> Ordering {
    keys.iter()
        .map(|&k| a[k].cmp(&b[k]))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}
