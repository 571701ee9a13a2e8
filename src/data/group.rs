use std::fmt;

use log::{debug, warn};

use super::model::Table;
use crate::error::ConfigWarning;

/// Columns whose values identify a group, in order.
pub type GroupSpec = Vec<String>;

// ---------------------------------------------------------------------------
// GroupKey / Partition
// ---------------------------------------------------------------------------

/// The group columns and the values shared by every row of one partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupKey {
    pub columns: Vec<String>,
    pub values: Vec<String>,
}

impl GroupKey {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// `(column, value)` pairs in group-column order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

/// Renders as `col = value, col2 = value2`, the heading used above each
/// group in exported documents.
impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (col, val)) in self.pairs().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{col} = {val}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub key: GroupKey,
    pub table: Table,
}

/// Ordered partitions plus the column list they share, so that a result with
/// zero partitions still knows its header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partitions {
    pub columns: Vec<String>,
    pub groups: Vec<Partition>,
}

impl Partitions {
    /// All rows, partitions concatenated in order.
    pub fn rows(&self) -> impl Iterator<Item = &Vec<String>> {
        self.groups.iter().flat_map(|p| p.table.rows())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Partitioning
// ---------------------------------------------------------------------------

/// Split a table into runs of adjacent rows sharing the group-column values.
///
/// A new partition starts whenever a row's group values differ from the
/// previous row's. Rows with equal keys that are not adjacent land in
/// separate partitions, so sort by the group columns first for one partition
/// per distinct key.
///
/// An empty spec, or one naming only missing columns, yields one partition
/// holding the whole table under an empty key.
pub fn partition(table: &Table, spec: &GroupSpec) -> (Partitions, Vec<ConfigWarning>) {
    let mut warnings = Vec::new();
    let mut key_columns = Vec::with_capacity(spec.len());
    let mut key_idx = Vec::with_capacity(spec.len());
    for col in spec {
        match table.column_index(col) {
            Some(idx) => {
                key_columns.push(col.clone());
                key_idx.push(idx);
            }
            None => {
                let w = ConfigWarning::UnknownGroupColumn(col.clone());
                warn!("{w}");
                warnings.push(w);
            }
        }
    }

    let columns = table.columns().to_vec();
    if key_idx.is_empty() {
        let whole = Partition {
            key: GroupKey::default(),
            table: table.clone(),
        };
        return (
            Partitions {
                columns,
                groups: vec![whole],
            },
            warnings,
        );
    }

    let mut groups: Vec<Partition> = Vec::new();
    let mut run: Vec<Vec<String>> = Vec::new();
    let mut current: Option<Vec<String>> = None;

    for row in table.rows() {
        let values: Vec<String> = key_idx.iter().map(|&i| row[i].clone()).collect();
        if current.as_ref() != Some(&values) {
            if let Some(done) = current.replace(values) {
                groups.push(finish_run(&key_columns, done, &columns, std::mem::take(&mut run)));
            }
        }
        run.push(row.clone());
    }
    if let Some(done) = current {
        groups.push(finish_run(&key_columns, done, &columns, run));
    }

    debug!(
        "partitioned {} rows into {} group(s) on {:?}",
        table.len(),
        groups.len(),
        key_columns
    );
    (Partitions { columns, groups }, warnings)
}

fn finish_run(
    key_columns: &[String],
    values: Vec<String>,
    columns: &[String],
    rows: Vec<Vec<String>>,
) -> Partition {
    Partition {
        key: GroupKey {
            columns: key_columns.to_vec(),
            values,
        },
        table: Table::from_parts(columns.to_vec(), rows),
    }
}
