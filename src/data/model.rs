use std::collections::{BTreeSet, HashSet};

use crate::error::TableError;

// ---------------------------------------------------------------------------
// Table – ordered columns, ordered rows, text cells
// ---------------------------------------------------------------------------

/// An immutable table of text cells.
///
/// Column names are unique and their order is significant. Every row holds
/// exactly one cell per column, stored positionally in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, checking that column names are unique and that every
    /// row has one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.as_str()) {
                return Err(TableError::DuplicateColumn(col.clone()));
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(TableError::RaggedRow {
                    row: i + 1,
                    expected: columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Convenience constructor from anything string-like.
    ///
    /// ```
    /// # use csv2doc::Table;
    /// let t = Table::from_records(["name", "category"], [["A", "X"], ["B", "Y"]]).unwrap();
    /// assert_eq!(t.len(), 2);
    /// ```
    pub fn from_records<C, R, S>(
        columns: C,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<Self, TableError>
    where
        C: IntoIterator<Item = S>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(Into::into).collect())
            .collect();
        Self::new(columns, rows)
    }

    /// Stages that only reorder or drop whole rows keep the invariants of
    /// their input, so they skip the checks in [`Table::new`].
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    /// Table with the same columns and the given subset / permutation of rows.
    pub(crate) fn with_rows(&self, indices: impl IntoIterator<Item = usize>) -> Self {
        let rows = indices.into_iter().map(|i| self.rows[i].clone()).collect();
        Self::from_parts(self.columns.clone(), rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Position of a column, if the table has it.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell text at `row` for the named column.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// Sorted set of distinct values in a column (what a filter picker offers).
    pub fn unique_values(&self, column: &str) -> Option<BTreeSet<&str>> {
        let col = self.column_index(column)?;
        Some(self.rows.iter().map(|r| r[col].as_str()).collect())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ragged_rows() {
        let err = Table::from_records(["a", "b"], [vec!["1", "2"], vec!["3"]]).unwrap_err();
        assert!(matches!(
            err,
            TableError::RaggedRow {
                row: 2,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn rejects_duplicate_columns() {
        let err = Table::from_records(["a", "a"], Vec::<[&str; 2]>::new()).unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(c) if c == "a"));
    }

    #[test]
    fn cell_lookup_and_unique_values() {
        let t = Table::from_records(
            ["name", "category"],
            [["A", "X"], ["B", "Y"], ["C", "X"]],
        )
        .unwrap();
        assert_eq!(t.cell(2, "name"), Some("C"));
        assert_eq!(t.cell(3, "name"), None);
        assert_eq!(t.cell(0, "missing"), None);

        let cats: Vec<&str> = t.unique_values("category").unwrap().into_iter().collect();
        assert_eq!(cats, vec!["X", "Y"]);
        assert!(t.unique_values("missing").is_none());
    }

    #[test]
    fn empty_table_has_no_rows() {
        let t = Table::default();
        assert!(t.is_empty());
        assert_eq!(t.column_count(), 0);
    }
}
