//! Persisted export options.
//!
//! The on-disk layout mirrors what the converter saves next to each cached
//! table, so option files written by earlier versions load unchanged:
//!
//! ```json
//! {
//!   "grouping":  { "enabled": true, "columns": ["category"] },
//!   "sorting":   { "enabled": true, "columns": ["name"], "order": "Descending" },
//!   "filtering": {
//!     "enabled": true,
//!     "filter_columns": ["category"],
//!     "filter_conditions": { "category": ["X"] },
//!     "column_filter_type": "Exclude only",
//!     "include_columns": [],
//!     "exclude_columns": ["internal_id"]
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::filter::{ColumnProjection, FilterSpec};
use crate::data::sort::{SortOrder, SortSpec};
use crate::pipeline::PipelineOptions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedOptions {
    pub grouping: GroupingOptions,
    pub sorting: SortingOptions,
    pub filtering: FilteringOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingOptions {
    pub enabled: bool,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortingOptions {
    pub enabled: bool,
    pub columns: Vec<String>,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilteringOptions {
    pub enabled: bool,
    pub filter_columns: Vec<String>,
    pub filter_conditions: BTreeMap<String, Vec<String>>,
    pub column_filter_type: ColumnFilterType,
    pub include_columns: Vec<String>,
    pub exclude_columns: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnFilterType {
    #[default]
    #[serde(rename = "None")]
    None,
    #[serde(rename = "Include only")]
    Include,
    #[serde(rename = "Exclude only")]
    Exclude,
}

impl SavedOptions {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading options file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing options file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("serializing options")?;
        std::fs::write(path, text)
            .with_context(|| format!("writing options file {}", path.display()))
    }

    /// Disabled sections become identity stages. A filter column with no
    /// selected values imposes nothing, and a non-empty include list wins
    /// over the exclude list.
    pub fn to_pipeline_options(&self) -> PipelineOptions {
        let mut options = PipelineOptions::default();

        if self.grouping.enabled {
            options.group = self.grouping.columns.clone();
        }
        if self.sorting.enabled {
            options.sort = SortSpec {
                columns: self.sorting.columns.clone(),
                order: self.sorting.order,
            };
        }
        if self.filtering.enabled {
            let f = &self.filtering;
            options.filter = f
                .filter_conditions
                .iter()
                .filter(|(_, values)| !values.is_empty())
                .map(|(col, values)| (col.clone(), values.iter().cloned().collect()))
                .collect::<FilterSpec>();
            options.projection = match f.column_filter_type {
                ColumnFilterType::None => ColumnProjection::None,
                ColumnFilterType::Include | ColumnFilterType::Exclude => {
                    projection_from_lists(&f.include_columns, &f.exclude_columns)
                }
            };
        }
        options
    }

    /// Inverse of [`SavedOptions::to_pipeline_options`]: a section is
    /// enabled when it has anything in it.
    pub fn from_pipeline_options(options: &PipelineOptions) -> Self {
        let (column_filter_type, include_columns, exclude_columns) = match &options.projection {
            ColumnProjection::None => (ColumnFilterType::None, Vec::new(), Vec::new()),
            ColumnProjection::Include(cols) => (
                ColumnFilterType::Include,
                cols.iter().cloned().collect(),
                Vec::new(),
            ),
            ColumnProjection::Exclude(cols) => (
                ColumnFilterType::Exclude,
                Vec::new(),
                cols.iter().cloned().collect(),
            ),
        };
        let filter_conditions: BTreeMap<String, Vec<String>> = options
            .filter
            .iter()
            .map(|(col, values)| (col.clone(), values.iter().cloned().collect()))
            .collect();

        Self {
            grouping: GroupingOptions {
                enabled: !options.group.is_empty(),
                columns: options.group.clone(),
            },
            sorting: SortingOptions {
                enabled: !options.sort.is_empty(),
                columns: options.sort.columns.clone(),
                order: options.sort.order,
            },
            filtering: FilteringOptions {
                enabled: !filter_conditions.is_empty()
                    || column_filter_type != ColumnFilterType::None,
                filter_columns: filter_conditions.keys().cloned().collect(),
                filter_conditions,
                column_filter_type,
                include_columns,
                exclude_columns,
            },
        }
    }
}

/// Include wins when both lists are given; empty lists mean no projection.
pub fn projection_from_lists(include: &[String], exclude: &[String]) -> ColumnProjection {
    if !include.is_empty() {
        ColumnProjection::Include(include.iter().cloned().collect())
    } else if !exclude.is_empty() {
        ColumnProjection::Exclude(exclude.iter().cloned().collect())
    } else {
        ColumnProjection::None
    }
}
