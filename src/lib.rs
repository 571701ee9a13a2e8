//! Turn CSV tables into documents.
//!
//! A [`Table`] of text cells goes through a fixed pipeline:
//!
//! ```text
//!  raw bytes ─► loader ─► filter ─► sort ─► (group) ─► export ─► Document
//! ```
//!
//! Every stage borrows its input and returns a new value, so a loaded table
//! can be shared (e.g. behind an `Arc`) and re-exported with different
//! options as often as needed.

pub mod cache;
pub mod data;
pub mod error;
pub mod export;
pub mod options;
pub mod pipeline;

pub use data::filter::{ColumnProjection, FilterSpec};
pub use data::group::{GroupKey, GroupSpec, Partition, Partitions};
pub use data::loader::{load_file, load_table};
pub use data::model::Table;
pub use data::sort::{SortOrder, SortSpec};
pub use error::{ConfigWarning, ExportError, TableError};
pub use export::{Document, ExportFormat, ExportSource};
pub use pipeline::{run_pipeline, Export, PipelineOptions};
