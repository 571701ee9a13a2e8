//! Document encoders.
//!
//! Each encoder takes an [`ExportSource`], either a flat table or grouped
//! partitions, and returns the rendered bytes. [`export`] wraps the bytes in
//! a [`Document`] with a suggested file name and MIME type.

pub mod delimited;
pub mod docx;
pub mod html;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::group::Partitions;
use crate::data::model::Table;
use crate::error::ExportError;

/// Output formats.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Html,
    Docx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Html => "text/html",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// File name offered for download.
    pub fn suggested_name(self, grouped: bool) -> String {
        match (self, grouped) {
            (ExportFormat::Csv, _) => "data_export.csv".to_string(),
            (fmt, true) => format!("grouped_data.{}", fmt.extension()),
            (fmt, false) => format!("data.{}", fmt.extension()),
        }
    }
}

/// What an encoder renders.
#[derive(Debug, Clone, Copy)]
pub enum ExportSource<'a> {
    Flat(&'a Table),
    Grouped(&'a Partitions),
}

impl<'a> ExportSource<'a> {
    pub fn columns(&self) -> &'a [String] {
        match *self {
            ExportSource::Flat(t) => t.columns(),
            ExportSource::Grouped(p) => &p.columns,
        }
    }

    /// Every data row in output order.
    pub fn rows(&self) -> Box<dyn Iterator<Item = &'a Vec<String>> + 'a> {
        match *self {
            ExportSource::Flat(t) => Box::new(t.rows().iter()),
            ExportSource::Grouped(p) => Box::new(p.rows()),
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, ExportSource::Grouped(_))
    }
}

/// A rendered export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
    pub suggested_name: String,
    pub mime_type: &'static str,
}

/// Render `source` in the requested format.
///
/// An empty title counts as no title. The title is ignored for CSV.
pub fn export(
    source: ExportSource<'_>,
    format: ExportFormat,
    title: Option<&str>,
) -> Result<Document, ExportError> {
    let title = title.filter(|t| !t.is_empty());
    let bytes = match format {
        ExportFormat::Csv => delimited::encode(source)?,
        ExportFormat::Html => html::encode(source, title).into_bytes(),
        ExportFormat::Docx => docx::encode(source, title)?,
    };
    debug!("exported {} bytes as {:?}", bytes.len(), format);
    Ok(Document {
        format,
        bytes,
        suggested_name: format.suggested_name(source.is_grouped()),
        mime_type: format.mime_type(),
    })
}
