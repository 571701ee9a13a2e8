use log::debug;

use crate::data::filter::{filter, ColumnProjection, FilterSpec};
use crate::data::group::{partition, GroupSpec};
use crate::data::model::Table;
use crate::data::sort::{sort, SortSpec};
use crate::error::{ConfigWarning, ExportError};
use crate::export::{export, Document, ExportFormat, ExportSource};

// ---------------------------------------------------------------------------
// Pipeline options
// ---------------------------------------------------------------------------

/// Everything that shapes an export, independent of the output format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Per-column accepted values.
    pub filter: FilterSpec,

    /// Column include / exclude list, applied after value filtering.
    pub projection: ColumnProjection,

    /// Row ordering, applied to the filtered table.
    pub sort: SortSpec,

    /// Group columns. Empty means a flat, heading-less export.
    pub group: GroupSpec,
}

/// A finished export plus every configuration warning raised on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub document: Document,
    pub warnings: Vec<ConfigWarning>,
}

/// Filter → sort → (group) → encode.
///
/// Missing columns anywhere in `options` degrade to warnings; only the
/// encoder can fail, and a failure leaves `table` untouched.
pub fn run_pipeline(
    table: &Table,
    options: &PipelineOptions,
    format: ExportFormat,
    title: Option<&str>,
) -> Result<Export, ExportError> {
    let (filtered, mut warnings) = filter(table, &options.filter, &options.projection);
    let (sorted, sort_warnings) = sort(&filtered, &options.sort);
    warnings.extend(sort_warnings);

    let document = if options.group.is_empty() {
        export(ExportSource::Flat(&sorted), format, title)?
    } else {
        let (parts, group_warnings) = partition(&sorted, &options.group);
        warnings.extend(group_warnings);
        export(ExportSource::Grouped(&parts), format, title)?
    };

    debug!(
        "pipeline produced {} ({} bytes, {} warning(s))",
        document.suggested_name,
        document.bytes.len(),
        warnings.len()
    );
    Ok(Export { document, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_table;
    use crate::data::sort::SortOrder;

    fn sample() -> Table {
        Table::from_records(
            ["name", "category"],
            [["A", "X"], ["B", "Y"], ["C", "X"]],
        )
        .unwrap()
    }

    fn accept(column: &str, values: &[&str]) -> FilterSpec {
        let values = values.iter().map(|v| v.to_string()).collect();
        FilterSpec::from([(column.to_string(), values)])
    }

    fn csv_of(export: &Export) -> String {
        String::from_utf8(export.document.bytes.clone()).unwrap()
    }

    #[test]
    fn defaults_pass_the_table_through() {
        let out = run_pipeline(&sample(), &PipelineOptions::default(), ExportFormat::Csv, None)
            .unwrap();
        assert_eq!(csv_of(&out), "name,category\nA,X\nB,Y\nC,X\n");
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn filter_sort_and_project() {
        let options = PipelineOptions {
            filter: accept("category", &["X"]),
            projection: ColumnProjection::Include(["name".to_string()].into()),
            sort: SortSpec::new(["name"], SortOrder::Descending),
            group: GroupSpec::new(),
        };
        let out = run_pipeline(&sample(), &options, ExportFormat::Csv, None).unwrap();
        assert_eq!(csv_of(&out), "name\nC\nA\n");
    }

    #[test]
    fn grouping_switches_to_grouped_output() {
        let options = PipelineOptions {
            sort: SortSpec::new(["category"], SortOrder::Ascending),
            group: vec!["category".to_string()],
            ..Default::default()
        };
        let out = run_pipeline(&sample(), &options, ExportFormat::Html, Some("Items")).unwrap();
        assert_eq!(out.document.suggested_name, "grouped_data.html");
        let html = String::from_utf8(out.document.bytes).unwrap();
        assert_eq!(html.matches("<h2>").count(), 2);
        assert!(html.find("category = X").unwrap() < html.find("category = Y").unwrap());
    }

    #[test]
    fn warnings_accumulate_across_stages() {
        let options = PipelineOptions {
            filter: accept("ghost", &["1"]),
            projection: ColumnProjection::Exclude(["category".to_string()].into()),
            sort: SortSpec::new(["nope"], SortOrder::Ascending),
            group: vec!["category".to_string()],
        };
        let out = run_pipeline(&sample(), &options, ExportFormat::Csv, None).unwrap();
        assert_eq!(
            out.warnings,
            vec![
                ConfigWarning::UnknownFilterColumn("ghost".into()),
                ConfigWarning::UnknownSortColumn("nope".into()),
                ConfigWarning::SortSkipped,
                ConfigWarning::UnknownGroupColumn("category".into()),
            ]
        );
        assert_eq!(csv_of(&out), "name\nA\nB\nC\n");
    }

    #[test]
    fn empty_table_through_every_format() {
        let empty = Table::from_records(["a", "b", "c"], Vec::<[&str; 3]>::new()).unwrap();
        let options = PipelineOptions {
            filter: accept("a", &["x"]),
            sort: SortSpec::new(["b"], SortOrder::Ascending),
            group: vec!["c".to_string()],
            ..Default::default()
        };
        for format in [ExportFormat::Csv, ExportFormat::Html, ExportFormat::Docx] {
            let out = run_pipeline(&empty, &options, format, Some("Empty")).unwrap();
            assert!(out.warnings.is_empty());
            assert!(!out.document.bytes.is_empty());
        }
        let out = run_pipeline(&empty, &options, ExportFormat::Csv, None).unwrap();
        assert_eq!(csv_of(&out), "a,b,c\n");
    }

    #[test]
    fn docx_failure_is_scoped_to_that_export() {
        let table = Table::from_records(["name"], [["bell\u{7}"]]).unwrap();
        let before = table.clone();
        let options = PipelineOptions::default();

        assert!(run_pipeline(&table, &options, ExportFormat::Docx, None).is_err());
        assert_eq!(table, before);
        assert!(run_pipeline(&table, &options, ExportFormat::Csv, None).is_ok());
        assert!(run_pipeline(&table, &options, ExportFormat::Html, None).is_ok());
    }

    #[test]
    fn csv_output_loads_back() {
        let out = run_pipeline(&sample(), &PipelineOptions::default(), ExportFormat::Csv, None)
            .unwrap();
        assert_eq!(load_table(&out.document.bytes).unwrap(), sample());
    }
}
