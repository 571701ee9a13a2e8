use quick_xml::escape::escape;

use super::ExportSource;
use crate::data::model::Table;

const STYLE: &str = "<style>
  table, th, td {
    border: 1px solid black;
    border-collapse: collapse;
    padding: 5px 10px;
    margin: 5px;
    font-size: 12px;
    font-family: Arial, sans-serif;
  }
</style>
";

/// Self-contained HTML: a style block, an optional `<h1>` title, then one
/// table per partition. Grouped tables are each preceded by an `<h2>` naming
/// the group's `column = value` pairs; a flat table gets no heading.
pub fn encode(source: ExportSource<'_>, title: Option<&str>) -> String {
    let mut out = String::from(STYLE);
    if let Some(title) = title {
        out.push_str(&format!("<h1>{}</h1>\n", escape(title)));
    }

    match source {
        ExportSource::Flat(table) => push_table(&mut out, table),
        ExportSource::Grouped(parts) => {
            for group in &parts.groups {
                if !group.key.is_empty() {
                    out.push_str(&format!("<h2>{}</h2>\n", escape(&group.key.to_string())));
                }
                push_table(&mut out, &group.table);
            }
        }
    }
    out
}

fn push_table(out: &mut String, table: &Table) {
    out.push_str("<table class=\"dataframe\">\n  <thead>\n    <tr>\n");
    for col in table.columns() {
        out.push_str(&format!("      <th>{}</th>\n", escape(col)));
    }
    out.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for row in table.rows() {
        out.push_str("    <tr>\n");
        for cell in row {
            out.push_str(&format!("      <td>{}</td>\n", escape(cell)));
        }
        out.push_str("    </tr>\n");
    }
    out.push_str("  </tbody>\n</table>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::group::partition;

    fn sample() -> Table {
        Table::from_records(
            ["name", "category"],
            [["A", "X"], ["C", "X"], ["B", "Y"]],
        )
        .unwrap()
    }

    #[test]
    fn flat_table_has_no_headings() {
        let html = encode(ExportSource::Flat(&sample()), None);
        assert!(html.starts_with("<style>"));
        assert!(!html.contains("<h1>"));
        assert!(!html.contains("<h2>"));
        assert_eq!(html.matches("<table").count(), 1);
        assert!(html.contains("<th>category</th>"));
        assert_eq!(html.matches("<td>").count(), 6);
    }

    #[test]
    fn title_precedes_first_table() {
        let html = encode(ExportSource::Flat(&sample()), Some("Inventory"));
        let h1 = html.find("<h1>Inventory</h1>").unwrap();
        assert!(h1 < html.find("<table").unwrap());
    }

    #[test]
    fn one_table_per_group_with_label() {
        let (parts, _) = partition(&sample(), &vec!["category".to_string()]);
        let html = encode(ExportSource::Grouped(&parts), Some("Report"));

        assert_eq!(html.matches("<table").count(), 2);
        let x = html.find("<h2>category = X</h2>").unwrap();
        let y = html.find("<h2>category = Y</h2>").unwrap();
        assert!(html.find("<h1>Report</h1>").unwrap() < x);
        assert!(x < y);
        // group X's table sits between its heading and the next one
        let a = html.find("<td>A</td>").unwrap();
        assert!(x < a && a < y);
    }

    #[test]
    fn text_is_escaped() {
        let t = Table::from_records(["<b>"], [["a & b"]]).unwrap();
        let html = encode(ExportSource::Flat(&t), Some("<script>"));
        assert!(html.contains("<h1>&lt;script&gt;</h1>"));
        assert!(html.contains("<th>&lt;b&gt;</th>"));
        assert!(html.contains("<td>a &amp; b</td>"));
    }

    #[test]
    fn empty_table_renders_header_only() {
        let t = Table::from_records(["a", "b", "c"], Vec::<[&str; 3]>::new()).unwrap();
        let html = encode(ExportSource::Flat(&t), None);
        assert!(html.contains("<th>c</th>"));
        assert!(!html.contains("<td>"));

        let (parts, _) = partition(&t, &vec!["a".to_string()]);
        let html = encode(ExportSource::Grouped(&parts), Some("T"));
        assert!(html.contains("<h1>T</h1>"));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn zero_columns_still_well_formed() {
        let html = encode(ExportSource::Flat(&Table::default()), None);
        assert!(html.contains("<thead>\n    <tr>\n    </tr>"));
        assert!(html.ends_with("</table>\n"));
    }
}
