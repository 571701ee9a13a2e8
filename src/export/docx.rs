use std::io::Cursor;

use docx_rs::{
    AlignmentType, BreakType, Docx, Paragraph, Run, Style, StyleType, Table as DocxTable,
    TableCell, TableRow, WidthType,
};

use super::ExportSource;
use crate::error::ExportError;

/// Usable text width of a Letter page with one-inch margins, in twentieths
/// of a point.
const TEXT_WIDTH: usize = 9360;

/// Header cells are bold 12pt, body cells 10pt (sizes in half-points).
const HEADER_SIZE: usize = 24;
const BODY_SIZE: usize = 20;

const TITLE_STYLE: &str = "Heading1";
const GROUP_STYLE: &str = "Heading3";

// ---------------------------------------------------------------------------
// Document building
// ---------------------------------------------------------------------------

fn new_document() -> Docx {
    Docx::new()
        .add_style(
            Style::new(TITLE_STYLE, StyleType::Paragraph)
                .name("Heading 1")
                .bold()
                .size(32)
                .color("365F91"),
        )
        .add_style(
            Style::new(GROUP_STYLE, StyleType::Paragraph)
                .name("Heading 3")
                .bold()
                .size(24)
                .color("4F81BD"),
        )
}

fn heading(text: &str, style: &str, centered: bool) -> Result<Paragraph, ExportError> {
    let run = text_run(text, || "heading".to_string())?;
    let paragraph = Paragraph::new().add_run(run).style(style);
    Ok(if centered {
        paragraph.align(AlignmentType::Center)
    } else {
        paragraph
    })
}

/// A grid table with a bold header row, or `None` when there are no
/// columns to put in it. `first_row` numbers the data rows in error
/// messages.
fn table(
    columns: &[String],
    rows: &[Vec<String>],
    first_row: usize,
) -> Result<Option<DocxTable>, ExportError> {
    if columns.is_empty() {
        return Ok(None);
    }
    let width = TEXT_WIDTH / columns.len();

    let mut table_rows = Vec::with_capacity(rows.len() + 1);
    let header = columns
        .iter()
        .map(|col| {
            let run = text_run(col, || format!("column header '{col}'"))?;
            Ok(cell(width, run.bold().size(HEADER_SIZE)))
        })
        .collect::<Result<Vec<_>, ExportError>>()?;
    table_rows.push(TableRow::new(header));

    for (i, row) in rows.iter().enumerate() {
        let cells = columns
            .iter()
            .zip(row)
            .map(|(col, value)| {
                let run = text_run(value, || format!("column '{col}', row {}", first_row + i))?;
                Ok(cell(width, run.size(BODY_SIZE)))
            })
            .collect::<Result<Vec<_>, ExportError>>()?;
        table_rows.push(TableRow::new(cells));
    }

    Ok(Some(
        DocxTable::new(table_rows).set_grid(vec![width; columns.len()]),
    ))
}

fn cell(width: usize, run: Run) -> TableCell {
    TableCell::new()
        .width(width, WidthType::Dxa)
        .add_paragraph(Paragraph::new().add_run(run))
}

/// One run holding `text`, with line breaks kept as breaks. Fails on
/// characters XML cannot carry.
fn text_run(text: &str, context: impl Fn() -> String) -> Result<Run, ExportError> {
    if let Some(ch) = text.chars().find(|&c| !is_xml_char(c)) {
        return Err(ExportError::InvalidXmlText {
            context: context(),
            ch,
        });
    }

    let mut run = Run::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        if !line.is_empty() {
            run = run.add_text(line);
        }
    }
    Ok(run)
}

/// Characters allowed by the XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Word-processing document (DOCX).
///
/// Layout: the title as a level-1 heading (centered over a flat table), then
/// per partition a level-3 heading with the group's `column = value` pairs
/// and a grid table. Consecutive groups are separated by a blank paragraph.
/// A source without columns produces a document holding only the heading.
///
/// Fails without producing bytes if any text contains characters XML cannot
/// represent (control characters such as NUL).
pub fn encode(source: ExportSource<'_>, title: Option<&str>) -> Result<Vec<u8>, ExportError> {
    let mut doc = new_document();

    match source {
        ExportSource::Flat(table_data) => {
            if let Some(title) = title {
                doc = doc.add_paragraph(heading(title, TITLE_STYLE, true)?);
            }
            if let Some(t) = table(table_data.columns(), table_data.rows(), 1)? {
                doc = doc.add_table(t);
            }
        }
        ExportSource::Grouped(parts) => {
            if let Some(title) = title {
                doc = doc.add_paragraph(heading(title, TITLE_STYLE, false)?);
            }
            let mut first_row = 1;
            for (i, group) in parts.groups.iter().enumerate() {
                if i > 0 {
                    doc = doc.add_paragraph(Paragraph::new());
                }
                if !group.key.is_empty() {
                    doc = doc.add_paragraph(heading(&group.key.to_string(), GROUP_STYLE, false)?);
                }
                if let Some(t) = table(group.table.columns(), group.table.rows(), first_row)? {
                    doc = doc.add_table(t);
                }
                first_row += group.table.len();
            }
        }
    }

    let mut buf = Cursor::new(Vec::new());
    doc.build().pack(&mut buf).map_err(std::io::Error::other)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use quick_xml::events::Event;
    use quick_xml::Reader;

    use super::*;
    use crate::data::group::partition;
    use crate::data::model::Table;

    fn document_xml(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    /// One entry per body paragraph or table: `table(<rows>)`, or
    /// `<style>:<text>` for a paragraph (style empty when unset, breaks as
    /// `\n`).
    fn outline(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut depth = 0usize;
        let mut out = Vec::new();
        let mut style = String::new();
        let mut text = String::new();
        let mut in_text = false;
        let mut in_table = false;
        let mut rows = 0;

        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) => {
                    depth += 1;
                    match (depth, e.name().as_ref()) {
                        (3, b"w:p") => {
                            style.clear();
                            text.clear();
                        }
                        (3, b"w:tbl") => {
                            in_table = true;
                            rows = 0;
                        }
                        (_, b"w:t") => in_text = true,
                        _ => {}
                    }
                }
                Event::Empty(e) => match (depth, e.name().as_ref()) {
                    (2, b"w:p") => out.push(":".to_string()),
                    (_, b"w:pStyle") if !in_table => {
                        let val = e.try_get_attribute("w:val").unwrap().unwrap();
                        style = val.unescape_value().unwrap().into_owned();
                    }
                    (_, b"w:br") if !in_table => text.push('\n'),
                    _ => {}
                },
                Event::Text(t) if in_text && !in_table => {
                    text.push_str(&t.unescape().unwrap());
                }
                Event::End(e) => {
                    match (depth, e.name().as_ref()) {
                        (3, b"w:p") => out.push(format!("{style}:{text}")),
                        (3, b"w:tbl") => {
                            in_table = false;
                            out.push(format!("table({rows})"));
                        }
                        (_, b"w:tr") => rows += 1,
                        (_, b"w:t") => in_text = false,
                        _ => {}
                    }
                    depth -= 1;
                }
                Event::Eof => break,
                _ => {}
            }
        }
        out
    }

    /// Run properties preceding the first text equal to `text`.
    fn run_props<'a>(xml: &'a str, text: &str) -> &'a str {
        let end = xml.find(&format!(">{text}</w:t>")).unwrap();
        let start = xml[..end].rfind("<w:r>").unwrap();
        &xml[start..end]
    }

    fn sample() -> Table {
        Table::from_records(
            ["name", "category"],
            [["A", "X"], ["C", "X"], ["B", "Y"]],
        )
        .unwrap()
    }

    #[test]
    fn package_has_document_and_styles() {
        let bytes = encode(ExportSource::Flat(&sample()), None).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for name in ["[Content_Types].xml", "word/document.xml", "word/styles.xml"] {
            assert!(archive.by_name(name).is_ok(), "missing {name}");
        }
        let mut styles = String::new();
        archive
            .by_name("word/styles.xml")
            .unwrap()
            .read_to_string(&mut styles)
            .unwrap();
        assert!(styles.contains("Heading1"));
        assert!(styles.contains("Heading3"));
    }

    #[test]
    fn flat_table_with_centered_title() {
        let xml = document_xml(&encode(ExportSource::Flat(&sample()), Some("Stock")).unwrap());
        let body = outline(&xml);
        // header + three data rows
        assert_eq!(body, ["Heading1:Stock", "table(4)"]);
        assert!(xml.contains(r#"<w:jc w:val="center""#));
    }

    #[test]
    fn header_cells_are_bold_and_larger() {
        let xml = document_xml(&encode(ExportSource::Flat(&sample()), None).unwrap());
        let header = run_props(&xml, "name");
        assert!(header.contains("<w:b"));
        assert!(header.contains(r#"w:val="24""#));
        let body = run_props(&xml, "A");
        assert!(!body.contains("<w:b"));
        assert!(body.contains(r#"w:val="20""#));
    }

    #[test]
    fn groups_get_subheadings_and_spacers_between() {
        let (parts, _) = partition(&sample(), &vec!["category".to_string()]);
        let xml = document_xml(&encode(ExportSource::Grouped(&parts), Some("Report")).unwrap());
        assert_eq!(
            outline(&xml),
            [
                "Heading1:Report",
                "Heading3:category = X",
                "table(3)",
                ":",
                "Heading3:category = Y",
                "table(2)",
            ]
        );
        assert!(!xml.contains(r#"<w:jc w:val="center""#));
    }

    #[test]
    fn line_breaks_and_markup_characters() {
        let t = Table::from_records(["note"], [["a < b"]]).unwrap();
        let xml = document_xml(&encode(ExportSource::Flat(&t), Some("x\r\ny")).unwrap());
        assert_eq!(outline(&xml)[0], "Heading1:x\ny");
        assert!(xml.contains(">a &lt; b</w:t>"));
    }

    #[test]
    fn control_characters_fail_the_export() {
        let t = Table::from_records(["name", "bad"], [["ok", "ok"], ["ok", "nul\0"]]).unwrap();
        let err = encode(ExportSource::Flat(&t), None).unwrap_err();
        match err {
            ExportError::InvalidXmlText { context, ch } => {
                assert_eq!(ch, '\0');
                assert_eq!(context, "column 'bad', row 2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_table_yields_header_row_only() {
        let t = Table::from_records(["a", "b", "c"], Vec::<[&str; 3]>::new()).unwrap();
        let xml = document_xml(&encode(ExportSource::Flat(&t), Some("Empty")).unwrap());
        assert_eq!(outline(&xml), ["Heading1:Empty", "table(1)"]);
        assert!(xml.contains(">c</w:t>"));
    }

    #[test]
    fn zero_columns_yield_heading_only() {
        let xml = document_xml(&encode(ExportSource::Flat(&Table::default()), Some("Nothing")).unwrap());
        assert_eq!(outline(&xml), ["Heading1:Nothing"]);
    }
}
