//! Office Open XML workbooks
//!
//! Reading goes through calamine. Writing emits a minimal single-sheet
//! SpreadsheetML package with inline strings.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{RowSource, Table, TableError, TableFormat, TableWriter, ensure_parent_dir};

/// Name of the single sheet written
pub const SHEET_NAME: &str = "Sheet1";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        SHEET_NAME
    )
}

/// Open the first worksheet. The first row is the header.
pub fn open(path: &Path) -> Result<RowSource, TableError> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| TableError::read(path, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TableError::read(path, "workbook has no worksheets"))?
        .map_err(|e| TableError::read(path, e))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(cell_text).collect(),
        None => {
            return Err(TableError::MissingHeader {
                path: path.to_path_buf(),
            });
        }
    };

    let data: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    let len = data.len();

    Ok(RowSource::new(
        headers,
        Box::new(data.into_iter().map(Ok)),
        Some(len),
    ))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Column letters for a zero-based index (0 -> A, 26 -> AA)
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Escape text for an XML text node, dropping characters XML 1.0 cannot carry
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}

fn sheet_xml(table: &Table) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    let all_rows = std::iter::once(&table.columns).chain(table.rows.iter());
    for (r, row) in all_rows.enumerate() {
        let row_number = r + 1;
        xml.push_str(&format!(r#"<row r="{}">"#, row_number));
        for (c, value) in row.iter().enumerate() {
            xml.push_str(&format!(
                r#"<c r="{}{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                column_letter(c),
                row_number,
                escape_xml(value)
            ));
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Writes a single-sheet `.xlsx` workbook
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxWriter;

impl TableWriter for XlsxWriter {
    fn format(&self) -> TableFormat {
        TableFormat::Xlsx
    }

    fn write(&self, table: &Table, path: &Path) -> Result<(), TableError> {
        ensure_parent_dir(path)?;

        let file = File::create(path).map_err(|e| TableError::write(path, e))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, String); 5] = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", ROOT_RELS.to_string()),
            ("xl/workbook.xml", workbook_xml()),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
            ("xl/worksheets/sheet1.xml", sheet_xml(table)),
        ];

        for (name, content) in parts {
            zip.start_file(name, options)
                .map_err(|e| TableError::write(path, e))?;
            zip.write_all(content.as_bytes())
                .map_err(|e| TableError::write(path, e))?;
        }

        zip.finish().map_err(|e| TableError::write(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
        assert_eq!(escape_xml("bell\u{7}"), "bell");
        assert_eq!(escape_xml("tab\tok"), "tab\tok");
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");

        let mut table = Table::new(vec!["prompt".to_string(), "Base64_output".to_string()]);
        table
            .push_row(vec!["test".to_string(), "dGVzdA==".to_string()])
            .unwrap();
        table
            .push_row(vec!["<tag> & more".to_string(), "PHRhZz4gJiBtb3Jl".to_string()])
            .unwrap();

        XlsxWriter.write(&table, &path).unwrap();

        let source = open(&path).unwrap();
        assert_eq!(source.headers(), table.columns.as_slice());
        assert_eq!(source.len_hint(), Some(2));
        let rows: Vec<Vec<String>> = source.map(|r| r.unwrap()).collect();
        assert_eq!(rows, table.rows);
    }

    #[test]
    fn test_open_rejects_non_workbook() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fake.xlsx");
        std::fs::write(&path, "prompt\nhello\n").unwrap();
        assert!(open(&path).is_err());
    }
}
