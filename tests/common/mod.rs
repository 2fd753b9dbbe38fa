#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A worksheet cell for test workbooks.
#[derive(Debug, Clone)]
pub enum V {
    S(&'static str),
    N(f64),
    E,
}

fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn inline_string(cell_ref: &str, s: &str) -> String {
    format!(
        r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
        cell_ref,
        escape(s)
    )
}

fn sheet_xml(headers: &[&str], rows: &[Vec<V>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    xml.push_str(r#"<row r="1">"#);
    for (c, header) in headers.iter().enumerate() {
        xml.push_str(&inline_string(&format!("{}1", column_letter(c)), header));
    }
    xml.push_str("</row>");
    for (r, row) in rows.iter().enumerate() {
        let row_number = r + 2;
        xml.push_str(&format!(r#"<row r="{}">"#, row_number));
        for (c, value) in row.iter().enumerate() {
            let cell_ref = format!("{}{}", column_letter(c), row_number);
            match value {
                V::S(s) => xml.push_str(&inline_string(&cell_ref, s)),
                V::N(n) => xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, cell_ref, n)),
                V::E => {}
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Build a single-sheet .xlsx workbook in memory.
pub fn xlsx_bytes(sheet_name: &str, headers: &[&str], rows: &[Vec<V>]) -> Vec<u8> {
    let files: Vec<(&str, String)> = vec![
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#
                .to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
                .to_string(),
        ),
        (
            "xl/workbook.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
                escape(sheet_name)
            ),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#
                .to_string(),
        ),
        ("xl/worksheets/sheet1.xml", sheet_xml(headers, rows)),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, content) in files {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn write_xlsx(path: &Path, headers: &[&str], rows: &[Vec<V>]) {
    std::fs::write(path, xlsx_bytes("Hoja1", headers, rows)).unwrap();
}

pub const PPR_HEADERS: [&str; 8] = [
    "Orden Presupuestal",
    "Entidad",
    "Tipo de gobierno",
    "PIA",
    "PIM",
    "Avance %",
    "Población",
    "Puntaje Total",
];

/// Four entities shaped like the PPR 0101 report, with execution stored as fractions.
pub fn ppr_rows() -> Vec<Vec<V>> {
    vec![
        vec![
            V::N(2.0),
            V::S("Municipalidad de Lima"),
            V::S("Local"),
            V::N(1000.0),
            V::N(1200.0),
            V::N(0.85),
            V::N(500.0),
            V::N(80.0),
        ],
        vec![
            V::N(1.0),
            V::S("Gobierno Regional Cusco"),
            V::S("Regional"),
            V::N(2000.0),
            V::N(1500.0),
            V::N(0.92),
            V::N(300.0),
            V::N(90.0),
        ],
        vec![
            V::N(3.0),
            V::S("Municipalidad de Piura"),
            V::S("Local"),
            V::N(0.0),
            V::N(400.0),
            V::N(0.5),
            V::N(0.0),
            V::N(60.0),
        ],
        vec![
            V::N(4.0),
            V::S("Municipalidad de Tacna"),
            V::S("Local"),
            V::E,
            V::N(250.0),
            V::S("n/d"),
            V::N(100.0),
            V::E,
        ],
    ]
}

pub fn write_ppr(path: &Path) {
    write_xlsx(path, &PPR_HEADERS, &ppr_rows());
}
