use crate::error::{LedgerError, Result};
use crate::style::{DATE_STYLE_ID, STYLES_XML, cell_ref, excel_serial};
use crate::workbook::{Cell, Row, Sheet, Workbook};
use ::zip as zip_crate;
use quick_xml::{Writer, escape::escape, events::BytesText};
use std::{
    fs::File,
    io::{self, BufWriter, Seek, Write},
    path::Path,
};
use tracing::{debug, trace};
use zip_crate::result::{ZipError, ZipResult};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const ROOT_RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#,
);

/// Work with files
impl Workbook {
    /// Serializes the workbook as an `.xlsx` package into `out` and hands `out` back.
    pub fn write_to<W: Write + Seek>(&self, out: W) -> Result<W> {
        Ok(self.write_package(out)?)
    }

    /// Writes the workbook to `dst`, creating the file or truncating an existing one.
    ///
    /// The file handle is closed before this returns, whether or not writing succeeded.
    pub fn save<P: AsRef<Path>>(&self, dst: P) -> Result<()> {
        let path = dst.as_ref();
        let io_failure = |source: io::Error| LedgerError::IoFailure {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_failure)?;
        let mut out = match self.write_package(BufWriter::new(file)) {
            Ok(out) => out,
            Err(ZipError::Io(e)) => return Err(io_failure(e)),
            Err(e) => return Err(e.into()),
        };
        out.flush().map_err(io_failure)?;
        debug!(
            "wrote {} sheet(s) to {}",
            self.sheets().len(),
            path.display()
        );
        Ok(())
    }

    fn write_package<W: Write + Seek>(&self, out: W) -> ZipResult<W> {
        let mut zout = zip_crate::ZipWriter::new(out);
        let opt: zip_crate::write::FileOptions<'_, ()> = zip_crate::write::FileOptions::default()
            .compression_method(zip_crate::CompressionMethod::Deflated);

        zout.start_file("[Content_Types].xml", opt)?;
        zout.write_all(self.content_types_xml().as_bytes())?;
        zout.start_file("_rels/.rels", opt)?;
        zout.write_all(ROOT_RELS.as_bytes())?;
        zout.start_file("xl/workbook.xml", opt)?;
        zout.write_all(self.workbook_xml().as_bytes())?;
        zout.start_file("xl/_rels/workbook.xml.rels", opt)?;
        zout.write_all(self.workbook_rels_xml().as_bytes())?;
        zout.start_file("xl/styles.xml", opt)?;
        zout.write_all(STYLES_XML.as_bytes())?;

        for (i, sheet) in self.sheets().iter().enumerate() {
            let sheet_path = format!("xl/worksheets/sheet{}.xml", i + 1);
            trace!("serializing '{}' as {sheet_path}", sheet.name());
            zout.start_file(sheet_path, opt)?;
            zout.write_all(&sheet_xml(sheet)?)?;
        }

        zout.finish()
    }

    fn content_types_xml(&self) -> String {
        let mut s = String::from(XML_DECL);
        s.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        s.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
        s.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        s.push_str(r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
        s.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
        for i in 1..=self.sheets().len() {
            s.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
            ));
        }
        s.push_str("</Types>");
        s
    }

    fn workbook_xml(&self) -> String {
        let mut s = format!(r#"{XML_DECL}<workbook xmlns="{NS_MAIN}" xmlns:r="{NS_REL}"><sheets>"#);
        for (i, sheet) in self.sheets().iter().enumerate() {
            s.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(sheet.name()),
                i + 1,
                i + 1
            ));
        }
        s.push_str("</sheets></workbook>");
        s
    }

    /// Sheets take rId1..rIdN, styles the one after.
    fn workbook_rels_xml(&self) -> String {
        let mut s = format!(r#"{XML_DECL}<Relationships xmlns="{NS_PKG_REL}">"#);
        let n = self.sheets().len();
        for i in 1..=n {
            s.push_str(&format!(
                r#"<Relationship Id="rId{i}" Type="{NS_REL}/worksheet" Target="worksheets/sheet{i}.xml"/>"#
            ));
        }
        s.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="{NS_REL}/styles" Target="styles.xml"/>"#,
            n + 1
        ));
        s.push_str("</Relationships>");
        s
    }
}

fn sheet_xml(sheet: &Sheet) -> io::Result<Vec<u8>> {
    let mut xml = format!(r#"{XML_DECL}<worksheet xmlns="{NS_MAIN}" xmlns:r="{NS_REL}">"#)
        .into_bytes();
    if sheet.row_count() == 0 {
        xml.extend_from_slice(b"<sheetData/>");
    } else {
        xml.extend_from_slice(b"<sheetData>");
        for row in sheet.rows() {
            xml.extend_from_slice(&row_xml(row)?);
        }
        xml.extend_from_slice(b"</sheetData>");
    }
    xml.extend_from_slice(b"</worksheet>");
    Ok(xml)
}

fn row_xml(row: &Row) -> io::Result<Vec<u8>> {
    let row_num = row.index() + 1;
    let mut writer = Writer::new(Vec::new());

    writer
        .create_element("row")
        .with_attribute(("r", row_num.to_string().as_str()))
        .write_inner_content(|w| {
            for (col, cell) in row.cells() {
                let coord = cell_ref(row.index(), u32::from(col));
                let c_elem = w.create_element("c").with_attribute(("r", coord.as_str()));
                match cell {
                    Cell::Text(text) => {
                        c_elem
                            .with_attribute(("t", "inlineStr"))
                            .write_inner_content(|w2| {
                                w2.create_element("is").write_inner_content(|w3| {
                                    let mut t_elem = w3.create_element("t");
                                    if text.trim().len() != text.len() {
                                        t_elem = t_elem.with_attribute(("xml:space", "preserve"));
                                    }
                                    t_elem.write_text_content(BytesText::new(text))?;
                                    Ok(())
                                })?;
                                Ok(())
                            })?;
                    }
                    Cell::Number(n) => {
                        let val = n.to_string();
                        c_elem.write_inner_content(|w2| {
                            w2.create_element("v")
                                .write_text_content(BytesText::new(&val))?;
                            Ok(())
                        })?;
                    }
                    Cell::Date(dt) => {
                        let val = excel_serial(*dt).to_string();
                        c_elem
                            .with_attribute(("s", DATE_STYLE_ID.to_string().as_str()))
                            .write_inner_content(|w2| {
                                w2.create_element("v")
                                    .write_text_content(BytesText::new(&val))?;
                                Ok(())
                            })?;
                    }
                }
            }
            Ok(())
        })?;

    Ok(writer.into_inner())
}
