//! style.rs - the fixed styles part plus coordinate / serial-number helpers

use chrono::{NaiveDate, NaiveDateTime, Timelike};

/// `cellXfs` index of the date style (built-in number format 14).
pub const DATE_STYLE_ID: u32 = 1;

/// Minimal `xl/styles.xml`: one font, the two mandatory fills, one border, and two cell formats:
/// general and date.
pub const STYLES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill>"#,
    r#"<fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="2">"#,
    r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
    r#"<xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>"#,
    r#"</cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    r#"</styleSheet>"#,
);

/* ========================== BYTE/STRING HELPERS =========================== */

/// 0 -> "A", 25 -> "Z", 26 -> "AA".
pub fn col_letter(mut n: u32) -> String {
    let mut s = String::new();
    loop {
        s.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    s
}

/// "A2"-style reference for zero-based row/column indices.
pub fn cell_ref(row: u32, col: u32) -> String {
    format!("{}{}", col_letter(col), row + 1)
}

/// Excel 1900-system serial: whole days with the time of day as the fraction, 1900-01-01 = 1.
///
/// Excel counts a 1900-02-29 that never existed, so from 1900-03-01 on the count starts one day
/// earlier. Dates before 1900 have no serial; [`crate::workbook::Row::create_cell`] rejects them.
pub fn excel_serial(dt: NaiveDateTime) -> f64 {
    let leap_bug = NaiveDate::from_ymd_opt(1900, 3, 1).unwrap_or_default();
    let epoch = if dt.date() < leap_bug {
        NaiveDate::from_ymd_opt(1899, 12, 31)
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)
    }
    .unwrap_or_default();
    let days = (dt.date() - epoch).num_days() as f64;
    let secs = f64::from(dt.time().num_seconds_from_midnight())
        + f64::from(dt.time().nanosecond()) / 1e9;
    days + secs / 86_400.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_letter() {
        assert_eq!(col_letter(0), "A");
        assert_eq!(col_letter(6), "G");
        assert_eq!(col_letter(25), "Z");
        assert_eq!(col_letter(26), "AA");
        assert_eq!(col_letter(16_383), "XFD");
        assert_eq!(cell_ref(1, 0), "A2");
    }

    #[test]
    fn test_excel_serial() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(excel_serial(d.and_hms_opt(0, 0, 0).unwrap()), 45292.0);
        assert_eq!(excel_serial(d.and_hms_opt(12, 0, 0).unwrap()), 45292.5);
    }

    #[test]
    fn test_excel_serial_around_1900_leap_day() {
        let serial = |y, m, d| {
            excel_serial(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
        };
        assert_eq!(serial(1900, 1, 1), 1.0);
        assert_eq!(serial(1900, 2, 28), 59.0);
        // 60 is Excel's phantom 1900-02-29.
        assert_eq!(serial(1900, 3, 1), 61.0);
        assert_eq!(serial(1900, 3, 2), 62.0);
    }
}
