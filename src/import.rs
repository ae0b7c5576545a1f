//! Reads transaction lines from CSV.
//!
//! Expected header: `due_date,bank,description,code,value,category,tags`. Empty fields count as
//! absent, `due_date` is `YYYY-MM-DD`, `bank` a symbolic bank name and `tags` a `;`-separated list
//! whose items are kept as written, empty ones included.
//! Required fields are not checked here; the ledger writer does that when the record is appended.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{Bank, LineRecord};
use crate::error::{LedgerError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct CsvLine {
    due_date: Option<String>,
    bank: Option<String>,
    description: Option<String>,
    code: Option<String>,
    value: Option<String>,
    category: Option<String>,
    tags: Option<String>,
}

impl CsvLine {
    fn into_record(self, line: u64) -> Result<LineRecord> {
        let invalid = |what: &str, value: &str| {
            LedgerError::InvalidArgument(format!("line {line}: invalid {what} '{value}'"))
        };

        let due_date = self
            .due_date
            .map(|s| {
                NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|_| invalid("due_date", &s))
            })
            .transpose()?;
        let bank = self
            .bank
            .map(|s| Bank::from_str(&s).map_err(|_| invalid("bank", &s)))
            .transpose()?;
        let value = self
            .value
            .map(|s| Decimal::from_str(&s).map_err(|_| invalid("value", &s)))
            .transpose()?;
        let tags = self.tags.map(|s| {
            s.split(';')
                .map(|t| t.trim().to_owned())
                .collect()
        });

        Ok(LineRecord {
            due_date,
            bank,
            description: self.description,
            code: self.code,
            value,
            category: self.category,
            tags,
        })
    }
}

/// Parses every CSV row of `reader` into a [`LineRecord`].
pub fn read_lines<R: Read>(reader: R) -> Result<Vec<LineRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut records = Vec::new();
    for result in rdr.records() {
        let raw = result?;
        let line = raw.position().map_or(0, |p| p.line());
        let csv_line: CsvLine = raw.deserialize(Some(&headers))?;
        records.push(csv_line.into_record(line)?);
    }
    debug!("read {} transaction record(s)", records.len());
    Ok(records)
}

pub fn read_lines_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<LineRecord>> {
    let file = File::open(path.as_ref()).map_err(csv::Error::from)?;
    read_lines(file)
}
