//! lib.rs - ledger core of financial-spreadsheet
//! Appends transaction lines to a one-sheet `.xlsx` workbook and saves it.

pub mod config;
pub mod domain;
pub mod error;
mod files_part;
pub mod import;
pub mod style;
pub mod workbook;

use std::path::Path;

use tracing::{debug, info, trace};

pub use config::{ConfigProvider, Properties, TIME_ZONE_KEY};
pub use domain::{Bank, LineRecord, TransactionLine};
pub use error::{ConfigError, LedgerError, Result};
pub use workbook::{Cell, Row, Sheet, Workbook};

/// Name of the only sheet in a ledger.
pub const SHEET_NAME: &str = "Transactions";
/// Header labels, in column order.
pub const HEADERS: [&str; 7] = [
    "Due Date",
    "Bank",
    "Description",
    "Code",
    "Value",
    "Category",
    "Tags",
];
/// Row index of the header. Row 0 is left empty.
pub const HEADER_ROW: u32 = 1;

/// Builds a transactions workbook one line at a time.
///
/// A writer is open from [`TransactionLedgerWriter::new`] until [`TransactionLedgerWriter::save`]
/// runs; after that it is closed and every call returns [`LedgerError::Closed`].
///
/// ```no_run
/// use chrono::NaiveDate;
/// use financial_spreadsheet::{Bank, Properties, TransactionLedgerWriter, TransactionLine};
/// use rust_decimal::Decimal;
///
/// let mut config = Properties::new();
/// config.set("app.time_zone", "America/Sao_Paulo");
///
/// let mut ledger = TransactionLedgerWriter::new(config);
/// ledger.append_line(TransactionLine {
///     due_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
///     bank: Bank::Nubank,
///     description: "Electricity".into(),
///     code: "ENEL-0524".into(),
///     value: Decimal::new(18990, 2),
///     category: Some("Utilities".into()),
///     tags: None,
/// })?;
/// ledger.save("ledger.xlsx")?;
/// # Ok::<(), financial_spreadsheet::LedgerError>(())
/// ```
pub struct TransactionLedgerWriter<C: ConfigProvider> {
    workbook: Option<Workbook>,
    config: C,
}

impl<C: ConfigProvider> TransactionLedgerWriter<C> {
    /// Creates a workbook with the `Transactions` sheet and its header row.
    ///
    /// `config` is consulted for [`TIME_ZONE_KEY`] every time a due date is written.
    pub fn new(config: C) -> Self {
        let mut workbook = Workbook::new();
        let header = Row::with_cells(HEADER_ROW, HEADERS.map(Cell::from));
        workbook.push_sheet(Sheet::new(SHEET_NAME)).insert_row(header);
        debug!("created ledger workbook with sheet '{SHEET_NAME}'");
        Self {
            workbook: Some(workbook),
            config,
        }
    }

    /// Appends `line` right after the current last row.
    ///
    /// Every cell is built before the row is stored, so a failing time-zone lookup leaves the
    /// sheet untouched.
    pub fn append_line(&mut self, line: TransactionLine) -> Result<()> {
        let sheet = self
            .workbook
            .as_mut()
            .and_then(|wb| wb.sheet_mut(SHEET_NAME))
            .ok_or(LedgerError::Closed)?;
        let row_index = sheet.next_row_index()?;
        let row = build_row(row_index, line, &self.config)?;
        trace!("row {row_index}: {} cell(s)", row.len());
        sheet.insert_row(row);
        Ok(())
    }

    /// Checks that every required field of `record` is present, then appends it.
    pub fn append_record(&mut self, record: LineRecord) -> Result<()> {
        if self.is_closed() {
            return Err(LedgerError::Closed);
        }
        self.append_line(TransactionLine::try_from(record)?)
    }

    /// Writes the workbook to `path` and closes the writer.
    ///
    /// An empty path is rejected without closing. Once the destination is opened the writer is
    /// closed no matter how the write ends.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(LedgerError::InvalidArgument("path is required".into()));
        }
        let workbook = self.workbook.take().ok_or(LedgerError::Closed)?;
        workbook.save(path)?;
        info!(
            "saved {} transaction line(s) to {}",
            data_rows(&workbook),
            path.display()
        );
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.workbook.is_none()
    }

    /// The `Transactions` sheet, while the writer is open.
    pub fn sheet(&self) -> Option<&Sheet> {
        self.workbook.as_ref().and_then(|wb| wb.sheet(SHEET_NAME))
    }

    /// Number of lines appended so far.
    pub fn line_count(&self) -> usize {
        self.workbook.as_ref().map(data_rows).unwrap_or(0)
    }
}

fn data_rows(workbook: &Workbook) -> usize {
    workbook
        .sheet(SHEET_NAME)
        .map(|s| s.rows().filter(|r| r.index() > HEADER_ROW).count())
        .unwrap_or(0)
}

/// Due date, bank, description, code, value, then category and tags when present. Each optional
/// value takes the next free column, so tags land in the category column when there is no
/// category.
fn build_row(index: u32, line: TransactionLine, config: &dyn ConfigProvider) -> Result<Row> {
    let TransactionLine {
        due_date,
        bank,
        description,
        code,
        value,
        category,
        tags,
    } = line;

    let tz = config::resolve_time_zone(config)?;
    let due = config::start_of_day(due_date, tz)?;
    // Parsing the decimal text rounds to the nearest double.
    let amount: f64 = value.to_string().parse().map_err(|_| {
        LedgerError::InvalidArgument(format!("value {value} has no floating-point form"))
    })?;

    let mut cells = vec![
        Cell::Date(due),
        Cell::Text(bank.name().to_owned()),
        Cell::Text(description),
        Cell::Text(code),
        Cell::Number(amount),
    ];
    if let Some(category) = category {
        cells.push(Cell::Text(category));
    }
    if let Some(tags) = tags {
        cells.push(Cell::Text(tags.join(", ")));
    }

    let mut row = Row::new(index)?;
    for (col, cell) in (0u16..).zip(cells) {
        row.create_cell(col, cell)?;
    }
    Ok(row)
}
