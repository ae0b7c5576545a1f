//! In-memory spreadsheet document: a workbook of named sheets, sheets of sparse rows, rows of
//! typed cells. [`crate::files_part`] turns it into an `.xlsx` package.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::{Datelike, NaiveDateTime};

use crate::error::{LedgerError, Result};

/// Last zero-based row index a worksheet can hold.
pub const MAX_ROW_INDEX: u32 = 1_048_575;
/// Last zero-based column index a worksheet can hold.
pub const MAX_COL_INDEX: u16 = 16_383;

/// Years a date cell can hold in the 1900 date system.
pub const DATE_YEARS: std::ops::RangeInclusive<i32> = 1900..=9999;

const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// A typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    /// Wall-clock date and time, stored as a date-formatted serial number.
    Date(NaiveDateTime),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_owned())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(d: NaiveDateTime) -> Self {
        Cell::Date(d)
    }
}

/// A sparse row; only columns that were set hold a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    index: u32,
    cells: BTreeMap<u16, Cell>,
}

impl Row {
    /// An empty row at zero-based `index`.
    pub fn new(index: u32) -> Result<Self> {
        if index > MAX_ROW_INDEX {
            return Err(LedgerError::Engine(format!(
                "row index {index} exceeds {MAX_ROW_INDEX}"
            )));
        }
        Ok(Self {
            index,
            cells: BTreeMap::new(),
        })
    }

    /// A row holding `cells` from column A onwards. `index` must be within [`MAX_ROW_INDEX`].
    pub(crate) fn with_cells(index: u32, cells: impl IntoIterator<Item = Cell>) -> Self {
        Self {
            index,
            cells: (0u16..).zip(cells).collect(),
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Sets the cell at zero-based column `col`, replacing any previous value.
    ///
    /// Dates outside [`DATE_YEARS`] are rejected.
    pub fn create_cell(&mut self, col: u16, cell: impl Into<Cell>) -> Result<&mut Self> {
        if col > MAX_COL_INDEX {
            return Err(LedgerError::Engine(format!(
                "column index {col} exceeds {MAX_COL_INDEX}"
            )));
        }
        let cell = cell.into();
        if let Cell::Date(d) = &cell {
            if !DATE_YEARS.contains(&d.year()) {
                return Err(LedgerError::Engine(format!(
                    "date {d} is outside the spreadsheet date range"
                )));
            }
        }
        self.cells.insert(col, cell);
        Ok(self)
    }

    pub fn cell(&self, col: u16) -> Option<&Cell> {
        self.cells.get(&col)
    }

    /// Cells in column order.
    pub fn cells(&self) -> impl Iterator<Item = (u16, &Cell)> {
        self.cells.iter().map(|(c, v)| (*c, v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A named grid of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    rows: BTreeMap<u32, Row>,
}

impl Sheet {
    /// A sheet with no rows. Names are only checked by [`Workbook::create_sheet`].
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            rows: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates an empty row at `index`, dropping whatever was there.
    pub fn create_row(&mut self, index: u32) -> Result<&mut Row> {
        let row = Row::new(index)?;
        Ok(match self.rows.entry(index) {
            Entry::Occupied(mut e) => {
                e.insert(row);
                e.into_mut()
            }
            Entry::Vacant(e) => e.insert(row),
        })
    }

    /// Stores a fully built row at its own index.
    pub fn insert_row(&mut self, row: Row) {
        self.rows.insert(row.index, row);
    }

    pub fn row(&self, index: u32) -> Option<&Row> {
        self.rows.get(&index)
    }

    /// Rows in ascending index order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Greatest populated row index, `None` while the sheet is empty.
    pub fn last_row_index(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// Index right after the last row; `0` for an empty sheet.
    pub fn next_row_index(&self) -> Result<u32> {
        match self.last_row_index() {
            None => Ok(0),
            Some(MAX_ROW_INDEX) => Err(LedgerError::Engine(format!(
                "sheet '{}' is full ({} rows)",
                self.name,
                u64::from(MAX_ROW_INDEX) + 1
            ))),
            Some(last) => Ok(last + 1),
        }
    }
}

/// A document holding one or more sheets, in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty sheet called `name`.
    pub fn create_sheet(&mut self, name: &str) -> Result<&mut Sheet> {
        if name.trim().is_empty() {
            return Err(LedgerError::Engine("sheet name is empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(LedgerError::Engine(format!(
                "sheet name '{name}' is longer than {MAX_SHEET_NAME_LEN} characters"
            )));
        }
        if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_CHARS.contains(c)) {
            return Err(LedgerError::Engine(format!(
                "sheet name '{name}' contains '{c}'"
            )));
        }
        if self.sheets.iter().any(|s| s.name.eq_ignore_ascii_case(name)) {
            return Err(LedgerError::Engine(format!("Sheet {name} already exists")));
        }
        Ok(self.push_sheet(Sheet::new(name)))
    }

    pub(crate) fn push_sheet(&mut self, sheet: Sheet) -> &mut Sheet {
        self.sheets.push(sheet);
        let last = self.sheets.len() - 1;
        &mut self.sheets[last]
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }
}
