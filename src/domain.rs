//! Transaction values accepted by the ledger writer.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::LedgerError;

/// Banks a transaction can belong to. Written to the sheet by symbolic name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bank {
    BancoDoBrasil,
    Bradesco,
    Caixa,
    Inter,
    Itau,
    Nubank,
    Santander,
}

impl Bank {
    pub const ALL: [Bank; 7] = [
        Bank::BancoDoBrasil,
        Bank::Bradesco,
        Bank::Caixa,
        Bank::Inter,
        Bank::Itau,
        Bank::Nubank,
        Bank::Santander,
    ];

    /// Stable symbolic name, e.g. `BANCO_DO_BRASIL`.
    pub const fn name(self) -> &'static str {
        match self {
            Bank::BancoDoBrasil => "BANCO_DO_BRASIL",
            Bank::Bradesco => "BRADESCO",
            Bank::Caixa => "CAIXA",
            Bank::Inter => "INTER",
            Bank::Itau => "ITAU",
            Bank::Nubank => "NUBANK",
            Bank::Santander => "SANTANDER",
        }
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Bank {
    type Err = LedgerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Bank::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| LedgerError::InvalidArgument(format!("unknown bank: {s}")))
    }
}

/// One row of the ledger.
///
/// The five leading fields are required. `category` and `tags` are written only when present,
/// each taking the next free column.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionLine {
    pub due_date: NaiveDate,
    pub bank: Bank,
    pub description: String,
    pub code: String,
    pub value: Decimal,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// A transaction whose fields may be missing, e.g. as read from a CSV file.
///
/// Converting it into a [`TransactionLine`] checks that every required field is present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineRecord {
    pub due_date: Option<NaiveDate>,
    pub bank: Option<Bank>,
    pub description: Option<String>,
    pub code: Option<String>,
    pub value: Option<Decimal>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn required<T>(field: Option<T>, name: &str) -> Result<T, LedgerError> {
    field.ok_or_else(|| LedgerError::InvalidArgument(format!("{name} is required")))
}

impl TryFrom<LineRecord> for TransactionLine {
    type Error = LedgerError;

    fn try_from(record: LineRecord) -> Result<Self, Self::Error> {
        Ok(TransactionLine {
            due_date: required(record.due_date, "dueDate")?,
            bank: required(record.bank, "bank")?,
            description: required(record.description, "description")?,
            code: required(record.code, "code")?,
            value: required(record.value, "value")?,
            category: record.category,
            tags: record.tags,
        })
    }
}

impl From<TransactionLine> for LineRecord {
    fn from(line: TransactionLine) -> Self {
        LineRecord {
            due_date: Some(line.due_date),
            bank: Some(line.bank),
            description: Some(line.description),
            code: Some(line.code),
            value: Some(line.value),
            category: line.category,
            tags: line.tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> LineRecord {
        LineRecord {
            due_date: NaiveDate::from_ymd_opt(2024, 1, 10),
            bank: Some(Bank::Nubank),
            description: Some("Groceries".into()),
            code: Some("0001".into()),
            value: Some(Decimal::new(-4250, 2)),
            category: None,
            tags: None,
        }
    }

    #[test]
    fn test_bank_names_round_trip() {
        for bank in Bank::ALL {
            assert_eq!(bank.name().parse::<Bank>().unwrap(), bank);
        }
        assert_eq!("banco_do_brasil".parse::<Bank>().unwrap(), Bank::BancoDoBrasil);
        assert!("ACME".parse::<Bank>().is_err());
    }

    #[test]
    fn test_record_with_all_required_fields() {
        let line = TransactionLine::try_from(full_record()).unwrap();
        assert_eq!(line.bank, Bank::Nubank);
        assert_eq!(line.value, Decimal::new(-4250, 2));
    }

    #[test]
    fn test_record_missing_field_names_it() {
        let record = LineRecord {
            code: None,
            ..full_record()
        };
        let err = TransactionLine::try_from(record).unwrap_err();
        assert!(matches!(&err, LedgerError::InvalidArgument(msg) if msg.contains("code")));
    }

    #[test]
    fn test_first_missing_field_is_reported() {
        let err = TransactionLine::try_from(LineRecord::default()).unwrap_err();
        assert!(matches!(&err, LedgerError::InvalidArgument(msg) if msg.contains("dueDate")));
    }
}
