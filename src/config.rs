//! Key-value configuration consumed by the ledger writer.
//!
//! Settings come from a `.properties` style file (`key=value` per line). The writer only needs
//! one of them, [`TIME_ZONE_KEY`], which names the IANA zone used to turn due dates into
//! points in time.

use std::collections::HashMap;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone};
use chrono_tz::Tz;
use tracing::trace;

use crate::error::{ConfigError, LedgerError, Result};

/// Key holding the time zone in which due dates start.
pub const TIME_ZONE_KEY: &str = "app.time_zone";

/// Source of configuration values, looked up by key.
pub trait ConfigProvider {
    fn property(&self, key: &str) -> Option<String>;
}

impl<T: ConfigProvider + ?Sized> ConfigProvider for &T {
    fn property(&self, key: &str) -> Option<String> {
        (**self).property(key)
    }
}

impl ConfigProvider for HashMap<String, String> {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// An in-memory set of properties, usually read from an `app.properties` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: HashMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `.properties` text.
    ///
    /// Blank lines and lines starting with `#` or `!` are skipped. Each remaining line is split at
    /// the first `=` or `:`; both halves are trimmed. A line without a separator becomes a key
    /// with an empty value. When a key repeats, the last occurrence wins.
    pub fn parse(text: &str) -> Self {
        let mut values = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let (key, value) = match line.find(['=', ':']) {
                Some(pos) => (&line[..pos], &line[pos + 1..]),
                None => (line, ""),
            };
            values.insert(key.trim().to_owned(), value.trim().to_owned());
        }
        Self { values }
    }

    /// Reads and parses a properties file.
    pub fn load<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigProvider for Properties {
    fn property(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_owned)
    }
}

/// Looks up [`TIME_ZONE_KEY`] and parses it as an IANA zone name.
pub fn resolve_time_zone(config: &dyn ConfigProvider) -> std::result::Result<Tz, ConfigError> {
    let value = config
        .property(TIME_ZONE_KEY)
        .ok_or_else(|| ConfigError::MissingKey(TIME_ZONE_KEY.to_owned()))?;
    let tz = value
        .trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::InvalidTimeZone {
            key: TIME_ZONE_KEY.to_owned(),
            value: value.clone(),
        })?;
    trace!("resolved {TIME_ZONE_KEY} to {tz}");
    Ok(tz)
}

/// Wall-clock time at which `date` starts in `tz`.
///
/// Usually midnight. If midnight falls into a DST gap the day starts at the first instant after
/// the gap; if midnight happens twice the earlier one is taken.
pub fn start_of_day(date: NaiveDate, tz: Tz) -> Result<NaiveDateTime> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    if let Some(dt) = tz.from_local_datetime(&midnight).earliest() {
        return Ok(dt.naive_local());
    }

    // Gap: shift by the offset in force before the transition, then read the clock back.
    let before = midnight - TimeDelta::days(1);
    let offset = tz
        .offset_from_local_datetime(&before)
        .earliest()
        .ok_or_else(|| LedgerError::Engine(format!("no start of day for {date} in {tz}")))?;
    let utc = midnight - TimeDelta::seconds(i64::from(offset.fix().local_minus_utc()));
    Ok(tz.from_utc_datetime(&utc).naive_local())
}
