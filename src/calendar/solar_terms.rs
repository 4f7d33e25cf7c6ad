//! Solar-term reference table
//!
//! An immutable, date-ordered table of the 24 yearly solar terms, loaded once
//! at startup either from the built-in data set or from a JSON file.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// Built-in table (KST dates, 2024 through 2026)
const BUILTIN_TABLE: &str = include_str!("../../data/solar_terms.json");

/// Number of solar terms in a yearly cycle
pub const TERMS_PER_YEAR: u8 = 24;

/// A single solar-term boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarTermEntry {
    /// Calendar date the term starts on
    pub date: NaiveDate,

    /// Term name (e.g. 입춘)
    pub term_name: String,

    /// Position in the yearly cycle, 1 (입춘) through 24 (대한)
    pub ordinal: u8,
}

/// Date-ordered solar-term table
#[derive(Debug, Clone)]
pub struct SolarTermTable {
    entries: Vec<SolarTermEntry>,
}

impl SolarTermTable {
    /// Build a table, validating ordinals and date order
    pub fn new(entries: Vec<SolarTermEntry>) -> Result<Self, CalendarError> {
        if entries.is_empty() {
            return Err(CalendarError::EmptyTable);
        }

        for (index, entry) in entries.iter().enumerate() {
            if !(1..=TERMS_PER_YEAR).contains(&entry.ordinal) {
                return Err(CalendarError::InvalidOrdinal {
                    index,
                    ordinal: entry.ordinal,
                });
            }
        }

        if let Some(index) = entries
            .windows(2)
            .position(|pair| pair[1].date < pair[0].date)
        {
            return Err(CalendarError::UnorderedTable {
                index: index + 1,
                date: entries[index + 1].date,
            });
        }

        Ok(Self { entries })
    }

    /// Parse a table from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, CalendarError> {
        let entries: Vec<SolarTermEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// The table shipped with the crate
    pub fn builtin() -> Result<Self, CalendarError> {
        Self::from_json(BUILTIN_TABLE)
    }

    /// Read a table from a JSON file
    pub fn from_path(path: &Path) -> Result<Self, CalendarError> {
        let json = std::fs::read_to_string(path).map_err(|source| CalendarError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// All entries in date order
    pub fn entries(&self) -> &[SolarTermEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First and last boundary dates covered by the table
    pub fn coverage(&self) -> (NaiveDate, NaiveDate) {
        // Non-empty is checked in `new`.
        let first = self.entries[0].date;
        let last = self.entries[self.entries.len() - 1].date;
        (first, last)
    }

    /// Latest entry dated on or before `date`
    pub fn at_or_before(&self, date: NaiveDate) -> Option<&SolarTermEntry> {
        let split = self.split_point(date);
        split.checked_sub(1).map(|i| &self.entries[i])
    }

    /// Earliest entry dated strictly after `date`
    pub fn after(&self, date: NaiveDate) -> Option<&SolarTermEntry> {
        self.entries.get(self.split_point(date))
    }

    /// Index of the first entry dated after `date` (binary search)
    fn split_point(&self, date: NaiveDate) -> usize {
        self.entries.partition_point(|entry| entry.date <= date)
    }
}

/// Load the solar-term table used for the lifetime of the process
pub fn load_terms(path: Option<&Path>) -> Result<SolarTermTable, CalendarError> {
    let table = match path {
        Some(path) => SolarTermTable::from_path(path)?,
        None => SolarTermTable::builtin()?,
    };

    let (first, last) = table.coverage();
    tracing::info!(
        "Loaded {} solar terms covering {} to {}",
        table.len(),
        first,
        last
    );

    Ok(table)
}
