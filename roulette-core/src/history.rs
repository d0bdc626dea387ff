//! Date-indexed view of past selections

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::types::{FilterKey, HistoricalOutcome};

/// Names selected per calendar day, days ascending, insertion order within a day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DateIndex {
    days: BTreeMap<NaiveDate, Vec<String>>,
}

impl DateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, date: NaiveDate, name: String) {
        self.days.entry(date).or_default().push(name);
    }

    pub fn get(&self, date: NaiveDate) -> Option<&[String]> {
        self.days.get(&date).map(Vec::as_slice)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[String])> {
        self.days.iter().map(|(day, names)| (*day, names.as_slice()))
    }

    /// Most recent day with at least one selection
    pub fn latest(&self) -> Option<(NaiveDate, &[String])> {
        self.days
            .iter()
            .next_back()
            .map(|(day, names)| (*day, names.as_slice()))
    }

    /// Number of distinct days
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn total_selections(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

/// Group the outcomes admitted by `filter` by their recorded day
pub fn aggregate(outcomes: &[HistoricalOutcome], filter: &FilterKey) -> DateIndex {
    let mut index = DateIndex::new();
    for outcome in outcomes.iter().filter(|o| o.matches(filter)) {
        index.push(outcome.date, outcome.name.clone());
    }
    index
}

/// Parse a recorded date into its calendar day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive `YYYY-MM-DDTHH:MM:SS`
/// timestamps. Timestamps keep the day in their own offset, never the
/// caller's local clock.
pub fn parse_outcome_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(day);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.date())
}
