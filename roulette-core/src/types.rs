//! Domain types shared by the engine components

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SelectionError;

/// Wire form of the universal filter.
pub const ALL_FILTER: &str = "all";

/// Opaque, stable participant identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Category selector partitioning the pool
///
/// `All` is compatible with every participant; a `Category` requires the
/// participant to carry that tag. Converting from a string does not check the
/// key against a catalog, use [`FilterCatalog::parse`] for user input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum FilterKey {
    #[default]
    All,
    Category(String),
}

impl FilterKey {
    pub fn category(name: impl Into<String>) -> Self {
        Self::Category(name.into())
    }

    /// Key used in selected-flag maps and on the wire
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_FILTER,
            Self::Category(name) => name,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Whether a tag set is compatible with this filter
    pub fn admits(&self, tags: &BTreeSet<String>) -> bool {
        match self {
            Self::All => true,
            Self::Category(name) => tags.contains(name),
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for FilterKey {
    fn from(raw: String) -> Self {
        if raw.eq_ignore_ascii_case(ALL_FILTER) {
            Self::All
        } else {
            Self::Category(raw)
        }
    }
}

impl From<FilterKey> for String {
    fn from(key: FilterKey) -> Self {
        match key {
            FilterKey::All => ALL_FILTER.to_string(),
            FilterKey::Category(name) => name,
        }
    }
}

/// The finite set of filter keys a session accepts
///
/// Holds the configured categories plus every tag seen in an authoritative
/// pool snapshot. `all` is always valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCatalog {
    categories: BTreeSet<String>,
}

impl FilterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from configured category names. Blank names are ignored.
    pub fn with_categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self::new();
        for category in categories {
            catalog.insert(category.into());
        }
        catalog
    }

    fn insert(&mut self, category: String) -> bool {
        let trimmed = category.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_FILTER) {
            return false;
        }
        self.categories.insert(trimmed.to_string())
    }

    /// Absorb the tags carried by a pool snapshot. Returns how many were new.
    pub fn observe(&mut self, pool: &[Participant]) -> usize {
        let mut added = 0;
        for participant in pool {
            for tag in participant.tags() {
                if self.insert(tag.clone()) {
                    added += 1;
                }
            }
        }
        added
    }

    pub fn contains(&self, key: &FilterKey) -> bool {
        match key {
            FilterKey::All => true,
            FilterKey::Category(name) => self.categories.contains(name),
        }
    }

    /// Parse user input into a known filter key
    pub fn parse(&self, raw: &str) -> Result<FilterKey, SelectionError> {
        let key = FilterKey::from(raw.trim().to_string());
        if self.contains(&key) {
            Ok(key)
        } else {
            Err(SelectionError::InvalidFilter(raw.to_string()))
        }
    }

    /// All valid keys, `all` first
    pub fn keys(&self) -> Vec<FilterKey> {
        std::iter::once(FilterKey::All)
            .chain(self.categories.iter().cloned().map(FilterKey::Category))
            .collect()
    }
}

/// A member of the pool as reported by the remote system of record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    id: ParticipantId,
    name: String,
    tags: BTreeSet<String>,
    selected: BTreeMap<String, bool>,
    last_selected_at: Option<DateTime<Utc>>,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tags: BTreeSet::new(),
            selected: BTreeMap::new(),
            last_selected_at: None,
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Set the selected flag under one filter
    #[must_use]
    pub fn with_selected(mut self, filter: &FilterKey, selected: bool) -> Self {
        self.selected.insert(filter.as_str().to_string(), selected);
        self
    }

    #[must_use]
    pub fn with_selected_flags(mut self, flags: BTreeMap<String, bool>) -> Self {
        self.selected = flags;
        self
    }

    #[must_use]
    pub fn with_last_selected_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_selected_at = Some(at);
        self
    }

    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn selected_flags(&self) -> &BTreeMap<String, bool> {
        &self.selected
    }

    pub fn last_selected_at(&self) -> Option<DateTime<Utc>> {
        self.last_selected_at
    }

    /// Selected under `filter`; a missing entry counts as not selected
    pub fn is_selected_under(&self, filter: &FilterKey) -> bool {
        self.selected
            .get(filter.as_str())
            .copied()
            .unwrap_or(false)
    }

    pub fn matches(&self, filter: &FilterKey) -> bool {
        filter.admits(&self.tags)
    }

    pub(crate) fn mark_selected(&mut self, filter: &FilterKey, at: DateTime<Utc>) {
        self.selected.insert(filter.as_str().to_string(), true);
        self.last_selected_at = Some(at);
    }

    pub(crate) fn clear_selected(&mut self, filter: &FilterKey) {
        self.selected.remove(filter.as_str());
    }
}

/// One past selection, read-only to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalOutcome {
    pub name: String,
    pub date: NaiveDate,
    pub tags: BTreeSet<String>,
}

impl HistoricalOutcome {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
            tags: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn matches(&self, filter: &FilterKey) -> bool {
        filter.admits(&self.tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_key_all_round_trips_through_string() {
        assert_eq!(FilterKey::from("ALL".to_string()), FilterKey::All);
        assert_eq!(String::from(FilterKey::All), "all");
        assert_eq!(
            FilterKey::from("web".to_string()),
            FilterKey::category("web")
        );
    }

    #[test]
    fn filter_key_serializes_as_plain_string() {
        let json = serde_json::to_string(&FilterKey::category("app")).unwrap();
        assert_eq!(json, "\"app\"");
        let parsed: FilterKey = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(parsed, FilterKey::All);
    }

    #[test]
    fn all_admits_untagged_participants() {
        let p = Participant::new("1", "Ana");
        assert!(p.matches(&FilterKey::All));
        assert!(!p.matches(&FilterKey::category("web")));
    }

    #[test]
    fn selected_flags_are_per_filter() {
        let web = FilterKey::category("web");
        let p = Participant::new("1", "Ana")
            .with_tags(["web", "app"])
            .with_selected(&web, true);

        assert!(p.is_selected_under(&web));
        assert!(!p.is_selected_under(&FilterKey::category("app")));
        assert!(!p.is_selected_under(&FilterKey::All));
    }

    #[test]
    fn catalog_accepts_all_and_known_categories() {
        let catalog = FilterCatalog::with_categories(["web", "  ", "app"]);
        assert_eq!(catalog.parse("all").unwrap(), FilterKey::All);
        assert_eq!(catalog.parse(" web ").unwrap(), FilterKey::category("web"));
        assert!(matches!(
            catalog.parse("data"),
            Err(SelectionError::InvalidFilter(key)) if key == "data"
        ));
        assert_eq!(catalog.keys().len(), 3);
    }

    #[test]
    fn catalog_learns_tags_from_pool() {
        let mut catalog = FilterCatalog::new();
        let pool = vec![
            Participant::new("1", "Ana").with_tag("web"),
            Participant::new("2", "Leo").with_tags(["web", "qa"]),
        ];

        assert_eq!(catalog.observe(&pool), 2);
        assert_eq!(catalog.observe(&pool), 0);
        assert!(catalog.contains(&FilterKey::category("qa")));
    }
}
