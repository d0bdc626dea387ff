//! Payload records exchanged with the remote system
//!
//! Entries are decoded into these explicit records first and then validated
//! into domain types. Anything that fails validation is reported as
//! [`ClientError::Malformed`] instead of leaking partial data into a session.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::history::parse_outcome_date;
use crate::types::{FilterKey, HistoricalOutcome, Participant, ParticipantId};

/// One pool member as sent by the remote system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub selected_flags: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_selected_at: Option<String>,
}

/// One past outcome as sent by the remote system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub name: String,
    /// Calendar day or full timestamp
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub id: String,
    pub filter_key: String,
}

impl CommitRequest {
    pub fn new(id: &ParticipantId, filter: &FilterKey) -> Self {
        Self {
            id: id.to_string(),
            filter_key: filter.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    pub filter_key: String,
}

impl ResetRequest {
    pub fn new(filter: &FilterKey) -> Self {
        Self {
            filter_key: filter.to_string(),
        }
    }
}

fn required(field: &str, value: &str, context: &str) -> Result<String, ClientError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Malformed(format!(
            "{context}: '{field}' is empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn tags(raw: Vec<String>, context: &str) -> Result<Vec<String>, ClientError> {
    raw.iter().map(|tag| required("tags", tag, context)).collect()
}

impl TryFrom<PoolEntry> for Participant {
    type Error = ClientError;

    fn try_from(entry: PoolEntry) -> Result<Self, Self::Error> {
        let id = required("id", &entry.id, "pool entry")?;
        let context = format!("pool entry {id}");
        let name = required("name", &entry.name, &context)?;

        let mut participant = Participant::new(id, name)
            .with_tags(tags(entry.tags, &context)?)
            .with_selected_flags(entry.selected_flags);

        if let Some(raw) = entry.last_selected_at {
            let at = DateTime::parse_from_rfc3339(raw.trim()).map_err(|e| {
                ClientError::Malformed(format!("{context}: invalid lastSelectedAt '{raw}': {e}"))
            })?;
            participant = participant.with_last_selected_at(at.with_timezone(&Utc));
        }

        Ok(participant)
    }
}

impl From<&Participant> for PoolEntry {
    fn from(participant: &Participant) -> Self {
        Self {
            id: participant.id().to_string(),
            name: participant.name().to_string(),
            tags: participant.tags().iter().cloned().collect(),
            selected_flags: participant.selected_flags().clone(),
            last_selected_at: participant.last_selected_at().map(|at| at.to_rfc3339()),
        }
    }
}

impl TryFrom<HistoryEntry> for HistoricalOutcome {
    type Error = ClientError;

    fn try_from(entry: HistoryEntry) -> Result<Self, Self::Error> {
        let name = required("name", &entry.name, "history entry")?;
        let context = format!("history entry for {name}");
        let date = parse_outcome_date(&entry.date).ok_or_else(|| {
            ClientError::Malformed(format!("{context}: invalid date '{}'", entry.date))
        })?;

        let mut outcome = HistoricalOutcome::new(name, date);
        outcome.tags.extend(tags(entry.tags, &context)?);
        Ok(outcome)
    }
}

impl From<&HistoricalOutcome> for HistoryEntry {
    fn from(outcome: &HistoricalOutcome) -> Self {
        Self {
            name: outcome.name.clone(),
            date: outcome.date.format("%Y-%m-%d").to_string(),
            tags: outcome.tags.iter().cloned().collect(),
        }
    }
}

/// Validate a pool payload. Duplicate identities make the whole payload malformed.
pub fn decode_pool(entries: Vec<PoolEntry>) -> Result<Vec<Participant>, ClientError> {
    let mut seen = HashSet::new();
    let mut pool = Vec::with_capacity(entries.len());
    for entry in entries {
        let participant = Participant::try_from(entry)?;
        if !seen.insert(participant.id().clone()) {
            return Err(ClientError::Malformed(format!(
                "duplicate participant id {}",
                participant.id()
            )));
        }
        pool.push(participant);
    }
    Ok(pool)
}

pub fn decode_history(entries: Vec<HistoryEntry>) -> Result<Vec<HistoricalOutcome>, ClientError> {
    entries.into_iter().map(HistoricalOutcome::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str) -> PoolEntry {
        PoolEntry {
            id: id.to_string(),
            name: name.to_string(),
            tags: vec!["web".to_string()],
            selected_flags: BTreeMap::new(),
            last_selected_at: None,
        }
    }

    #[test]
    fn pool_entry_parses_camel_case_payload() {
        let json = r#"{
            "id": "65f0c1",
            "name": "Ana",
            "tags": ["web"],
            "selectedFlags": {"web": true},
            "lastSelectedAt": "2024-03-01T09:15:00Z"
        }"#;
        let entry: PoolEntry = serde_json::from_str(json).unwrap();
        let participant = Participant::try_from(entry).unwrap();

        assert_eq!(participant.id().as_str(), "65f0c1");
        assert!(participant.is_selected_under(&FilterKey::category("web")));
        assert!(participant.last_selected_at().is_some());
    }

    #[test]
    fn missing_optional_fields_default() {
        let entry: PoolEntry = serde_json::from_str(r#"{"id":"1","name":"Leo"}"#).unwrap();
        let participant = Participant::try_from(entry).unwrap();
        assert!(participant.tags().is_empty());
        assert!(participant.selected_flags().is_empty());
    }

    #[test]
    fn blank_identity_is_malformed() {
        let result = Participant::try_from(entry("  ", "Ana"));
        assert!(matches!(result, Err(ClientError::Malformed(msg)) if msg.contains("'id'")));
    }

    #[test]
    fn blank_tag_is_malformed() {
        let mut bad = entry("1", "Ana");
        bad.tags.push(String::new());
        assert!(Participant::try_from(bad).is_err());
    }

    #[test]
    fn bad_timestamp_is_malformed() {
        let mut bad = entry("1", "Ana");
        bad.last_selected_at = Some("last tuesday".to_string());
        assert!(matches!(
            Participant::try_from(bad),
            Err(ClientError::Malformed(_))
        ));
    }

    #[test]
    fn duplicate_ids_reject_the_payload() {
        let result = decode_pool(vec![entry("1", "Ana"), entry("1", "Ana again")]);
        assert!(matches!(result, Err(ClientError::Malformed(msg)) if msg.contains("duplicate")));
    }

    #[test]
    fn history_entry_accepts_timestamps() {
        let entry = HistoryEntry {
            name: "Ana".to_string(),
            date: "2024-03-01T12:00:00Z".to_string(),
            tags: vec!["web".to_string()],
        };
        let outcome = HistoricalOutcome::try_from(entry).unwrap();
        assert_eq!(outcome.date.to_string(), "2024-03-01");
        assert!(outcome.tags.contains("web"));
    }

    #[test]
    fn history_entry_with_bad_date_is_malformed() {
        let entry = HistoryEntry {
            name: "Ana".to_string(),
            date: "soon".to_string(),
            tags: vec![],
        };
        assert!(decode_history(vec![entry]).is_err());
    }

    #[test]
    fn request_bodies_use_camel_case() {
        let body = CommitRequest::new(&"7".into(), &FilterKey::category("web"));
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"id":"7","filterKey":"web"}"#
        );
        let reset = ResetRequest::new(&FilterKey::All);
        assert_eq!(
            serde_json::to_string(&reset).unwrap(),
            r#"{"filterKey":"all"}"#
        );
    }
}
