//! Session-local provisional exclusions
//!
//! A skipped participant stays out of the draw until reinstated or until the
//! session is reset. Nothing here is sent to the remote system.

use std::collections::HashMap;

use crate::filter::Excludes;
use crate::types::ParticipantId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// The user rejected a drawn outcome
    ProvisionalSkip,
}

#[derive(Debug, Clone, Default)]
pub struct ExclusionLedger {
    entries: HashMap<ParticipantId, ExclusionReason>,
}

impl ExclusionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude `id`. Returns false if it was already excluded.
    pub fn exclude(&mut self, id: ParticipantId) -> bool {
        self.entries
            .insert(id, ExclusionReason::ProvisionalSkip)
            .is_none()
    }

    /// Reinstate `id`. Returns false if it was not excluded.
    pub fn reinstate(&mut self, id: &ParticipantId) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn is_excluded(&self, id: &ParticipantId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn reason(&self, id: &ParticipantId) -> Option<ExclusionReason> {
        self.entries.get(id).copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Excluded identities, in no particular order
    pub fn ids(&self) -> impl Iterator<Item = &ParticipantId> {
        self.entries.keys()
    }
}

impl Excludes for ExclusionLedger {
    fn excludes(&self, id: &ParticipantId) -> bool {
        self.is_excluded(id)
    }
}
