//! Pool filtering
//!
//! Derives the eligible subset of a pool snapshot. Ordering is stable so a
//! draw index always refers to the same participant for a given snapshot.

use std::collections::{BTreeSet, HashSet};

use crate::types::{FilterKey, Participant, ParticipantId};

/// Membership test for identities kept out of the draw
pub trait Excludes {
    fn excludes(&self, id: &ParticipantId) -> bool;
}

impl Excludes for HashSet<ParticipantId> {
    fn excludes(&self, id: &ParticipantId) -> bool {
        self.contains(id)
    }
}

impl Excludes for BTreeSet<ParticipantId> {
    fn excludes(&self, id: &ParticipantId) -> bool {
        self.contains(id)
    }
}

/// Why a participant is or is not a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    /// Does not carry the filter's tag
    OutsideFilter,
    /// Already selected under the filter in the remote system
    AlreadySelected,
    /// Provisionally skipped in this session
    Excluded,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Classify one participant against a filter and exclusion set
pub fn classify<E: Excludes + ?Sized>(
    participant: &Participant,
    filter: &FilterKey,
    excluded: &E,
) -> Eligibility {
    if !participant.matches(filter) {
        Eligibility::OutsideFilter
    } else if participant.is_selected_under(filter) {
        Eligibility::AlreadySelected
    } else if excluded.excludes(participant.id()) {
        Eligibility::Excluded
    } else {
        Eligibility::Eligible
    }
}

/// Participants that may be drawn, in pool order
///
/// An empty result means the pool is exhausted under `filter`; it is not an
/// error here.
pub fn eligible<E: Excludes + ?Sized>(
    pool: &[Participant],
    filter: &FilterKey,
    excluded: &E,
) -> Vec<Participant> {
    pool.iter()
        .filter(|p| classify(p, filter, excluded).is_eligible())
        .cloned()
        .collect()
}

/// True when no participant in `pool` can be drawn under `filter`
pub fn is_exhausted<E: Excludes + ?Sized>(
    pool: &[Participant],
    filter: &FilterKey,
    excluded: &E,
) -> bool {
    !pool
        .iter()
        .any(|p| classify(p, filter, excluded).is_eligible())
}
