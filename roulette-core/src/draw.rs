//! Uniform random draw over the eligible subset
//!
//! The random source is injected so draws are reproducible under a seed.
//! Every eligible participant has the same chance; history, tags and prior
//! skips carry no weight.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use thiserror::Error;

use crate::types::Participant;

/// Produces draw indices
pub trait RandomSource: Send {
    /// Return an index in `0..upper`. `upper` is never zero.
    fn next_index(&mut self, upper: usize) -> usize;
}

/// `RandomSource` backed by the standard seedable generator
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic source for tests and replays
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for StdRandom {
    fn next_index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no eligible participants to draw from")]
pub struct EmptyPoolError;

/// Outcome of a draw: position in the eligible snapshot and the participant there
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawResult {
    pub index: usize,
    pub participant: Participant,
}

/// Pick one participant uniformly from `eligible`
pub fn draw(
    eligible: &[Participant],
    rng: &mut dyn RandomSource,
) -> Result<DrawResult, EmptyPoolError> {
    if eligible.is_empty() {
        return Err(EmptyPoolError);
    }

    // Sources are expected to stay in range; the modulo keeps a faulty one in bounds.
    let index = rng.next_index(eligible.len()) % eligible.len();
    Ok(DrawResult {
        index,
        participant: eligible[index].clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(usize);

    impl RandomSource for Fixed {
        fn next_index(&mut self, _upper: usize) -> usize {
            self.0
        }
    }

    fn pool(n: usize) -> Vec<Participant> {
        (0..n)
            .map(|i| Participant::new(format!("id-{i}"), format!("P{i}")))
            .collect()
    }

    #[test]
    fn empty_pool_fails() {
        let mut rng = StdRandom::seeded(1);
        assert_eq!(draw(&[], &mut rng), Err(EmptyPoolError));
    }

    #[test]
    fn index_matches_participant_for_many_seeds() {
        for size in 1..8 {
            let eligible = pool(size);
            for seed in 0..50 {
                let mut rng = StdRandom::seeded(seed);
                let result = draw(&eligible, &mut rng).unwrap();
                assert!(result.index < size);
                assert_eq!(result.participant, eligible[result.index]);
            }
        }
    }

    #[test]
    fn same_seed_gives_same_draw() {
        let eligible = pool(10);
        let first = draw(&eligible, &mut StdRandom::seeded(42)).unwrap();
        let second = draw(&eligible, &mut StdRandom::seeded(42)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn injected_source_controls_index() {
        let eligible = pool(3);
        let result = draw(&eligible, &mut Fixed(2)).unwrap();
        assert_eq!(result.index, 2);
        assert_eq!(result.participant.name(), "P2");
    }

    #[test]
    fn out_of_range_source_stays_in_bounds() {
        let eligible = pool(3);
        let result = draw(&eligible, &mut Fixed(7)).unwrap();
        assert_eq!(result.index, 1);
    }

    #[test]
    fn every_position_is_reachable() {
        let eligible = pool(4);
        let mut rng = StdRandom::seeded(7);
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[draw(&eligible, &mut rng).unwrap().index] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }
}
