//! Roll-request collaborator
//!
//! Every random number the rules need goes through a `DiceProvider`.
//! AI-controlled actors roll locally; player-controlled actors are prompted
//! by the hosting application, which may decline a request. A declined roll
//! must resolve to a well-defined "action not taken" outcome upstream.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Reply to a roll request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollReply {
    /// A value in `1..=sides`
    Rolled(u32),
    /// The operator declined the prompt
    Declined,
}

impl RollReply {
    /// Value if rolled, `None` if declined
    pub fn value(&self) -> Option<u32> {
        match self {
            RollReply::Rolled(v) => Some(*v),
            RollReply::Declined => None,
        }
    }
}

/// Source of die rolls for the combat core
pub trait DiceProvider {
    /// Request a roll of a die with the given number of sides
    fn roll(&mut self, sides: u32) -> RollReply;

    fn d100(&mut self) -> RollReply {
        self.roll(100)
    }

    fn d6(&mut self) -> RollReply {
        self.roll(6)
    }

    fn d10(&mut self) -> RollReply {
        self.roll(10)
    }
}

/// Deterministic seeded dice - never declines
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DiceProvider for SeededDice {
    fn roll(&mut self, sides: u32) -> RollReply {
        RollReply::Rolled(self.rng.gen_range(1..=sides.max(1)))
    }
}

/// Scripted dice for tests: replays queued replies, then declines
#[derive(Default)]
pub struct ScriptedDice {
    queue: VecDeque<RollReply>,
}

impl ScriptedDice {
    pub fn new(values: &[u32]) -> Self {
        Self {
            queue: values.iter().map(|v| RollReply::Rolled(*v)).collect(),
        }
    }

    pub fn push(&mut self, reply: RollReply) {
        self.queue.push_back(reply);
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl DiceProvider for ScriptedDice {
    fn roll(&mut self, _sides: u32) -> RollReply {
        self.queue.pop_front().unwrap_or(RollReply::Declined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_dice_in_range() {
        let mut dice = SeededDice::new(42);
        for _ in 0..200 {
            match dice.d100() {
                RollReply::Rolled(v) => assert!((1..=100).contains(&v)),
                RollReply::Declined => panic!("seeded dice never decline"),
            }
        }
        for _ in 0..50 {
            match dice.roll(3) {
                RollReply::Rolled(v) => assert!((1..=3).contains(&v)),
                RollReply::Declined => panic!("seeded dice never decline"),
            }
        }
    }

    #[test]
    fn test_seeded_dice_deterministic() {
        let mut a = SeededDice::new(7);
        let mut b = SeededDice::new(7);
        for _ in 0..20 {
            assert_eq!(a.d100(), b.d100());
        }
    }

    #[test]
    fn test_scripted_dice_replay_then_decline() {
        let mut dice = ScriptedDice::new(&[55, 3]);
        assert_eq!(dice.d100(), RollReply::Rolled(55));
        assert_eq!(dice.d6(), RollReply::Rolled(3));
        assert_eq!(dice.d100(), RollReply::Declined);
    }
}
