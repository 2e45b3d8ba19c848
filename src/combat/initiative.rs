//! Initiative token scheduler
//!
//! Each round gets a fresh multiset of control-category tokens, one per
//! living eligible combatant plus modifiers. Drawing is uniform-random
//! without replacement; the round is over exactly when the pool is empty.
//! External triggers may inject tokens between draws.

use serde::{Deserialize, Serialize};

use crate::combat::combatant::{CombatStance, ControlKind};
use crate::combat::roster::Roster;
use crate::dice::{DiceProvider, RollReply};

/// One-time adjustments applied when a round's pool is built
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RoundModifiers {
    /// Flat extra tokens per faction (first-round abilities, ambushes)
    pub bonus_player_tokens: u32,
    pub bonus_ai_tokens: u32,
    /// Breaking down the door: the defenders get this many extra tokens
    pub forced_entry_penalty: u32,
    /// Remove every token of this category, guaranteeing the other side acts first
    pub strip_category: Option<ControlKind>,
}

/// Result of one pool draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenDraw {
    Token(ControlKind),
    /// The pool is empty: the round is over
    Exhausted,
    /// The draw roll was declined; every token stays in the pool
    Declined,
}

/// The round's remaining actor tokens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenPool {
    tokens: Vec<ControlKind>,
}

impl TokenPool {
    /// Build the pool for a new round from live combatant counts
    ///
    /// Combatants in Overwatch do not draw; they act through interrupts.
    /// Heightened alertness grants a bonus token unless an opposing
    /// combatant carries the same trait, or the bearer has dull senses.
    pub fn build_round(roster: &Roster, modifiers: &RoundModifiers) -> Self {
        let mut tokens = Vec::new();

        let opposing_alert = |control: ControlKind| {
            roster
                .iter()
                .any(|c| c.control != control && c.is_active() && c.traits.heightened_alertness)
        };

        for combatant in roster.iter() {
            if !combatant.is_active() || combatant.stance == CombatStance::Overwatch {
                continue;
            }
            tokens.push(combatant.control);

            if combatant.traits.heightened_alertness
                && !combatant.traits.dull_senses
                && !opposing_alert(combatant.control)
            {
                tokens.push(combatant.control);
            }
        }

        for _ in 0..modifiers.bonus_player_tokens {
            tokens.push(ControlKind::PlayerControlled);
        }
        for _ in 0..modifiers.bonus_ai_tokens + modifiers.forced_entry_penalty {
            tokens.push(ControlKind::AIControlled);
        }

        if let Some(stripped) = modifiers.strip_category {
            tokens.retain(|t| *t != stripped);
        }

        Self { tokens }
    }

    /// Uniform draw without replacement. An empty pool means the round is
    /// over; a declined draw roll leaves the pool exactly as it was.
    pub fn draw_next(&mut self, dice: &mut dyn DiceProvider) -> TokenDraw {
        if self.tokens.is_empty() {
            return TokenDraw::Exhausted;
        }
        match dice.roll(self.tokens.len() as u32) {
            RollReply::Rolled(roll) => {
                TokenDraw::Token(self.tokens.swap_remove((roll - 1) as usize))
            }
            RollReply::Declined => TokenDraw::Declined,
        }
    }

    /// Inject extra tokens between draws (time-freeze style triggers)
    pub fn inject(&mut self, category: ControlKind, count: u32) {
        for _ in 0..count {
            self.tokens.push(category);
        }
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len()
    }

    pub fn count_of(&self, category: ControlKind) -> usize {
        self.tokens.iter().filter(|t| **t == category).count()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
