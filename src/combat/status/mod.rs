//! Status effect engine
//!
//! One active instance per category per combatant. Effects are applied with
//! resistance tests, ticked once at the start of the owner's turn, and
//! removed on expiry, cure, or a battle-boundary cleanup flag.

pub mod apply;
pub mod tick;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

pub use apply::{apply_status, cure_status, force_status, ApplyOutcome};
pub use tick::{tick_statuses, TickReport};

/// Closed set of status conditions
///
/// Ordering fixes the tick sequence when several are active.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum StatusCategory {
    Poisoned,
    Diseased,
    Burning,
    Stunned,
    Prone,
    Entangled,
    Petrified,
    Incapacitated,
    BeingSwallowed,
    Pit,
    Fear,
    Seduced,
    Frenzy,
}

/// Skill adjustments carried by an active effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillModifier {
    pub melee: i32,
    pub ranged: i32,
    pub dodge: i32,
}

/// Duration until removal: `-1` indefinite, `0` one-shot, `>0` turns remaining
pub type Duration = i32;

/// One active condition on a combatant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStatusEffect {
    pub category: StatusCategory,
    pub duration: Duration,
    pub modifier: Option<SkillModifier>,
    /// Fixed damage dealt each tick, ignoring armor
    pub damage: Option<u32>,
    /// Escalation or threshold stage (entangled, being-swallowed)
    pub progress: u8,
    pub remove_after_combat: bool,
    pub remove_after_next_battle: bool,
}

impl ActiveStatusEffect {
    pub fn new(category: StatusCategory, duration: Duration) -> Self {
        Self {
            category,
            duration,
            modifier: None,
            damage: None,
            progress: 0,
            remove_after_combat: false,
            remove_after_next_battle: false,
        }
    }

    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = Some(damage);
        self
    }

    pub fn with_modifier(mut self, modifier: SkillModifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    pub fn cleanup_after_combat(mut self) -> Self {
        self.remove_after_combat = true;
        self
    }
}

/// A combatant's active conditions, at most one per category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSet {
    effects: AHashMap<StatusCategory, ActiveStatusEffect>,
}

impl StatusSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, category: StatusCategory) -> bool {
        self.effects.contains_key(&category)
    }

    pub fn get(&self, category: StatusCategory) -> Option<&ActiveStatusEffect> {
        self.effects.get(&category)
    }

    pub fn get_mut(&mut self, category: StatusCategory) -> Option<&mut ActiveStatusEffect> {
        self.effects.get_mut(&category)
    }

    pub(crate) fn insert(&mut self, effect: ActiveStatusEffect) {
        self.effects.insert(effect.category, effect);
    }

    pub(crate) fn remove(&mut self, category: StatusCategory) -> Option<ActiveStatusEffect> {
        self.effects.remove(&category)
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveStatusEffect> {
        self.effects.values()
    }

    /// Active categories in tick order
    pub fn categories(&self) -> Vec<StatusCategory> {
        let mut cats: Vec<StatusCategory> = self.effects.keys().copied().collect();
        cats.sort();
        cats
    }

    /// Sum of skill modifiers from all active effects
    pub fn skill_modifier(&self) -> SkillModifier {
        let mut total = SkillModifier::default();
        for effect in self.effects.values() {
            if let Some(m) = effect.modifier {
                total.melee += m.melee;
                total.ranged += m.ranged;
                total.dodge += m.dodge;
            }
        }
        total
    }

    /// Drop effects flagged for removal when combat ends
    pub fn clear_after_combat(&mut self) {
        self.effects.retain(|_, e| !e.remove_after_combat);
    }

    /// Drop effects flagged for removal after the next battle
    pub fn clear_after_battle(&mut self) {
        self.effects.retain(|_, e| !e.remove_after_next_battle);
    }
}
