//! Status application with resistance tests
//!
//! Applying a category already present is a no-op. Some categories grant a
//! resistance test before taking hold; a declined test roll cancels the
//! application with no state change.

use crate::combat::combatant::{Attribute, CombatStance, Combatant};
use crate::combat::status::{ActiveStatusEffect, StatusCategory};
use crate::dice::{DiceProvider, RollReply};

/// Outcome of trying to apply a status effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Target already holds this category
    AlreadyAffected,
    /// Resistance test passed, or a trait auto-cured it
    Resisted,
    /// The test roll was declined; nothing changed
    Cancelled,
}

/// Attribute tested before a category takes hold, if any
fn resistance_attribute(category: StatusCategory) -> Option<Attribute> {
    match category {
        StatusCategory::Poisoned | StatusCategory::Diseased => Some(Attribute::Constitution),
        StatusCategory::Fear
        | StatusCategory::Incapacitated
        | StatusCategory::Petrified
        | StatusCategory::Stunned => Some(Attribute::Resolve),
        StatusCategory::Prone => Some(Attribute::Dexterity),
        StatusCategory::Burning
        | StatusCategory::Entangled
        | StatusCategory::BeingSwallowed
        | StatusCategory::Pit
        | StatusCategory::Seduced
        | StatusCategory::Frenzy => None,
    }
}

fn take_hold(target: &mut Combatant, effect: ActiveStatusEffect) {
    if effect.category == StatusCategory::Prone {
        target.stance = CombatStance::Prone;
    }
    target.statuses.insert(effect);
}

/// Apply a status effect, running the category's resistance test
pub fn apply_status(
    target: &mut Combatant,
    effect: ActiveStatusEffect,
    dice: &mut dyn DiceProvider,
) -> ApplyOutcome {
    let category = effect.category;
    if target.statuses.has(category) {
        return ApplyOutcome::AlreadyAffected;
    }

    // Trait auto-cures fire before any roll
    if category == StatusCategory::Fear && target.traits.fearless {
        return ApplyOutcome::Resisted;
    }

    if let Some(attribute) = resistance_attribute(category) {
        match dice.d100() {
            RollReply::Declined => return ApplyOutcome::Cancelled,
            RollReply::Rolled(roll) => {
                if roll <= target.attribute(attribute) {
                    return ApplyOutcome::Resisted;
                }
            }
        }
    }

    take_hold(target, effect);
    ApplyOutcome::Applied
}

/// Apply without any resistance test (forced consequences like a failed shove)
pub fn force_status(target: &mut Combatant, effect: ActiveStatusEffect) -> ApplyOutcome {
    if target.statuses.has(effect.category) {
        return ApplyOutcome::AlreadyAffected;
    }
    take_hold(target, effect);
    ApplyOutcome::Applied
}

/// Remove a status through an external cure. Prone reverts the stance.
pub fn cure_status(target: &mut Combatant, category: StatusCategory) -> bool {
    let removed = target.statuses.remove(category).is_some();
    if removed && category == StatusCategory::Prone && target.stance == CombatStance::Prone {
        target.stance = CombatStance::Normal;
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::combatant::ControlKind;
    use crate::core::types::Cell;
    use crate::dice::ScriptedDice;

    fn combatant() -> Combatant {
        Combatant::new("test", ControlKind::AIControlled, Cell::new(0, 0))
    }

    #[test]
    fn test_apply_is_idempotent_per_category() {
        let mut c = combatant();
        let mut dice = ScriptedDice::new(&[99, 99]);

        let first = apply_status(
            &mut c,
            ActiveStatusEffect::new(StatusCategory::Poisoned, 3).with_damage(2),
            &mut dice,
        );
        assert_eq!(first, ApplyOutcome::Applied);

        let second = apply_status(
            &mut c,
            ActiveStatusEffect::new(StatusCategory::Poisoned, 3).with_damage(2),
            &mut dice,
        );
        assert_eq!(second, ApplyOutcome::AlreadyAffected);
    }

    #[test]
    fn test_constitution_resists_poison() {
        let mut c = combatant();
        c.stats.constitution = 60;
        let mut dice = ScriptedDice::new(&[55]);
        let outcome = apply_status(
            &mut c,
            ActiveStatusEffect::new(StatusCategory::Poisoned, 3),
            &mut dice,
        );
        assert_eq!(outcome, ApplyOutcome::Resisted);
        assert!(!c.has_status(StatusCategory::Poisoned));
    }

    #[test]
    fn test_fearless_auto_resists_fear() {
        let mut c = combatant();
        c.traits.fearless = true;
        // No roll queued: the trait must short-circuit before any request
        let mut dice = ScriptedDice::default();
        let outcome = apply_status(
            &mut c,
            ActiveStatusEffect::new(StatusCategory::Fear, -1),
            &mut dice,
        );
        assert_eq!(outcome, ApplyOutcome::Resisted);
    }

    #[test]
    fn test_declined_test_cancels_cleanly() {
        let mut c = combatant();
        let mut dice = ScriptedDice::default(); // declines immediately
        let outcome = apply_status(
            &mut c,
            ActiveStatusEffect::new(StatusCategory::Stunned, 1),
            &mut dice,
        );
        assert_eq!(outcome, ApplyOutcome::Cancelled);
        assert!(c.statuses.is_empty());
    }

    #[test]
    fn test_prone_sets_stance_and_cure_reverts() {
        let mut c = combatant();
        force_status(&mut c, ActiveStatusEffect::new(StatusCategory::Prone, 2));
        assert_eq!(c.stance, CombatStance::Prone);

        assert!(cure_status(&mut c, StatusCategory::Prone));
        assert_eq!(c.stance, CombatStance::Normal);
    }

    #[test]
    fn test_entangled_needs_no_test() {
        let mut c = combatant();
        let mut dice = ScriptedDice::default();
        let outcome = apply_status(
            &mut c,
            ActiveStatusEffect::new(StatusCategory::Entangled, 2).with_damage(2),
            &mut dice,
        );
        assert_eq!(outcome, ApplyOutcome::Applied);
    }
}
