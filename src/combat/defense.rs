//! Defense resolver
//!
//! Picks exactly one reaction per incoming hit, in strict priority:
//! dodge, shield parry, weapon parry, nothing. Each tier consumes its
//! budget when the roll is actually made; a declined roll skips the tier
//! without spending anything.

use serde::{Deserialize, Serialize};

use crate::combat::combatant::{CombatStance, Combatant};
use crate::combat::constants::{
    NO_PARRY_STANCE_SHIELD_PENALTY, PARRY_FUMBLE_FLOOR, PARRY_STANCE_DODGE_BONUS,
    PARRY_STANCE_SHIELD_BONUS, ROLL_CEILING,
};
use crate::combat::equipment::WeaponTrait;
use crate::combat::status::StatusCategory;
use crate::dice::{DiceProvider, RollReply};

/// Which reaction the defender used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefenseReaction {
    Dodge,
    ShieldParry,
    WeaponParry,
    None,
}

/// Which reactions the attack permits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DefenseOptions {
    #[default]
    All,
    /// Special attacks (tongue, spit, sweep) permit only the dodge
    DodgeOnly,
}

/// Outcome of a defensive reaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseResult {
    pub reaction: DefenseReaction,
    pub success: bool,
    /// Damage removed from the incoming hit
    pub damage_negated: u32,
    /// The parrying shield or weapon took damage
    pub item_damaged: bool,
    pub narrative: String,
}

impl DefenseResult {
    fn undefended(name: &str) -> Self {
        Self {
            reaction: DefenseReaction::None,
            success: false,
            damage_negated: 0,
            item_damaged: false,
            narrative: format!("{} is unable to defend", name),
        }
    }
}

/// Roll success: under the skill and under the global ceiling
fn roll_succeeds(roll: u32, skill: i32) -> bool {
    roll as i32 <= skill.min(ROLL_CEILING as i32)
}

fn dodge_available(defender: &Combatant) -> bool {
    !defender.has_dodged_this_battle
        && !defender.is_vulnerable_after_power_attack
        && !defender.has_status(StatusCategory::Frenzy)
}

/// Resolve a defender's reaction against an incoming hit
pub fn resolve_defense(
    defender: &mut Combatant,
    incoming_damage: u32,
    options: DefenseOptions,
    dice: &mut dyn DiceProvider,
) -> DefenseResult {
    let in_parry_stance = defender.stance == CombatStance::Parry;

    // Tier 1: dodge, once per battle
    if dodge_available(defender) {
        if let RollReply::Rolled(roll) = dice.d100() {
            defender.has_dodged_this_battle = true;
            let mut skill = defender.dodge_skill();
            if in_parry_stance {
                skill += PARRY_STANCE_DODGE_BONUS;
            }
            if roll_succeeds(roll, skill) {
                return DefenseResult {
                    reaction: DefenseReaction::Dodge,
                    success: true,
                    damage_negated: incoming_damage,
                    item_damaged: false,
                    narrative: format!("{} dodges aside", defender.name),
                };
            }
            return DefenseResult {
                reaction: DefenseReaction::Dodge,
                success: false,
                damage_negated: 0,
                item_damaged: false,
                narrative: format!("{} fails to dodge", defender.name),
            };
        }
        // Declined: fall through without spending the dodge
    }

    // Tier 2: shield parry, once per turn
    if options == DefenseOptions::All
        && defender.shield.is_some()
        && !defender.has_parried_this_turn
    {
        if let RollReply::Rolled(roll) = dice.d100() {
            defender.has_parried_this_turn = true;
            let stance_mod = if in_parry_stance {
                PARRY_STANCE_SHIELD_BONUS
            } else {
                NO_PARRY_STANCE_SHIELD_PENALTY
            };
            let skill = defender.parry_skill() + stance_mod;
            let name = defender.name.clone();
            if let (true, Some(shield)) = (roll_succeeds(roll, skill), defender.shield.as_mut()) {
                let negated = shield.defense.min(incoming_damage);
                let overwhelmed = incoming_damage > shield.defense;
                if overwhelmed {
                    shield.damaged = true;
                }
                return DefenseResult {
                    reaction: DefenseReaction::ShieldParry,
                    success: true,
                    damage_negated: negated,
                    item_damaged: overwhelmed,
                    narrative: format!("{} catches the blow on the shield", name),
                };
            }
            return DefenseResult {
                reaction: DefenseReaction::ShieldParry,
                success: false,
                damage_negated: 0,
                item_damaged: false,
                narrative: format!("{}'s shield is out of line", name),
            };
        }
    }

    // Tier 3: weapon parry, parry stance only, once per turn
    if options == DefenseOptions::All
        && in_parry_stance
        && !defender.has_parried_this_turn
        && !defender.weapon.has_trait(WeaponTrait::Unwieldy)
    {
        if let RollReply::Rolled(roll) = dice.d100() {
            defender.has_parried_this_turn = true;
            if roll >= PARRY_FUMBLE_FLOOR {
                // Fumble damages the parrying weapon no matter what
                defender.weapon.damaged = true;
                return DefenseResult {
                    reaction: DefenseReaction::WeaponParry,
                    success: false,
                    damage_negated: 0,
                    item_damaged: true,
                    narrative: format!("{}'s parry goes wide, the blade takes the hit", defender.name),
                };
            }
            if roll_succeeds(roll, defender.parry_skill()) {
                return DefenseResult {
                    reaction: DefenseReaction::WeaponParry,
                    success: true,
                    damage_negated: incoming_damage,
                    item_damaged: false,
                    narrative: format!("{} turns the blow aside", defender.name),
                };
            }
            return DefenseResult {
                reaction: DefenseReaction::WeaponParry,
                success: false,
                damage_negated: 0,
                item_damaged: false,
                narrative: format!("{}'s parry comes too late", defender.name),
            };
        }
    }

    DefenseResult::undefended(&defender.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::combatant::ControlKind;
    use crate::combat::equipment::{Shield, Weapon};
    use crate::combat::status::ActiveStatusEffect;
    use crate::core::types::Cell;
    use crate::dice::ScriptedDice;

    fn defender() -> Combatant {
        let mut c = Combatant::new("guard", ControlKind::AIControlled, Cell::new(0, 0));
        c.stats.dodge_skill = 40;
        c.stats.melee_skill = 50;
        c
    }

    #[test]
    fn test_dodge_tried_first_and_consumes_budget() {
        let mut c = defender();
        let mut dice = ScriptedDice::new(&[35]);
        let result = resolve_defense(&mut c, 6, DefenseOptions::All, &mut dice);
        assert_eq!(result.reaction, DefenseReaction::Dodge);
        assert!(result.success);
        assert_eq!(result.damage_negated, 6);
        assert!(c.has_dodged_this_battle);
    }

    #[test]
    fn test_dodge_used_at_most_once_per_battle() {
        let mut c = defender();
        let mut dice = ScriptedDice::new(&[35]);
        resolve_defense(&mut c, 6, DefenseOptions::All, &mut dice);

        // Second hit: dodge budget spent, no shield, no parry stance
        let mut dice = ScriptedDice::new(&[35]);
        let result = resolve_defense(&mut c, 6, DefenseOptions::All, &mut dice);
        assert_eq!(result.reaction, DefenseReaction::None);
    }

    #[test]
    fn test_dodge_ceiling_applies() {
        let mut c = defender();
        c.stats.dodge_skill = 95;
        let mut dice = ScriptedDice::new(&[85]);
        let result = resolve_defense(&mut c, 6, DefenseOptions::All, &mut dice);
        assert_eq!(result.reaction, DefenseReaction::Dodge);
        assert!(!result.success);
    }

    #[test]
    fn test_vulnerable_blocks_dodge() {
        let mut c = defender();
        c.is_vulnerable_after_power_attack = true;
        c.shield = Some(Shield::round(3));
        let mut dice = ScriptedDice::new(&[30]);
        let result = resolve_defense(&mut c, 6, DefenseOptions::All, &mut dice);
        assert_eq!(result.reaction, DefenseReaction::ShieldParry);
        assert!(!c.has_dodged_this_battle);
    }

    #[test]
    fn test_frenzy_blocks_dodge() {
        let mut c = defender();
        c.statuses
            .insert(ActiveStatusEffect::new(StatusCategory::Frenzy, -1));
        let mut dice = ScriptedDice::new(&[30]);
        let result = resolve_defense(&mut c, 6, DefenseOptions::All, &mut dice);
        assert_eq!(result.reaction, DefenseReaction::None);
    }

    #[test]
    fn test_shield_parry_partial_negation_damages_shield() {
        let mut c = defender();
        c.has_dodged_this_battle = true;
        c.shield = Some(Shield::round(3));
        let mut dice = ScriptedDice::new(&[30]);
        let result = resolve_defense(&mut c, 8, DefenseOptions::All, &mut dice);
        assert_eq!(result.reaction, DefenseReaction::ShieldParry);
        assert!(result.success);
        assert_eq!(result.damage_negated, 3);
        assert!(result.item_damaged);
        assert!(c.shield.as_ref().unwrap().damaged);
    }

    #[test]
    fn test_weapon_parry_requires_parry_stance() {
        let mut c = defender();
        c.has_dodged_this_battle = true;
        let mut dice = ScriptedDice::new(&[30]);
        let result = resolve_defense(&mut c, 6, DefenseOptions::All, &mut dice);
        assert_eq!(result.reaction, DefenseReaction::None);

        c.stance = CombatStance::Parry;
        let mut dice = ScriptedDice::new(&[30]);
        let result = resolve_defense(&mut c, 6, DefenseOptions::All, &mut dice);
        assert_eq!(result.reaction, DefenseReaction::WeaponParry);
        assert!(result.success);
        assert_eq!(result.damage_negated, 6);
    }

    #[test]
    fn test_weapon_parry_fumble_damages_weapon() {
        let mut c = defender();
        c.has_dodged_this_battle = true;
        c.stance = CombatStance::Parry;
        let mut dice = ScriptedDice::new(&[96]);
        let result = resolve_defense(&mut c, 6, DefenseOptions::All, &mut dice);
        assert!(!result.success);
        assert!(result.item_damaged);
        assert!(c.weapon.damaged);
    }

    #[test]
    fn test_parry_budget_is_once_per_turn() {
        let mut c = defender();
        c.has_dodged_this_battle = true;
        c.shield = Some(Shield::round(3));
        c.stance = CombatStance::Parry;

        let mut dice = ScriptedDice::new(&[90]);
        let result = resolve_defense(&mut c, 6, DefenseOptions::All, &mut dice);
        assert_eq!(result.reaction, DefenseReaction::ShieldParry);
        assert!(c.has_parried_this_turn);

        // Weapon parry is gated behind the same budget
        let mut dice = ScriptedDice::new(&[10]);
        let result = resolve_defense(&mut c, 6, DefenseOptions::All, &mut dice);
        assert_eq!(result.reaction, DefenseReaction::None);
    }

    #[test]
    fn test_dodge_only_restriction() {
        let mut c = defender();
        c.has_dodged_this_battle = true;
        c.shield = Some(Shield::round(3));
        c.stance = CombatStance::Parry;
        let mut dice = ScriptedDice::new(&[10]);
        let result = resolve_defense(&mut c, 6, DefenseOptions::DodgeOnly, &mut dice);
        assert_eq!(result.reaction, DefenseReaction::None);
    }

    #[test]
    fn test_declined_dodge_falls_through_without_spending() {
        let mut c = defender();
        c.shield = Some(Shield::round(3));
        let mut dice = ScriptedDice::default();
        dice.push(RollReply::Declined); // dodge prompt declined
        dice.push(RollReply::Rolled(30)); // shield parry
        let result = resolve_defense(&mut c, 6, DefenseOptions::All, &mut dice);
        assert_eq!(result.reaction, DefenseReaction::ShieldParry);
        assert!(!c.has_dodged_this_battle);
    }

    #[test]
    fn test_unwieldy_weapon_cannot_parry() {
        let mut c = defender();
        c.has_dodged_this_battle = true;
        c.stance = CombatStance::Parry;
        c.weapon = Weapon::sword();
        c.weapon.traits.push(WeaponTrait::Unwieldy);
        let mut dice = ScriptedDice::new(&[10]);
        let result = resolve_defense(&mut c, 6, DefenseOptions::All, &mut dice);
        assert_eq!(result.reaction, DefenseReaction::None);
    }
}
