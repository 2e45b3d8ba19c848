//! Attack resolution pipeline
//!
//! One d100 to-hit roll against base skill plus additive modifiers, with a
//! global ceiling that beats any skill. Hits route through the defense
//! resolver, then hit-location armor with damage-type bypass, then the
//! positional consequences (charge follow-through).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combat::combatant::{CombatStance, Combatant};
use crate::combat::constants::*;
use crate::combat::context::CombatContext;
use crate::combat::defense::{resolve_defense, DefenseOptions, DefenseResult};
use crate::combat::equipment::{DamageType, WeaponTrait};
use crate::combat::hit_location::HitLocation;
use crate::combat::roster::Roster;
use crate::combat::shove::{resolve_shove, ShoveOutcome, ShoveResult};
use crate::combat::status::StatusCategory;
use crate::core::error::Result;
use crate::core::types::CombatantId;
use crate::dice::{DiceProvider, RollReply};
use crate::spatial::{PositionQuery, RelativeDirection};

/// How an attack attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackOutcome {
    Hit,
    Miss,
    /// Attacker or target off the field, or no line of fire: nothing happened
    NoOp,
    /// To-hit roll declined; nothing happened, no ammunition spent
    Cancelled,
}

/// Full record of one attack resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackResult {
    pub outcome: AttackOutcome,
    pub to_hit_chance: i32,
    pub roll: Option<u32>,
    pub damage_dealt: u32,
    pub hit_location: Option<HitLocation>,
    pub defense: Option<DefenseResult>,
    /// Name of a quick-slot item damaged by a torso hit
    pub gear_damaged: Option<String>,
    pub shove: Option<ShoveResult>,
    pub narrative: String,
}

impl AttackResult {
    fn no_op(narrative: &str) -> Self {
        Self {
            outcome: AttackOutcome::NoOp,
            to_hit_chance: 0,
            roll: None,
            damage_dealt: 0,
            hit_location: None,
            defense: None,
            gear_damaged: None,
            shove: None,
            narrative: narrative.into(),
        }
    }
}

/// Additive to-hit modifiers for one attack
fn to_hit_chance(
    attacker: &Combatant,
    defender: &Combatant,
    grid: &dyn PositionQuery,
    context: &CombatContext,
    obstacles: u32,
) -> i32 {
    let mut chance = attacker.attack_skill();
    let ranged = attacker.weapon.is_ranged();

    if ranged {
        chance += obstacles as i32 * OBSTACLE_PENALTY;
        if defender.size.is_large() {
            chance += LARGE_TARGET_BONUS;
        }
    }

    if context.aimed || attacker.stance == CombatStance::Aiming {
        chance += AIMED_BONUS;
    }
    if context.attacker_elevated {
        chance += ELEVATION_BONUS;
    }
    if context.charge_attack {
        chance += CHARGE_BONUS;
    }
    if context.power_attack {
        chance += POWER_ATTACK_BONUS;
    }

    let behind = match (attacker.position, defender.position) {
        (Some(a), Some(d)) => {
            grid.relative_direction(defender.facing, d, a) == RelativeDirection::Behind
        }
        _ => false,
    };
    if behind {
        chance += BEHIND_BONUS;
    }

    if defender.stance == CombatStance::Prone || defender.has_status(StatusCategory::Prone) {
        chance += TARGET_PRONE_BONUS;
    }
    if defender.weapon.has_trait(WeaponTrait::Slow) {
        chance += TARGET_SLOW_WEAPON_BONUS;
    }
    if defender.weapon.has_trait(WeaponTrait::Defensive) {
        chance += TARGET_DEFENSIVE_WEAPON_PENALTY;
    }

    if defender.is_vulnerable_after_power_attack {
        // Overextended: easier to hit, and the guard modifiers below are off
        chance += TARGET_VULNERABLE_BONUS;
    } else if !behind {
        if defender.shield.is_some() {
            chance += TARGET_SHIELD_PENALTY;
        }
        if defender.stance == CombatStance::Parry {
            chance += TARGET_PARRY_STANCE_PENALTY;
        }
    }

    chance
}

/// Roll the weapon damage table, re-rolling zero results, then add bonuses
fn roll_damage(attacker: &Combatant, dice: &mut dyn DiceProvider) -> u32 {
    let table = attacker.weapon.damage;
    let mut base = 0;
    // Re-roll zero table results before any modifier is applied. A declined
    // roll resolves to the table minimum; bounded so a degenerate table
    // cannot spin forever.
    for _ in 0..32 {
        match dice.roll(table.die) {
            RollReply::Rolled(raw) => base = table.value(raw),
            RollReply::Declined => base = 1,
        }
        if base > 0 {
            break;
        }
    }
    let base = base.max(1);

    let mut damage = base as i32 + attacker.stats.damage_bonus + attacker.talent_damage_bonus as i32;
    if attacker.weapon.is_ranged() {
        damage += attacker.weapon.ammunition_bonus as i32;
    }
    if attacker.weapon.has_trait(WeaponTrait::Unwieldy) {
        damage += 2;
    }
    damage.max(0) as u32
}

/// Armor reduction with damage-type bypass, floored at zero
fn reduce_by_armor(
    incoming: u32,
    defender: &Combatant,
    location: HitLocation,
    damage_type: DamageType,
    armor_piercing: u32,
) -> u32 {
    let mut armor = 0u32;
    if !damage_type.ignores_equipped_armor() {
        armor += defender.armor_at(location).saturating_sub(armor_piercing);
    }
    if !damage_type.ignores_natural_armor() {
        armor += defender.natural_armor;
    }
    incoming.saturating_sub(armor)
}

/// Whether the defender gets a defensive reaction at all
fn can_react(defender: &Combatant) -> bool {
    !defender.has_status(StatusCategory::Petrified)
        && !defender.has_status(StatusCategory::Incapacitated)
        && !defender.has_status(StatusCategory::BeingSwallowed)
}

pub fn resolve_attack(
    roster: &mut Roster,
    grid: &mut dyn PositionQuery,
    dice: &mut dyn DiceProvider,
    attacker_id: CombatantId,
    defender_id: CombatantId,
    context: CombatContext,
) -> Result<AttackResult> {
    resolve_attack_with_options(
        roster,
        grid,
        dice,
        attacker_id,
        defender_id,
        context,
        DefenseOptions::All,
    )
}

/// Full pipeline; special attacks pass `DefenseOptions::DodgeOnly`
pub fn resolve_attack_with_options(
    roster: &mut Roster,
    grid: &mut dyn PositionQuery,
    dice: &mut dyn DiceProvider,
    attacker_id: CombatantId,
    defender_id: CombatantId,
    context: CombatContext,
    defense_options: DefenseOptions,
) -> Result<AttackResult> {
    let (attacker, defender) = roster.pair_mut(attacker_id, defender_id)?;

    let (Some(attacker_pos), Some(defender_pos)) = (attacker.position, defender.position) else {
        return Ok(AttackResult::no_op("the target is nowhere to be found"));
    };

    // Ranged pre-checks: line of fire and obstacle count
    let mut obstacles = 0;
    if attacker.weapon.is_ranged() {
        let los = grid.line_of_sight(attacker_pos, defender_pos);
        obstacles = context.obstacle_override.unwrap_or(los.obstacles);
        if !los.can_shoot {
            return Ok(AttackResult::no_op("no clear line of fire"));
        }
    }

    let chance = to_hit_chance(attacker, defender, grid, &context, obstacles);

    let roll = match dice.d100() {
        RollReply::Declined => {
            // Attack never confirmed: no ammunition, no flags, no damage
            return Ok(AttackResult {
                outcome: AttackOutcome::Cancelled,
                to_hit_chance: chance,
                roll: None,
                damage_dealt: 0,
                hit_location: None,
                defense: None,
                gear_damaged: None,
                shove: None,
                narrative: format!("{} holds the attack", attacker.name),
            });
        }
        RollReply::Rolled(v) => v,
    };

    // From here on the attack is committed; ranged ammunition is spent at
    // the end regardless of hit or miss.
    let hit = roll <= ROLL_CEILING && (roll as i32) <= chance;
    debug!(
        attacker = %attacker.name,
        defender = %defender.name,
        chance,
        roll,
        hit,
        "to-hit resolved"
    );

    let mut result = AttackResult {
        outcome: if hit { AttackOutcome::Hit } else { AttackOutcome::Miss },
        to_hit_chance: chance,
        roll: Some(roll),
        damage_dealt: 0,
        hit_location: None,
        defense: None,
        gear_damaged: None,
        shove: None,
        narrative: String::new(),
    };

    if !hit {
        result.narrative = format!("{} misses {}", attacker.name, defender.name);
        finish_attack(roster.get_mut(attacker_id)?, &context, false);
        return Ok(result);
    }

    let potential = roll_damage(attacker, dice);
    let damage_type = context
        .damage_type_override
        .unwrap_or(attacker.weapon.damage_type);
    let armor_piercing = attacker.weapon.armor_piercing + context.bonus_armor_piercing;

    let mut remaining = potential;
    if can_react(defender) {
        let defense = resolve_defense(defender, potential, defense_options, dice);
        remaining = potential.saturating_sub(defense.damage_negated);
        result.defense = Some(defense);
    }

    if remaining > 0 {
        let location = match dice.roll(HIT_LOCATION_DIE) {
            RollReply::Rolled(v) => HitLocation::from_d6(v),
            RollReply::Declined => HitLocation::Torso,
        };
        result.hit_location = Some(location);

        let final_damage = reduce_by_armor(remaining, defender, location, damage_type, armor_piercing);
        defender.take_damage(final_damage);
        result.damage_dealt = final_damage;

        // Torso hits risk carried gear
        if location == HitLocation::Torso && !defender.quick_slots.is_empty() {
            if let RollReply::Rolled(gear_roll) = dice.roll(GEAR_DAMAGE_DIE) {
                let occupied = defender.quick_slots.len() as u32;
                if gear_roll <= occupied {
                    result.gear_damaged =
                        Some(defender.quick_slots[(gear_roll - 1) as usize].clone());
                }
            }
        }

        result.narrative = format!(
            "{} hits {} in the {:?} for {} damage",
            attacker.name, defender.name, location, final_damage
        );
    } else {
        result.narrative = format!("{} strikes, but {} takes nothing", attacker.name, defender.name);
    }

    finish_attack(roster.get_mut(attacker_id)?, &context, true);

    // Charge always follows through with a shove, then the attacker advances
    if context.charge_attack {
        let shove = resolve_shove(roster, grid, dice, attacker_id, defender_id, true)?;
        if matches!(shove.outcome, ShoveOutcome::Pushed { .. }) {
            if grid.move_to(attacker_id, defender_pos) {
                roster.get_mut(attacker_id)?.position = Some(defender_pos);
            }
        }
        result.shove = Some(shove);
    }

    Ok(result)
}

/// End-of-resolution bookkeeping on the attacker. Ammunition is spent on
/// hit and miss alike; a power attack only overextends when it connects.
fn finish_attack(attacker: &mut Combatant, context: &CombatContext, hit: bool) {
    if let Some(ammo) = attacker.weapon.ammunition.as_mut() {
        *ammo = ammo.saturating_sub(1);
    }
    if hit && context.power_attack {
        attacker.is_vulnerable_after_power_attack = true;
    }
}
