//! Combat rule constants - all tunable values in one place
//!
//! Rolls are 1..=100 against a skill value; modifiers are ADDITIVE.

/// A d100 roll above this always misses, regardless of skill
pub const ROLL_CEILING: u32 = 80;

/// A weapon-parry roll of this or above fumbles and damages the weapon
pub const PARRY_FUMBLE_FLOOR: u32 = 95;

// To-hit modifiers (additive)
pub const OBSTACLE_PENALTY: i32 = -10; // per obstacle, ranged only
pub const LARGE_TARGET_BONUS: i32 = 10; // ranged only
pub const AIMED_BONUS: i32 = 10;
pub const BEHIND_BONUS: i32 = 20;
pub const ELEVATION_BONUS: i32 = 10;
pub const CHARGE_BONUS: i32 = 10;
pub const POWER_ATTACK_BONUS: i32 = 20;
pub const TARGET_PRONE_BONUS: i32 = 30;
pub const TARGET_VULNERABLE_BONUS: i32 = 10;
pub const TARGET_SHIELD_PENALTY: i32 = -5;
pub const TARGET_PARRY_STANCE_PENALTY: i32 = -10;
pub const TARGET_SLOW_WEAPON_BONUS: i32 = 5;
pub const TARGET_DEFENSIVE_WEAPON_PENALTY: i32 = -5;

// Defense modifiers
pub const PARRY_STANCE_DODGE_BONUS: i32 = 15;
pub const PARRY_STANCE_SHIELD_BONUS: i32 = 15;
pub const NO_PARRY_STANCE_SHIELD_PENALTY: i32 = -15;

/// Hit-location die: 1 head, 2 arms, 6 legs, rest torso
pub const HIT_LOCATION_DIE: u32 = 6;

/// Gear-damage die rolled against occupied quick slots on torso hits
pub const GEAR_DAMAGE_DIE: u32 = 10;

/// Shove contest: attacker damage bonus scales by this against target dexterity
pub const SHOVE_DAMAGE_BONUS_SCALE: i32 = 10;
