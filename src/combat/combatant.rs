//! Combatant data model
//!
//! Built from persistent character data when a battle starts, mutated by
//! every attack, defense, and status tick, and discarded when the battle
//! ends. Removal from the field (hit points at zero, fully swallowed) clears
//! the position but never destroys the value.

use serde::{Deserialize, Serialize};

use crate::combat::equipment::{ArmorPiece, Shield, Weapon};
use crate::combat::hit_location::HitLocation;
use crate::combat::status::{StatusCategory, StatusSet};
use crate::core::types::{Cell, CombatantId, Facing, Size};

/// Who drives this combatant's decisions and rolls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    PlayerControlled,
    AIControlled,
}

/// Exclusive posture gating reactions and to-hit modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CombatStance {
    #[default]
    Normal,
    Parry,
    Aiming,
    Overwatch,
    Prone,
}

/// Attribute used by resistance and escape tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Strength,
    Dexterity,
    Constitution,
    Resolve,
}

/// Stat block read from persistent character data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub melee_skill: u32,
    pub ranged_skill: u32,
    pub dodge_skill: u32,
    pub strength: u32,
    pub dexterity: u32,
    pub constitution: u32,
    pub resolve: u32,
    /// Flat melee damage bonus
    pub damage_bonus: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            melee_skill: 50,
            ranged_skill: 50,
            dodge_skill: 40,
            strength: 50,
            dexterity: 50,
            constitution: 50,
            resolve: 50,
            damage_bonus: 0,
        }
    }
}

/// Species traits that feed initiative and resistance rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpeciesTraits {
    /// Grants a bonus initiative token unless cancelled by an opposing trait
    pub heightened_alertness: bool,
    /// Cancels heightened alertness on the opposing side
    pub dull_senses: bool,
    /// Auto-resists fear and terror
    pub fearless: bool,
}

/// A participant in the current battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub control: ControlKind,

    /// Absent means removed from the battlefield
    pub position: Option<Cell>,
    pub facing: Facing,

    pub action_points: u32,
    pub max_action_points: u32,
    pub movement_points: u32,
    pub max_movement_points: u32,

    pub hit_points: u32,
    pub max_hit_points: u32,

    pub stance: CombatStance,
    pub stats: Stats,
    pub size: Size,
    pub traits: SpeciesTraits,
    /// Hide/scale armor applied after equipped armor
    pub natural_armor: u32,
    /// Extra damage from talents, applied on the no-defense path
    pub talent_damage_bonus: u32,

    pub weapon: Weapon,
    pub shield: Option<Shield>,
    pub armor: Vec<ArmorPiece>,
    /// Occupied quick-item slots, at risk on torso hits
    pub quick_slots: Vec<String>,

    pub statuses: StatusSet,

    pub has_dodged_this_battle: bool,
    pub has_parried_this_turn: bool,
    pub is_vulnerable_after_power_attack: bool,
}

impl Combatant {
    pub fn new(name: &str, control: ControlKind, position: Cell) -> Self {
        Self {
            id: CombatantId::new(),
            name: name.into(),
            control,
            position: Some(position),
            facing: Facing::default(),
            action_points: 2,
            max_action_points: 2,
            movement_points: 4,
            max_movement_points: 4,
            hit_points: 20,
            max_hit_points: 20,
            stance: CombatStance::default(),
            stats: Stats::default(),
            size: Size::default(),
            traits: SpeciesTraits::default(),
            natural_armor: 0,
            talent_damage_bonus: 0,
            weapon: Weapon::sword(),
            shield: None,
            armor: Vec::new(),
            quick_slots: Vec::new(),
            statuses: StatusSet::new(),
            has_dodged_this_battle: false,
            has_parried_this_turn: false,
            is_vulnerable_after_power_attack: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hit_points > 0
    }

    /// On the field and able to take part in a round
    pub fn is_active(&self) -> bool {
        self.is_alive() && self.position.is_some()
    }

    pub fn attribute(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Strength => self.stats.strength,
            Attribute::Dexterity => self.stats.dexterity,
            Attribute::Constitution => self.stats.constitution,
            Attribute::Resolve => self.stats.resolve,
        }
    }

    /// Melee or ranged skill for the equipped weapon, with status modifiers
    pub fn attack_skill(&self) -> i32 {
        let modifiers = self.statuses.skill_modifier();
        if self.weapon.is_ranged() {
            self.stats.ranged_skill as i32 + modifiers.ranged
        } else {
            self.stats.melee_skill as i32 + modifiers.melee
        }
    }

    pub fn dodge_skill(&self) -> i32 {
        self.stats.dodge_skill as i32 + self.statuses.skill_modifier().dodge
    }

    /// Combat skill used for parries (melee, with status modifiers)
    pub fn parry_skill(&self) -> i32 {
        self.stats.melee_skill as i32 + self.statuses.skill_modifier().melee
    }

    /// Summed defense of equipped armor covering a location
    pub fn armor_at(&self, location: HitLocation) -> u32 {
        self.armor
            .iter()
            .filter(|p| !p.damaged && p.covers(location))
            .map(|p| p.defense)
            .sum()
    }

    pub fn has_status(&self, category: StatusCategory) -> bool {
        self.statuses.has(category)
    }

    /// Apply damage, saturating at zero hit points
    pub fn take_damage(&mut self, amount: u32) {
        self.hit_points = self.hit_points.saturating_sub(amount);
    }

    /// Start-of-turn refresh: points restored, per-turn budgets reset
    pub fn refresh_turn(&mut self) {
        self.action_points = self.max_action_points;
        self.movement_points = self.max_movement_points;
        self.has_parried_this_turn = false;
        self.is_vulnerable_after_power_attack = false;
    }

    /// Reset battle-scoped flags when a new battle starts
    pub fn reset_battle_flags(&mut self) {
        self.has_dodged_this_battle = false;
        self.has_parried_this_turn = false;
        self.is_vulnerable_after_power_attack = false;
        self.statuses.clear_after_battle();
    }
}
