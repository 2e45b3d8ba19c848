//! Weapons, armor pieces, and shields
//!
//! Armor protects per hit location via a coverage set; weapons carry a
//! damage table (die + modifier), an armor-piercing value, and handling
//! traits that feed the to-hit modifier table.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::combat::hit_location::HitLocation;

/// Melee weapons use melee skill; ranged use ranged skill and ammunition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Melee,
    Ranged,
}

/// Handling traits that adjust the wielder's profile as a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponTrait {
    /// Easier to hit its wielder
    Slow,
    /// Harder to hit its wielder, better parries
    Defensive,
    /// Extra damage, no parry use
    Unwieldy,
    TwoHanded,
}

/// Damage type - decides which armor layers apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DamageType {
    #[default]
    Physical,
    /// Ignores equipped armor and natural armor
    Fire,
    /// Ignores natural armor only
    Acid,
    Cold,
    Poison,
}

impl DamageType {
    pub fn ignores_equipped_armor(&self) -> bool {
        matches!(self, DamageType::Fire)
    }

    pub fn ignores_natural_armor(&self) -> bool {
        matches!(self, DamageType::Fire | DamageType::Acid)
    }
}

/// Damage table: `1..=die` plus a signed modifier, floored at zero.
/// The pipeline re-rolls zero results before applying bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRoll {
    pub die: u32,
    pub modifier: i32,
}

impl DamageRoll {
    pub fn new(die: u32, modifier: i32) -> Self {
        Self { die, modifier }
    }

    /// Apply the modifier to a raw die value, floored at zero
    pub fn value(&self, raw: u32) -> u32 {
        (raw as i32 + self.modifier).max(0) as u32
    }
}

/// An equipped weapon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub kind: WeaponKind,
    pub damage: DamageRoll,
    pub armor_piercing: u32,
    pub damage_type: DamageType,
    pub traits: Vec<WeaponTrait>,
    /// Remaining ammunition; melee weapons carry `None`
    pub ammunition: Option<u32>,
    /// Flat damage bonus from loaded ammunition
    pub ammunition_bonus: u32,
    pub damaged: bool,
}

impl Weapon {
    pub fn has_trait(&self, t: WeaponTrait) -> bool {
        self.traits.contains(&t)
    }

    pub fn is_ranged(&self) -> bool {
        self.kind == WeaponKind::Ranged
    }

    pub fn sword() -> Self {
        Self {
            name: "sword".into(),
            kind: WeaponKind::Melee,
            damage: DamageRoll::new(6, 0),
            armor_piercing: 0,
            damage_type: DamageType::Physical,
            traits: Vec::new(),
            ammunition: None,
            ammunition_bonus: 0,
            damaged: false,
        }
    }

    pub fn warhammer() -> Self {
        Self {
            name: "warhammer".into(),
            kind: WeaponKind::Melee,
            damage: DamageRoll::new(6, 1),
            armor_piercing: 2,
            damage_type: DamageType::Physical,
            traits: vec![WeaponTrait::Slow, WeaponTrait::TwoHanded],
            ammunition: None,
            ammunition_bonus: 0,
            damaged: false,
        }
    }

    pub fn spear() -> Self {
        Self {
            name: "spear".into(),
            kind: WeaponKind::Melee,
            damage: DamageRoll::new(6, 0),
            armor_piercing: 1,
            damage_type: DamageType::Physical,
            traits: vec![WeaponTrait::Defensive],
            ammunition: None,
            ammunition_bonus: 0,
            damaged: false,
        }
    }

    pub fn crossbow() -> Self {
        Self {
            name: "crossbow".into(),
            kind: WeaponKind::Ranged,
            damage: DamageRoll::new(6, 1),
            armor_piercing: 2,
            damage_type: DamageType::Physical,
            traits: vec![WeaponTrait::TwoHanded],
            ammunition: Some(12),
            ammunition_bonus: 0,
            damaged: false,
        }
    }

    /// Unarmed fallback - can roll zero and be re-rolled
    pub fn fists() -> Self {
        Self {
            name: "fists".into(),
            kind: WeaponKind::Melee,
            damage: DamageRoll::new(3, -1),
            armor_piercing: 0,
            damage_type: DamageType::Physical,
            traits: Vec::new(),
            ammunition: None,
            ammunition_bonus: 0,
            damaged: false,
        }
    }
}

/// A worn armor piece covering a set of hit locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorPiece {
    pub name: String,
    pub defense: u32,
    pub coverage: AHashSet<HitLocation>,
    pub damaged: bool,
}

impl ArmorPiece {
    pub fn new(name: &str, defense: u32, coverage: &[HitLocation]) -> Self {
        Self {
            name: name.into(),
            defense,
            coverage: coverage.iter().copied().collect(),
            damaged: false,
        }
    }

    pub fn covers(&self, location: HitLocation) -> bool {
        self.coverage.contains(&location)
    }

    pub fn helmet(defense: u32) -> Self {
        Self::new("helmet", defense, &[HitLocation::Head])
    }

    pub fn breastplate(defense: u32) -> Self {
        Self::new("breastplate", defense, &[HitLocation::Torso])
    }

    pub fn mail_shirt(defense: u32) -> Self {
        Self::new(
            "mail shirt",
            defense,
            &[HitLocation::Torso, HitLocation::Arms],
        )
    }

    pub fn greaves(defense: u32) -> Self {
        Self::new("greaves", defense, &[HitLocation::Legs])
    }
}

/// An off-hand shield
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shield {
    pub name: String,
    pub defense: u32,
    pub damaged: bool,
}

impl Shield {
    pub fn round(defense: u32) -> Self {
        Self {
            name: "round shield".into(),
            defense,
            damaged: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_type_bypass() {
        assert!(DamageType::Fire.ignores_equipped_armor());
        assert!(DamageType::Fire.ignores_natural_armor());
        assert!(!DamageType::Acid.ignores_equipped_armor());
        assert!(DamageType::Acid.ignores_natural_armor());
        assert!(!DamageType::Physical.ignores_natural_armor());
    }

    #[test]
    fn test_damage_roll_floors_at_zero() {
        let fists = DamageRoll::new(3, -1);
        assert_eq!(fists.value(1), 0);
        assert_eq!(fists.value(3), 2);
    }

    #[test]
    fn test_armor_coverage() {
        let mail = ArmorPiece::mail_shirt(3);
        assert!(mail.covers(HitLocation::Torso));
        assert!(mail.covers(HitLocation::Arms));
        assert!(!mail.covers(HitLocation::Head));
    }

    #[test]
    fn test_ranged_weapons_carry_ammunition() {
        let bow = Weapon::crossbow();
        assert!(bow.is_ranged());
        assert!(bow.ammunition.is_some());
        assert!(Weapon::sword().ammunition.is_none());
    }
}
