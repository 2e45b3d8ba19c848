//! Per-attack situational context
//!
//! Built fresh for every attack attempt and never persisted. Carries the
//! flags the to-hit and damage math need but the combatant does not own.

use serde::{Deserialize, Serialize};

use crate::combat::equipment::DamageType;

/// Situational flags for a single attack attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombatContext {
    pub power_attack: bool,
    pub charge_attack: bool,
    pub aimed: bool,
    /// Attacker stands strictly higher than the target
    pub attacker_elevated: bool,
    /// Overrides the weapon's damage type (breath, thrown vials)
    pub damage_type_override: Option<DamageType>,
    /// Extra armor-piercing on top of the weapon's own value
    pub bonus_armor_piercing: u32,
    /// Overrides the line-of-sight obstacle count when set
    pub obstacle_override: Option<u32>,
}

impl CombatContext {
    pub fn power_attack() -> Self {
        Self {
            power_attack: true,
            ..Default::default()
        }
    }

    pub fn charge() -> Self {
        Self {
            charge_attack: true,
            ..Default::default()
        }
    }

    pub fn aimed() -> Self {
        Self {
            aimed: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context_is_plain_attack() {
        let ctx = CombatContext::default();
        assert!(!ctx.power_attack);
        assert!(!ctx.charge_attack);
        assert!(!ctx.aimed);
        assert!(ctx.damage_type_override.is_none());
    }

    #[test]
    fn test_shorthand_constructors() {
        assert!(CombatContext::power_attack().power_attack);
        assert!(CombatContext::charge().charge_attack);
        assert!(CombatContext::aimed().aimed);
    }
}
