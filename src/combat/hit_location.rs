//! Hit locations for armor coverage
//!
//! A successful hit against a reacting defender rolls a d6 for location;
//! armor protects only the locations its coverage set names.

use serde::{Deserialize, Serialize};

/// Body location struck by an attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitLocation {
    Head,
    Arms,
    Torso,
    Legs,
}

impl HitLocation {
    pub fn all() -> [HitLocation; 4] {
        [
            HitLocation::Head,
            HitLocation::Arms,
            HitLocation::Torso,
            HitLocation::Legs,
        ]
    }

    /// Map a d6 roll to a location: 1 head, 2 arms, 6 legs, rest torso
    pub fn from_d6(roll: u32) -> HitLocation {
        match roll {
            1 => HitLocation::Head,
            2 => HitLocation::Arms,
            6 => HitLocation::Legs,
            _ => HitLocation::Torso,
        }
    }
}
