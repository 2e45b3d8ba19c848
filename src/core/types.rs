//! Core type definitions shared across the combat engine

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for combatants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantId(pub Uuid);

impl CombatantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CombatantId {
    fn default() -> Self {
        Self::new()
    }
}

/// A cell on the battle grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance - diagonals count as one step
    pub fn distance(&self, other: &Self) -> u32 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        dx.max(dy) as u32
    }

    /// Unit step vector from this cell toward another (each axis clamped to -1..=1)
    pub fn step_toward(&self, other: &Self) -> (i32, i32) {
        ((other.x - self.x).signum(), (other.y - self.y).signum())
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Facing direction of a combatant (8-way)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    #[default]
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Facing {
    /// Unit offset for this facing
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Facing::North => (0, -1),
            Facing::NorthEast => (1, -1),
            Facing::East => (1, 0),
            Facing::SouthEast => (1, 1),
            Facing::South => (0, 1),
            Facing::SouthWest => (-1, 1),
            Facing::West => (-1, 0),
            Facing::NorthWest => (-1, -1),
        }
    }

    /// Facing for a unit step vector, `None` for a zero vector
    pub fn from_offset(dx: i32, dy: i32) -> Option<Facing> {
        match (dx.signum(), dy.signum()) {
            (0, -1) => Some(Facing::North),
            (1, -1) => Some(Facing::NorthEast),
            (1, 0) => Some(Facing::East),
            (1, 1) => Some(Facing::SouthEast),
            (0, 1) => Some(Facing::South),
            (-1, 1) => Some(Facing::SouthWest),
            (-1, 0) => Some(Facing::West),
            (-1, -1) => Some(Facing::NorthWest),
            _ => None,
        }
    }

    /// The two facings 45 degrees off this one
    pub fn adjacent(&self) -> (Facing, Facing) {
        match self {
            Facing::North => (Facing::NorthWest, Facing::NorthEast),
            Facing::NorthEast => (Facing::North, Facing::East),
            Facing::East => (Facing::NorthEast, Facing::SouthEast),
            Facing::SouthEast => (Facing::East, Facing::South),
            Facing::South => (Facing::SouthEast, Facing::SouthWest),
            Facing::SouthWest => (Facing::South, Facing::West),
            Facing::West => (Facing::SouthWest, Facing::NorthWest),
            Facing::NorthWest => (Facing::West, Facing::North),
        }
    }

    pub fn opposite(&self) -> Facing {
        match self {
            Facing::North => Facing::South,
            Facing::NorthEast => Facing::SouthWest,
            Facing::East => Facing::West,
            Facing::SouthEast => Facing::NorthWest,
            Facing::South => Facing::North,
            Facing::SouthWest => Facing::NorthEast,
            Facing::West => Facing::East,
            Facing::NorthWest => Facing::SouthEast,
        }
    }
}

/// Body size category - gates shoves and ranged to-hit bonuses
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Size {
    Small,
    #[default]
    Normal,
    Large,
    ExtraLarge,
}

impl Size {
    /// Large and extra-large bodies cannot be displaced and are easier to shoot
    pub fn is_large(&self) -> bool {
        matches!(self, Size::Large | Size::ExtraLarge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chebyshev_distance() {
        let a = Cell::new(0, 0);
        assert_eq!(a.distance(&Cell::new(3, 1)), 3);
        assert_eq!(a.distance(&Cell::new(-2, -2)), 2);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_step_toward_clamps_to_unit() {
        let a = Cell::new(0, 0);
        assert_eq!(a.step_toward(&Cell::new(5, 0)), (1, 0));
        assert_eq!(a.step_toward(&Cell::new(-4, 3)), (-1, 1));
    }

    #[test]
    fn test_facing_opposite() {
        assert_eq!(Facing::North.opposite(), Facing::South);
        assert_eq!(Facing::NorthEast.opposite(), Facing::SouthWest);
    }

    #[test]
    fn test_large_sizes() {
        assert!(Size::Large.is_large());
        assert!(Size::ExtraLarge.is_large());
        assert!(!Size::Normal.is_large());
    }
}
