//! Positional query service
//!
//! The combat core never walks the dungeon itself; it asks these queries.
//! `SquareGrid` is the in-memory implementation used by the harness and
//! tests. A hosting application may supply its own.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::core::types::{Cell, CombatantId, Facing};

/// Line-of-sight answer for a ranged attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineOfSight {
    pub can_shoot: bool,
    /// Obstacles between shooter and target (each is a to-hit penalty)
    pub obstacles: u32,
}

/// Where a cell lies relative to a combatant's facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativeDirection {
    Front,
    Flank,
    /// One of the three cells directly behind the facing
    Behind,
}

/// Positional queries the combat core depends on
pub trait PositionQuery {
    fn distance(&self, a: Cell, b: Cell) -> u32;

    fn is_adjacent(&self, a: Cell, b: Cell) -> bool {
        self.distance(a, b) == 1
    }

    /// Direction of `observed` relative to a combatant at `from` facing `facing`
    fn relative_direction(&self, facing: Facing, from: Cell, observed: Cell) -> RelativeDirection;

    fn line_of_sight(&self, from: Cell, to: Cell) -> LineOfSight;

    /// Cells adjacent to `cell` that exist on the map
    fn neighbors(&self, cell: Cell) -> Vec<Cell>;

    /// True when the cell exists and is not a wall
    fn is_walkable(&self, cell: Cell) -> bool;

    fn occupant(&self, cell: Cell) -> Option<CombatantId>;

    /// Move an actor to a cell; false when the cell is blocked or occupied
    fn move_to(&mut self, actor: CombatantId, cell: Cell) -> bool;

    /// Remove an actor from the map entirely (swallowed, dead)
    fn remove(&mut self, actor: CombatantId);
}

/// Relative direction from facing and a step vector
///
/// Behind is the facing's opposite and the two facings 45 degrees off it,
/// matching the three-cell blind arc of the zone of control.
pub fn classify_direction(facing: Facing, from: Cell, observed: Cell) -> RelativeDirection {
    let (dx, dy) = from.step_toward(&observed);
    let Some(toward) = Facing::from_offset(dx, dy) else {
        return RelativeDirection::Front; // same cell, degenerate
    };

    let rear = facing.opposite();
    let (rear_a, rear_b) = rear.adjacent();
    if toward == rear || toward == rear_a || toward == rear_b {
        return RelativeDirection::Behind;
    }

    let (front_a, front_b) = facing.adjacent();
    if toward == facing || toward == front_a || toward == front_b {
        RelativeDirection::Front
    } else {
        RelativeDirection::Flank
    }
}

/// In-memory square battle grid with walls and occupancy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SquareGrid {
    pub width: i32,
    pub height: i32,
    walls: AHashSet<Cell>,
    occupancy: AHashMap<Cell, CombatantId>,
    positions: AHashMap<CombatantId, Cell>,
}

impl SquareGrid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn add_wall(&mut self, cell: Cell) {
        self.walls.insert(cell);
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    /// Place an actor at battle start. False if the cell is taken.
    pub fn place(&mut self, actor: CombatantId, cell: Cell) -> bool {
        if !self.is_walkable(cell) || self.occupancy.contains_key(&cell) {
            return false;
        }
        self.occupancy.insert(cell, actor);
        self.positions.insert(actor, cell);
        true
    }

    pub fn position_of(&self, actor: CombatantId) -> Option<Cell> {
        self.positions.get(&actor).copied()
    }

    /// Walls strictly between two cells along a stepped line
    fn count_obstacles(&self, from: Cell, to: Cell) -> u32 {
        let mut current = from;
        let mut obstacles = 0;
        while current != to {
            let (dx, dy) = current.step_toward(&to);
            current = current.offset(dx, dy);
            if current == to {
                break;
            }
            if self.walls.contains(&current) {
                obstacles += 1;
            }
        }
        obstacles
    }
}

impl PositionQuery for SquareGrid {
    fn distance(&self, a: Cell, b: Cell) -> u32 {
        a.distance(&b)
    }

    fn relative_direction(&self, facing: Facing, from: Cell, observed: Cell) -> RelativeDirection {
        classify_direction(facing, from, observed)
    }

    fn line_of_sight(&self, from: Cell, to: Cell) -> LineOfSight {
        let obstacles = self.count_obstacles(from, to);
        // Two or more intervening walls block the shot outright
        LineOfSight {
            can_shoot: obstacles < 2,
            obstacles,
        }
    }

    fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        let mut out = Vec::with_capacity(8);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let c = cell.offset(dx, dy);
                if self.in_bounds(c) {
                    out.push(c);
                }
            }
        }
        out
    }

    fn is_walkable(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && !self.walls.contains(&cell)
    }

    fn occupant(&self, cell: Cell) -> Option<CombatantId> {
        self.occupancy.get(&cell).copied()
    }

    fn move_to(&mut self, actor: CombatantId, cell: Cell) -> bool {
        if !self.is_walkable(cell) {
            return false;
        }
        if let Some(other) = self.occupancy.get(&cell) {
            if *other != actor {
                return false;
            }
        }
        if let Some(old) = self.positions.get(&actor) {
            self.occupancy.remove(old);
        }
        self.occupancy.insert(cell, actor);
        self.positions.insert(actor, cell);
        true
    }

    fn remove(&mut self, actor: CombatantId) {
        if let Some(cell) = self.positions.remove(&actor) {
            self.occupancy.remove(&cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behind_arc_is_three_cells() {
        let origin = Cell::new(5, 5);
        // Facing north: behind is south, south-east, south-west
        assert_eq!(
            classify_direction(Facing::North, origin, Cell::new(5, 6)),
            RelativeDirection::Behind
        );
        assert_eq!(
            classify_direction(Facing::North, origin, Cell::new(6, 6)),
            RelativeDirection::Behind
        );
        assert_eq!(
            classify_direction(Facing::North, origin, Cell::new(4, 6)),
            RelativeDirection::Behind
        );
        assert_eq!(
            classify_direction(Facing::North, origin, Cell::new(5, 4)),
            RelativeDirection::Front
        );
        assert_eq!(
            classify_direction(Facing::North, origin, Cell::new(4, 5)),
            RelativeDirection::Flank
        );
    }

    #[test]
    fn test_place_and_move() {
        let mut grid = SquareGrid::new(10, 10);
        let a = CombatantId::new();
        let b = CombatantId::new();

        assert!(grid.place(a, Cell::new(1, 1)));
        assert!(grid.place(b, Cell::new(2, 1)));
        // Cannot move onto an occupied cell
        assert!(!grid.move_to(a, Cell::new(2, 1)));
        assert!(grid.move_to(a, Cell::new(1, 2)));
        assert_eq!(grid.position_of(a), Some(Cell::new(1, 2)));
        assert_eq!(grid.occupant(Cell::new(1, 1)), None);
    }

    #[test]
    fn test_walls_block_walkability_and_count_as_obstacles() {
        let mut grid = SquareGrid::new(10, 1);
        grid.add_wall(Cell::new(3, 0));
        assert!(!grid.is_walkable(Cell::new(3, 0)));

        let los = grid.line_of_sight(Cell::new(0, 0), Cell::new(6, 0));
        assert!(los.can_shoot);
        assert_eq!(los.obstacles, 1);

        grid.add_wall(Cell::new(4, 0));
        let los = grid.line_of_sight(Cell::new(0, 0), Cell::new(6, 0));
        assert!(!los.can_shoot);
        assert_eq!(los.obstacles, 2);
    }

    #[test]
    fn test_remove_clears_occupancy() {
        let mut grid = SquareGrid::new(4, 4);
        let a = CombatantId::new();
        grid.place(a, Cell::new(0, 0));
        grid.remove(a);
        assert_eq!(grid.position_of(a), None);
        assert_eq!(grid.occupant(Cell::new(0, 0)), None);
    }
}
