//! Battle roster: the combatants taking part in the current battle
//!
//! Insertion order is the deterministic tie-break used when picking which
//! combatant of a drawn category acts.

use serde::{Deserialize, Serialize};

use crate::combat::combatant::{Combatant, ControlKind};
use crate::core::error::{CombatError, Result};
use crate::core::types::{Cell, CombatantId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    combatants: Vec<Combatant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, combatant: Combatant) -> CombatantId {
        let id = combatant.id;
        self.combatants.push(combatant);
        id
    }

    pub fn get(&self, id: CombatantId) -> Result<&Combatant> {
        self.combatants
            .iter()
            .find(|c| c.id == id)
            .ok_or(CombatError::CombatantNotFound(id))
    }

    pub fn get_mut(&mut self, id: CombatantId) -> Result<&mut Combatant> {
        self.combatants
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CombatError::CombatantNotFound(id))
    }

    /// Distinct mutable borrows of two combatants
    pub fn pair_mut(
        &mut self,
        a: CombatantId,
        b: CombatantId,
    ) -> Result<(&mut Combatant, &mut Combatant)> {
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        if ia == ib {
            return Err(CombatError::InvalidSetup(
                "a combatant cannot target itself".into(),
            ));
        }
        if ia < ib {
            let (left, right) = self.combatants.split_at_mut(ib);
            Ok((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.combatants.split_at_mut(ia);
            Ok((&mut right[0], &mut left[ib]))
        }
    }

    fn index_of(&self, id: CombatantId) -> Result<usize> {
        self.combatants
            .iter()
            .position(|c| c.id == id)
            .ok_or(CombatError::CombatantNotFound(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.combatants.iter_mut()
    }

    /// Combatant standing on a cell, if any
    pub fn at_cell(&self, cell: Cell) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.position == Some(cell))
    }

    /// Living, on-the-field combatants of a control category
    pub fn active_of(&self, control: ControlKind) -> impl Iterator<Item = &Combatant> {
        self.combatants
            .iter()
            .filter(move |c| c.control == control && c.is_active())
    }

    /// First active combatant of a category with action points left,
    /// in insertion order
    pub fn next_actor(&self, control: ControlKind) -> Option<CombatantId> {
        self.combatants
            .iter()
            .find(|c| c.control == control && c.is_active() && c.action_points > 0)
            .map(|c| c.id)
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_mut_borrows_both() {
        let mut roster = Roster::new();
        let a = roster.add(Combatant::new(
            "a",
            ControlKind::PlayerControlled,
            Cell::new(0, 0),
        ));
        let b = roster.add(Combatant::new(
            "b",
            ControlKind::AIControlled,
            Cell::new(1, 0),
        ));

        let (ca, cb) = roster.pair_mut(a, b).unwrap();
        ca.hit_points = 5;
        cb.hit_points = 7;
        assert_eq!(roster.get(a).unwrap().hit_points, 5);
        assert_eq!(roster.get(b).unwrap().hit_points, 7);
    }

    #[test]
    fn test_pair_mut_rejects_self_target() {
        let mut roster = Roster::new();
        let a = roster.add(Combatant::new(
            "a",
            ControlKind::PlayerControlled,
            Cell::new(0, 0),
        ));
        assert!(roster.pair_mut(a, a).is_err());
    }

    #[test]
    fn test_next_actor_insertion_order() {
        let mut roster = Roster::new();
        let first = roster.add(Combatant::new(
            "first",
            ControlKind::AIControlled,
            Cell::new(0, 0),
        ));
        let second = roster.add(Combatant::new(
            "second",
            ControlKind::AIControlled,
            Cell::new(1, 0),
        ));

        assert_eq!(roster.next_actor(ControlKind::AIControlled), Some(first));

        roster.get_mut(first).unwrap().action_points = 0;
        assert_eq!(roster.next_actor(ControlKind::AIControlled), Some(second));

        roster.get_mut(second).unwrap().hit_points = 0;
        assert_eq!(roster.next_actor(ControlKind::AIControlled), None);
    }
}
