//! Shove and displacement mechanics
//!
//! Push resolution is a strict priority list: straight back, chain push,
//! the two diagonals off the push vector, then falling prone in place.

use serde::{Deserialize, Serialize};

use crate::combat::constants::SHOVE_DAMAGE_BONUS_SCALE;
use crate::combat::roster::Roster;
use crate::combat::status::{force_status, ActiveStatusEffect, StatusCategory};
use crate::core::error::Result;
use crate::core::types::{Cell, CombatantId, Facing};
use crate::dice::{DiceProvider, RollReply};
use crate::spatial::PositionQuery;

/// How a shove attempt resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShoveOutcome {
    /// Target displaced; `chained` when an occupant was pushed along
    Pushed { to: Cell, chained: bool },
    /// No cell to move into; target knocked prone in place
    FellProne,
    /// Contested roll lost
    Resisted,
    /// Large targets cannot be displaced
    TargetTooLarge,
    /// Non-charge shoves require adjacency
    NotAdjacent,
    /// Attacker or target is off the field
    NoPosition,
    /// Contest roll declined; nothing happened
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoveResult {
    pub outcome: ShoveOutcome,
    pub narrative: String,
}

/// Move a combatant through the grid, keeping its own position in sync
fn relocate(
    roster: &mut Roster,
    grid: &mut dyn PositionQuery,
    id: CombatantId,
    cell: Cell,
) -> Result<bool> {
    if !grid.move_to(id, cell) {
        return Ok(false);
    }
    roster.get_mut(id)?.position = Some(cell);
    Ok(true)
}

/// The two diagonal alternatives 45 degrees off a push vector
fn diagonal_steps(step: (i32, i32)) -> Option<[(i32, i32); 2]> {
    let facing = Facing::from_offset(step.0, step.1)?;
    let (left, right) = facing.adjacent();
    Some([left.offset(), right.offset()])
}

/// Resolve a shove attempt from attacker against target
pub fn resolve_shove(
    roster: &mut Roster,
    grid: &mut dyn PositionQuery,
    dice: &mut dyn DiceProvider,
    attacker_id: CombatantId,
    target_id: CombatantId,
    is_charge: bool,
) -> Result<ShoveResult> {
    let attacker = roster.get(attacker_id)?;
    let target = roster.get(target_id)?;
    let (attacker_name, target_name) = (attacker.name.clone(), target.name.clone());

    let (Some(attacker_pos), Some(target_pos)) = (attacker.position, target.position) else {
        return Ok(ShoveResult {
            outcome: ShoveOutcome::NoPosition,
            narrative: "nothing there to shove".into(),
        });
    };

    if target.size.is_large() {
        return Ok(ShoveResult {
            outcome: ShoveOutcome::TargetTooLarge,
            narrative: format!("{} does not budge", target_name),
        });
    }

    if !is_charge {
        if !grid.is_adjacent(attacker_pos, target_pos) {
            return Ok(ShoveResult {
                outcome: ShoveOutcome::NotAdjacent,
                narrative: format!("{} is out of reach", target_name),
            });
        }

        // Contested: d100 plus scaled damage bonus must beat target dexterity
        let roll = match dice.d100() {
            RollReply::Declined => {
                return Ok(ShoveResult {
                    outcome: ShoveOutcome::Cancelled,
                    narrative: format!("{} holds back", attacker_name),
                });
            }
            RollReply::Rolled(v) => v as i32,
        };
        let attacker_side = roll + attacker.stats.damage_bonus * SHOVE_DAMAGE_BONUS_SCALE;
        if attacker_side <= target.stats.dexterity as i32 {
            return Ok(ShoveResult {
                outcome: ShoveOutcome::Resisted,
                narrative: format!("{} stands firm", target_name),
            });
        }
    }

    let step = attacker_pos.step_toward(&target_pos);
    let straight = target_pos.offset(step.0, step.1);

    // (a) straight push into a free cell
    if grid.is_walkable(straight) && grid.occupant(straight).is_none() {
        relocate(roster, grid, target_id, straight)?;
        return Ok(ShoveResult {
            outcome: ShoveOutcome::Pushed {
                to: straight,
                chained: false,
            },
            narrative: format!("{} is thrown back", target_name),
        });
    }

    // (b) chain push through an occupant
    if grid.is_walkable(straight) {
        if let Some(occupant_id) = grid.occupant(straight) {
            let further = straight.offset(step.0, step.1);
            if grid.is_walkable(further) && grid.occupant(further).is_none() {
                relocate(roster, grid, occupant_id, further)?;
                relocate(roster, grid, target_id, straight)?;
                return Ok(ShoveResult {
                    outcome: ShoveOutcome::Pushed {
                        to: straight,
                        chained: true,
                    },
                    narrative: format!("{} crashes into the one behind", target_name),
                });
            }
        }
    }

    // (c) diagonal alternatives, in fixed order
    if let Some(diagonals) = diagonal_steps(step) {
        for (dx, dy) in diagonals {
            let cell = target_pos.offset(dx, dy);
            if grid.is_walkable(cell) && grid.occupant(cell).is_none() {
                relocate(roster, grid, target_id, cell)?;
                return Ok(ShoveResult {
                    outcome: ShoveOutcome::Pushed {
                        to: cell,
                        chained: false,
                    },
                    narrative: format!("{} stumbles aside", target_name),
                });
            }
        }
    }

    // (d) nowhere to go
    force_status(
        roster.get_mut(target_id)?,
        ActiveStatusEffect::new(StatusCategory::Prone, 1),
    );
    Ok(ShoveResult {
        outcome: ShoveOutcome::FellProne,
        narrative: format!("{} is knocked off their feet", target_name),
    })
}
