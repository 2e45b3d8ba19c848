//! Per-turn status effect ticks
//!
//! Runs once at the start of the owning combatant's turn, before any other
//! turn logic. Each category has its own tick behavior; positive durations
//! then count down and expire at zero.

use serde::{Deserialize, Serialize};

use crate::combat::combatant::{Attribute, CombatStance, Combatant};
use crate::combat::status::StatusCategory;
use crate::dice::{DiceProvider, RollReply};

/// What one effect did during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub category: StatusCategory,
    pub damage: u32,
    pub removed: bool,
    pub narrative: String,
}

/// Escape test result: cleared, still held, or roll declined
enum Escape {
    Cleared,
    Held,
}

/// Roll an escape test against a threshold. A declined roll counts as not
/// attempting the escape, which leaves the combatant held.
fn escape_test(dice: &mut dyn DiceProvider, threshold: u32) -> Escape {
    match dice.d100() {
        RollReply::Rolled(roll) if roll <= threshold => Escape::Cleared,
        _ => Escape::Held,
    }
}

/// Tick every active status on a combatant, in category order
pub fn tick_statuses(c: &mut Combatant, dice: &mut dyn DiceProvider) -> Vec<TickReport> {
    let mut reports = Vec::new();

    for category in c.statuses.categories() {
        let mut damage = 0u32;
        let mut removed = false;
        let mut narrative;

        match category {
            StatusCategory::Poisoned | StatusCategory::Diseased | StatusCategory::Burning => {
                damage = c
                    .statuses
                    .get(category)
                    .and_then(|e| e.damage)
                    .unwrap_or(1);
                c.take_damage(damage);
                narrative = format!("{} suffers {} damage", c.name, damage);
            }

            StatusCategory::Stunned => {
                c.action_points = c.action_points.saturating_sub(1);
                narrative = format!("{} is stunned and loses an action", c.name);
            }

            StatusCategory::Entangled => {
                // Escalating damage: base times ticks elapsed
                if let Some(effect) = c.statuses.get_mut(category) {
                    effect.progress += 1;
                    damage = effect.damage.unwrap_or(1) * effect.progress as u32;
                }
                c.take_damage(damage);
                narrative = format!("the vines tighten around {} for {} damage", c.name, damage);
            }

            StatusCategory::Pit => match escape_test(dice, c.attribute(Attribute::Dexterity)) {
                Escape::Cleared => {
                    c.statuses.remove(category);
                    removed = true;
                    narrative = format!("{} climbs out of the pit", c.name);
                }
                Escape::Held => {
                    c.action_points = 0;
                    narrative = format!("{} struggles in the pit", c.name);
                }
            },

            StatusCategory::Incapacitated | StatusCategory::Seduced => {
                match escape_test(dice, c.attribute(Attribute::Resolve)) {
                    Escape::Cleared => {
                        c.statuses.remove(category);
                        removed = true;
                        narrative = format!("{} shakes it off", c.name);
                    }
                    Escape::Held => {
                        c.action_points = 0;
                        narrative = format!("{} cannot act", c.name);
                    }
                }
            }

            StatusCategory::Petrified => {
                c.action_points = 0;
                narrative = format!("{} is stone", c.name);
            }

            StatusCategory::BeingSwallowed => {
                let stage = c.statuses.get(category).map(|e| e.progress).unwrap_or(0);
                let strength = c.attribute(Attribute::Strength);
                // First threshold at full strength, second at half
                let threshold = if stage == 0 { strength } else { strength / 2 };

                if stage >= 2 {
                    // Terminal: already fully swallowed
                    c.action_points = 0;
                    narrative = format!("{} has been fully swallowed", c.name);
                } else {
                    match escape_test(dice, threshold) {
                        Escape::Cleared => {
                            c.statuses.remove(category);
                            removed = true;
                            narrative = format!("{} wrenches free of the maw", c.name);
                        }
                        Escape::Held => {
                            c.action_points = 0;
                            if let Some(effect) = c.statuses.get_mut(category) {
                                effect.progress += 1;
                            }
                            if stage + 1 >= 2 {
                                // Swallowed whole: gone from the battlefield
                                c.position = None;
                                narrative = format!("{} is swallowed whole", c.name);
                            } else {
                                narrative = format!("{} is dragged deeper", c.name);
                            }
                        }
                    }
                }
            }

            // Passive while active; duration bookkeeping below
            StatusCategory::Prone | StatusCategory::Fear | StatusCategory::Frenzy => {
                narrative = format!("{} remains {:?}", c.name, category);
            }
        }

        // Duration countdown for effects still present
        if !removed {
            if let Some(effect) = c.statuses.get_mut(category) {
                if effect.duration > 0 {
                    effect.duration -= 1;
                }
                if effect.duration == 0 {
                    c.statuses.remove(category);
                    removed = true;
                    if category == StatusCategory::Prone && c.stance == CombatStance::Prone {
                        c.stance = CombatStance::Normal;
                    }
                    narrative = format!("{}: {:?} wears off", c.name, category);
                }
            }
        }

        reports.push(TickReport {
            category,
            damage,
            removed,
            narrative,
        });
    }

    reports
}
