//! Combat round controller
//!
//! Owns the roster and the token pool, draws the next actor, runs status
//! ticks at the start of each turn, routes actions through the attack
//! pipeline, and detects the end of combat. All state mutation funnels
//! through one turn at a time.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::combat::attack::{resolve_attack, AttackOutcome, AttackResult};
use crate::combat::combatant::{Combatant, ControlKind};
use crate::combat::context::CombatContext;
use crate::combat::initiative::{RoundModifiers, TokenDraw, TokenPool};
use crate::combat::presenter::{Annotation, CombatPresenter};
use crate::combat::roster::Roster;
use crate::combat::status::{tick_statuses, TickReport};
use crate::core::error::{CombatError, Result};
use crate::core::types::CombatantId;
use crate::dice::DiceProvider;
use crate::spatial::PositionQuery;

/// Battle progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleStatus {
    Ongoing,
    /// Every active combatant left belongs to this side
    Won(ControlKind),
    /// Nobody left standing
    MutualDestruction,
}

/// What happened when the controller tried to start the next turn
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    /// The pool is empty; start the next round
    RoundOver,
    /// The draw prompt was declined; the pool still holds its tokens
    DrawDeclined,
    /// A token was drawn but nobody of that category can act
    NoEligibleActor(ControlKind),
    /// An actor is up; ticks have already been applied
    TurnStarted {
        actor: CombatantId,
        ticks: Vec<TickReport>,
    },
    /// The drawn actor lost all action points (or its life) to its ticks
    TurnForfeited {
        actor: CombatantId,
        ticks: Vec<TickReport>,
    },
    /// Combat has ended
    BattleOver(BattleStatus),
}

/// Orchestrates rounds for one battle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundController {
    pub roster: Roster,
    pool: TokenPool,
    round: u32,
    /// Applied only when building the first round's pool
    first_round_modifiers: RoundModifiers,
    status: BattleStatus,
}

impl RoundController {
    pub fn new(mut roster: Roster, first_round_modifiers: RoundModifiers) -> Self {
        for combatant in roster.iter_mut() {
            combatant.reset_battle_flags();
        }
        Self {
            roster,
            pool: TokenPool::default(),
            round: 0,
            first_round_modifiers,
            status: BattleStatus::Ongoing,
        }
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn status(&self) -> BattleStatus {
        self.status
    }

    pub fn pool(&self) -> &TokenPool {
        &self.pool
    }

    /// Inject tokens between draws (external triggers)
    pub fn inject_tokens(&mut self, category: ControlKind, count: u32) {
        self.pool.inject(category, count);
    }

    /// Build the token pool for a new round
    pub fn start_round(&mut self) {
        self.round += 1;
        let modifiers = if self.round == 1 {
            self.first_round_modifiers
        } else {
            RoundModifiers::default()
        };
        self.pool = TokenPool::build_round(&self.roster, &modifiers);
        info!(round = self.round, tokens = self.pool.remaining(), "round started");
    }

    /// Draw the next token and set up that actor's turn
    pub fn next_turn(
        &mut self,
        grid: &mut dyn PositionQuery,
        dice: &mut dyn DiceProvider,
        presenter: &mut dyn CombatPresenter,
    ) -> Result<TurnEvent> {
        if let Some(status) = self.check_end(presenter) {
            return Ok(TurnEvent::BattleOver(status));
        }

        let category = match self.pool.draw_next(dice) {
            TokenDraw::Token(category) => category,
            TokenDraw::Exhausted => return Ok(TurnEvent::RoundOver),
            TokenDraw::Declined => return Ok(TurnEvent::DrawDeclined),
        };

        let Some(actor_id) = self.roster.next_actor(category) else {
            return Ok(TurnEvent::NoEligibleActor(category));
        };

        {
            let actor = self.roster.get_mut(actor_id)?;
            actor.refresh_turn();
        }

        // Status ticks run before anything else the turn does
        let ticks = {
            let actor = self.roster.get_mut(actor_id)?;
            tick_statuses(actor, dice)
        };
        for report in &ticks {
            presenter.narrate(&report.narrative);
            if report.damage > 0 {
                if let Some(cell) = self.roster.get(actor_id)?.position {
                    presenter.annotate(cell, Annotation::Damage(report.damage));
                }
            }
        }
        self.reap(grid, presenter)?;

        let actor = self.roster.get(actor_id)?;
        if !actor.is_active() || actor.action_points == 0 {
            return Ok(TurnEvent::TurnForfeited {
                actor: actor_id,
                ticks,
            });
        }
        Ok(TurnEvent::TurnStarted {
            actor: actor_id,
            ticks,
        })
    }

    /// Run an attack action for the current actor, spending one action point
    pub fn perform_attack(
        &mut self,
        grid: &mut dyn PositionQuery,
        dice: &mut dyn DiceProvider,
        presenter: &mut dyn CombatPresenter,
        attacker_id: CombatantId,
        defender_id: CombatantId,
        context: CombatContext,
    ) -> Result<AttackResult> {
        {
            let attacker = self.roster.get(attacker_id)?;
            if attacker.action_points == 0 {
                return Ok(no_op_result(&attacker.name, "is out of action points"));
            }
            if attacker.position.is_none() {
                return Ok(no_op_result(&attacker.name, "is not on the battlefield"));
            }
        }

        let result = resolve_attack(
            &mut self.roster,
            grid,
            dice,
            attacker_id,
            defender_id,
            context,
        )?;

        // A cancelled attack never happened; the action point is kept
        if result.outcome != AttackOutcome::Cancelled {
            let attacker = self.roster.get_mut(attacker_id)?;
            attacker.action_points = attacker.action_points.saturating_sub(1);
        }

        presenter.narrate(&result.narrative);
        if let Some(cell) = self.roster.get(defender_id)?.position {
            match result.outcome {
                AttackOutcome::Hit if result.damage_dealt > 0 => {
                    presenter.annotate(cell, Annotation::Damage(result.damage_dealt));
                }
                AttackOutcome::Miss => presenter.annotate(cell, Annotation::Miss),
                _ => {}
            }
        }

        self.reap(grid, presenter)?;
        Ok(result)
    }

    /// One-time death hook: remove fallen combatants from the field
    fn reap(
        &mut self,
        grid: &mut dyn PositionQuery,
        presenter: &mut dyn CombatPresenter,
    ) -> Result<()> {
        let fallen: Vec<(CombatantId, Option<crate::core::types::Cell>, String)> = self
            .roster
            .iter()
            .filter(|c| !c.is_alive() && c.position.is_some())
            .map(|c| (c.id, c.position, c.name.clone()))
            .collect();

        for (id, position, name) in fallen {
            info!(combatant = %name, "combatant falls");
            presenter.narrate(&format!("{} falls", name));
            if let Some(cell) = position {
                presenter.annotate(cell, Annotation::Death);
            }
            grid.remove(id);
            self.roster.get_mut(id)?.position = None;
        }

        // Fully-swallowed combatants left the field without dying
        let vanished: Vec<CombatantId> = self
            .roster
            .iter()
            .filter(|c| c.position.is_none())
            .map(|c| c.id)
            .collect();
        for id in vanished {
            grid.remove(id);
        }
        Ok(())
    }

    /// Detect the end of combat and run boundary cleanup once
    fn check_end(&mut self, presenter: &mut dyn CombatPresenter) -> Option<BattleStatus> {
        if self.status != BattleStatus::Ongoing {
            return Some(self.status);
        }

        let players = self
            .roster
            .active_of(ControlKind::PlayerControlled)
            .count();
        let monsters = self.roster.active_of(ControlKind::AIControlled).count();

        let ended = match (players, monsters) {
            (0, 0) => Some(BattleStatus::MutualDestruction),
            (_, 0) => Some(BattleStatus::Won(ControlKind::PlayerControlled)),
            (0, _) => Some(BattleStatus::Won(ControlKind::AIControlled)),
            _ => None,
        };

        if let Some(status) = ended {
            self.status = status;
            for combatant in self.roster.iter_mut() {
                combatant.statuses.clear_after_combat();
            }
            presenter.narrate("the battle is over");
            info!(?status, round = self.round, "battle ended");
        }
        ended
    }
}

fn no_op_result(name: &str, reason: &str) -> AttackResult {
    AttackResult {
        outcome: AttackOutcome::NoOp,
        to_hit_chance: 0,
        roll: None,
        damage_dealt: 0,
        hit_location: None,
        defense: None,
        gear_damaged: None,
        shove: None,
        narrative: format!("{} {}", name, reason),
    }
}

/// Build a combatant roster and controller for a fresh battle
///
/// Both control categories must field at least one active combatant.
pub fn start_battle(
    combatants: Vec<Combatant>,
    modifiers: RoundModifiers,
) -> Result<RoundController> {
    let mut roster = Roster::new();
    for combatant in combatants {
        roster.add(combatant);
    }
    for side in [ControlKind::PlayerControlled, ControlKind::AIControlled] {
        if roster.active_of(side).next().is_none() {
            return Err(CombatError::EmptySide(format!("{:?}", side)));
        }
    }
    Ok(RoundController::new(roster, modifiers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::combatant::Combatant;
    use crate::combat::presenter::RecordingPresenter;
    use crate::combat::status::{force_status, ActiveStatusEffect, StatusCategory};
    use crate::core::types::Cell;
    use crate::dice::{ScriptedDice, SeededDice};
    use crate::spatial::SquareGrid;

    fn small_battle() -> (RoundController, SquareGrid, CombatantId, CombatantId) {
        let mut grid = SquareGrid::new(10, 10);
        let mut hero = Combatant::new("hero", ControlKind::PlayerControlled, Cell::new(1, 1));
        hero.stats.melee_skill = 60;
        let hero_id = hero.id;
        grid.place(hero_id, Cell::new(1, 1));

        let mut ghoul = Combatant::new("ghoul", ControlKind::AIControlled, Cell::new(2, 1));
        ghoul.has_dodged_this_battle = true;
        let ghoul_id = ghoul.id;
        grid.place(ghoul_id, Cell::new(2, 1));

        let controller = start_battle(vec![hero, ghoul], RoundModifiers::default()).unwrap();
        (controller, grid, hero_id, ghoul_id)
    }

    #[test]
    fn test_start_battle_requires_both_sides() {
        let hero = Combatant::new("hero", ControlKind::PlayerControlled, Cell::new(0, 0));
        let result = start_battle(vec![hero], RoundModifiers::default());
        assert!(matches!(result, Err(CombatError::EmptySide(_))));
    }

    #[test]
    fn test_declined_draw_does_not_end_the_round() {
        let (mut controller, mut grid, _h, _g) = small_battle();
        let mut presenter = RecordingPresenter::default();
        controller.start_round();
        assert_eq!(controller.pool().remaining(), 2);

        // The prompt is declined: nobody acts, but the tokens stay
        let mut dice = ScriptedDice::default();
        let event = controller
            .next_turn(&mut grid, &mut dice, &mut presenter)
            .unwrap();
        assert_eq!(event, TurnEvent::DrawDeclined);
        assert_eq!(controller.pool().remaining(), 2);

        // A rolled draw afterwards still starts a turn from the same pool
        let mut dice = SeededDice::new(9);
        let event = controller
            .next_turn(&mut grid, &mut dice, &mut presenter)
            .unwrap();
        assert!(matches!(event, TurnEvent::TurnStarted { .. }));
        assert_eq!(controller.pool().remaining(), 1);
    }

    #[test]
    fn test_round_pool_rebuilt_per_round() {
        let (mut controller, _grid, _h, _g) = small_battle();
        controller.start_round();
        assert_eq!(controller.pool().remaining(), 2);
        controller.start_round();
        assert_eq!(controller.pool().remaining(), 2);
        assert_eq!(controller.round(), 2);
    }

    #[test]
    fn test_empty_pool_means_round_over() {
        let (mut controller, mut grid, _h, _g) = small_battle();
        let mut presenter = RecordingPresenter::default();
        let mut dice = SeededDice::new(3);
        controller.start_round();

        let mut turns = 0;
        loop {
            match controller
                .next_turn(&mut grid, &mut dice, &mut presenter)
                .unwrap()
            {
                TurnEvent::RoundOver => break,
                _ => turns += 1,
            }
        }
        assert_eq!(turns, 2);
    }

    #[test]
    fn test_attack_spends_action_point() {
        let (mut controller, mut grid, hero, ghoul) = small_battle();
        let mut presenter = RecordingPresenter::default();
        controller.start_round();

        let mut dice = ScriptedDice::new(&[55, 4, 3]);
        let result = controller
            .perform_attack(
                &mut grid,
                &mut dice,
                &mut presenter,
                hero,
                ghoul,
                CombatContext::default(),
            )
            .unwrap();
        assert_eq!(result.outcome, AttackOutcome::Hit);
        assert_eq!(controller.roster.get(hero).unwrap().action_points, 1);
        assert!(!presenter.lines.is_empty());
    }

    #[test]
    fn test_no_action_points_is_descriptive_noop() {
        let (mut controller, mut grid, hero, ghoul) = small_battle();
        controller.roster.get_mut(hero).unwrap().action_points = 0;
        let mut presenter = RecordingPresenter::default();
        let mut dice = ScriptedDice::new(&[55]);

        let result = controller
            .perform_attack(
                &mut grid,
                &mut dice,
                &mut presenter,
                hero,
                ghoul,
                CombatContext::default(),
            )
            .unwrap();
        assert_eq!(result.outcome, AttackOutcome::NoOp);
        assert_eq!(dice.remaining(), 1);
    }

    #[test]
    fn test_cancelled_attack_keeps_action_point() {
        let (mut controller, mut grid, hero, ghoul) = small_battle();
        let mut presenter = RecordingPresenter::default();
        let mut dice = ScriptedDice::default(); // declines the to-hit roll

        let result = controller
            .perform_attack(
                &mut grid,
                &mut dice,
                &mut presenter,
                hero,
                ghoul,
                CombatContext::default(),
            )
            .unwrap();
        assert_eq!(result.outcome, AttackOutcome::Cancelled);
        assert_eq!(controller.roster.get(hero).unwrap().action_points, 2);
    }

    #[test]
    fn test_death_hook_fires_once_and_ends_battle() {
        let (mut controller, mut grid, hero, ghoul) = small_battle();
        controller.roster.get_mut(ghoul).unwrap().hit_points = 2;
        let mut presenter = RecordingPresenter::default();
        controller.start_round();

        let mut dice = ScriptedDice::new(&[55, 4, 3]);
        controller
            .perform_attack(
                &mut grid,
                &mut dice,
                &mut presenter,
                hero,
                ghoul,
                CombatContext::default(),
            )
            .unwrap();

        let ghoul_ref = controller.roster.get(ghoul).unwrap();
        assert!(!ghoul_ref.is_alive());
        assert_eq!(ghoul_ref.position, None);
        assert_eq!(grid.position_of(ghoul), None);
        assert_eq!(
            presenter.lines.iter().filter(|l| *l == "ghoul falls").count(),
            1
        );

        let mut dice = SeededDice::new(1);
        let event = controller
            .next_turn(&mut grid, &mut dice, &mut presenter)
            .unwrap();
        assert_eq!(
            event,
            TurnEvent::BattleOver(BattleStatus::Won(ControlKind::PlayerControlled))
        );
    }

    #[test]
    fn test_ticks_run_before_turn_and_can_forfeit() {
        let (mut controller, mut grid, hero, _g) = small_battle();
        force_status(
            controller.roster.get_mut(hero).unwrap(),
            ActiveStatusEffect::new(StatusCategory::Petrified, -1),
        );
        let mut presenter = RecordingPresenter::default();
        controller.start_round();

        // Keep drawing until the hero's token comes up
        let mut dice = SeededDice::new(5);
        loop {
            match controller
                .next_turn(&mut grid, &mut dice, &mut presenter)
                .unwrap()
            {
                TurnEvent::TurnForfeited { actor, ticks } if actor == hero => {
                    assert_eq!(ticks.len(), 1);
                    break;
                }
                TurnEvent::RoundOver => {
                    controller.start_round();
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_battle_boundary_cleanup() {
        let (mut controller, mut grid, hero, ghoul) = small_battle();
        force_status(
            controller.roster.get_mut(hero).unwrap(),
            ActiveStatusEffect::new(StatusCategory::Fear, -1).cleanup_after_combat(),
        );
        controller.roster.get_mut(ghoul).unwrap().hit_points = 0;

        let mut presenter = RecordingPresenter::default();
        let mut dice = SeededDice::new(1);
        let event = controller
            .next_turn(&mut grid, &mut dice, &mut presenter)
            .unwrap();
        assert!(matches!(event, TurnEvent::BattleOver(_)));
        assert!(!controller.roster.get(hero).unwrap().has_status(StatusCategory::Fear));
    }
}
