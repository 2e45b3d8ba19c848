//! Special-attack capability interface
//!
//! Monster abilities depend on this trait directly instead of subscribing
//! to attack-resolution events, so the wiring is one-directional. All of
//! these restrict the defender to the dodge reaction.

use crate::combat::attack::{resolve_attack_with_options, AttackOutcome, AttackResult};
use crate::combat::context::CombatContext;
use crate::combat::defense::DefenseOptions;
use crate::combat::roster::Roster;
use crate::combat::shove::resolve_shove;
use crate::combat::status::{apply_status, ActiveStatusEffect, StatusCategory};
use crate::core::error::Result;
use crate::core::types::CombatantId;
use crate::dice::DiceProvider;
use crate::spatial::PositionQuery;

/// Special attacks the resolution pipeline offers to ability components
pub trait SpecialAttacks {
    /// Kick: a plain strike that chains into a shove attempt
    fn resolve_kick(
        &self,
        roster: &mut Roster,
        grid: &mut dyn PositionQuery,
        dice: &mut dyn DiceProvider,
        attacker: CombatantId,
        target: CombatantId,
    ) -> Result<AttackResult>;

    /// Spit: dodge-only ranged strike that poisons on a damaging hit
    fn resolve_spit(
        &self,
        roster: &mut Roster,
        grid: &mut dyn PositionQuery,
        dice: &mut dyn DiceProvider,
        attacker: CombatantId,
        target: CombatantId,
    ) -> Result<AttackResult>;

    /// Tongue: dodge-only grab that entangles on a damaging hit
    fn resolve_tongue(
        &self,
        roster: &mut Roster,
        grid: &mut dyn PositionQuery,
        dice: &mut dyn DiceProvider,
        attacker: CombatantId,
        target: CombatantId,
    ) -> Result<AttackResult>;

    /// Sweeping strike: dodge-only blow that knocks the target prone
    fn resolve_sweep(
        &self,
        roster: &mut Roster,
        grid: &mut dyn PositionQuery,
        dice: &mut dyn DiceProvider,
        attacker: CombatantId,
        target: CombatantId,
    ) -> Result<AttackResult>;
}

/// The standard pipeline's implementation of the capability interface
#[derive(Debug, Default)]
pub struct AttackPipeline;

impl AttackPipeline {
    fn dodge_only_with_status(
        &self,
        roster: &mut Roster,
        grid: &mut dyn PositionQuery,
        dice: &mut dyn DiceProvider,
        attacker: CombatantId,
        target: CombatantId,
        effect: ActiveStatusEffect,
    ) -> Result<AttackResult> {
        let result = resolve_attack_with_options(
            roster,
            grid,
            dice,
            attacker,
            target,
            CombatContext::default(),
            DefenseOptions::DodgeOnly,
        )?;
        if result.outcome == AttackOutcome::Hit && result.damage_dealt > 0 {
            apply_status(roster.get_mut(target)?, effect, dice);
        }
        Ok(result)
    }
}

impl SpecialAttacks for AttackPipeline {
    fn resolve_kick(
        &self,
        roster: &mut Roster,
        grid: &mut dyn PositionQuery,
        dice: &mut dyn DiceProvider,
        attacker: CombatantId,
        target: CombatantId,
    ) -> Result<AttackResult> {
        let mut result = resolve_attack_with_options(
            roster,
            grid,
            dice,
            attacker,
            target,
            CombatContext::default(),
            DefenseOptions::All,
        )?;
        if result.outcome == AttackOutcome::Hit && result.damage_dealt > 0 {
            result.shove = Some(resolve_shove(roster, grid, dice, attacker, target, false)?);
        }
        Ok(result)
    }

    fn resolve_spit(
        &self,
        roster: &mut Roster,
        grid: &mut dyn PositionQuery,
        dice: &mut dyn DiceProvider,
        attacker: CombatantId,
        target: CombatantId,
    ) -> Result<AttackResult> {
        self.dodge_only_with_status(
            roster,
            grid,
            dice,
            attacker,
            target,
            ActiveStatusEffect::new(StatusCategory::Poisoned, 3).with_damage(1),
        )
    }

    fn resolve_tongue(
        &self,
        roster: &mut Roster,
        grid: &mut dyn PositionQuery,
        dice: &mut dyn DiceProvider,
        attacker: CombatantId,
        target: CombatantId,
    ) -> Result<AttackResult> {
        self.dodge_only_with_status(
            roster,
            grid,
            dice,
            attacker,
            target,
            ActiveStatusEffect::new(StatusCategory::Entangled, 2).with_damage(2),
        )
    }

    fn resolve_sweep(
        &self,
        roster: &mut Roster,
        grid: &mut dyn PositionQuery,
        dice: &mut dyn DiceProvider,
        attacker: CombatantId,
        target: CombatantId,
    ) -> Result<AttackResult> {
        let result = resolve_attack_with_options(
            roster,
            grid,
            dice,
            attacker,
            target,
            CombatContext::default(),
            DefenseOptions::DodgeOnly,
        )?;
        if result.outcome == AttackOutcome::Hit && result.damage_dealt > 0 {
            crate::combat::status::force_status(
                roster.get_mut(target)?,
                ActiveStatusEffect::new(StatusCategory::Prone, 1),
            );
        }
        Ok(result)
    }
}
