//! Combat resolution rules
//!
//! The battle core: attack and defense resolution, status effects,
//! initiative tokens, shoves, and the round controller that drives them.

pub mod attack;
pub mod combatant;
pub mod constants;
pub mod context;
pub mod defense;
pub mod equipment;
pub mod hit_location;
pub mod initiative;
pub mod presenter;
pub mod roster;
pub mod round;
pub mod shove;
pub mod special;
pub mod status;

pub use attack::{resolve_attack, resolve_attack_with_options, AttackOutcome, AttackResult};
pub use combatant::{CombatStance, Combatant, ControlKind, Stats};
pub use context::CombatContext;
pub use defense::{DefenseOptions, DefenseReaction, DefenseResult};
pub use hit_location::HitLocation;
pub use initiative::{RoundModifiers, TokenDraw, TokenPool};
pub use presenter::{Annotation, CombatPresenter, NullPresenter, RecordingPresenter, TracingPresenter};
pub use roster::Roster;
pub use round::{start_battle, BattleStatus, RoundController, TurnEvent};
pub use shove::{resolve_shove, ShoveOutcome, ShoveResult};
pub use special::{AttackPipeline, SpecialAttacks};
pub use status::{
    apply_status, cure_status, force_status, tick_statuses, ActiveStatusEffect, ApplyOutcome,
    StatusCategory,
};
