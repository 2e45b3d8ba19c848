//! Gloomdelve: combat rules for a grid-based dungeon crawl
//!
//! A deterministic combat-resolution core meant to be embedded in a host
//! application. The host supplies dice (every roll can be prompted and
//! declined), a battlefield implementing [`spatial::PositionQuery`], and a
//! [`combat::CombatPresenter`] sink for narration; the crate owns the rules:
//! percentile to-hit resolution, layered defenses, hit-location armor,
//! status effects, initiative tokens, and the round loop.

pub mod combat;
pub mod core;
pub mod dice;
pub mod spatial;

pub use crate::core::error::{CombatError, Result};
