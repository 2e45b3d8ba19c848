pub mod error;
pub mod types;

pub use error::{CombatError, Result};
pub use types::{Cell, CombatantId, Facing, Size};
