//! Presentation hooks
//!
//! Fire-and-forget: the rules never read anything back from these calls.
//! A hosting UI draws floating text and highlights; the harness logs.

use crate::core::types::Cell;

/// Short annotation shown at a battlefield cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Miss,
    Damage(u32),
    Dodged,
    Parried,
    StatusApplied(String),
    Death,
}

/// Sink for combat presentation events
pub trait CombatPresenter {
    /// Annotate a cell with a combat outcome
    fn annotate(&mut self, cell: Cell, annotation: Annotation);

    /// Narrate a line for the battle log
    fn narrate(&mut self, line: &str);
}

/// Discards everything
#[derive(Debug, Default)]
pub struct NullPresenter;

impl CombatPresenter for NullPresenter {
    fn annotate(&mut self, _cell: Cell, _annotation: Annotation) {}
    fn narrate(&mut self, _line: &str) {}
}

/// Routes narration through `tracing`
#[derive(Debug, Default)]
pub struct TracingPresenter;

impl CombatPresenter for TracingPresenter {
    fn annotate(&mut self, cell: Cell, annotation: Annotation) {
        tracing::debug!(x = cell.x, y = cell.y, ?annotation, "annotate");
    }

    fn narrate(&mut self, line: &str) {
        tracing::info!("{}", line);
    }
}

/// Collects narration for inspection (tests, JSON reports)
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub lines: Vec<String>,
    pub annotations: Vec<(Cell, Annotation)>,
}

impl CombatPresenter for RecordingPresenter {
    fn annotate(&mut self, cell: Cell, annotation: Annotation) {
        self.annotations.push((cell, annotation));
    }

    fn narrate(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_presenter_keeps_order() {
        let mut presenter = RecordingPresenter::default();
        presenter.narrate("first");
        presenter.annotate(Cell::new(1, 2), Annotation::Damage(4));
        presenter.narrate("second");
        assert_eq!(presenter.lines, vec!["first", "second"]);
        assert_eq!(
            presenter.annotations,
            vec![(Cell::new(1, 2), Annotation::Damage(4))]
        );
    }
}
