//! Presentation hooks. The engine reports what happened; a front end
//! decides how to show it.

use crate::{ActionOutcome, MatchState, Outcome};

/// Observer of match progress. All methods default to no-ops so a view
/// only implements what it cares about.
pub trait MatchView {
    fn match_started(&mut self, state: &MatchState) {
        let _ = state;
    }

    /// Called after every resolved turn, local or remote, with the state
    /// already updated.
    fn turn_resolved(&mut self, actor: &str, outcome: &ActionOutcome, state: &MatchState) {
        let _ = (actor, outcome, state);
    }

    fn match_ended(&mut self, outcome: &Outcome) {
        let _ = outcome;
    }
}

/// A view that renders nothing. Used in tests and headless runs.
pub struct SilentView;

impl MatchView for SilentView {}
