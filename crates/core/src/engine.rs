use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Catalog, Document, MatchSource, Reporter, activate, find_candidate};

/// Per page-load engine state. Created fresh for every load.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EngineState {
    has_activated: bool,
    attempts_made: u32,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_activated(&self) -> bool {
        self.has_activated
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    /// Count a trigger. Returns `false` once the budget of `max_attempts` is spent;
    /// the counter itself never exceeds it.
    pub fn begin_attempt(&mut self, max_attempts: u32) -> bool {
        if self.attempts_made >= max_attempts {
            return false;
        }
        self.attempts_made += 1;
        true
    }

    /// Activated, or no attempts left.
    pub fn is_done(&self, max_attempts: u32) -> bool {
        self.has_activated || self.attempts_made >= max_attempts
    }

    // Only the activator flips this.
    pub(crate) fn mark_activated(&mut self) {
        self.has_activated = true;
    }
}

/// What a single trigger did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A previous trigger already clicked.
    AlreadyDone,
    /// Attempt budget spent; no document work was done.
    Exhausted,
    NoMatch,
    /// Candidate found and clicked.
    Rejected(MatchSource),
    /// Candidate found but not clickable right now.
    Blocked(MatchSource),
}

/// Summary of one page load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineReport {
    pub activated: bool,
    pub attempts: u32,
    /// Last candidate found, clicked or not.
    pub matched: Option<MatchSource>,
}

impl EngineReport {
    pub fn from_state(state: &EngineState, matched: Option<MatchSource>) -> Self {
        Self {
            activated: state.has_activated(),
            attempts: state.attempts_made(),
            matched,
        }
    }
}

/// One trigger: budget check, match, then activate.
pub async fn trigger<D, R>(
    state: &mut EngineState,
    document: &D,
    catalog: &Catalog,
    reporter: &R,
    max_attempts: u32,
) -> TriggerOutcome
where
    D: Document,
    R: Reporter + ?Sized,
{
    if state.has_activated() {
        return TriggerOutcome::AlreadyDone;
    }
    if !state.begin_attempt(max_attempts) {
        return TriggerOutcome::Exhausted;
    }

    let Some(candidate) = find_candidate(document, catalog).await else {
        debug!(attempt = state.attempts_made(), "no reject control found");
        return TriggerOutcome::NoMatch;
    };

    if activate(state, document, Some(&candidate), reporter).await {
        TriggerOutcome::Rejected(candidate.source)
    } else {
        TriggerOutcome::Blocked(candidate.source)
    }
}
