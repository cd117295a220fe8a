use tracing::{debug, info};

use crate::{Candidate, Document, EngineEvent, EngineState, Reporter};

/// Click `candidate` if it is still on screen and nothing was clicked yet.
///
/// The element is re-inspected right before the click since host scripts may
/// have hidden or removed it since it was matched. Host failures are treated as
/// a failed attempt and never escape. Returns `true` only for the one click
/// that flips `state` to activated.
pub async fn activate<D, R>(
    state: &mut EngineState,
    document: &D,
    candidate: Option<&Candidate<D::Element>>,
    reporter: &R,
) -> bool
where
    D: Document,
    R: Reporter + ?Sized,
{
    let Some(candidate) = candidate else {
        return false;
    };
    if state.has_activated() {
        return false;
    }

    let element_state = match document.element_state(&candidate.element).await {
        Ok(element_state) => element_state,
        Err(e) => {
            debug!(source = %candidate.source, error = %e, "candidate state unavailable");
            return false;
        }
    };
    if !element_state.is_activatable() {
        debug!(source = %candidate.source, ?element_state, "candidate not visible");
        return false;
    }

    if let Err(e) = document.click(&candidate.element).await {
        debug!(source = %candidate.source, error = %e, "click dispatch failed");
        return false;
    }

    state.mark_activated();
    info!(source = %candidate.source, "cookie banner rejected");

    let event = EngineEvent::RejectPerformed {
        url: document.location().await,
    };
    if let Err(e) = reporter.report(&event) {
        debug!(error = %e, "reporter unavailable, dropping event");
    }
    true
}
