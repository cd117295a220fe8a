use serde::{Deserialize, Serialize};

use crate::DomError;

/// Outbound notification sent to the counting collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EngineEvent {
    RejectPerformed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

/// Fire-and-forget sink for [`EngineEvent`]s.
///
/// Implementations must not block. Errors are swallowed by the caller, an
/// unreachable collaborator never undoes or repeats a click.
pub trait Reporter {
    fn report(&self, event: &EngineEvent) -> Result<(), DomError>;
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, event: &EngineEvent) -> Result<(), DomError> {
        (**self).report(event)
    }
}

/// Reporter for hosts with nobody listening.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _event: &EngineEvent) -> Result<(), DomError> {
        Ok(())
    }
}
