//! Static host for the engine: pages parsed with `scraper`, no script execution.

mod document;
mod style;

pub use document::{ClickedElement, StaticDocument, StaticElement};
pub use style::InlineStyle;

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info};
use unbanner_core::{
    Catalog, DomError, EngineReport, EngineState, NullReporter, PageWorker, TriggerOutcome, Visit,
    VisitReport, trigger,
};

/// Fetches pages over HTTP and runs a single check against the served markup.
///
/// Nothing in the fetched page executes, so banners injected by script are
/// invisible to it; the click only lands in the in-memory tree.
pub struct ParserWorker {
    client: Client,
    catalog: Arc<Catalog>,
}

impl ParserWorker {
    pub fn new() -> Self {
        Self::with_catalog(Arc::new(Catalog::builtin()))
    }

    pub fn with_catalog(catalog: Arc<Catalog>) -> Self {
        Self {
            client: Client::new(),
            catalog,
        }
    }

    /// Run one check over already fetched markup.
    pub async fn inspect(&self, url: &str, html: &str) -> EngineReport {
        let document = StaticDocument::parse(html).with_url(url);
        let mut state = EngineState::new();
        let outcome = trigger(&mut state, &document, &self.catalog, &NullReporter, 1).await;
        debug!(url, ?outcome, "static check finished");

        let matched = match outcome {
            TriggerOutcome::Rejected(source) | TriggerOutcome::Blocked(source) => Some(source),
            _ => None,
        };
        EngineReport::from_state(&state, matched)
    }
}

impl Default for ParserWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl PageWorker for ParserWorker {
    async fn execute(&self, visit: &Visit) -> Result<VisitReport, DomError> {
        let html = self
            .client
            .get(&visit.url)
            .send()
            .await
            .map_err(|e| DomError::fetch_error(e.to_string()))?
            .text()
            .await
            .map_err(|e| DomError::fetch_error(e.to_string()))?;

        let engine = self.inspect(&visit.url, &html).await;
        info!(visit = %visit.id, url = %visit.url, activated = engine.activated, "page inspected");

        Ok(VisitReport {
            visit_id: visit.id.clone(),
            url: visit.url.clone(),
            engine,
        })
    }
}
