use async_trait::async_trait;
use chromiumoxide::cdp::js_protocol::runtime::{AddBindingParams, EventBindingCalled};
use chromiumoxide::page::Page;
use futures::StreamExt;
use futures::stream::LocalBoxStream;
use serde_json::json;
use tracing::debug;
use unbanner_core::DomError;
use unbanner_scheduler::{MutationBatch, MutationWatch, StreamWatch};

use crate::shared::{js, to_dom_error};

const BINDING: &str = "__unbannerMutations";

/// Observer installed in the page, reporting back through a runtime binding.
pub struct ChromiumWatch {
    page: Page,
    batches: StreamWatch<LocalBoxStream<'static, MutationBatch>>,
}

impl ChromiumWatch {
    /// Register the binding, subscribe to its calls, then start observing.
    pub async fn install(page: &Page) -> Result<Self, DomError> {
        page.execute(AddBindingParams::new(BINDING))
            .await
            .map_err(|e| to_dom_error(e, "add binding"))?;

        let events = page
            .event_listener::<EventBindingCalled>()
            .await
            .map_err(|e| to_dom_error(e, "binding listener"))?;
        let batches = events
            .filter_map(|event| async move {
                if event.name != BINDING {
                    return None;
                }
                Some(MutationBatch::inserted(parse_added(&event.payload)))
            })
            .boxed_local();

        let installed = page
            .evaluate(js::build_js_call(js::observer::INSTALL_OBSERVER, &[json!(BINDING)]))
            .await
            .map_err(|e| to_dom_error(e, "install observer"))?;
        debug!(installed = ?installed.value(), "mutation observer");

        Ok(Self {
            page: page.clone(),
            batches: StreamWatch::new(batches),
        })
    }
}

fn parse_added(payload: &str) -> usize {
    payload.trim().parse().unwrap_or(0)
}

#[async_trait(?Send)]
impl MutationWatch for ChromiumWatch {
    async fn next_batch(&mut self) -> Option<MutationBatch> {
        self.batches.next_batch().await
    }

    async fn disconnect(&mut self) {
        self.batches.disconnect().await;
        if let Err(e) = self
            .page
            .evaluate(js::build_js_call(js::observer::DISCONNECT_OBSERVER, &[]))
            .await
        {
            debug!(error = %e, "observer disconnect failed");
        }
    }
}
