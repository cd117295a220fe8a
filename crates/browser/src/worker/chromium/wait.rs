use chromiumoxide::page::Page;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};
use unbanner_core::DomError;

use crate::shared::{TimeoutConfig, js, to_dom_error};

const REQUIRED_STABLE_CHECKS: u32 = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadingState {
    ready_state: String,
    active_requests: u64,
}

pub struct WaitStrategy {
    config: TimeoutConfig,
}

impl WaitStrategy {
    pub fn new(config: TimeoutConfig) -> Self {
        Self { config }
    }

    /// Wait until the document is complete with no pending requests for a few
    /// consecutive checks. Gives up quietly after `page_stable`.
    pub async fn wait_for_stable(&self, page: &Page) -> Result<(), DomError> {
        let start = Instant::now();
        let mut stable_checks = 0;

        loop {
            let result = match page.evaluate(js::build_js_call(js::wait::CHECK_LOADING, &[])).await {
                Ok(r) => r,
                Err(e) => {
                    let err = to_dom_error(e, "wait for stable");
                    if err.category != unbanner_core::ErrorCategory::Detached {
                        return Err(err);
                    }
                    debug!("page context changed, waiting");
                    stable_checks = 0;
                    sleep(self.config.check_interval).await;
                    continue;
                }
            };

            let state = result
                .value()
                .and_then(|v| v.as_str())
                .and_then(|raw| serde_json::from_str::<LoadingState>(raw).ok());
            match state {
                Some(state) if state.ready_state == "complete" && state.active_requests == 0 => {
                    stable_checks += 1;
                    if stable_checks >= REQUIRED_STABLE_CHECKS {
                        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "page stable");
                        if self.config.settle_delay > Duration::ZERO {
                            sleep(self.config.settle_delay).await;
                        }
                        return Ok(());
                    }
                }
                _ => stable_checks = 0,
            }

            if start.elapsed() > self.config.page_stable {
                warn!("page did not stabilize, continuing anyway");
                return Ok(());
            }
            sleep(self.config.check_interval).await;
        }
    }
}
