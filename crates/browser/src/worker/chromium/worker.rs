use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig, HeadlessMode};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use unbanner_core::{
    BrowserConfig, Catalog, DomError, EngineConfig, EngineReport, PageWorker, Visit, VisitReport,
};
use unbanner_scheduler::{NoWatch, Scheduler};
use unbanner_storage::{ChannelReporter, LogBadge, TabCounter, TabId, TabMessage};

use super::document::ChromiumDocument;
use super::wait::WaitStrategy;
use super::watch::ChromiumWatch;
use crate::shared::TimeoutConfig;

/// Loads each visit in a fresh Chromium and lets the engine work the page.
pub struct ChromiumWorker {
    catalog: Arc<Catalog>,
    engine_config: EngineConfig,
    timeout_config: TimeoutConfig,
}

impl ChromiumWorker {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default(), TimeoutConfig::default())
    }

    pub fn with_config(engine_config: EngineConfig, timeout_config: TimeoutConfig) -> Self {
        Self {
            catalog: Arc::new(Catalog::builtin()),
            engine_config,
            timeout_config,
        }
    }

    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = catalog;
        self
    }

    async fn launch(config: Option<&BrowserConfig>) -> Result<Browser, DomError> {
        let headless = config.is_none_or(|c| c.headless);
        let temp_dir = std::env::temp_dir().join(format!("chromium-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&temp_dir)
            .map_err(|e| DomError::browser_error(format!("Failed to create temp dir: {}", e)))?;

        let mut builder = ChromeConfig::builder()
            .headless_mode(if headless { HeadlessMode::True } else { HeadlessMode::False })
            .user_data_dir(temp_dir);

        if let Some(cfg) = config {
            if let (Some(w), Some(h)) = (cfg.viewport_width, cfg.viewport_height) {
                builder = builder.window_size(w, h);
            }
        }

        let chrome_cfg = builder.build()
            .map_err(|e| DomError::browser_error(format!("Config failed: {}", e)))?;

        let (browser, mut handler) = Browser::launch(chrome_cfg).await
            .map_err(|e| DomError::browser_error(format!("Launch failed: {}", e)))?;

        tokio::spawn(async move { while handler.next().await.is_some() {} });
        Ok(browser)
    }

    /// Run the engine against an already loaded page.
    pub async fn run_engine(&self, document: &ChromiumDocument, reporter: &ChannelReporter) -> EngineReport {
        let scheduler = Scheduler::new(document, reporter, self.catalog.clone(), self.engine_config.clone());
        match ChromiumWatch::install(document.page()).await {
            Ok(watch) => scheduler.run(watch).await,
            Err(e) => {
                warn!(error = %e, "mutation observer unavailable, timed checks only");
                scheduler.run(NoWatch).await
            }
        }
    }

    async fn visit(&self, browser: &Browser, visit: &Visit) -> Result<EngineReport, DomError> {
        let page = browser.new_page("about:blank").await
            .map_err(|e| DomError::browser_error(format!("New page failed: {}", e)))?;

        debug!(visit = %visit.id, url = %visit.url, "navigating");
        tokio::time::timeout(self.timeout_config.navigation, page.goto(visit.url.clone()))
            .await
            .map_err(|_| DomError::timeout_error(format!("Navigation to {} timed out", visit.url)))?
            .map_err(|e| DomError::navigation_error(format!("Navigation failed: {}", e)))?;

        WaitStrategy::new(self.timeout_config.clone()).wait_for_stable(&page).await?;

        let (sender, receiver) = unbanner_storage::channel();
        let tab: TabId = 1;
        let reporter = ChannelReporter::new(Some(tab), sender.clone());
        let counter = tokio::spawn(TabCounter::new(LogBadge).run(receiver));

        let document = ChromiumDocument::new(page);
        let report = self.run_engine(&document, &reporter).await;

        if let Err(e) = sender.send(TabMessage::Removed(tab)) {
            debug!(error = %e, "tab counter gone before tab removal");
        }
        drop(reporter);
        drop(sender);
        if let Err(e) = counter.await {
            debug!(error = %e, "tab counter task ended abnormally");
        }
        Ok(report)
    }
}

impl Default for ChromiumWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl PageWorker for ChromiumWorker {
    async fn execute(&self, visit: &Visit) -> Result<VisitReport, DomError> {
        let mut browser = Self::launch(visit.browser_config.as_ref()).await?;
        let result = self.visit(&browser, visit).await;
        if let Err(e) = browser.close().await {
            debug!(error = %e, "browser close failed");
        }

        let engine = result?;
        info!(
            visit = %visit.id,
            url = %visit.url,
            activated = engine.activated,
            attempts = engine.attempts,
            "visit finished"
        );
        Ok(VisitReport {
            visit_id: visit.id.clone(),
            url: visit.url.clone(),
            engine,
        })
    }
}
