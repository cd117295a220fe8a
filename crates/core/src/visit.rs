use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{DomError, EngineReport};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport_width: Option<u32>,
    pub viewport_height: Option<u32>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: None,
            viewport_height: None,
        }
    }
}

/// One page load to run the engine against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub id: String,
    pub url: String,
    pub browser_config: Option<BrowserConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitReport {
    pub visit_id: String,
    pub url: String,
    pub engine: EngineReport,
}

/// A host able to load a page and run the engine on it.
#[async_trait(?Send)]
pub trait PageWorker {
    async fn execute(&self, visit: &Visit) -> Result<VisitReport, DomError>;
}
