use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::DomError;

/// Rendered geometry and computed style of one element, as the host reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementState {
    pub width: f64,
    pub height: f64,
    pub display: String,
    pub visibility: String,
    pub opacity: String,
}

impl ElementState {
    /// Has a non-empty box and is not hidden through `display` or `visibility`.
    pub fn is_rendered(&self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.display != "none"
            && self.visibility != "hidden"
    }

    /// Rendered and not fully transparent.
    pub fn is_activatable(&self) -> bool {
        self.is_rendered() && !self.is_transparent()
    }

    fn is_transparent(&self) -> bool {
        let raw = self.opacity.trim();
        let value = match raw.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f64>().map(|v| v / 100.0),
            None => raw.parse::<f64>(),
        };
        matches!(value, Ok(v) if v == 0.0)
    }
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            display: "block".to_string(),
            visibility: "visible".to_string(),
            opacity: "1".to_string(),
        }
    }
}

/// The live page the engine runs against.
///
/// The document owns its nodes; `Element` is a transient handle valid for one
/// trigger at most. Hosts are driven from a single cooperative task, so neither
/// the document nor its handles have to be `Send`.
#[async_trait(?Send)]
pub trait Document {
    type Element;

    /// First element matching `selector` in document order.
    async fn query_first(&self, selector: &str) -> Result<Option<Self::Element>, DomError>;

    /// Every element matching `selector` under `scope` (the body when `None`), in document order.
    async fn query_all(
        &self,
        scope: Option<&Self::Element>,
        selector: &str,
    ) -> Result<Vec<Self::Element>, DomError>;

    async fn element_state(&self, element: &Self::Element) -> Result<ElementState, DomError>;

    /// Text content, or the form value when the element has no text.
    async fn text_or_value(&self, element: &Self::Element) -> Result<String, DomError>;

    /// Dispatch a synthetic click.
    async fn click(&self, element: &Self::Element) -> Result<(), DomError>;

    /// Address of the page, attached to outbound events when known.
    async fn location(&self) -> Option<String> {
        None
    }
}
