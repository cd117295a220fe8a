use async_trait::async_trait;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use serde_json::Value;
use unbanner_core::{Document, DomError, ElementState};

use crate::shared::{js, to_dom_error};

/// A live Chromium page seen through CDP.
///
/// Element handles are remote objects; once the node leaves the page, calls on
/// it fail and come back as `Detached` errors.
pub struct ChromiumDocument {
    page: Page,
}

impl ChromiumDocument {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    async fn call(&self, element: &Element, function: &str, action: &str) -> Result<Value, DomError> {
        let returns = element
            .call_js_fn(function, false)
            .await
            .map_err(|e| to_dom_error(e, action))?;
        if let Some(exception) = returns.exception_details {
            return Err(DomError::script_error(format!("{} threw: {}", action, exception.text)));
        }
        Ok(returns.result.value.unwrap_or(Value::Null))
    }
}

#[async_trait(?Send)]
impl Document for ChromiumDocument {
    type Element = Element;

    async fn query_first(&self, selector: &str) -> Result<Option<Element>, DomError> {
        let mut found = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| to_dom_error(e, selector))?;
        if found.is_empty() {
            return Ok(None);
        }
        Ok(Some(found.swap_remove(0)))
    }

    async fn query_all(&self, scope: Option<&Element>, selector: &str) -> Result<Vec<Element>, DomError> {
        let found = match scope {
            Some(scope) => scope.find_elements(selector).await,
            None => self.page.find_elements(selector).await,
        };
        found.map_err(|e| to_dom_error(e, selector))
    }

    async fn element_state(&self, element: &Element) -> Result<ElementState, DomError> {
        let value = self.call(element, js::element::ELEMENT_STATE, "element state").await?;
        let raw = value
            .as_str()
            .ok_or_else(|| DomError::parsing_error("element state was not a string"))?;
        serde_json::from_str(raw).map_err(|e| DomError::parsing_error(format!("element state: {}", e)))
    }

    async fn text_or_value(&self, element: &Element) -> Result<String, DomError> {
        let value = self.call(element, js::element::TEXT_OR_VALUE, "text").await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn click(&self, element: &Element) -> Result<(), DomError> {
        self.call(element, js::element::CLICK, "click")
            .await
            .map(|_| ())
            .map_err(|e| DomError::dispatch_error(e.message).with_context(e.context))
    }

    async fn location(&self) -> Option<String> {
        self.page.url().await.ok().flatten()
    }
}
