//! In-memory fakes for the host seams.

use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::{Document, DomError, ElementState, EngineEvent, Reporter};

pub fn visible() -> ElementState {
    ElementState {
        width: 120.0,
        height: 32.0,
        ..ElementState::default()
    }
}

pub fn hidden() -> ElementState {
    ElementState {
        display: "none".to_string(),
        ..visible()
    }
}

/// Document whose query results are wired up by hand, selector string to element ids.
#[derive(Default)]
pub struct FakeDocument {
    texts: HashMap<usize, String>,
    states: RefCell<HashMap<usize, ElementState>>,
    selectors: HashMap<String, Vec<usize>>,
    scoped: HashMap<(usize, String), Vec<usize>>,
    invalid: Vec<String>,
    clicks: RefCell<Vec<usize>>,
    queries: Cell<usize>,
    failing_clicks: Cell<bool>,
}

impl FakeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(mut self, id: usize, text: &str, state: ElementState) -> Self {
        self.texts.insert(id, text.to_string());
        self.states.get_mut().insert(id, state);
        self
    }

    pub fn matches(mut self, selector: &str, ids: &[usize]) -> Self {
        self.selectors.insert(selector.to_string(), ids.to_vec());
        self
    }

    pub fn scoped(mut self, scope: usize, selector: &str, ids: &[usize]) -> Self {
        self.scoped.insert((scope, selector.to_string()), ids.to_vec());
        self
    }

    pub fn invalid(mut self, selector: &str) -> Self {
        self.invalid.push(selector.to_string());
        self
    }

    pub fn set_state(&self, id: usize, state: ElementState) {
        self.states.borrow_mut().insert(id, state);
    }

    pub fn fail_clicks(&self, fail: bool) {
        self.failing_clicks.set(fail);
    }

    pub fn clicks(&self) -> Vec<usize> {
        self.clicks.borrow().clone()
    }

    pub fn queries(&self) -> usize {
        self.queries.get()
    }

    fn lookup(&self, scope: Option<usize>, selector: &str) -> Result<Vec<usize>, DomError> {
        self.queries.set(self.queries.get() + 1);
        if self.invalid.iter().any(|s| s == selector) {
            return Err(DomError::invalid_selector(selector, "rejected by fake"));
        }
        let found = match scope {
            Some(scope) => self.scoped.get(&(scope, selector.to_string())),
            None => self.selectors.get(selector),
        };
        Ok(found.cloned().unwrap_or_default())
    }
}

#[async_trait(?Send)]
impl Document for FakeDocument {
    type Element = usize;

    async fn query_first(&self, selector: &str) -> Result<Option<usize>, DomError> {
        Ok(self.lookup(None, selector)?.first().copied())
    }

    async fn query_all(&self, scope: Option<&usize>, selector: &str) -> Result<Vec<usize>, DomError> {
        self.lookup(scope.copied(), selector)
    }

    async fn element_state(&self, element: &usize) -> Result<ElementState, DomError> {
        self.states
            .borrow()
            .get(element)
            .cloned()
            .ok_or_else(|| DomError::detached(format!("no element {}", element)))
    }

    async fn text_or_value(&self, element: &usize) -> Result<String, DomError> {
        Ok(self.texts.get(element).cloned().unwrap_or_default())
    }

    async fn click(&self, element: &usize) -> Result<(), DomError> {
        if self.failing_clicks.get() {
            return Err(DomError::dispatch_error("handler threw"));
        }
        self.clicks.borrow_mut().push(*element);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    events: RefCell<Vec<EngineEvent>>,
    disconnected: bool,
}

impl RecordingReporter {
    pub fn disconnected() -> Self {
        Self {
            disconnected: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.borrow().clone()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: &EngineEvent) -> Result<(), DomError> {
        if self.disconnected {
            return Err(DomError::report_error("extension context invalidated"));
        }
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}
