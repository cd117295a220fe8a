use serde::{Deserialize, Serialize};

/// Error categories for deciding whether a failure is local to one rule, one
/// attempt, or the whole visit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Selector the host cannot parse or evaluate
    InvalidSelector,
    /// The host threw while the synthetic click was dispatched
    Dispatch,
    /// Script evaluation against the page failed
    ScriptExecution,
    /// Element was detached or cannot be resolved anymore
    Detached,
    /// Navigation or page load errors
    Navigation,
    /// Browser/driver errors
    Browser,
    /// Parsing errors (HTML/JSON)
    Parsing,
    /// Network errors while fetching a page
    Network,
    /// Timeout errors
    Timeout,
    /// The counting collaborator could not be reached
    Report,
}

/// Structured error shared by every host and collaborator seam.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("[{category:?}] {message}")]
pub struct DomError {
    pub category: ErrorCategory,
    pub message: String,
    /// Optional context (selector, url, binding name...)
    pub context: serde_json::Value,
}

impl DomError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            context: serde_json::json!({}),
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    pub fn invalid_selector(selector: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        let selector = selector.into();
        Self::new(
            ErrorCategory::InvalidSelector,
            format!("Invalid selector '{}': {}", selector, reason),
        )
        .with_context(serde_json::json!({ "selector": selector }))
    }

    pub fn dispatch_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Dispatch, message)
    }

    pub fn script_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::ScriptExecution, message)
    }

    pub fn detached(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Detached, message)
    }

    pub fn navigation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Navigation, message)
    }

    pub fn browser_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Browser, message)
    }

    pub fn parsing_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Parsing, message)
    }

    pub fn fetch_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Network, message)
    }

    pub fn timeout_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Timeout, message)
    }

    pub fn report_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Report, message)
    }
}
