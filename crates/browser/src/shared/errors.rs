use unbanner_core::DomError;

/// Classify a CDP failure by its message.
pub fn to_dom_error(e: impl std::fmt::Display, action: &str) -> DomError {
    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("timeout") || lower.contains("timed out") {
        DomError::timeout_error(format!("{} timed out: {}", action, s))
    } else if lower.contains("navigation") || lower.contains("net::err") {
        DomError::navigation_error(format!("{} navigation failed: {}", action, s))
    } else if lower.contains("not a valid selector") || lower.contains("while querying") {
        DomError::invalid_selector(action, s)
    } else if lower.contains("no node") || lower.contains("could not find node")
        || lower.contains("context was destroyed") || lower.contains("cannot find context")
    {
        DomError::detached(format!("{}: {}", action, s))
    } else {
        DomError::browser_error(format!("{} failed: {}", action, s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unbanner_core::ErrorCategory;

    #[test]
    fn messages_are_classified() {
        let cases = [
            ("Request timed out.", ErrorCategory::Timeout),
            ("net::ERR_NAME_NOT_RESOLVED", ErrorCategory::Navigation),
            ("DOM Error while querying", ErrorCategory::InvalidSelector),
            ("Could not find node with given id", ErrorCategory::Detached),
            ("Execution context was destroyed.", ErrorCategory::Detached),
            ("websocket closed", ErrorCategory::Browser),
        ];
        for (message, category) in cases {
            assert_eq!(to_dom_error(message, "query").category, category, "{message}");
        }
    }

    #[test]
    fn selector_errors_keep_the_selector() {
        let err = to_dom_error("DOM Error while querying", "button[[");
        assert_eq!(err.context["selector"], "button[[");
    }
}
