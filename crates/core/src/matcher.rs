//! Two-pass search for a reject control.
//!
//! Pass one walks the vendor selector table; pass two scopes to the first
//! rendered banner container (or the body) and matches clickable text against
//! the phrasing table. First hit wins, a selector hit always beats a text hit.
//!
//! Visibility is not consulted here: a hidden selector hit is still the
//! candidate, and later rules (another vendor id, any text match) are not
//! tried for that trigger. The activator refuses the click and the next trigger
//! searches again, so a hit that stays hidden for the whole load shadows every
//! rule after it.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::catalog::CLICKABLE_SELECTOR;
use crate::{Catalog, Document};

/// Which catalog entry produced a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "pass", rename_all = "snake_case")]
pub enum MatchSource {
    KnownSelector { vendor: String, selector: String },
    TextPattern { pattern: String, text: String },
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchSource::KnownSelector { vendor, selector } => write!(f, "{} '{}'", vendor, selector),
            MatchSource::TextPattern { pattern, text } => write!(f, "text '{}' ~ /{}/i", text, pattern),
        }
    }
}

/// An element believed to be a reject control, borrowed from the document for one trigger.
#[derive(Debug, Clone)]
pub struct Candidate<E> {
    pub element: E,
    pub source: MatchSource,
}

/// Reads the document only; never touches engine state.
pub async fn find_candidate<D: Document>(document: &D, catalog: &Catalog) -> Option<Candidate<D::Element>> {
    match known_selector_pass(document, catalog).await {
        Some(candidate) => Some(candidate),
        None => text_pass(document, catalog).await,
    }
}

async fn known_selector_pass<D: Document>(document: &D, catalog: &Catalog) -> Option<Candidate<D::Element>> {
    for rule in catalog.reject_selectors() {
        match document.query_first(&rule.selector).await {
            Ok(Some(element)) => {
                return Some(Candidate {
                    element,
                    source: MatchSource::KnownSelector {
                        vendor: rule.vendor.clone(),
                        selector: rule.selector.clone(),
                    },
                });
            }
            Ok(None) => {}
            Err(e) => debug!(vendor = %rule.vendor, selector = %rule.selector, error = %e, "skipping selector rule"),
        }
    }
    None
}

/// First banner container that is actually on screen.
async fn banner_scope<D: Document>(document: &D, catalog: &Catalog) -> Option<D::Element> {
    for rule in catalog.banner_containers() {
        let container = match document.query_first(&rule.selector).await {
            Ok(Some(container)) => container,
            Ok(None) => continue,
            Err(e) => {
                debug!(selector = %rule.selector, error = %e, "skipping container rule");
                continue;
            }
        };

        match document.element_state(&container).await {
            Ok(state) if state.is_rendered() => return Some(container),
            Ok(_) => {}
            Err(e) => debug!(selector = %rule.selector, error = %e, "container state unavailable"),
        }
    }
    None
}

async fn text_pass<D: Document>(document: &D, catalog: &Catalog) -> Option<Candidate<D::Element>> {
    let scope = banner_scope(document, catalog).await;
    let clickables = match document.query_all(scope.as_ref(), CLICKABLE_SELECTOR).await {
        Ok(clickables) => clickables,
        Err(e) => {
            debug!(error = %e, scoped = scope.is_some(), "clickable lookup failed");
            return None;
        }
    };

    for element in clickables {
        let raw = match document.text_or_value(&element).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!(error = %e, "skipping unreadable clickable");
                continue;
            }
        };
        let text = raw.trim();

        if let Some(pattern) = catalog.text_patterns().iter().find(|p| p.is_match(text)) {
            return Some(Candidate {
                source: MatchSource::TextPattern {
                    pattern: pattern.as_str().to_string(),
                    text: text.to_string(),
                },
                element,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogSource;
    use crate::testing::{FakeDocument, hidden, visible};

    #[tokio::test]
    async fn known_selector_beats_text_match() {
        let doc = FakeDocument::new()
            .element(1, "Reject All", visible())
            .element(2, "No thanks", visible())
            .matches("#onetrust-reject-all-handler", &[1])
            .matches(CLICKABLE_SELECTOR, &[2, 1]);

        let candidate = find_candidate(&doc, &Catalog::builtin()).await.unwrap();
        assert_eq!(candidate.element, 1);
        assert!(matches!(candidate.source, MatchSource::KnownSelector { ref vendor, .. } if vendor == "OneTrust"));
    }

    #[tokio::test]
    async fn selector_catalog_order_decides_between_vendors() {
        let doc = FakeDocument::new()
            .element(1, "Deny", visible())
            .element(2, "Decline", visible())
            .matches(".osano-cm-deny", &[1])
            .matches("#didomi-notice-disagree-button", &[2]);

        let candidate = find_candidate(&doc, &Catalog::builtin()).await.unwrap();
        assert_eq!(candidate.element, 2);
    }

    #[tokio::test]
    async fn hidden_selector_hit_shadows_later_rules() {
        let doc = FakeDocument::new()
            .element(1, "Decline", hidden())
            .element(2, "Decline all", visible())
            .element(3, "No thanks", visible())
            .matches("#CybotCookiebotDialogBodyButtonDecline", &[1])
            .matches("#CybotCookiebotDialogBodyLevelButtonLevelOptinDeclineAll", &[2])
            .matches(CLICKABLE_SELECTOR, &[3]);

        let candidate = find_candidate(&doc, &Catalog::builtin()).await.unwrap();
        assert_eq!(candidate.element, 1);
        assert_eq!(
            candidate.source,
            MatchSource::KnownSelector {
                vendor: "Cookiebot".into(),
                selector: "#CybotCookiebotDialogBodyButtonDecline".into(),
            }
        );
    }

    #[tokio::test]
    async fn invalid_selector_is_skipped() {
        let catalog = Catalog::from_source(CatalogSource {
            reject_selectors: vec![
                crate::SelectorRule { vendor: "Broken".into(), selector: "button[[".into() },
                crate::SelectorRule { vendor: "Acme".into(), selector: "#acme-reject".into() },
            ],
            ..CatalogSource::default()
        });
        let doc = FakeDocument::new()
            .element(7, "Nope", visible())
            .invalid("button[[")
            .matches("#acme-reject", &[7]);

        let candidate = find_candidate(&doc, &catalog).await.unwrap();
        assert_eq!(candidate.element, 7);
    }

    #[tokio::test]
    async fn text_pass_scopes_to_first_rendered_container() {
        let doc = FakeDocument::new()
            .element(10, "", hidden())
            .element(11, "", visible())
            .element(1, "Decline", visible())
            .element(2, "No thanks", visible())
            .matches("#onetrust-banner-sdk", &[10])
            .matches(".cookie-banner", &[11])
            .matches(CLICKABLE_SELECTOR, &[1, 2])
            .scoped(11, CLICKABLE_SELECTOR, &[2]);

        let candidate = find_candidate(&doc, &Catalog::builtin()).await.unwrap();
        assert_eq!(candidate.element, 2);
        assert_eq!(
            candidate.source,
            MatchSource::TextPattern { pattern: r"^no,?\s*thanks".into(), text: "No thanks".into() }
        );
    }

    #[tokio::test]
    async fn text_pass_falls_back_to_body_in_document_order() {
        let doc = FakeDocument::new()
            .element(1, "Accept all", visible())
            .element(2, "  Reject all \n", visible())
            .element(3, "Decline", visible())
            .matches(CLICKABLE_SELECTOR, &[1, 2, 3]);

        let candidate = find_candidate(&doc, &Catalog::builtin()).await.unwrap();
        assert_eq!(candidate.element, 2);
        assert!(matches!(candidate.source, MatchSource::TextPattern { ref text, .. } if text == "Reject all"));
    }

    #[tokio::test]
    async fn nothing_to_find() {
        let doc = FakeDocument::new()
            .element(1, "Accept", visible())
            .matches(CLICKABLE_SELECTOR, &[1]);

        assert!(find_candidate(&doc, &Catalog::builtin()).await.is_none());
    }
}
