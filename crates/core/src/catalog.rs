//! Ordered, data-only rule tables consumed by the matcher.
//!
//! The built-in tables cover the consent frameworks seen most in the wild.
//! Order matters everywhere: the first rule that yields an element wins.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::DomError;

/// Known vendor reject controls, `(vendor, selector)`.
pub const REJECT_SELECTORS: &[(&str, &str)] = &[
    ("OneTrust", "#onetrust-reject-all-handler"),
    ("OneTrust", r#".onetrust-close-btn-handler[aria-label*="reject" i]"#),
    ("Cookiebot", "#CybotCookiebotDialogBodyButtonDecline"),
    ("Cookiebot", "#CybotCookiebotDialogBodyLevelButtonLevelOptinDeclineAll"),
    ("TrustArc", ".truste-button2"),
    ("TrustArc", "#truste-consent-required"),
    ("Quantcast", r#".qc-cmp2-summary-buttons button[mode="secondary"]"#),
    ("Quantcast", "[data-tracking-opt-in-reject]"),
    ("Didomi", "#didomi-notice-disagree-button"),
    ("Didomi", ".didomi-continue-without-agreeing"),
    ("Complianz", ".cmplz-deny"),
    ("Complianz", ".cmplz-btn.cmplz-deny"),
    ("CookieYes", ".cky-btn-reject"),
    ("CookieYes", r#"[data-cky-tag="reject-button"]"#),
    ("Klaro", ".klaro .cm-btn-decline"),
    ("Klaro", r#".klaro button[data-type="decline"]"#),
    ("Cookie Notice", ".cookie-notice-container .cn-decline"),
    ("EU Cookie Law", ".eupopup-button_2"),
    ("GDPR Cookie Consent", ".gdpr-cookie-notice-reject"),
    ("Osano", ".osano-cm-deny"),
    ("Termly", ".t-declineAllButton"),
    ("Iubenda", ".iubenda-cs-reject-btn"),
    ("Usercentrics", r#"[data-testid="uc-deny-all-button"]"#),
    ("Usercentrics", "#uc-btn-deny-banner"),
    ("Admiral", ".admiral-close-btn"),
];

/// Reject/decline/essential-only phrasings, matched case-insensitively against trimmed text.
pub const REJECT_TEXT_PATTERNS: &[&str] = &[
    r"^reject\s*(all)?$",
    r"^decline\s*(all)?$",
    r"^refuse\s*(all)?$",
    r"^deny\s*(all)?$",
    r"^(only\s+)?essential(s)?(\s+only)?$",
    r"^(only\s+)?necessary(\s+only)?$",
    r"^(only\s+)?required(\s+only)?$",
    r"^use\s+(only\s+)?necessary",
    r"^accept\s+(only\s+)?necessary",
    r"^accept\s+(only\s+)?essential",
    r"^continue\s+without\s+accepting",
    r"^do\s+not\s+(consent|agree|accept)",
    r"^disagree",
    r"^no,?\s*thanks",
    r"^opt[\s-]?out",
];

/// Banner containers used to scope the text search.
pub const BANNER_CONTAINERS: &[&str] = &[
    "#onetrust-banner-sdk",
    "#CybotCookiebotDialog",
    "#truste-consent-content",
    ".qc-cmp2-container",
    "#didomi-popup",
    ".cmplz-cookiebanner",
    ".cky-consent-container",
    ".klaro",
    ".cookie-notice",
    ".cookie-consent",
    ".cookie-banner",
    ".gdpr-banner",
    r#"[class*="cookie-consent"]"#,
    r#"[class*="cookie-banner"]"#,
    r#"[class*="gdpr"]"#,
    r#"[id*="cookie-consent"]"#,
    r#"[id*="cookie-banner"]"#,
    r#"[id*="gdpr"]"#,
    r#"[aria-label*="cookie" i]"#,
    r#"[aria-label*="consent" i]"#,
    r#"[role="dialog"][aria-modal="true"]"#,
];

/// Elements a user could click to answer a banner.
pub const CLICKABLE_SELECTOR: &str =
    r#"button, a, [role="button"], input[type="button"], input[type="submit"]"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorRule {
    pub vendor: String,
    pub selector: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerContainerRule {
    pub selector: String,
}

/// A compiled, case-insensitive text pattern.
#[derive(Debug, Clone)]
pub struct TextPattern {
    source: String,
    regex: Regex,
}

impl TextPattern {
    pub fn compile(source: &str) -> Result<Self, DomError> {
        let regex = RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map_err(|e| DomError::parsing_error(format!("Invalid text pattern '{}': {}", source, e)))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Serialized form of a catalog, as curated outside the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSource {
    #[serde(default)]
    pub reject_selectors: Vec<SelectorRule>,
    #[serde(default)]
    pub text_patterns: Vec<String>,
    #[serde(default)]
    pub banner_containers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    reject_selectors: Vec<SelectorRule>,
    text_patterns: Vec<TextPattern>,
    banner_containers: Vec<BannerContainerRule>,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self::from_source(CatalogSource {
            reject_selectors: REJECT_SELECTORS
                .iter()
                .map(|(vendor, selector)| SelectorRule {
                    vendor: vendor.to_string(),
                    selector: selector.to_string(),
                })
                .collect(),
            text_patterns: REJECT_TEXT_PATTERNS.iter().map(|p| p.to_string()).collect(),
            banner_containers: BANNER_CONTAINERS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Patterns that fail to compile are dropped; selectors are kept verbatim
    /// and only rejected by the host when evaluated.
    pub fn from_source(source: CatalogSource) -> Self {
        let text_patterns = source
            .text_patterns
            .iter()
            .filter_map(|p| match TextPattern::compile(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!(pattern = %p, error = %e, "skipping text pattern");
                    None
                }
            })
            .collect();

        Self {
            reject_selectors: source.reject_selectors,
            text_patterns,
            banner_containers: source
                .banner_containers
                .into_iter()
                .map(|selector| BannerContainerRule { selector })
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DomError> {
        let source: CatalogSource = serde_json::from_str(json)
            .map_err(|e| DomError::parsing_error(format!("Invalid catalog: {}", e)))?;
        Ok(Self::from_source(source))
    }

    pub fn reject_selectors(&self) -> &[SelectorRule] {
        &self.reject_selectors
    }

    pub fn text_patterns(&self) -> &[TextPattern] {
        &self.text_patterns
    }

    pub fn banner_containers(&self) -> &[BannerContainerRule] {
        &self.banner_containers
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(catalog: &Catalog, text: &str) -> bool {
        catalog.text_patterns().iter().any(|p| p.is_match(text))
    }

    #[test]
    fn builtin_tables_keep_their_order() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.reject_selectors().len(), REJECT_SELECTORS.len());
        assert_eq!(
            catalog.reject_selectors()[0].selector,
            "#onetrust-reject-all-handler"
        );
        assert_eq!(catalog.text_patterns().len(), 15);
        assert_eq!(catalog.banner_containers().len(), 21);
        assert_eq!(
            catalog.banner_containers()[20].selector,
            r#"[role="dialog"][aria-modal="true"]"#
        );
    }

    #[test]
    fn reject_phrasings_match_case_insensitively() {
        let catalog = Catalog::builtin();
        for text in [
            "Reject All",
            "DECLINE",
            "Deny all",
            "Essentials only",
            "Only necessary",
            "Accept only necessary cookies",
            "Continue without accepting",
            "Do not consent",
            "No thanks",
            "No, thanks!",
            "Opt-out",
        ] {
            assert!(matches(&catalog, text), "{text}");
        }
    }

    #[test]
    fn accepting_phrasings_do_not_match() {
        let catalog = Catalog::builtin();
        for text in ["Accept all", "I agree", "Reject all cookies now", "Manage settings", ""] {
            assert!(!matches(&catalog, text), "{text}");
        }
    }

    #[test]
    fn json_catalog_skips_broken_patterns() {
        let catalog = Catalog::from_json(
            r##"{
                "reject_selectors": [{ "vendor": "Acme", "selector": "#acme-no" }],
                "text_patterns": ["^nope$", "(unclosed"]
            }"##,
        )
        .unwrap();

        assert_eq!(catalog.reject_selectors()[0].vendor, "Acme");
        assert_eq!(catalog.text_patterns().len(), 1);
        assert_eq!(catalog.text_patterns()[0].as_str(), "^nope$");
        assert!(catalog.banner_containers().is_empty());
    }

    #[test]
    fn malformed_json_is_a_parsing_error() {
        let err = Catalog::from_json("{ not json").unwrap_err();
        assert_eq!(err.category, crate::ErrorCategory::Parsing);
    }
}
