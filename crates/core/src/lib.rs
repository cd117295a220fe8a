//! Detection and dismissal of cookie-consent banners.
//!
//! The engine finds a reject control through [`find_candidate`], clicks it
//! through [`activate`] and tells a [`Reporter`] about it, at most once per
//! [`EngineState`]. Hosts plug in through the [`Document`] trait.

mod activator;
pub mod catalog;
mod config;
mod dom;
mod engine;
mod error;
mod matcher;
mod report;
mod visit;

#[cfg(test)]
mod testing;

pub use activator::activate;
pub use catalog::{BannerContainerRule, Catalog, CatalogSource, SelectorRule, TextPattern};
pub use config::EngineConfig;
pub use dom::{Document, ElementState};
pub use engine::{EngineReport, EngineState, TriggerOutcome, trigger};
pub use error::{DomError, ErrorCategory};
pub use matcher::{Candidate, MatchSource, find_candidate};
pub use report::{EngineEvent, NullReporter, Reporter};
pub use visit::{BrowserConfig, PageWorker, Visit, VisitReport};
