//! The counting collaborator: per-tab reject counts shown as badge text.
//!
//! Engines report through a [`ChannelReporter`]; tab lifecycle hooks feed the
//! same channel so counts reset when a tab closes or starts a new load.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use unbanner_core::{DomError, EngineEvent, Reporter};

pub type TabId = u32;

pub const BADGE_COLOR: &str = "#4CAF50";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabStatus {
    Loading,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabMessage {
    /// Sent by an engine; `tab` is filled in by the transport.
    Event { tab: Option<TabId>, event: EngineEvent },
    Removed(TabId),
    Updated { tab: TabId, status: TabStatus },
}

#[async_trait]
pub trait BadgeDisplay: Send + Sync {
    async fn set_text(&self, tab: TabId, text: &str) -> Result<()>;
    async fn set_color(&self, tab: TabId, color: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub color: Option<String>,
}

/// Keeps badges in memory, for headless runs and tests.
#[derive(Debug, Default)]
pub struct MemoryBadge {
    badges: Mutex<HashMap<TabId, Badge>>,
}

impl MemoryBadge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tab: TabId) -> Option<Badge> {
        self.badges.lock().ok()?.get(&tab).cloned()
    }

    fn update(&self, tab: TabId, apply: impl FnOnce(&mut Badge)) -> Result<()> {
        let mut badges = self.badges.lock().map_err(|_| anyhow!("badge state poisoned"))?;
        apply(badges.entry(tab).or_default());
        Ok(())
    }
}

#[async_trait]
impl BadgeDisplay for MemoryBadge {
    async fn set_text(&self, tab: TabId, text: &str) -> Result<()> {
        self.update(tab, |badge| badge.text = text.to_string())
    }

    async fn set_color(&self, tab: TabId, color: &str) -> Result<()> {
        self.update(tab, |badge| badge.color = Some(color.to_string()))
    }
}

/// Writes badge changes to the log.
#[derive(Debug, Default)]
pub struct LogBadge;

#[async_trait]
impl BadgeDisplay for LogBadge {
    async fn set_text(&self, tab: TabId, text: &str) -> Result<()> {
        info!(tab, text, "badge");
        Ok(())
    }

    async fn set_color(&self, _tab: TabId, _color: &str) -> Result<()> {
        Ok(())
    }
}

pub struct TabCounter<B: BadgeDisplay> {
    counts: HashMap<TabId, u32>,
    badge: B,
}

impl<B: BadgeDisplay> TabCounter<B> {
    pub fn new(badge: B) -> Self {
        Self {
            counts: HashMap::new(),
            badge,
        }
    }

    pub fn count(&self, tab: TabId) -> u32 {
        self.counts.get(&tab).copied().unwrap_or(0)
    }

    pub fn badge(&self) -> &B {
        &self.badge
    }

    pub async fn record(&mut self, tab: Option<TabId>, event: &EngineEvent) -> Result<()> {
        let Some(tab) = tab else {
            debug!("ignoring event without a tab");
            return Ok(());
        };
        match event {
            EngineEvent::RejectPerformed { url } => {
                let count = self.counts.entry(tab).or_insert(0);
                *count += 1;
                let text = count.to_string();
                debug!(tab, count = *count, ?url, "reject counted");
                self.badge.set_color(tab, BADGE_COLOR).await?;
                self.badge.set_text(tab, &text).await
            }
        }
    }

    pub fn tab_removed(&mut self, tab: TabId) {
        self.counts.remove(&tab);
    }

    pub async fn tab_updated(&mut self, tab: TabId, status: TabStatus) -> Result<()> {
        if status != TabStatus::Loading {
            return Ok(());
        }
        self.counts.remove(&tab);
        self.badge.set_text(tab, "").await
    }

    pub async fn handle(&mut self, message: TabMessage) -> Result<()> {
        match message {
            TabMessage::Event { tab, event } => self.record(tab, &event).await,
            TabMessage::Removed(tab) => {
                self.tab_removed(tab);
                Ok(())
            }
            TabMessage::Updated { tab, status } => self.tab_updated(tab, status).await,
        }
    }

    /// Process messages until every sender is dropped.
    pub async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<TabMessage>) -> Self {
        while let Some(message) = receiver.recv().await {
            if let Err(e) = self.handle(message).await {
                warn!(error = %e, "badge update failed");
            }
        }
        self
    }
}

pub fn channel() -> (mpsc::UnboundedSender<TabMessage>, mpsc::UnboundedReceiver<TabMessage>) {
    mpsc::unbounded_channel()
}

/// Engine-side end of the channel, bound to one tab.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tab: Option<TabId>,
    sender: mpsc::UnboundedSender<TabMessage>,
}

impl ChannelReporter {
    pub fn new(tab: Option<TabId>, sender: mpsc::UnboundedSender<TabMessage>) -> Self {
        Self { tab, sender }
    }
}

impl Reporter for ChannelReporter {
    fn report(&self, event: &EngineEvent) -> Result<(), DomError> {
        self.sender
            .send(TabMessage::Event {
                tab: self.tab,
                event: event.clone(),
            })
            .map_err(|_| DomError::report_error("tab counter is gone"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected() -> EngineEvent {
        EngineEvent::RejectPerformed { url: None }
    }

    #[tokio::test]
    async fn counts_per_tab_and_shows_badge() {
        let mut counter = TabCounter::new(MemoryBadge::new());
        for tab in [1, 1, 2] {
            counter.handle(TabMessage::Event { tab: Some(tab), event: rejected() }).await.unwrap();
        }

        assert_eq!(counter.count(1), 2);
        assert_eq!(counter.count(2), 1);
        assert_eq!(counter.badge().get(1), Some(Badge { text: "2".into(), color: Some(BADGE_COLOR.into()) }));
    }

    #[tokio::test]
    async fn events_without_tab_are_ignored() {
        let mut counter = TabCounter::new(MemoryBadge::new());
        counter.handle(TabMessage::Event { tab: None, event: rejected() }).await.unwrap();
        assert!(counter.counts.is_empty());
    }

    #[tokio::test]
    async fn new_load_resets_count_and_clears_badge() {
        let mut counter = TabCounter::new(MemoryBadge::new());
        counter.handle(TabMessage::Event { tab: Some(4), event: rejected() }).await.unwrap();
        counter.handle(TabMessage::Updated { tab: 4, status: TabStatus::Complete }).await.unwrap();
        assert_eq!(counter.count(4), 1);

        counter.handle(TabMessage::Updated { tab: 4, status: TabStatus::Loading }).await.unwrap();
        assert_eq!(counter.count(4), 0);
        assert_eq!(counter.badge().get(4).map(|b| b.text), Some(String::new()));

        counter.handle(TabMessage::Event { tab: Some(4), event: rejected() }).await.unwrap();
        assert_eq!(counter.count(4), 1);
    }

    #[tokio::test]
    async fn closed_tab_is_forgotten() {
        let mut counter = TabCounter::new(MemoryBadge::new());
        counter.record(Some(9), &rejected()).await.unwrap();
        counter.tab_removed(9);
        assert_eq!(counter.count(9), 0);
    }

    #[tokio::test]
    async fn reporter_feeds_the_counter_until_it_goes_away() {
        let (tx, rx) = channel();
        let reporter = ChannelReporter::new(Some(3), tx.clone());
        reporter.report(&rejected()).unwrap();
        reporter.report(&rejected()).unwrap();
        drop(tx);
        drop(reporter);

        let counter = TabCounter::new(MemoryBadge::new()).run(rx).await;
        assert_eq!(counter.count(3), 2);

        let (tx, rx) = channel();
        drop(rx);
        let err = ChannelReporter::new(Some(3), tx).report(&rejected()).unwrap_err();
        assert_eq!(err.category, unbanner_core::ErrorCategory::Report);
    }
}
