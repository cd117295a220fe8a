//! Drives the engine over the lifetime of a page load.
//!
//! One immediate check, a few delayed checks at fixed offsets, and debounced
//! re-checks whenever the document gains nodes, until a reject control is
//! clicked, the attempt budget runs out or nothing is left to wait for.

mod debounce;
mod watch;

pub use debounce::Debouncer;
pub use watch::{MutationBatch, MutationWatch, NoWatch, StreamWatch};

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tracing::debug;
use unbanner_core::{
    Catalog, Document, EngineConfig, EngineReport, EngineState, MatchSource, Reporter, TriggerOutcome, trigger,
};

/// Why a check ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Immediate,
    /// Fixed offset after start.
    Delayed(Duration),
    /// Debounced re-check after node insertions.
    Mutation,
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerSource::Immediate => write!(f, "immediate"),
            TriggerSource::Delayed(offset) => write!(f, "delayed {}ms", offset.as_millis()),
            TriggerSource::Mutation => write!(f, "mutation"),
        }
    }
}

/// Owns the [`EngineState`] of one page load.
pub struct Scheduler<'a, D: Document, R: Reporter + ?Sized> {
    document: &'a D,
    reporter: &'a R,
    catalog: Arc<Catalog>,
    config: EngineConfig,
    state: EngineState,
    matched: Option<MatchSource>,
}

impl<'a, D: Document, R: Reporter + ?Sized> Scheduler<'a, D, R> {
    pub fn new(document: &'a D, reporter: &'a R, catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        Self {
            document,
            reporter,
            catalog,
            config,
            state: EngineState::new(),
            matched: None,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn report(&self) -> EngineReport {
        EngineReport::from_state(&self.state, self.matched.clone())
    }

    /// Run a single trigger.
    pub async fn attempt(&mut self, source: TriggerSource) -> TriggerOutcome {
        let outcome = trigger(
            &mut self.state,
            self.document,
            &self.catalog,
            self.reporter,
            self.config.max_attempts,
        )
        .await;

        debug!(trigger = %source, attempt = self.state.attempts_made(), ?outcome, "check finished");
        if let TriggerOutcome::Rejected(matched) | TriggerOutcome::Blocked(matched) = &outcome {
            self.matched = Some(matched.clone());
        }
        outcome
    }

    /// Drive all triggers until the engine is done or nothing can trigger anymore.
    ///
    /// `watch` is disconnected on success, at the observe ceiling, and before
    /// returning. Pending delayed checks are simply abandoned once done.
    pub async fn run<W: MutationWatch>(mut self, mut watch: W) -> EngineReport {
        let start = Instant::now();
        let mut offsets = self.config.delayed_checks.clone();
        offsets.sort();
        let mut delays: VecDeque<Duration> = offsets.into();
        let watch_deadline = start + self.config.observe_ceiling;
        let mut watching = true;
        let mut debounce = Debouncer::new(self.config.debounce);

        self.attempt(TriggerSource::Immediate).await;

        loop {
            if self.state.is_done(self.config.max_attempts) {
                break;
            }
            if !watching && delays.is_empty() && !debounce.is_pending() {
                break;
            }

            let next_delay = delays.front().map(|offset| start + *offset);
            tokio::select! {
                biased;

                _ = sleep_until(next_delay.unwrap_or(start)), if next_delay.is_some() => {
                    if let Some(offset) = delays.pop_front() {
                        self.attempt(TriggerSource::Delayed(offset)).await;
                    }
                }
                _ = debounce.fired(), if debounce.is_pending() => {
                    self.attempt(TriggerSource::Mutation).await;
                }
                _ = sleep_until(watch_deadline), if watching => {
                    debug!(ceiling_ms = self.config.observe_ceiling.as_millis() as u64, "mutation watch ceiling reached");
                    watching = false;
                    watch.disconnect().await;
                }
                batch = watch.next_batch(), if watching => match batch {
                    Some(batch) => {
                        if batch.has_insertions() && debounce.signal() {
                            debug!(added = batch.added_nodes, "re-check scheduled");
                        }
                    }
                    None => {
                        debug!("mutation watch closed by host");
                        watching = false;
                        watch.disconnect().await;
                    }
                },
            }
        }

        if watching {
            watch.disconnect().await;
        }

        let report = self.report();
        debug!(activated = report.activated, attempts = report.attempts, "engine finished");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use std::cell::Cell;
    use tokio::time::sleep;
    use unbanner_parser::StaticDocument;

    #[derive(Default)]
    struct CountingReporter {
        events: Cell<usize>,
    }

    impl Reporter for CountingReporter {
        fn report(&self, _event: &unbanner_core::EngineEvent) -> Result<(), unbanner_core::DomError> {
            self.events.set(self.events.get() + 1);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn empty_page_runs_every_timed_check_then_stops() {
        let doc = StaticDocument::parse("<html><body><p>Hello</p></body></html>");
        let reporter = CountingReporter::default();
        let scheduler = Scheduler::new(&doc, &reporter, Arc::new(Catalog::builtin()), EngineConfig::default());

        let start = Instant::now();
        let report = scheduler.run(NoWatch).await;

        assert!(!report.activated);
        assert_eq!(report.attempts, 4);
        assert!(start.elapsed() >= Duration::from_millis(2000));
        assert!(start.elapsed() < Duration::from_millis(2100));
        assert_eq!(reporter.events.get(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_stays_until_ceiling_without_a_match() {
        let doc = StaticDocument::parse("<html><body></body></html>");
        let reporter = CountingReporter::default();
        let config = EngineConfig::default().with_delayed_checks(&[]).with_observe_ceiling(1000);
        let scheduler = Scheduler::new(&doc, &reporter, Arc::new(Catalog::builtin()), config);
        let (tx, rx) = mpsc::unbounded();

        let start = Instant::now();
        let report = scheduler.run(StreamWatch::new(rx)).await;

        assert_eq!(report.attempts, 1);
        assert!(start.elapsed() >= Duration::from_millis(1000));
        // the watch dropped its receiver on disconnect
        assert!(tx.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn insertion_bursts_coalesce_into_one_check() {
        let doc = StaticDocument::parse("<html><body></body></html>");
        let reporter = CountingReporter::default();
        let config = EngineConfig::default().with_delayed_checks(&[]).with_observe_ceiling(1000);
        let scheduler = Scheduler::new(&doc, &reporter, Arc::new(Catalog::builtin()), config);
        let (tx, rx) = mpsc::unbounded();

        let host = async {
            sleep(Duration::from_millis(200)).await;
            for _ in 0..5 {
                let _ = tx.unbounded_send(MutationBatch::inserted(3));
                sleep(Duration::from_millis(10)).await;
            }
            // attribute-only batches never schedule a check
            sleep(Duration::from_millis(300)).await;
            let _ = tx.unbounded_send(MutationBatch::default());
        };

        let (report, ()) = tokio::join!(scheduler.run(StreamWatch::new(rx)), host);
        assert_eq!(report.attempts, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn attempt_budget_ends_the_run_early() {
        let doc = StaticDocument::parse("<html><body></body></html>");
        let reporter = CountingReporter::default();
        let config = EngineConfig::default().with_max_attempts(2);
        let scheduler = Scheduler::new(&doc, &reporter, Arc::new(Catalog::builtin()), config);
        let (_tx, rx) = mpsc::unbounded::<MutationBatch>();

        let start = Instant::now();
        let report = scheduler.run(StreamWatch::new(rx)).await;

        assert_eq!(report.attempts, 2);
        assert!(start.elapsed() < Duration::from_millis(600));
    }
}
