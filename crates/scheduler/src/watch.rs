use async_trait::async_trait;
use futures::{Stream, StreamExt};

/// One batch of DOM changes as delivered by the host's observer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationBatch {
    pub added_nodes: usize,
}

impl MutationBatch {
    pub fn inserted(added_nodes: usize) -> Self {
        Self { added_nodes }
    }

    pub fn has_insertions(&self) -> bool {
        self.added_nodes > 0
    }
}

/// Document-wide subtree watch for node insertions.
#[async_trait(?Send)]
pub trait MutationWatch {
    /// Next batch, or `None` once the host stopped delivering.
    ///
    /// Must be cancel-safe, it is polled inside `select!`.
    async fn next_batch(&mut self) -> Option<MutationBatch>;

    /// Tear the watch down. Called at most once.
    async fn disconnect(&mut self);
}

/// Adapts any stream of batches, e.g. a channel fed by the host.
pub struct StreamWatch<S> {
    stream: Option<S>,
}

impl<S> StreamWatch<S> {
    pub fn new(stream: S) -> Self {
        Self { stream: Some(stream) }
    }
}

#[async_trait(?Send)]
impl<S> MutationWatch for StreamWatch<S>
where
    S: Stream<Item = MutationBatch> + Unpin,
{
    async fn next_batch(&mut self) -> Option<MutationBatch> {
        match self.stream.as_mut() {
            Some(stream) => stream.next().await,
            None => None,
        }
    }

    async fn disconnect(&mut self) {
        self.stream = None;
    }
}

/// For hosts that cannot observe the document; only timed triggers run.
#[derive(Debug, Default)]
pub struct NoWatch;

#[async_trait(?Send)]
impl MutationWatch for NoWatch {
    async fn next_batch(&mut self) -> Option<MutationBatch> {
        None
    }

    async fn disconnect(&mut self) {}
}
