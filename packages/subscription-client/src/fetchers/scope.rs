use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Lifetime of one view's fetches. Results are accepted only while the view
/// is open and the session identity is the one the view started under.
#[derive(Debug, Clone)]
pub struct ViewScope {
    started_at: u64,
    current: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
}

impl ViewScope {
    pub fn new(current: Arc<AtomicU64>) -> Self {
        Self {
            started_at: current.load(Ordering::SeqCst),
            current,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn generation(&self) -> u64 {
        self.started_at
    }

    /// Called when the view goes away.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_current(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
            && self.current.load(Ordering::SeqCst) == self.started_at
    }

    pub fn accept<T>(&self, value: T) -> Option<T> {
        self.is_current().then_some(value)
    }

    /// Awaits `fetch` and drops its output if the scope went stale meanwhile.
    pub async fn run<F: Future>(&self, fetch: F) -> Option<F::Output> {
        let output = fetch.await;
        self.accept(output)
    }
}
