use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use scc::HashMap;
use tokio::task::JoinHandle;

/// Identifies one scheduled one-shot timer. Returned by
/// [`TimerSource::schedule_timer`] and used to cancel it, or to recognize
/// which pending call a fired timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Invoked once when a timer scheduled through [`TimerSource`] fires.
/// Never invoked for a timer that was cancelled first.
pub trait TimerObserver: Send + Sync + 'static {
    fn on_timer(&self, timer_id: TimerId);
}

/// The reactor/timer collaborator the client engine depends on to arm a
/// per-call deadline. The core only needs one-shot timers; the concrete
/// reactor (epoll loop, tokio runtime, anything else) is out of scope —
/// [`TokioTimerSource`] is the one obvious implementation shipped so the
/// engine can be exercised without a bespoke reactor.
pub trait TimerSource: Send + Sync + 'static {
    fn schedule_timer(&self, delay: Duration, observer: Arc<dyn TimerObserver>) -> TimerId;

    /// Cancels a still-pending timer. Returns `false` if it already fired
    /// or was never scheduled.
    fn cancel_timer(&self, timer_id: TimerId) -> bool;
}

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

fn next_timer_id() -> TimerId {
    TimerId(NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed))
}

/// [`TimerSource`] backed by `tokio::time::sleep`, spawned on whatever
/// runtime `schedule_timer` is called from. `handles` lives behind an `Arc`
/// so a spawned timer task can reap its own entry once it fires — a timer
/// that isn't cancelled first would otherwise leak its `JoinHandle` for the
/// life of the process.
#[derive(Debug, Default)]
pub struct TokioTimerSource {
    handles: Arc<HashMap<TimerId, JoinHandle<()>>>,
}

impl TokioTimerSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimerSource for TokioTimerSource {
    fn schedule_timer(&self, delay: Duration, observer: Arc<dyn TimerObserver>) -> TimerId {
        let timer_id = next_timer_id();
        let handles = self.handles.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            observer.on_timer(timer_id);
            let _ = handles.remove(&timer_id);
        });
        let _ = self.handles.insert(timer_id, handle);
        timer_id
    }

    fn cancel_timer(&self, timer_id: TimerId) -> bool {
        let Some((_, handle)) = self.handles.remove(&timer_id) else {
            return false;
        };
        let already_finished = handle.is_finished();
        handle.abort();
        !already_finished
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::{TimerId, TimerObserver, TimerSource, TokioTimerSource};

    struct RecordingObserver(Mutex<Vec<TimerId>>);

    impl TimerObserver for RecordingObserver {
        fn on_timer(&self, timer_id: TimerId) {
            self.0.lock().unwrap().push(timer_id);
        }
    }

    #[tokio::test]
    async fn fires_after_delay() {
        let source = TokioTimerSource::new();
        let observer = std::sync::Arc::new(RecordingObserver(Mutex::new(Vec::new())));
        let timer_id = source.schedule_timer(Duration::from_millis(10), observer.clone());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(observer.0.lock().unwrap().as_slice(), [timer_id]);
    }

    #[tokio::test]
    async fn cancel_before_fire_suppresses_the_callback() {
        let source = TokioTimerSource::new();
        let observer = std::sync::Arc::new(RecordingObserver(Mutex::new(Vec::new())));
        let timer_id = source.schedule_timer(Duration::from_millis(50), observer.clone());

        assert!(source.cancel_timer(timer_id));
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(observer.0.lock().unwrap().is_empty());
    }
}
