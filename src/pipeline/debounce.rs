//! Debounce gate: holds the latest job back until editing pauses.
//!
//! Every edit re-arms a single timer with the delay proposed by the
//! [`TimingEstimator`]. Re-arming discards the previously armed job. When
//! the timer expires without another edit, the armed job is moved into the
//! [`CoalescingQueue`].
//!
//! The delay is computed *before* the gap of the current edit is recorded,
//! so an edit never influences its own debounce interval.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::queue::CoalescingQueue;
use super::timing::TimingEstimator;
use crate::debug;

struct Armed<T> {
    deadline: Instant,
    item: T,
}

struct TimerState<T> {
    armed: Option<Armed<T>>,
    shutdown: bool,
}

struct Shared<T> {
    state: Mutex<TimerState<T>>,
    wake: Condvar,
    queue: Arc<CoalescingQueue<T>>,
}

pub struct DebounceGate<T: Send + 'static> {
    shared: Arc<Shared<T>>,
    timing: Arc<Mutex<TimingEstimator>>,
    last_edit: Mutex<Option<Instant>>,
    timer: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> DebounceGate<T> {
    /// Spawn the timer thread feeding `queue`.
    pub fn new(
        timing: Arc<Mutex<TimingEstimator>>,
        queue: Arc<CoalescingQueue<T>>,
    ) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(TimerState {
                armed: None,
                shutdown: false,
            }),
            wake: Condvar::new(),
            queue,
        });

        let timer = thread::Builder::new()
            .name("hurtigbrief-debounce".into())
            .spawn({
                let shared = Arc::clone(&shared);
                move || run_timer(&shared)
            })?;

        Ok(Self {
            shared,
            timing,
            last_edit: Mutex::new(None),
            timer: Some(timer),
        })
    }

    /// Arm the timer for `item`, superseding any armed item.
    ///
    /// Returns the delay the timer was armed with.
    pub fn on_edit(&self, item: T) -> Duration {
        let now = Instant::now();
        let delay = self.timing.lock().propose_delay();

        let superseded = {
            let mut state = self.shared.state.lock();
            state
                .armed
                .replace(Armed {
                    deadline: now + delay,
                    item,
                })
                .is_some()
        };
        self.shared.wake.notify_one();
        if superseded {
            debug!("debounce"; "timer re-armed, pending job superseded");
        }

        // First edit of the session has no predecessor; a long pause opens
        // a new session.
        if let Some(previous) = self.last_edit.lock().replace(now) {
            let gap = now.duration_since(previous);
            if !self.timing.lock().record_edit_gap(gap) {
                debug!("debounce"; "new editing session after {:.1}s pause", gap.as_secs_f64());
            }
        }

        delay
    }

    /// Disarm the timer, dropping the armed item. Returns whether one was armed.
    pub fn cancel(&self) -> bool {
        let cancelled = self.shared.state.lock().armed.take().is_some();
        self.shared.wake.notify_one();
        cancelled
    }

    pub fn is_armed(&self) -> bool {
        self.shared.state.lock().armed.is_some()
    }
}

impl<T: Send + 'static> Drop for DebounceGate<T> {
    fn drop(&mut self) {
        self.shared.state.lock().shutdown = true;
        self.shared.wake.notify_all();
        if let Some(timer) = self.timer.take() {
            let _ = timer.join();
        }
    }
}

fn run_timer<T>(shared: &Shared<T>) {
    let mut state = shared.state.lock();
    loop {
        if state.shutdown {
            return;
        }

        let Some(deadline) = state.armed.as_ref().map(|armed| armed.deadline) else {
            shared.wake.wait(&mut state);
            continue;
        };

        if Instant::now() >= deadline {
            // Firing under the lock keeps a concurrent re-arm from racing the move.
            if let Some(armed) = state.armed.take() {
                enqueue(&shared.queue, armed.item);
            }
        } else {
            shared.wake.wait_until(&mut state, deadline);
        }
    }
}

/// Move a fired item into the queue, overwriting anything unclaimed.
fn enqueue<T>(queue: &CoalescingQueue<T>, item: T) {
    if queue.put(item).is_some() {
        debug!("debounce"; "queued job superseded before the worker took it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;

    fn gate_with_compile_time(
        compile: Duration,
    ) -> (
        DebounceGate<u32>,
        Arc<CoalescingQueue<u32>>,
        Arc<Mutex<TimingEstimator>>,
    ) {
        let mut estimator = TimingEstimator::default();
        estimator.record_compile_duration(compile);
        let timing = Arc::new(Mutex::new(estimator));
        let queue = Arc::new(CoalescingQueue::new());
        let gate = DebounceGate::new(Arc::clone(&timing), Arc::clone(&queue)).unwrap();
        (gate, queue, timing)
    }

    #[test]
    fn test_burst_enqueues_only_last() {
        // 1.5 * 200ms
        let (gate, queue, _) = gate_with_compile_time(Duration::from_millis(200));

        for item in 1..=3 {
            gate.on_edit(item);
            thread::sleep(Duration::from_millis(20));
        }
        assert!(queue.is_empty(), "fired before the burst ended");
        assert!(gate.is_armed());

        assert_eq!(queue.take_timeout(Duration::from_secs(2)), Some(3));
        assert_eq!(queue.take_timeout(Duration::from_millis(500)), None);
        assert!(!gate.is_armed());
    }

    #[test]
    fn test_zero_delay_fires_immediately() {
        let timing = Arc::new(Mutex::new(TimingEstimator::default()));
        let queue = Arc::new(CoalescingQueue::new());
        let gate = DebounceGate::new(timing, Arc::clone(&queue)).unwrap();

        assert_eq!(gate.on_edit(42), Duration::ZERO);
        assert_eq!(queue.take_timeout(Duration::from_secs(1)), Some(42));
    }

    #[test]
    fn test_cancel_drops_armed_item() {
        let (gate, queue, _) = gate_with_compile_time(Duration::from_millis(100));

        gate.on_edit(1);
        assert!(gate.cancel());
        assert!(!gate.cancel());
        assert_eq!(queue.take_timeout(Duration::from_millis(400)), None);
    }

    #[test]
    fn test_first_edit_records_no_gap() {
        let (gate, queue, timing) = gate_with_compile_time(Duration::from_millis(100));

        gate.on_edit(1);
        assert_eq!(timing.lock().keystroke_gaps().len(), 0);

        thread::sleep(Duration::from_millis(10));
        gate.on_edit(2);
        assert_eq!(timing.lock().keystroke_gaps().len(), 1);
        assert!(timing.lock().mean_gap() >= 0.01);

        assert_eq!(queue.take_timeout(Duration::from_secs(2)), Some(2));
    }

    #[test]
    fn test_delay_uses_history_before_this_edit() {
        let (gate, queue, _) = gate_with_compile_time(Duration::from_millis(100));

        let first = gate.on_edit(1);
        assert!((first.as_secs_f64() - 0.15).abs() < 1e-9);

        // Long gap, recorded only after the second delay was proposed.
        thread::sleep(Duration::from_millis(300));
        assert_eq!(queue.take_timeout(Duration::from_secs(1)), Some(1));
        let second = gate.on_edit(2);
        assert!((second.as_secs_f64() - 0.15).abs() < 1e-9);

        let third = gate.on_edit(3);
        assert!(third > second);
    }

    #[test]
    fn test_idle_pause_does_not_stretch_delay() {
        let config = SchedulerConfig {
            max_edit_gap: 0.5,
            ..SchedulerConfig::default()
        };
        let timing = Arc::new(Mutex::new(TimingEstimator::new(&config)));
        let queue = Arc::new(CoalescingQueue::new());
        let gate = DebounceGate::new(Arc::clone(&timing), Arc::clone(&queue)).unwrap();

        assert_eq!(gate.on_edit(1), Duration::ZERO);
        thread::sleep(Duration::from_millis(700));
        assert_eq!(gate.on_edit(2), Duration::ZERO);
        assert_eq!(gate.on_edit(3), Duration::ZERO);
        assert_eq!(timing.lock().keystroke_gaps().len(), 1);
        assert!(timing.lock().mean_gap() < 0.5);

        thread::sleep(Duration::from_millis(100));
        assert_eq!(queue.try_take(), Some(3));
    }

    #[test]
    fn test_drop_stops_timer() {
        let (gate, queue, _) = gate_with_compile_time(Duration::from_millis(100));
        gate.on_edit(1);
        drop(gate);
        assert_eq!(queue.take_timeout(Duration::from_millis(300)), None);
    }
}
