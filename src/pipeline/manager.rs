//! Task manager: the single entry point of the compile pipeline.
//!
//! Owns the timing statistics, the debounce gate, the coalescing queue and
//! the worker thread. At most one compile runs at any time; requests that
//! arrive during a compile coalesce into the queue slot and the newest one
//! runs next.
//!
//! Results and compile times are published on one unbounded crossbeam
//! channel. [`TaskManager::events`] hands out receivers of that channel;
//! they compete for events rather than each seeing all of them.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam::channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use super::debounce::DebounceGate;
use super::messages::{CompileError, CompileEvent, CompileRequest, CompileResult, Job, JobId};
use super::queue::CoalescingQueue;
use super::timing::TimingEstimator;
use super::worker::{CompileWorker, JobStage, trace};
use crate::config::SchedulerConfig;
use crate::debug;

pub struct TaskManager {
    gate: DebounceGate<Job>,
    queue: Arc<CoalescingQueue<Job>>,
    timing: Arc<Mutex<TimingEstimator>>,
    next_id: AtomicU64,
    events: Receiver<CompileEvent>,
    worker: Option<JoinHandle<()>>,
}

impl TaskManager {
    /// Start the pipeline with empty timing history.
    pub fn start(config: &SchedulerConfig, worker: CompileWorker) -> Result<Self> {
        Self::with_estimator(TimingEstimator::new(config), worker)
    }

    /// Start the pipeline with pre-seeded timing statistics.
    pub fn with_estimator(estimator: TimingEstimator, worker: CompileWorker) -> Result<Self> {
        let timing = Arc::new(Mutex::new(estimator));
        let queue = Arc::new(CoalescingQueue::new());
        let (tx, rx) = unbounded();

        let gate = DebounceGate::new(Arc::clone(&timing), Arc::clone(&queue))
            .context("failed to spawn debounce timer")?;

        let handle = thread::Builder::new()
            .name("hurtigbrief-worker".into())
            .spawn({
                let queue = Arc::clone(&queue);
                let timing = Arc::clone(&timing);
                move || run_worker(worker, &queue, &timing, &tx)
            })
            .context("failed to spawn compile worker")?;

        Ok(Self {
            gate,
            queue,
            timing,
            next_id: AtomicU64::new(0),
            events: rx,
            worker: Some(handle),
        })
    }

    /// Hand in a new document snapshot. Never blocks on compilation.
    pub fn submit(&self, request: CompileRequest) -> JobId {
        let id = JobId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let delay = self.gate.on_edit(Job { id, request });
        debug!("submit"; "job {} armed, fires in {:.2}s", id, delay.as_secs_f64());
        id
    }

    /// Receiver for compile events.
    ///
    /// All receivers share one channel: each event is delivered to exactly
    /// one of them, so use a single consumer and fan out from there. The
    /// manager holds a receiver itself, so the channel stays open while it
    /// lives and undrained events accumulate in memory.
    pub fn events(&self) -> Receiver<CompileEvent> {
        self.events.clone()
    }

    /// Delay the next edit would be debounced with.
    pub fn proposed_delay(&self) -> Duration {
        self.timing.lock().propose_delay()
    }

    /// Snapshot of the timing statistics.
    pub fn timing(&self) -> TimingEstimator {
        self.timing.lock().clone()
    }

    /// Drop pending work and wait for a running compile to finish.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.gate.cancel();
        self.queue.close();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(
    mut worker: CompileWorker,
    queue: &CoalescingQueue<Job>,
    timing: &Mutex<TimingEstimator>,
    tx: &Sender<CompileEvent>,
) {
    while let Some(job) = queue.take_latest() {
        trace(&job, JobStage::Queued);
        let start = Instant::now();

        let outcome = catch_unwind(AssertUnwindSafe(|| worker.run(&job)))
            .unwrap_or_else(|payload| Err(CompileError::Panicked(panic_message(&*payload))));

        let elapsed = start.elapsed();
        timing.lock().record_compile_duration(elapsed);
        trace(&job, JobStage::Completed);

        // Nobody may be listening; the loop keeps serving the queue anyway.
        let _ = tx.send(CompileEvent::CompileTime {
            job: job.id,
            elapsed,
        });
        let _ = tx.send(CompileEvent::Finished(CompileResult {
            job: job.id,
            outcome: outcome.into(),
            elapsed,
        }));
    }
    debug!("worker"; "queue closed, worker exiting");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
