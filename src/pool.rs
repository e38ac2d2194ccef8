//! Bounded worker pool
//!
//! Fan-out/fan-in executor: a fixed number of OS threads pull tasks from a
//! shared queue and append tagged outcomes to a shared collection. Tasks
//! beyond the pool size queue up instead of spawning more threads. `wait`
//! is a join barrier over task completion (not queue emptiness), and
//! `shutdown` terminates workers with one sentinel each.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use thiserror::Error;

/// Why a task produced no value.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("{0}")]
    Failed(String),

    #[error("task panicked: {0}")]
    Panicked(String),

    #[error("abandoned: completion deadline expired")]
    Abandoned,
}

/// The result of one task, tagged with the identity it was submitted under.
/// Collection order is unspecified; correlate by tag, never by position.
#[derive(Clone, Debug)]
pub struct TaskOutcome<T> {
    pub tag: String,
    pub result: Result<T, TaskError>,
}

type Job<T> = Box<dyn FnOnce() -> Result<T, TaskError> + Send + 'static>;

enum Message<T> {
    Run(String, Job<T>),
    Shutdown,
}

/// Tracks how many submitted tasks have not finished executing yet.
#[derive(Default)]
struct Barrier {
    pending: Mutex<usize>,
    done: Condvar,
}

pub struct WorkerPool<T> {
    sender: Sender<Message<T>>,
    receiver: Receiver<Message<T>>,
    workers: Vec<JoinHandle<()>>,
    results: Arc<Mutex<Vec<TaskOutcome<T>>>>,
    barrier: Arc<Barrier>,
    size: usize,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Creates a pool of `size` workers (clamped to at least one). Workers
    /// do not run until [`start`](Self::start).
    pub fn new(size: usize) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            workers: Vec::new(),
            results: Arc::new(Mutex::new(Vec::new())),
            barrier: Arc::new(Barrier::default()),
            size: size.max(1),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of submitted tasks that have not finished executing.
    pub fn pending(&self) -> usize {
        *self.barrier.pending.lock()
    }

    /// Enqueues a task. Never blocks; the queue is unbounded, so callers
    /// are responsible for keeping submissions within memory limits.
    pub fn submit<F>(&self, tag: impl Into<String>, job: F)
    where
        F: FnOnce() -> Result<T, TaskError> + Send + 'static,
    {
        *self.barrier.pending.lock() += 1;
        // The queue outlives all senders; this cannot fail while the pool
        // itself holds the receiver.
        let _ = self
            .sender
            .send(Message::Run(tag.into(), Box::new(job)));
    }

    /// Launches the workers.
    pub fn start(&mut self) -> std::io::Result<()> {
        for n in 0..self.size {
            let receiver = self.receiver.clone();
            let results = Arc::clone(&self.results);
            let barrier = Arc::clone(&self.barrier);

            let handle = thread::Builder::new()
                .name(format!("craftcost-worker-{}", n))
                .spawn(move || worker_loop(receiver, results, barrier))?;
            self.workers.push(handle);
        }
        Ok(())
    }

    /// Blocks until every submitted task has finished executing, or until
    /// the optional deadline expires. Returns `true` when all tasks are
    /// done; `false` means some tasks are still outstanding and will be
    /// abandoned by `shutdown`.
    pub fn wait(&self, deadline: Option<Duration>) -> bool {
        let mut pending = self.barrier.pending.lock();
        match deadline {
            None => {
                while *pending > 0 {
                    self.barrier.done.wait(&mut pending);
                }
                true
            }
            Some(limit) => {
                let until = Instant::now() + limit;
                while *pending > 0 {
                    if self.barrier.done.wait_until(&mut pending, until).timed_out() {
                        return *pending == 0;
                    }
                }
                true
            }
        }
    }

    /// Sends one sentinel per worker and collects the outcomes. Call only
    /// after [`wait`](Self::wait); if `wait` timed out, busy workers are
    /// left to drain on their own instead of being joined.
    pub fn shutdown(mut self) -> Vec<TaskOutcome<T>> {
        for _ in 0..self.workers.len() {
            let _ = self.sender.send(Message::Shutdown);
        }

        let drained = *self.barrier.pending.lock() == 0;
        for handle in self.workers.drain(..) {
            if drained {
                let _ = handle.join();
            }
        }

        std::mem::take(&mut *self.results.lock())
    }
}

impl<T> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        // Covers pools dropped without an explicit shutdown.
        for _ in 0..self.workers.len() {
            let _ = self.sender.send(Message::Shutdown);
        }
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop<T: Send + 'static>(
    receiver: Receiver<Message<T>>,
    results: Arc<Mutex<Vec<TaskOutcome<T>>>>,
    barrier: Arc<Barrier>,
) {
    while let Ok(message) = receiver.recv() {
        let (tag, job) = match message {
            Message::Shutdown => break,
            Message::Run(tag, job) => (tag, job),
        };

        // A panicking task must not kill its worker silently; record it as
        // a failed outcome so the barrier still opens.
        let result = catch_unwind(AssertUnwindSafe(job))
            .unwrap_or_else(|payload| Err(TaskError::Panicked(panic_message(&payload))));

        results.lock().push(TaskOutcome { tag, result });

        let mut pending = barrier.pending.lock();
        *pending -= 1;
        barrier.done.notify_all();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
