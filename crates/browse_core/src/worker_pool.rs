//! Bounded worker pool (spec component C7).
//!
//! Tasks run on tokio's blocking thread pool, gated by a semaphore so the
//! number of tasks actually executing concurrently is bounded the way the
//! spec asks (`default: CPU count`), independent of tokio's own (much
//! larger) blocking-thread limit. Callbacks for a single task are always
//! invoked from that task's own future, in order, so the
//! `started -> progress* -> (result xor error)? -> finished` contract holds
//! without extra synchronization.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use types::{ErrorKind, Result, TaskId, TaskState};

use bytes::Bytes;
use types::DecodedImage;

/// The small closed set of values a task in this workspace can produce.
/// Internal-only (thumbnail coordinator, image pipeline); a public API
/// serving arbitrary callers would make this generic, but every caller here
/// is known up front.
#[derive(Debug, Clone)]
pub enum TaskOutput {
    Bytes(Bytes),
    Image(DecodedImage),
}

/// Passed to the task closure so it can cooperate with cancellation and
/// report progress without reaching back into the pool.
type ProgressCallback = Box<dyn Fn(u8, &str) + Send + Sync>;

pub struct TaskContext {
    cancel_flag: Arc<AtomicBool>,
    progress: Option<ProgressCallback>,
}

impl TaskContext {
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::SeqCst)
    }

    pub fn report_progress(&self, percent: u8, message: &str) {
        if let Some(progress) = &self.progress {
            progress(percent, message);
        }
    }
}

/// Callbacks bound at `submit` time. All are optional; a caller only wires
/// up the ones it needs.
#[derive(Default)]
pub struct TaskCallbacks {
    pub on_started: Option<Box<dyn FnOnce() + Send>>,
    pub on_progress: Option<ProgressCallback>,
    pub on_result: Option<Box<dyn FnOnce(TaskOutput) + Send>>,
    pub on_error: Option<Box<dyn FnOnce(ErrorKind) + Send>>,
    pub on_done: Option<Box<dyn FnOnce() + Send>>,
}

/// Per-task bookkeeping tracked by the pool for as long as a task is live
/// (spec §3's `Task.state`, alongside the cancel flag it's checked against).
struct TaskHandle {
    cancel_flag: Arc<AtomicBool>,
    state: Arc<Mutex<TaskState>>,
}

pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    tasks: Arc<Mutex<HashMap<TaskId, TaskHandle>>>,
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl WorkerPool {
    /// `worker_threads` is the bound on concurrently *executing* tasks; 0
    /// falls back to the CPU count, matching the spec's stated default.
    pub fn new(worker_threads: usize) -> Self {
        let threads = if worker_threads == 0 {
            num_cpus::get()
        } else {
            worker_threads
        };
        Self {
            semaphore: Arc::new(Semaphore::new(threads)),
            tasks: Arc::new(Mutex::new(HashMap::new())),
            handles: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Submits `work` for execution and returns its task id immediately.
    pub fn submit<F>(&self, work: F, mut callbacks: TaskCallbacks) -> TaskId
    where
        F: FnOnce(&TaskContext) -> Result<TaskOutput> + Send + 'static,
    {
        let id = TaskId::new_v4();
        let cancel_flag = Arc::new(AtomicBool::new(false));
        let state = Arc::new(Mutex::new(TaskState::Pending));
        self.tasks.lock().insert(
            id,
            TaskHandle {
                cancel_flag: cancel_flag.clone(),
                state: state.clone(),
            },
        );

        let on_started = callbacks.on_started.take();
        let on_progress = callbacks.on_progress.take();
        let on_result = callbacks.on_result.take();
        let on_error = callbacks.on_error.take();
        let on_done = callbacks.on_done.take();

        let semaphore = self.semaphore.clone();
        let tasks = self.tasks.clone();
        let task_cancel_flag = cancel_flag.clone();
        let task_state = state.clone();

        let handle = tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("worker pool semaphore is never closed");

            *task_state.lock() = TaskState::Running;
            if let Some(cb) = on_started {
                cb();
            }

            let ctx = TaskContext {
                cancel_flag: task_cancel_flag.clone(),
                progress: on_progress,
            };
            let outcome = tokio::task::spawn_blocking(move || work(&ctx)).await;
            let cancelled = task_cancel_flag.load(Ordering::SeqCst);

            match outcome {
                Ok(Ok(value)) if !cancelled => {
                    *task_state.lock() = TaskState::Completed;
                    if let Some(cb) = on_result {
                        cb(value);
                    }
                }
                Ok(Err(err)) if !cancelled => {
                    *task_state.lock() = TaskState::Failed;
                    if let Some(cb) = on_error {
                        cb(err);
                    }
                }
                Ok(_) => {
                    // Either cancelled, or completed after cancellation:
                    // no `result`/`error` signal, just `finished` below.
                    *task_state.lock() = TaskState::Cancelled;
                }
                Err(join_err) if !cancelled => {
                    *task_state.lock() = TaskState::Failed;
                    tracing::error!(error = %join_err, "worker task panicked");
                    if let Some(cb) = on_error {
                        cb(ErrorKind::CorruptArchive(join_err.to_string()));
                    }
                }
                Err(_) => {
                    *task_state.lock() = TaskState::Cancelled;
                }
            }

            tasks.lock().remove(&id);
            if let Some(cb) = on_done {
                cb();
            }
        });

        self.handles.lock().push(handle);
        id
    }

    /// Current lifecycle state of `id`, or `None` once the task has been
    /// removed from the registry (after its `finished` callback fired).
    pub fn state(&self, id: TaskId) -> Option<TaskState> {
        self.tasks.lock().get(&id).map(|handle| *handle.state.lock())
    }

    /// Sets the cancel flag for `id`. An in-flight task that has not yet
    /// checked the flag still runs to completion, but its result is
    /// suppressed; only `finished` is delivered.
    pub fn cancel(&self, id: TaskId) {
        if let Some(handle) = self.tasks.lock().get(&id) {
            handle.cancel_flag.store(true, Ordering::SeqCst);
        }
    }

    /// Cancels every currently-tracked task and clears the registry.
    /// Running tasks keep executing to completion (cooperative
    /// cancellation); they simply won't be found here again. See
    /// DESIGN.md for why this workspace picked "keep running, drop
    /// results" over killing threads outright.
    pub fn cancel_all(&self) {
        let mut tasks = self.tasks.lock();
        for handle in tasks.values() {
            handle.cancel_flag.store(true, Ordering::SeqCst);
        }
        tasks.clear();
    }

    /// Drains the pool, optionally bounded by a timeout.
    pub async fn wait_for_all(&self, timeout_ms: Option<u64>) {
        let handles: Vec<_> = std::mem::take(&mut *self.handles.lock());
        let join_all = futures::future::join_all(handles);
        match timeout_ms {
            Some(ms) => {
                let _ = tokio::time::timeout(Duration::from_millis(ms), join_all).await;
            }
            None => {
                join_all.await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn result_delivered_when_not_cancelled() {
        let pool = WorkerPool::new(2);
        let (tx, rx) = tokio::sync::oneshot::channel();
        let tx = Arc::new(Mutex::new(Some(tx)));
        let tx2 = tx.clone();
        pool.submit(
            |_ctx| Ok(TaskOutput::Bytes(Bytes::from_static(b"hi"))),
            TaskCallbacks {
                on_result: Some(Box::new(move |out| {
                    if let TaskOutput::Bytes(b) = out {
                        let _ = tx2.lock().take().unwrap().send(b);
                    }
                })),
                ..Default::default()
            },
        );
        let got = rx.await.unwrap();
        assert_eq!(&got[..], b"hi");
        let _ = tx;
    }

    #[tokio::test]
    async fn cancelled_task_suppresses_result_but_still_finishes() {
        let pool = WorkerPool::new(1);
        let result_fired = Arc::new(AtomicUsize::new(0));
        let done_fired = Arc::new(AtomicUsize::new(0));
        let result_fired2 = result_fired.clone();
        let done_fired2 = done_fired.clone();

        let id = pool.submit(
            |ctx| {
                std::thread::sleep(Duration::from_millis(50));
                if ctx.is_cancelled() {
                    return Err(ErrorKind::Cancelled);
                }
                Ok(TaskOutput::Bytes(Bytes::new()))
            },
            TaskCallbacks {
                on_result: Some(Box::new(move |_| {
                    result_fired2.fetch_add(1, Ordering::SeqCst);
                })),
                on_done: Some(Box::new(move || {
                    done_fired2.fetch_add(1, Ordering::SeqCst);
                })),
                ..Default::default()
            },
        );
        pool.cancel(id);
        pool.wait_for_all(Some(1000)).await;

        assert_eq!(result_fired.load(Ordering::SeqCst), 0);
        assert_eq!(done_fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn state_surfaces_running_then_completed_then_forgotten() {
        let pool = WorkerPool::new(1);
        let (release_tx, release_rx) = tokio::sync::oneshot::channel();
        let release_rx = Arc::new(Mutex::new(Some(release_rx)));

        let id = pool.submit(
            move |_ctx| {
                let _ = release_rx.lock().take().unwrap().blocking_recv();
                Ok(TaskOutput::Bytes(Bytes::new()))
            },
            TaskCallbacks::default(),
        );

        // Give the spawned task a moment to acquire its permit and start.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(pool.state(id), Some(TaskState::Running));

        release_tx.send(()).unwrap();
        pool.wait_for_all(Some(1000)).await;
        assert_eq!(pool.state(id), None);
    }
}
