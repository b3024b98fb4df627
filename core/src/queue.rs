use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// The number of worker threads used when none (or an invalid count) is
/// requested.
pub const DEFAULT_THREADS: usize = 5;

struct QueueState {
    tasks: VecDeque<Task>,
    /// Tasks submitted but not yet finished, including tasks still queued.
    pending: usize,
    shutdown: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    /// Signals workers that a task was queued or shutdown was requested.
    work_available: Condvar,
    /// Signals `finish` callers that the pending count reached zero.
    idle: Condvar,
}

/// A fixed pool of worker threads consuming a shared FIFO task queue.
///
/// Tasks may submit further tasks; `finish` blocks until all submitted work,
/// including transitively spawned work, has completed, and the queue can then
/// be reused for another phase. Shutdown is cooperative: workers stop picking
/// up new tasks but in-flight tasks run to completion.
pub struct WorkQueue {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl WorkQueue {
    /// Starts a work queue with the default number of worker threads.
    pub fn new() -> Self {
        Self::with_threads(DEFAULT_THREADS)
    }

    /// Starts a work queue with the given number of worker threads, falling
    /// back to the default when the count is zero.
    pub fn with_threads(threads: usize) -> Self {
        let threads = if threads == 0 {
            tracing::warn!(
                requested = threads,
                fallback = DEFAULT_THREADS,
                "invalid worker count, using default"
            );
            DEFAULT_THREADS
        } else {
            threads
        };

        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                pending: 0,
                shutdown: false,
            }),
            work_available: Condvar::new(),
            idle: Condvar::new(),
        });

        let workers = (0..threads)
            .map(|i| {
                let shared = Arc::clone(&shared);
                std::thread::Builder::new()
                    .name(format!("sift-worker-{i}"))
                    .spawn(move || worker_loop(&shared))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        WorkQueue {
            shared,
            workers: Mutex::new(workers),
            size: threads,
        }
    }

    /// Enqueues a task to be run by a worker thread. Returns immediately; the
    /// pending count is raised before the task is queued so that a `finish`
    /// racing with this call cannot miss it.
    pub fn execute<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.state.lock();
        if state.shutdown {
            tracing::warn!("task submitted after shutdown, dropping");
            return;
        }
        state.pending += 1;
        state.tasks.push_back(Box::new(task));
        self.shared.work_available.notify_one();
    }

    /// Blocks until every submitted task, including tasks submitted by other
    /// tasks, has completed. Does not stop the workers; the queue can keep
    /// being used afterwards, and this may be called repeatedly and from
    /// multiple threads.
    pub fn finish(&self) {
        let mut state = self.shared.state.lock();
        while state.pending > 0 {
            tracing::trace!(pending = state.pending, "waiting for tasks to finish");
            self.shared.idle.wait(&mut state);
        }
    }

    /// Asks the workers to stop picking up new tasks. Queued but unstarted
    /// tasks are abandoned; in-flight tasks are not interrupted.
    pub fn shutdown(&self) {
        let mut state = self.shared.state.lock();
        state.shutdown = true;
        self.shared.work_available.notify_all();
    }

    /// Waits for all work to finish, then shuts down and joins the worker
    /// threads. The queue cannot be reused afterwards.
    pub fn join(&self) {
        self.finish();
        self.shutdown();
        for worker in self.workers.lock().drain(..) {
            if worker.join().is_err() {
                tracing::error!("worker thread terminated abnormally");
            }
        }
    }

    /// Number of worker threads in the pool.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let task = {
            let mut state = shared.state.lock();
            while state.tasks.is_empty() && !state.shutdown {
                shared.work_available.wait(&mut state);
            }
            // Shutdown wins even when tasks remain queued.
            if state.shutdown {
                break;
            }
            state.tasks.pop_front().expect("task queue is non-empty")
        };

        // Catch panics at the worker boundary so a failing task neither kills
        // the worker nor leaks the pending count.
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            tracing::error!(
                worker = std::thread::current().name().unwrap_or("worker"),
                "task panicked"
            );
        }

        let mut state = shared.state.lock();
        state.pending -= 1;
        if state.pending == 0 {
            shared.idle.notify_all();
        }
    }
}
