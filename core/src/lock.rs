use parking_lot::{Condvar, Mutex};
use std::thread::{self, ThreadId};

#[derive(Debug, Default)]
struct LockState {
    /// Number of threads currently holding the read lock.
    readers: usize,
    /// Write hold count; greater than one only when the active writer has
    /// re-acquired the write lock.
    writers: usize,
    /// The thread holding the write lock, if any.
    active_writer: Option<ThreadId>,
}

impl LockState {
    fn is_active_writer(&self) -> bool {
        self.active_writer == Some(thread::current().id())
    }
}

/// A reader/writer lock with writer re-entrancy. The read lock may be held by
/// many threads at once as long as no writer is active. The write lock is
/// exclusive, but the active writer may re-acquire either lock without
/// blocking on itself, which lets a locked mutating method call another
/// locked method on the same thread.
///
/// Releasing a lock that is not held, or releasing the write lock from a
/// thread that is not the active writer, is a precondition violation and
/// panics.
#[derive(Debug, Default)]
pub struct MultiReaderLock {
    state: Mutex<LockState>,
    cond: Condvar,
}

impl MultiReaderLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until no writer other than the current thread is active, then
    /// acquires the read lock.
    pub fn lock_read(&self) {
        let mut state = self.state.lock();
        while state.writers > 0 && !state.is_active_writer() {
            self.cond.wait(&mut state);
        }
        state.readers += 1;
    }

    /// Releases the read lock, waking waiting writers once the reader count
    /// reaches zero.
    ///
    /// # Panics
    ///
    /// Panics if no readers currently hold the lock.
    pub fn unlock_read(&self) {
        let mut state = self.state.lock();
        if state.readers == 0 {
            panic!("no readers to unlock");
        }
        state.readers -= 1;
        if state.readers == 0 {
            self.cond.notify_all();
        }
    }

    /// Blocks until no reader and no other writer is active, then acquires
    /// the write lock and records the current thread as the active writer.
    pub fn lock_write(&self) {
        let mut state = self.state.lock();
        while (state.readers > 0 || state.writers > 0) && !state.is_active_writer() {
            self.cond.wait(&mut state);
        }
        state.writers += 1;
        state.active_writer = Some(thread::current().id());
    }

    /// Releases one write hold, clearing the active writer and waking waiters
    /// when the last hold is released.
    ///
    /// # Panics
    ///
    /// Panics if no writer holds the lock, or if called from a thread other
    /// than the active writer.
    pub fn unlock_write(&self) {
        let mut state = self.state.lock();
        if state.writers == 0 {
            panic!("no writers to unlock");
        }
        if !state.is_active_writer() {
            panic!("write lock released by a thread that does not hold it");
        }
        state.writers -= 1;
        if state.writers == 0 {
            state.active_writer = None;
            self.cond.notify_all();
        }
    }

    /// Acquires the read lock and returns a guard releasing it on drop.
    pub fn read(&self) -> ReadGuard<'_> {
        self.lock_read();
        ReadGuard { lock: self }
    }

    /// Acquires the write lock and returns a guard releasing it on drop.
    pub fn write(&self) -> WriteGuard<'_> {
        self.lock_write();
        WriteGuard { lock: self }
    }

    /// Number of threads currently holding the read lock.
    pub fn readers(&self) -> usize {
        self.state.lock().readers
    }

    /// Current write hold count.
    pub fn writers(&self) -> usize {
        self.state.lock().writers
    }

    /// Whether the calling thread is the active writer.
    pub fn is_active_writer(&self) -> bool {
        self.state.lock().is_active_writer()
    }
}

pub struct ReadGuard<'a> {
    lock: &'a MultiReaderLock,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        self.lock.unlock_read();
    }
}

pub struct WriteGuard<'a> {
    lock: &'a MultiReaderLock,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.lock.unlock_write();
    }
}
