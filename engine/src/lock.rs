//! A multi-reader / single-writer lock.
//!
//! Any number of readers may hold the lock at once; a writer excludes everyone.
//! Once a writer is waiting, new readers are held back until it has run, while
//! readers already inside are allowed to finish. The lock is not reentrant:
//! acquiring it again from a thread that already holds it will deadlock.

use parking_lot::{Condvar, Mutex};
use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

#[derive(Debug, Default)]
struct LockState {
    readers: usize,
    writer: bool,
    waiting_writers: usize,
}

impl LockState {
    fn admits_reader(&self) -> bool {
        !self.writer && self.waiting_writers == 0
    }
}

pub struct MultiReaderLock<T> {
    state: Mutex<LockState>,
    readers_cv: Condvar,
    writers_cv: Condvar,
    data: UnsafeCell<T>,
}

// SAFETY: the lock owns `data`, so moving the lock moves a `T`.
unsafe impl<T: Send> Send for MultiReaderLock<T> {}
// SAFETY: `data` is only reached through the guards. Read guards share `&T`
// across threads (needs `Sync`) and a write guard is the only live accessor
// while it exists (needs `Send`).
unsafe impl<T: Send + Sync> Sync for MultiReaderLock<T> {}

impl<T> MultiReaderLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            state: Mutex::new(LockState::default()),
            readers_cv: Condvar::new(),
            writers_cv: Condvar::new(),
            data: UnsafeCell::new(value),
        }
    }

    /// Blocks while a writer is active or waiting.
    pub fn read(&self) -> ReadGuard<'_, T> {
        let mut state = self.state.lock();
        while !state.admits_reader() {
            self.readers_cv.wait(&mut state);
        }
        state.readers += 1;
        ReadGuard { lock: self }
    }

    /// Non-blocking variant of [`read`](Self::read).
    pub fn try_read(&self) -> Option<ReadGuard<'_, T>> {
        let mut state = self.state.lock();
        if !state.admits_reader() {
            return None;
        }
        state.readers += 1;
        Some(ReadGuard { lock: self })
    }

    /// Blocks while any reader or another writer holds the lock.
    pub fn write(&self) -> WriteGuard<'_, T> {
        let mut state = self.state.lock();
        state.waiting_writers += 1;
        while state.writer || state.readers > 0 {
            self.writers_cv.wait(&mut state);
        }
        state.waiting_writers -= 1;
        state.writer = true;
        WriteGuard { lock: self }
    }

    /// Number of writers currently blocked in [`write`](Self::write).
    pub fn waiting_writers(&self) -> usize {
        self.state.lock().waiting_writers
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }

    fn release_read(&self) {
        let mut state = self.state.lock();
        state.readers -= 1;
        if state.readers == 0 {
            self.writers_cv.notify_one();
        }
    }

    fn release_write(&self) {
        let mut state = self.state.lock();
        state.writer = false;
        if state.waiting_writers > 0 {
            self.writers_cv.notify_one();
        } else {
            self.readers_cv.notify_all();
        }
    }
}

impl<T: Default> Default for MultiReaderLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

pub struct ReadGuard<'a, T> {
    lock: &'a MultiReaderLock<T>,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: while a read guard lives no writer can be admitted.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

pub struct WriteGuard<'a, T> {
    lock: &'a MultiReaderLock<T>,
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the write guard is the only live accessor.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the write guard is the only live accessor.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}
