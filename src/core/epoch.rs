//! Grace-period publication cell
//!
//! Holds the one piece of contended shared state: the pointer to the current
//! ring buffer. Readers pin it with [`EpochCell::read`], which never blocks
//! and never takes a lock. [`EpochCell::replace`] publishes a new value and
//! then waits until every reader that could still see the old one has
//! dropped its guard, so the returned box is exclusively owned.
//!
//! Readers register in one of two counters selected by the parity of a
//! global epoch. A replace swaps the pointer, bumps the epoch, and waits for
//! the counter of the previous parity to drain. A reader that registered
//! against a stale epoch notices the bump on its re-check and retries, so
//! it either is counted or loads the new pointer.

use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

/// Atomically replaceable `Option<Box<T>>` with deferred reclamation
pub struct EpochCell<T> {
    current: AtomicPtr<T>,
    epoch: AtomicUsize,
    readers: [AtomicUsize; 2],
    /// Serializes replacers against each other
    writer: Mutex<()>,
    _owned: PhantomData<Box<T>>,
}

// Readers hand out `&T` across threads and replacers move boxes between them.
unsafe impl<T: Send + Sync> Send for EpochCell<T> {}
unsafe impl<T: Send + Sync> Sync for EpochCell<T> {}

impl<T> EpochCell<T> {
    /// Create a cell, optionally holding a value
    pub fn new(value: Option<Box<T>>) -> Self {
        Self {
            current: AtomicPtr::new(into_raw(value)),
            epoch: AtomicUsize::new(0),
            readers: [AtomicUsize::new(0), AtomicUsize::new(0)],
            writer: Mutex::new(()),
            _owned: PhantomData,
        }
    }

    /// Create an empty cell
    pub fn empty() -> Self {
        Self::new(None)
    }

    /// Pin the current value for the lifetime of the guard
    pub fn read(&self) -> ReadGuard<'_, T> {
        loop {
            let epoch = self.epoch.load(Ordering::SeqCst);
            let slot = epoch & 1;
            self.readers[slot].fetch_add(1, Ordering::SeqCst);

            if self.epoch.load(Ordering::SeqCst) == epoch {
                let ptr = self.current.load(Ordering::SeqCst);
                return ReadGuard {
                    cell: self,
                    slot,
                    ptr,
                };
            }

            // A replace flipped the epoch under us, register again
            self.readers[slot].fetch_sub(1, Ordering::SeqCst);
            std::hint::spin_loop();
        }
    }

    /// Publish `value` and hand back the previous value once no reader can
    /// observe it anymore.
    ///
    /// Blocks until the grace period ends. Must not be called while the
    /// calling thread holds a [`ReadGuard`] of the same cell.
    pub fn replace(&self, value: Option<Box<T>>) -> Option<Box<T>> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let old = self.current.swap(into_raw(value), Ordering::SeqCst);
        self.synchronize();

        if old.is_null() {
            None
        } else {
            // SAFETY: the pointer came from Box::into_raw and the grace
            // period guarantees no reader still references it.
            Some(unsafe { Box::from_raw(old) })
        }
    }

    /// Check whether a value is currently published
    pub fn is_set(&self) -> bool {
        !self.current.load(Ordering::SeqCst).is_null()
    }

    fn synchronize(&self) {
        let previous = self.epoch.fetch_add(1, Ordering::SeqCst);
        let slot = previous & 1;
        while self.readers[slot].load(Ordering::SeqCst) != 0 {
            thread::yield_now();
        }
    }
}

impl<T> Default for EpochCell<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Drop for EpochCell<T> {
    fn drop(&mut self) {
        let ptr = *self.current.get_mut();
        if !ptr.is_null() {
            // SAFETY: `&mut self` means no guard can be alive.
            drop(unsafe { Box::from_raw(ptr) });
        }
    }
}

fn into_raw<T>(value: Option<Box<T>>) -> *mut T {
    value.map_or(ptr::null_mut(), Box::into_raw)
}

/// Read-side guard; the pinned value stays alive until this is dropped
pub struct ReadGuard<'a, T> {
    cell: &'a EpochCell<T>,
    slot: usize,
    ptr: *const T,
}

impl<'a, T> ReadGuard<'a, T> {
    /// The pinned value, if one was published
    pub fn get(&self) -> Option<&T> {
        // SAFETY: non-null pointers stay valid while this guard is
        // registered in its reader counter.
        unsafe { self.ptr.as_ref() }
    }
}

impl<'a, T> Drop for ReadGuard<'a, T> {
    fn drop(&mut self) {
        self.cell.readers[self.slot].fetch_sub(1, Ordering::SeqCst);
    }
}
