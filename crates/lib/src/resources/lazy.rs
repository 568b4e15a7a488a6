//! One-shot lazily constructed shared values.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Lifecycle of a [`LazyResource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Nobody asked for the value yet, or the last construction panicked.
    Uninitialized,
    /// One caller is constructing the value; others wait.
    Initializing,
    /// The value is built and shared.
    Ready,
}

enum Slot<T> {
    Uninitialized,
    Initializing,
    Ready(Arc<T>),
}

impl<T> Slot<T> {
    fn state(&self) -> ResourceState {
        match self {
            Slot::Uninitialized => ResourceState::Uninitialized,
            Slot::Initializing => ResourceState::Initializing,
            Slot::Ready(_) => ResourceState::Ready,
        }
    }
}

/// A value built at most once, on first access, and shared afterwards.
///
/// The first caller of [`get_or_init`](Self::get_or_init) moves the resource
/// to `Initializing` and runs the constructor without holding the lock;
/// concurrent callers park on a condition variable until the value is
/// `Ready`. If the constructor panics the resource goes back to
/// `Uninitialized`, the waiters are woken and the next caller retries.
pub struct LazyResource<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T> LazyResource<T> {
    /// Create an uninitialized resource.
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Uninitialized),
            ready: Condvar::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ResourceState {
        self.lock().state()
    }

    /// The value, if it has been built.
    pub fn get(&self) -> Option<Arc<T>> {
        match &*self.lock() {
            Slot::Ready(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Return the shared value, building it with `init` if needed.
    ///
    /// `init` runs at most once across all callers unless it panics.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> Arc<T> {
        let mut slot = self.lock();
        loop {
            if let Slot::Ready(value) = &*slot {
                return Arc::clone(value);
            }
            if matches!(*slot, Slot::Uninitialized) {
                break;
            }
            slot = self
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *slot = Slot::Initializing;
        drop(slot);

        let mut reset = ResetOnUnwind {
            resource: self,
            armed: true,
        };
        let value = Arc::new(init());
        reset.armed = false;

        *self.lock() = Slot::Ready(Arc::clone(&value));
        self.ready.notify_all();
        value
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for LazyResource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for LazyResource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyResource")
            .field("state", &self.state())
            .finish()
    }
}

/// Puts the resource back to `Uninitialized` if the constructor unwinds.
struct ResetOnUnwind<'a, T> {
    resource: &'a LazyResource<T>,
    armed: bool,
}

impl<T> Drop for ResetOnUnwind<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            *self.resource.lock() = Slot::Uninitialized;
            self.resource.ready.notify_all();
        }
    }
}
