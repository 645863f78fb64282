use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Counting semaphore with a close switch
///
/// Every [`signal`](Semaphore::signal) adds one permit and every
/// [`wait`](Semaphore::wait) takes one, blocking while none are available.
/// Because permits are counted, a signal that arrives before the matching
/// wait is not lost. [`close`](Semaphore::close) releases every waiter at
/// once, now and in the future, until [`reopen`](Semaphore::reopen) is called.
#[derive(Debug, Default)]
pub struct Semaphore {
    state: Mutex<State>,
    available: Condvar,
}

#[derive(Debug, Default)]
struct State {
    permits: usize,
    closed: bool,
}

impl Semaphore {
    pub fn new(permits: usize) -> Self {
        Self {
            state: Mutex::new(State {
                permits,
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Block until a permit is available and take it
    ///
    /// Returns `false` without taking a permit if the semaphore is closed.
    pub fn wait(&self) -> bool {
        let mut state = self.lock();
        while state.permits == 0 && !state.closed {
            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        if state.closed {
            return false;
        }
        state.permits -= 1;
        true
    }

    /// Add a permit and wake one waiter
    pub fn signal(&self) {
        let mut state = self.lock();
        state.permits += 1;
        self.available.notify_one();
    }

    /// Wake every waiter and make further waits return immediately
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        self.available.notify_all();
    }

    pub fn reopen(&self) {
        self.lock().closed = false;
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
