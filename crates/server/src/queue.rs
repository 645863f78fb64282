use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use transport::Command;

use crate::Semaphore;

/// Mailbox carrying commands from the network thread to the execution thread
///
/// Commands come out in the order they were pushed. Each push signals the
/// queue's semaphore once, so a consumer blocked in [`wait`](Self::wait)
/// never misses a command.
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Mutex<VecDeque<Command>>,
    ready: Semaphore,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, command: Command) {
        tracing::trace!(%command, "queueing command");
        self.lock().push_back(command);
        self.ready.signal();
    }

    pub fn has_pending(&self) -> bool {
        !self.lock().is_empty()
    }

    /// Take the oldest command, if any, without blocking
    pub fn pop(&self) -> Option<Command> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Block until a command has been pushed or the queue is closed
    ///
    /// Returns `false` once the queue is closed. A `true` return does not
    /// guarantee the command is still there: [`pop`](Self::pop) leaves the
    /// push's permit behind, so commands taken without waiting make later
    /// waits return once each with nothing to pop. Consumers drain with
    /// `pop` after every wakeup and wait again when the queue is empty.
    pub fn wait(&self) -> bool {
        self.ready.wait()
    }

    /// Release every consumer blocked in [`wait`](Self::wait)
    pub fn close(&self) {
        self.ready.close();
    }

    pub fn reopen(&self) {
        self.ready.reopen();
    }

    pub fn is_closed(&self) -> bool {
        self.ready.is_closed()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Command>> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
