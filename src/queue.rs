//! The external event queue: the single thread-safe ingress point a host
//! uses to drive the interpreter. Internal events never
//! cross this boundary — they are produced and consumed entirely inside the
//! single-threaded step loop, so they live as a plain `VecDeque` on
//! [`crate::interpreter::Interpreter`] instead of behind a lock.

use crate::event::Event;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A `Mutex`-guarded FIFO a host may push onto from another thread while the
/// interpreter's own loop stays single-threaded and cooperative.
#[derive(Debug, Default)]
pub struct ExternalQueue {
    inner: Mutex<VecDeque<Event>>,
}

impl ExternalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.inner.lock().expect("external queue poisoned").push_back(event);
    }

    pub fn pop(&self) -> Option<Event> {
        self.inner.lock().expect("external queue poisoned").pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().expect("external queue poisoned").is_empty()
    }
}
