use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// Bounded FIFO shared by one producer and one consumer.
///
/// When full, the oldest element is discarded so the producer never
/// blocks. The consumer parks on a condition variable until an element
/// arrives or the queue is stopped; after `stop`, remaining elements are
/// still drained before `pop` returns `None`.
pub struct DropOldestQueue<T> {
    inner: Mutex<Inner<T>>,
    available: Condvar,
    capacity: usize,
}

struct Inner<T> {
    items: VecDeque<T>,
    stopped: bool,
}

impl<T> DropOldestQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::new(),
                stopped: false,
            }),
            available: Condvar::new(),
            capacity: capacity.max(1),
        }
    }

    /// Enqueue without blocking. Returns true when an older element had to
    /// be discarded to make room.
    pub fn push(&self, item: T) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let mut dropped = false;
        if inner.items.len() >= self.capacity {
            inner.items.pop_front();
            dropped = true;
        }
        inner.items.push_back(item);
        drop(inner);
        self.available.notify_one();
        dropped
    }

    /// Block until an element is available or the queue is stopped.
    /// Returns `None` once stopped and drained.
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if let Some(item) = inner.items.pop_front() {
                return Some(item);
            }
            if inner.stopped {
                return None;
            }
            inner = self.available.wait(inner).unwrap();
        }
    }

    /// Wake the consumer and make `pop` return `None` once the queue is
    /// drained.
    pub fn stop(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.stopped = true;
        drop(inner);
        self.available.notify_all();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
