//! Replay-latest observer list
//!
//! A new subscriber is called immediately with the last published value,
//! then once per later publish. Observers run synchronously, in
//! registration order, with no internal lock held, so an observer may read
//! from (or subscribe to) the same store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Handle returned by `subscribe`, used to detach the observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: T,
    observers: Vec<(SubscriptionId, Observer<T>)>,
}

pub struct Observable<T> {
    inner: Mutex<Inner<T>>,
    next_id: AtomicU64,
}

impl<T: Clone> Observable<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Mutex::new(Inner {
                value: initial,
                observers: Vec::new(),
            }),
            next_id: AtomicU64::new(0),
        }
    }

    // A panicking observer must not wedge every later publish
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Last published value
    pub fn get(&self) -> T {
        self.lock().value.clone()
    }

    /// Register an observer; it is called right away with the current value
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let observer: Observer<T> = Arc::new(observer);
        let current = {
            let mut inner = self.lock();
            inner.observers.push((id, Arc::clone(&observer)));
            inner.value.clone()
        };
        observer(&current);
        id
    }

    /// Detach an observer; returns false if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.observers.len();
        inner.observers.retain(|(existing, _)| *existing != id);
        inner.observers.len() != before
    }

    /// Store a new value and notify every observer in registration order
    pub fn publish(&self, value: T) {
        let observers: Vec<Observer<T>> = {
            let mut inner = self.lock();
            inner.value = value.clone();
            inner.observers.iter().map(|(_, o)| Arc::clone(o)).collect()
        };
        for observer in observers {
            observer(&value);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }
}
