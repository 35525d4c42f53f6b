//! Observable value cells.
//!
//! A [`Store`] holds one value and a list of subscribers. Writes replace the
//! value and notify every subscriber synchronously, in the order they
//! subscribed, before returning. Clones of a store share the same cell.
//!
//! No lock is held while subscriber callbacks run, so a callback may read or
//! write the store, or unsubscribe itself or others. A write made from inside
//! a callback is queued behind the current round and flushed by the outermost
//! `set`, so every subscriber sees writes in order and ends on the current value.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: T,
    /// Keyed by a monotonically increasing id, so iteration is registration order.
    subscribers: BTreeMap<u64, Subscriber<T>>,
    next_id: u64,
    /// Pending `(subscriber id, value)` notifications, oldest first.
    queue: VecDeque<(u64, T)>,
    flushing: bool,
}

/// Clears the flush state if a subscriber panics mid-flush.
struct FlushGuard<'a, T> {
    inner: &'a Mutex<Inner<T>>,
}

impl<T> Drop for FlushGuard<'_, T> {
    fn drop(&mut self) {
        let mut inner = lock(self.inner);
        inner.flushing = false;
        inner.queue.clear();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Type-erased handle a [`Subscription`] uses to remove itself.
trait Registry: Send + Sync {
    fn remove(&self, id: u64);
}

impl<T: Send> Registry for Mutex<Inner<T>> {
    fn remove(&self, id: u64) {
        lock(self).subscribers.remove(&id);
    }
}

/// A single mutable value with subscriber notification.
pub struct Store<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Store {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default + Clone + Send + 'static> Default for Store<T> {
    fn default() -> Self {
        Store::new(T::default())
    }
}

impl<T: Clone + Send + 'static> Store<T> {
    pub fn new(value: T) -> Self {
        Store {
            inner: Arc::new(Mutex::new(Inner {
                value,
                subscribers: BTreeMap::new(),
                next_id: 0,
                queue: VecDeque::new(),
                flushing: false,
            })),
        }
    }

    /// Current value.
    pub fn get(&self) -> T {
        lock(&self.inner).value.clone()
    }

    /// Replace the value and notify all subscribers before returning.
    ///
    /// Called from inside a subscriber, the notifications are queued and
    /// delivered by the `set` already flushing once earlier ones are done.
    pub fn set(&self, value: T) {
        {
            let mut inner = lock(&self.inner);
            inner.value = value.clone();

            let ids: Vec<u64> = inner.subscribers.keys().copied().collect();
            tracing::trace!(subscribers = ids.len(), nested = inner.flushing, "store updated");
            inner
                .queue
                .extend(ids.into_iter().map(|id| (id, value.clone())));

            if inner.flushing {
                return;
            }
            inner.flushing = true;
        }

        let _guard = FlushGuard { inner: &self.inner };

        loop {
            let (subscriber, value) = {
                let mut inner = lock(&self.inner);
                let Some((id, value)) = inner.queue.pop_front() else {
                    break;
                };
                // An earlier callback may have unsubscribed this one
                let Some(subscriber) = inner.subscribers.get(&id) else {
                    continue;
                };
                (Arc::clone(subscriber), value)
            };
            subscriber(&value);
        }
    }

    /// Set the value computed from the current one.
    pub fn update(&self, f: impl FnOnce(T) -> T) {
        let next = f(self.get());
        self.set(next);
    }

    /// Register `callback`. It is called once right away with the current
    /// value and then after every [`Store::set`] until unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let callback: Subscriber<T> = Arc::new(callback);

        let (id, current) = {
            let mut inner = lock(&self.inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.insert(id, Arc::clone(&callback));
            (id, inner.value.clone())
        };

        callback(&current);

        let registry: Arc<dyn Registry> = self.inner.clone();
        Subscription {
            id,
            registry: Arc::downgrade(&registry),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }
}

/// Handle returned by [`Store::subscribe`].
///
/// Dropping it does not unsubscribe; call [`Subscription::unsubscribe`].
#[must_use = "a subscription stays active until `unsubscribe` is called"]
pub struct Subscription {
    id: u64,
    registry: Weak<dyn Registry>,
}

impl Subscription {
    /// Stop notifications to this subscriber. Safe to call more than once.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}
