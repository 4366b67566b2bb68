use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::watch;

type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A registered callback and the last version it was handed.
struct Subscriber<T> {
    callback: Callback<T>,
    delivered: Mutex<Option<u64>>,
}

impl<T> Subscriber<T> {
    /// Runs the callback unless a newer version already reached it.
    ///
    /// The `delivered` lock is held across the call, so one subscriber never
    /// sees two values at once or an older value after a newer one.
    fn deliver(&self, version: u64, value: &T) {
        let mut delivered = lock(&self.delivered);
        if delivered.is_some_and(|last| last >= version) {
            return;
        }
        (self.callback)(value);
        *delivered = Some(version);
    }
}

struct Registry<T> {
    next_id: u64,
    version: u64,
    subscribers: Vec<(u64, Arc<Subscriber<T>>)>,
}

/// A typed publish-subscribe cell holding the current value.
///
/// Callback subscribers receive the current snapshot as soon as they
/// subscribe and every committed value synchronously, before `set` returns.
/// Async consumers can instead hold a `watch` receiver.
///
/// Each commit carries a version. The registry lock covers both the commit
/// and the snapshot a new subscriber starts from, so no subscriber misses a
/// commit or ends on a value older than the cell's.
///
/// Callbacks must not call `set` on the cell that is notifying them.
pub struct StateCell<T> {
    current: watch::Sender<T>,
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: Clone + Send + Sync + 'static> StateCell<T> {
    /// Creates a new `StateCell` holding `initial`.
    pub fn new(initial: T) -> Self {
        let (current, _) = watch::channel(initial);

        Self {
            current,
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.current.borrow().clone()
    }

    /// Commits `value` and notifies every subscriber with it.
    pub fn set(&self, value: T) {
        let (version, subscribers) = {
            let mut registry = lock(&self.registry);
            registry.version += 1;
            self.current.send_replace(value.clone());
            let subscribers: Vec<Arc<Subscriber<T>>> = registry
                .subscribers
                .iter()
                .map(|(_, subscriber)| Arc::clone(subscriber))
                .collect();
            (registry.version, subscribers)
        };

        // Delivery runs outside the registry lock so callbacks may subscribe
        // or unsubscribe.
        for subscriber in subscribers {
            subscriber.deliver(version, &value);
        }
    }

    /// Registers `callback`, calling it immediately with the current value.
    ///
    /// # Returns
    ///
    /// A `Subscription` that unsubscribes when dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let subscriber = Arc::new(Subscriber {
            callback: Box::new(callback),
            delivered: Mutex::new(None),
        });

        let (id, version, snapshot) = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.subscribers.push((id, Arc::clone(&subscriber)));
            (id, registry.version, self.get())
        };

        subscriber.deliver(version, &snapshot);

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Returns a receiver that observes every committed value.
    pub fn watch(&self) -> watch::Receiver<T> {
        self.current.subscribe()
    }

    /// The number of live callback subscribers.
    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).subscribers.len()
    }
}

/// A live subscription to a `StateCell`. Dropping it unsubscribes.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription<T> {
    id: u64,
    registry: Weak<Mutex<Registry<T>>>,
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}
