//! Graph change fan-out.
//!
//! No payload travels with a notification: the graph is small and resolution
//! is cheap, so subscribers re-query whichever transforms they care about
//! instead of this module tracking which frames changed.

use std::sync::{Arc, Mutex, Weak};

type Callback = Arc<Mutex<dyn FnMut() + Send>>;

struct ListenerSlot {
    id: u64,
    callback: Callback,
}

#[derive(Default)]
struct NotifierInner {
    listeners: Vec<ListenerSlot>,
    next_id: u64,
}

/// Synchronous publish point for graph mutations.
///
/// Cloning shares the listener list, so the ingestion side and the rendering
/// layers can hold the same notifier.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    inner: Arc<Mutex<NotifierInner>>,
}

/// Handle returned by [`ChangeNotifier::subscribe`].
///
/// Dropping the handle does not unsubscribe; call [`Subscription::unsubscribe`],
/// which is idempotent and safe from inside an in-flight notification.
pub struct Subscription {
    id: u64,
    inner: Weak<Mutex<NotifierInner>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked on every graph change, after all callbacks
    /// registered before it.
    pub fn subscribe(&self, callback: impl FnMut() + Send + 'static) -> Subscription {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push(ListenerSlot {
            id,
            callback: Arc::new(Mutex::new(callback)),
        });
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Invoke every subscribed callback, in subscription order, on the
    /// calling thread.
    ///
    /// The listener list is snapshotted up front and no lock is held while a
    /// callback runs, so a callback may subscribe or unsubscribe (itself
    /// included) without corrupting the loop. A listener unsubscribed after
    /// the snapshot but before its turn is skipped.
    pub fn notify(&self) {
        let snapshot: Vec<(u64, Callback)> = {
            let inner = self.inner.lock().unwrap();
            inner
                .listeners
                .iter()
                .map(|slot| (slot.id, slot.callback.clone()))
                .collect()
        };

        for (id, callback) in snapshot {
            let still_subscribed = {
                let inner = self.inner.lock().unwrap();
                inner.listeners.iter().any(|slot| slot.id == id)
            };
            if still_subscribed {
                let mut callback = callback.lock().unwrap();
                (*callback)();
            }
        }
    }

    #[cfg(test)]
    fn listener_count(&self) -> usize {
        self.inner.lock().unwrap().listeners.len()
    }
}

impl Subscription {
    /// Remove the callback. A no-op if already unsubscribed or if the
    /// notifier is gone.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.inner.upgrade() {
            let mut inner = inner.lock().unwrap();
            inner.listeners.retain(|slot| slot.id != self.id);
        }
    }
}
