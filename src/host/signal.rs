//! Listener registry for host implementations.

use super::{AttachmentListener, AttachmentState, SubscriptionId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type SharedListener = Arc<dyn Fn(AttachmentState) + Send + Sync>;

/// Fan-out of attachment changes to any number of listeners.
///
/// Hosts embed one of these and forward [`super::Host::subscribe`] and
/// [`super::Host::unsubscribe`] to it, then call [`AttachmentSignal::notify`]
/// after changing their state.
#[derive(Default)]
pub struct AttachmentSignal {
    /// Registered listeners in subscription order.
    listeners: Mutex<Vec<(SubscriptionId, SharedListener)>>,
    /// Next id to hand out.
    next_id: AtomicU64,
}

impl AttachmentSignal {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn subscribe(&self, listener: AttachmentListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::from(listener)));
        id
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(existing, _)| *existing != id);
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `state` to every listener.
    ///
    /// The registry lock is released before listeners run, so a listener may
    /// subscribe or unsubscribe re-entrantly.
    pub fn notify(&self, state: AttachmentState) {
        let listeners: Vec<SharedListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(state);
        }
    }
}

impl std::fmt::Debug for AttachmentSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentSignal")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_notify_reaches_every_listener() {
        let signal = AttachmentSignal::new();
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let hits = hits.clone();
            signal.subscribe(Box::new(move |state| {
                assert_eq!(state, AttachmentState::Attached);
                hits.fetch_add(1, Ordering::SeqCst);
            }));
        }

        signal.notify(AttachmentState::Attached);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let signal = AttachmentSignal::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();

        let id = signal.subscribe(Box::new(move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(signal.len(), 1);

        signal.unsubscribe(id);
        signal.unsubscribe(id);
        assert!(signal.is_empty());

        signal.notify(AttachmentState::Detached);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_listener_can_unsubscribe_itself() {
        let signal = Arc::new(AttachmentSignal::new());
        let weak = Arc::downgrade(&signal);

        // Ids are handed out from zero
        signal.subscribe(Box::new(move |_| {
            if let Some(signal) = weak.upgrade() {
                signal.unsubscribe(SubscriptionId(0));
            }
        }));

        signal.notify(AttachmentState::Attached);
        assert!(signal.is_empty());
    }
}
