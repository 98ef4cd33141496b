//! Attachment Monitor: Blocking waits for attach and detach edges.
//!
//! The monitor subscribes to the host's attachment notifications and turns
//! them into channel messages, so a worker thread can sleep in `select!`
//! until either the state it wants shows up or it is cancelled. There is no
//! polling: an idle monitor costs nothing but a parked thread.

use crate::error::{AnimationError, Result};
use crate::host::{AttachmentState, Host, SubscriptionId};
use crossbeam_channel::{select, unbounded, Receiver, TryRecvError};
use std::sync::Weak;

/// Waits for the host to become attached or detached.
///
/// Notifications are only used as wake-ups; after each one the monitor asks
/// the host for its current state, so the host stays the source of truth
/// even when notifications from racing threads arrive out of order.
pub struct AttachmentMonitor {
    /// The host being watched. Not kept alive by the monitor.
    host: Weak<dyn Host>,
    /// Our subscription, removed on drop.
    subscription: Option<SubscriptionId>,
    /// Wake-ups from the host listener.
    events: Receiver<AttachmentState>,
    /// Disconnects when the owner cancels.
    cancel: Receiver<()>,
    /// Last state observed.
    last: AttachmentState,
}

impl AttachmentMonitor {
    /// Subscribe to `host` and read its initial state.
    ///
    /// The subscription is registered before the initial query, so an edge
    /// that happens in between is still seen. A host that is already gone is
    /// treated as permanently detached.
    ///
    /// # Arguments
    ///
    /// * `host` - The node to watch.
    /// * `cancel` - Channel whose disconnection cancels any wait.
    pub fn subscribe(host: Weak<dyn Host>, cancel: Receiver<()>) -> Self {
        let (event_tx, events) = unbounded();

        let (subscription, last) = match host.upgrade() {
            Some(live) => {
                let id = live.subscribe(Box::new(move |state| {
                    // Receiver gone means the monitor is being torn down
                    let _ = event_tx.send(state);
                }));
                (Some(id), live.current_attachment())
            }
            None => (None, AttachmentState::Detached),
        };

        Self {
            host,
            subscription,
            events,
            cancel,
            last,
        }
    }

    /// The state seen by the most recent wake-up.
    #[inline]
    pub const fn last_observed(&self) -> AttachmentState {
        self.last
    }

    /// Block until the host is attached. Returns immediately if it already is.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationError::Cancelled`] if the owner cancelled.
    pub fn wait_for_attach(&mut self) -> Result<()> {
        self.wait_for(AttachmentState::Attached)
    }

    /// Block until the host is detached. Returns immediately if it already is.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationError::Cancelled`] if the owner cancelled.
    pub fn wait_for_detach(&mut self) -> Result<()> {
        self.wait_for(AttachmentState::Detached)
    }

    fn wait_for(&mut self, target: AttachmentState) -> Result<()> {
        loop {
            // Teardown wins over a state that happens to match
            if self.is_cancelled() {
                return Err(AnimationError::Cancelled);
            }
            if self.last == target {
                return Ok(());
            }

            select! {
                recv(self.cancel) -> _ => return Err(AnimationError::Cancelled),
                recv(self.events) -> event => {
                    if event.is_ok() {
                        // Coalesce a burst into a single look at the host
                        while self.events.try_recv().is_ok() {}
                        self.last = self.observe();
                        tracing::trace!(state = ?self.last, "attachment changed");
                    } else {
                        // The host dropped its listeners: it will never attach again
                        self.last = AttachmentState::Detached;
                        if target == AttachmentState::Attached {
                            let _ = self.cancel.recv();
                            return Err(AnimationError::Cancelled);
                        }
                    }
                }
            }
        }
    }

    fn observe(&self) -> AttachmentState {
        self.host
            .upgrade()
            .map_or(AttachmentState::Detached, |host| host.current_attachment())
    }

    fn is_cancelled(&self) -> bool {
        matches!(self.cancel.try_recv(), Err(TryRecvError::Disconnected))
    }
}

impl Drop for AttachmentMonitor {
    fn drop(&mut self) {
        if let (Some(id), Some(host)) = (self.subscription.take(), self.host.upgrade()) {
            host.unsubscribe(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DisplayNode;
    use crossbeam_channel::bounded;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn watch(node: &Arc<DisplayNode>) -> (AttachmentMonitor, crossbeam_channel::Sender<()>) {
        let (cancel_tx, cancel_rx) = bounded(0);
        let host: Weak<dyn Host> = Arc::downgrade(node) as Weak<dyn Host>;
        (AttachmentMonitor::subscribe(host, cancel_rx), cancel_tx)
    }

    #[test]
    fn test_wait_returns_immediately_when_state_holds() {
        let node = Arc::new(DisplayNode::attached());
        let (mut monitor, _cancel) = watch(&node);

        assert_eq!(monitor.last_observed(), AttachmentState::Attached);
        assert!(monitor.wait_for_attach().is_ok());
    }

    #[test]
    fn test_wait_wakes_on_attach_edge() {
        let node = Arc::new(DisplayNode::new());
        let (mut monitor, _cancel) = watch(&node);

        let attacher = {
            let node = node.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(30));
                node.attach();
            })
        };

        let start = Instant::now();
        assert!(monitor.wait_for_attach().is_ok());
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(monitor.last_observed(), AttachmentState::Attached);
        attacher.join().unwrap();

        node.detach();
        assert!(monitor.wait_for_detach().is_ok());
    }

    #[test]
    fn test_cancel_unblocks_wait() {
        let node = Arc::new(DisplayNode::new());
        let (mut monitor, cancel) = watch(&node);

        let waiter = thread::spawn(move || monitor.wait_for_attach());
        thread::sleep(Duration::from_millis(20));
        drop(cancel);

        let result = waiter.join().unwrap();
        assert!(matches!(result, Err(AnimationError::Cancelled)));
    }

    #[test]
    fn test_cancel_wins_over_matching_state() {
        let node = Arc::new(DisplayNode::attached());
        let (mut monitor, cancel) = watch(&node);
        drop(cancel);
        assert!(monitor.wait_for_attach().unwrap_err().is_cancelled());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let node = Arc::new(DisplayNode::new());
        let (monitor, _cancel) = watch(&node);
        assert_eq!(node.subscriber_count(), 1);
        drop(monitor);
        assert_eq!(node.subscriber_count(), 0);
    }

    #[test]
    fn test_dropped_host_counts_as_detached() {
        let node = Arc::new(DisplayNode::attached());
        let (mut monitor, cancel) = watch(&node);
        drop(node);

        assert!(monitor.wait_for_detach().is_ok());

        // Waiting for an attach that can never come parks until cancelled
        let waiter = thread::spawn(move || monitor.wait_for_attach());
        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished());
        drop(cancel);
        assert!(waiter.join().unwrap().is_err());
    }
}
