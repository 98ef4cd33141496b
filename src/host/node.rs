//! `DisplayNode`: An in-memory host for headless embedding and tests.

use super::{AttachmentListener, AttachmentSignal, AttachmentState, Host, SubscriptionId};
use crate::frame::Frame;
use crate::layout::Size;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// One frame pushed to a [`DisplayNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRecord {
    /// When the frame arrived.
    pub at: Instant,
    /// The frame's lines.
    pub lines: Frame,
}

/// Frames a [`DisplayNode`] keeps by default.
pub const DEFAULT_RENDER_HISTORY: usize = 1024;

/// Mutable node state.
#[derive(Debug, Default)]
struct NodeState {
    attachment: AttachmentState,
    rendered: VecDeque<RenderRecord>,
    bounds: Size,
}

/// A host node that lives only in memory.
///
/// Attachment is toggled with [`DisplayNode::attach`] and
/// [`DisplayNode::detach`]. Rendered frames are recorded until taken with
/// [`DisplayNode::take_rendered`]; past the history limit the oldest record
/// is dropped, so a long-running animation uses bounded memory.
#[derive(Debug)]
pub struct DisplayNode {
    state: Mutex<NodeState>,
    /// Woken on every render.
    rendered_cv: Condvar,
    signal: AttachmentSignal,
    /// Most records kept.
    history: usize,
}

impl Default for DisplayNode {
    fn default() -> Self {
        Self::with_history(DEFAULT_RENDER_HISTORY)
    }
}

impl DisplayNode {
    /// Create a detached node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached node keeping at most `history` frames (at least one).
    pub fn with_history(history: usize) -> Self {
        Self {
            state: Mutex::new(NodeState::default()),
            rendered_cv: Condvar::new(),
            signal: AttachmentSignal::new(),
            history: history.max(1),
        }
    }

    /// Create a node that is already attached.
    pub fn attached() -> Self {
        let node = Self::new();
        node.lock().attachment = AttachmentState::Attached;
        node
    }

    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach the node to the display, notifying subscribers on change.
    pub fn attach(&self) {
        self.set_attachment(AttachmentState::Attached);
    }

    /// Detach the node from the display, notifying subscribers on change.
    pub fn detach(&self) {
        self.set_attachment(AttachmentState::Detached);
    }

    /// Set the attachment state, notifying subscribers on change.
    pub fn set_attachment(&self, attachment: AttachmentState) {
        let changed = {
            let mut state = self.lock();
            let changed = state.attachment != attachment;
            state.attachment = attachment;
            changed
        };
        if changed {
            self.signal.notify(attachment);
        }
    }

    /// Number of live attachment subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.signal.len()
    }

    /// Number of frames recorded and not yet taken.
    ///
    /// Never exceeds the history limit.
    pub fn render_count(&self) -> usize {
        self.lock().rendered.len()
    }

    /// Lines of the most recent frame.
    pub fn last_frame(&self) -> Option<Frame> {
        self.lock().rendered.back().map(|record| record.lines.clone())
    }

    /// Copy of every recorded frame, oldest first.
    pub fn rendered(&self) -> Vec<RenderRecord> {
        self.lock().rendered.iter().cloned().collect()
    }

    /// Drain the recorded frames, oldest first.
    pub fn take_rendered(&self) -> Vec<RenderRecord> {
        self.lock().rendered.drain(..).collect()
    }

    /// Last bounds reported by the animation.
    pub fn preferred_bounds(&self) -> Size {
        self.lock().bounds
    }

    /// Block until at least `count` frames are recorded or `timeout` passes.
    ///
    /// A `count` above the history limit is never reached.
    ///
    /// Returns whether the count was reached.
    pub fn wait_for_renders(&self, count: usize, timeout: Duration) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .rendered_cv
            .wait_timeout_while(guard, timeout, |state| state.rendered.len() < count)
            .unwrap_or_else(PoisonError::into_inner);
        guard.rendered.len() >= count
    }
}

impl Host for DisplayNode {
    fn current_attachment(&self) -> AttachmentState {
        self.lock().attachment
    }

    fn subscribe(&self, listener: AttachmentListener) -> SubscriptionId {
        self.signal.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.signal.unsubscribe(id);
    }

    fn render_frame(&self, lines: &[String]) {
        {
            let mut state = self.lock();
            if state.rendered.len() >= self.history {
                state.rendered.pop_front();
            }
            state.rendered.push_back(RenderRecord {
                at: Instant::now(),
                lines: lines.to_vec(),
            });
        }
        self.rendered_cv.notify_all();
    }

    fn report_preferred_bounds(&self, size: Size) {
        self.lock().bounds = size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_node_notifies_only_on_change() {
        let node = DisplayNode::new();
        let edges = Arc::new(AtomicUsize::new(0));
        let edges_clone = edges.clone();
        node.subscribe(Box::new(move |_| {
            edges_clone.fetch_add(1, Ordering::SeqCst);
        }));

        node.detach();
        node.attach();
        node.attach();
        node.detach();

        assert_eq!(edges.load(Ordering::SeqCst), 2);
        assert_eq!(node.current_attachment(), AttachmentState::Detached);
    }

    #[test]
    fn test_node_records_frames() {
        let node = DisplayNode::attached();
        assert!(node.current_attachment().is_attached());

        node.render_frame(&["a".to_string()]);
        node.render_frame(&["b".to_string()]);
        node.report_preferred_bounds(Size::new(3, 2));

        assert_eq!(node.render_count(), 2);
        assert_eq!(node.last_frame(), Some(vec!["b".to_string()]));
        assert_eq!(node.preferred_bounds(), Size::new(3, 2));

        let taken = node.take_rendered();
        assert_eq!(taken.len(), 2);
        assert_eq!(node.render_count(), 0);
    }

    #[test]
    fn test_history_drops_oldest_frames() {
        let node = DisplayNode::with_history(2);
        for text in ["a", "b", "c"] {
            node.render_frame(&[text.to_string()]);
        }

        assert_eq!(node.render_count(), 2);
        let kept: Vec<_> = node.rendered().into_iter().map(|r| r.lines).collect();
        assert_eq!(kept, [vec!["b".to_string()], vec!["c".to_string()]]);
        assert_eq!(node.last_frame(), Some(vec!["c".to_string()]));
    }

    #[test]
    fn test_wait_for_renders_times_out() {
        let node = DisplayNode::new();
        assert!(!node.wait_for_renders(1, Duration::from_millis(20)));
        node.render_frame(&[String::new()]);
        assert!(node.wait_for_renders(1, Duration::from_millis(20)));
    }
}
